/// Fuzzes the planners on many random fields. Path lengths are checked against a brute-force
/// breadth-first search, and coverage paths against the set of cells reachable from the start.
use field_pathing::{AstarSolver, Cell, CoveragePlanner, GridSolver, GridWorld};
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use rand::prelude::*;
use std::collections::VecDeque;

fn random_world(w: usize, h: usize, rng: &mut StdRng, rate: f64) -> GridWorld {
    let mut world = GridWorld::new(w, h).unwrap();
    world.randomize_obstacles(rate, rng);
    world
}

/// Distances from `start` to every reachable free cell.
fn bfs(world: &GridWorld, start: Cell) -> FxHashMap<Cell, usize> {
    let mut dist = FxHashMap::default();
    dist.insert(start, 0);
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        let d = dist[&cell];
        for n in cell.neumann_neighborhood() {
            if world.is_free(&n) && !dist.contains_key(&n) {
                dist.insert(n, d + 1);
                queue.push_back(n);
            }
        }
    }
    dist
}

fn visualize_grid(world: &GridWorld) {
    println!("{world}");
}

fn assert_followable(world: &GridWorld, from: Cell, path: &[Cell]) {
    for (a, b) in std::iter::once(&from).chain(path).tuple_windows() {
        assert!(a.is_adjacent(b), "{a} -> {b} is not a single move");
        assert!(world.is_free(b), "{b} is blocked");
    }
}

#[test]
fn fuzz_distance() {
    const N_GRIDS: usize = 2000;
    let mut rng = StdRng::seed_from_u64(0);
    let solver = AstarSolver::new();
    for _ in 0..N_GRIDS {
        let world = random_world(9, 7, &mut rng, 0.35);
        let (start, goal) = (world.start(), world.goal());
        let path = solver.find_path(&world, start, goal);
        let expected = bfs(&world, start).get(&goal).copied();
        if expected.unwrap_or(0) != path.len() {
            visualize_grid(&world);
        }
        match expected {
            Some(d) => {
                assert_eq!(path.len(), d);
                assert_eq!(solver.get_path_cost(&path), d as i32);
                assert_eq!(path.last(), Some(&goal));
                assert_followable(&world, start, &path);
            }
            None => assert!(path.is_empty()),
        }
    }
}

/// Same check with the components left stale, so only the search itself decides.
#[test]
fn fuzz_distance_after_toggles() {
    let mut rng = StdRng::seed_from_u64(1);
    let solver = AstarSolver::new();
    for _ in 0..500 {
        let mut world = random_world(8, 8, &mut rng, 0.2);
        for _ in 0..6 {
            let cell = Cell::new(rng.gen_range(1..7), rng.gen_range(1..7));
            let _ = world.toggle_obstacle(cell);
        }
        let (start, goal) = (world.start(), world.goal());
        let path = solver.find_path(&world, start, goal);
        let expected = bfs(&world, start).get(&goal).copied().unwrap_or(0);
        assert_eq!(path.len(), expected);
    }
}

#[test]
fn fuzz_coverage() {
    const N_GRIDS: usize = 300;
    let mut rng = StdRng::seed_from_u64(2);
    let planner = CoveragePlanner::new(AstarSolver::new());
    for _ in 0..N_GRIDS {
        let world = random_world(10, 8, &mut rng, 0.25);
        let start = world.start();
        let path = planner.plan(&world, start);
        assert_followable(&world, start, &path);

        let mut visited = path.iter().copied().collect::<FxHashSet<_>>();
        visited.insert(start);
        let reachable = bfs(&world, start).into_keys().collect::<FxHashSet<_>>();
        if visited != reachable {
            visualize_grid(&world);
        }
        assert_eq!(visited, reachable);
    }
}
