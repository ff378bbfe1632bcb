use crate::{cell::Cell, solver::GridSolver, MOVE_COST};

/// A* with the Manhattan distance as heuristic. On a 4-connected unit-cost grid this never
/// overestimates and is consistent, so returned paths are shortest paths.
#[derive(Clone, Debug, Default)]
pub struct AstarSolver;

impl AstarSolver {
    pub fn new() -> AstarSolver {
        AstarSolver
    }
}

impl GridSolver for AstarSolver {
    fn heuristic(&self, p1: &Cell, p2: &Cell) -> i32 {
        p1.manhattan_distance(p2) * MOVE_COST
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_world::GridWorld;
    use itertools::Itertools;

    fn is_valid_path(world: &GridWorld, from: Cell, path: &[Cell]) -> bool {
        std::iter::once(&from)
            .chain(path)
            .tuple_windows()
            .all(|(a, b)| a.is_adjacent(b) && world.is_free(b))
    }

    /// Asserts that the optimal 4 step solution is found around a single obstacle.
    #[test]
    fn solve_simple_problem() {
        let world = GridWorld::from_rows(&[
            "#####", //
            "#S..#", //
            "#.#.#", //
            "#..G#", //
            "#####",
        ])
        .unwrap();
        let solver = AstarSolver::new();
        let path = solver.find_path(&world, world.start(), world.goal());
        assert_eq!(path.len(), 4);
        assert_eq!(path.last(), Some(&world.goal()));
        assert!(!path.contains(&world.start()));
        assert!(is_valid_path(&world, world.start(), &path));
    }

    #[test]
    fn test_complex() {
        let world = GridWorld::from_rows(&[
            "##########", //
            "#S...#...#", //
            "#.##.#.#.#", //
            "#.#..#.#.#", //
            "#.#.##.#.#", //
            "#.#....#G#", //
            "##########",
        ])
        .unwrap();
        let solver = AstarSolver::new();
        let path = solver.find_path(&world, world.start(), world.goal());
        // (1,1) -> (4,1) -> (4,3) -> (3,3) -> (3,5) -> (6,5) -> (6,1) -> (8,1) -> (8,5)
        assert_eq!(path.len(), 3 + 2 + 1 + 2 + 3 + 4 + 2 + 4);
        assert!(is_valid_path(&world, world.start(), &path));
    }

    #[test]
    fn walled_in_goal() {
        let world = GridWorld::from_rows(&[
            "#######", //
            "#S..#.#", //
            "#...#G#", //
            "#...###", //
            "#######",
        ])
        .unwrap();
        let solver = AstarSolver::new();
        assert!(solver
            .find_path(&world, world.start(), world.goal())
            .is_empty());
    }

    /// The frontier must run dry on its own while the components are stale.
    #[test]
    fn walled_in_goal_with_dirty_components() {
        let mut world = GridWorld::from_rows(&[
            "#######", //
            "#S....#", //
            "#...#G#", //
            "#...###", //
            "#######",
        ])
        .unwrap();
        world.toggle_obstacle(Cell::new(5, 1)).unwrap();
        assert!(world.components_dirty);
        let solver = AstarSolver::new();
        assert!(solver
            .find_path(&world, world.start(), world.goal())
            .is_empty());
    }

    #[test]
    fn equal_start_goal() {
        let world = GridWorld::new(5, 5).unwrap();
        let solver = AstarSolver::new();
        let start = world.start();
        assert!(solver.find_path(&world, start, start).is_empty());
    }
}
