//! Full-coverage planning. Free cells are visited in boustrophedon ("snake") order and the legs
//! between consecutive targets are planned with a [GridSolver]. Targets that cannot be reached
//! from the current position, e.g. pockets sealed off by obstacles, are skipped.
use crate::{cell::Cell, grid_world::GridWorld, solver::GridSolver, Path};
use fxhash::FxHashSet;
use log::{debug, info};

#[derive(Clone, Debug, Default)]
pub struct CoveragePlanner<S: GridSolver> {
    pub solver: S,
}

impl<S: GridSolver> CoveragePlanner<S> {
    pub fn new(solver: S) -> CoveragePlanner<S> {
        CoveragePlanner { solver }
    }

    /// All free interior cells, row by row. Even rows are scanned left to right and odd rows right
    /// to left so that consecutive targets tend to be neighbours.
    pub fn visitation_order(world: &GridWorld) -> Vec<Cell> {
        let mut order = Vec::with_capacity(world.free_cell_count());
        for row in 1..world.height() as i32 - 1 {
            let mut cells = (1..world.width() as i32 - 1)
                .map(|col| Cell::new(col, row))
                .filter(|cell| world.is_free(cell))
                .collect::<Vec<_>>();
            if row % 2 == 1 {
                cells.reverse();
            }
            order.append(&mut cells);
        }
        order
    }

    /// Chains shortest paths from `agent_start` through every reachable free cell in visitation
    /// order. This is greedy and makes no attempt at minimising the total length.
    pub fn plan(&self, world: &GridWorld, agent_start: Cell) -> Path {
        let mut cursor = agent_start;
        let mut visited: FxHashSet<Cell> = FxHashSet::default();
        visited.insert(cursor);
        let mut path = Path::new();
        let mut skipped = 0;
        for target in Self::visitation_order(world) {
            if visited.contains(&target) {
                continue;
            }
            let leg = self.solver.find_path(world, cursor, target);
            if leg.is_empty() {
                debug!("Skipping unreachable target {}", target);
                skipped += 1;
                continue;
            }
            path.extend(leg);
            cursor = target;
            visited.insert(target);
        }
        info!(
            "Coverage plan from {}: {} targets, {} skipped, {} steps",
            agent_start,
            visited.len() - 1,
            skipped,
            path.len()
        );
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::astar::AstarSolver;

    #[test]
    fn snake_order() {
        let world = GridWorld::from_rows(&[
            "#####", //
            "#S..#", //
            "#.#.#", //
            "#..G#", //
            "#####",
        ])
        .unwrap();
        let order = CoveragePlanner::<AstarSolver>::visitation_order(&world);
        let expected = [(3, 1), (2, 1), (1, 1), (1, 2), (3, 2), (3, 3), (2, 3), (1, 3)]
            .map(|(c, r)| Cell::new(c, r));
        assert_eq!(order, expected);
    }

    #[test]
    fn covers_open_field() {
        let world = GridWorld::new(6, 5).unwrap();
        let planner = CoveragePlanner::new(AstarSolver::new());
        let path = planner.plan(&world, world.start());
        let mut visited = path.iter().copied().collect::<FxHashSet<_>>();
        visited.insert(world.start());
        assert_eq!(visited.len(), world.free_cell_count());
    }

    #[test]
    fn skips_sealed_pocket() {
        let world = GridWorld::from_rows(&[
            "#######", //
            "#S....#", //
            "#..#..#", //
            "#.#.#.#", //
            "#..#.G#", //
            "#######",
        ])
        .unwrap();
        let pocket = Cell::new(3, 3);
        let planner = CoveragePlanner::new(AstarSolver::new());
        let path = planner.plan(&world, world.start());
        assert!(!path.contains(&pocket));
        let mut visited = path.iter().copied().collect::<FxHashSet<_>>();
        visited.insert(world.start());
        assert_eq!(visited.len() + 1, world.free_cell_count());
    }

    #[test]
    fn nothing_to_cover() {
        let world = GridWorld::from_rows(&["#####", "#S#G#", "#####"]).unwrap();
        let planner = CoveragePlanner::new(AstarSolver::new());
        assert!(planner.plan(&world, world.start()).is_empty());

        let tiny = GridWorld::new(3, 3).unwrap();
        assert!(planner.plan(&tiny, tiny.start()).is_empty());
    }
}
