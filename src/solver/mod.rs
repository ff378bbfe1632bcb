use crate::{astar_search::astar, cell::Cell, grid_world::GridWorld, Path, MOVE_COST};
use log::{debug, info};
use smallvec::SmallVec;

pub mod astar;
pub mod dijkstra;

/// A single-pair path planner over a [GridWorld]. Implementors pick the heuristic, the search
/// itself is shared.
pub trait GridSolver {
    fn heuristic(&self, p1: &Cell, p2: &Cell) -> i32;

    /// Free 4-connected neighbours, each at unit cost.
    fn successors(&self, world: &GridWorld, node: &Cell) -> SmallVec<[(Cell, i32); 4]> {
        world
            .neighbours(node)
            .into_iter()
            .map(|n| (n, MOVE_COST))
            .collect()
    }

    /// Computes a shortest path from start to goal. The returned path excludes the start cell,
    /// so an agent standing on `start` can follow it step by step. An empty path means that no
    /// route exists (or that start and goal coincide).
    fn find_path(&self, world: &GridWorld, start: Cell, goal: Cell) -> Path {
        if start == goal {
            return Path::new();
        }
        if !world.components_dirty && !world.reachable(&start, &goal) {
            info!("{} is not reachable from {}", goal, start);
            return Path::new();
        }
        match astar(
            &start,
            |node| self.successors(world, node),
            |node| self.heuristic(node, &goal),
            |node| *node == goal,
        ) {
            Some((mut path, cost)) => {
                debug!("Found path of cost {} from {} to {}", cost, start, goal);
                path.remove(0);
                path
            }
            None => {
                info!("Search from {} to {} exhausted the frontier", start, goal);
                Path::new()
            }
        }
    }

    /// Total cost of driving a path returned by [find_path](Self::find_path).
    fn get_path_cost(&self, path: &Path) -> i32 {
        path.len() as i32 * MOVE_COST
    }
}
