use crate::{cell::Cell, solver::GridSolver};

/// Uninformed search. Expands by accumulated cost only, which makes it a reference for the
/// path lengths A* should produce.
#[derive(Clone, Debug, Default)]
pub struct DijkstraSolver;

impl GridSolver for DijkstraSolver {
    fn heuristic(&self, _: &Cell, _: &Cell) -> i32 {
        0
    }
}
