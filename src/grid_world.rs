use crate::cell::{Cell, Heading};
use crate::error::{EditRejection, FieldError, Result};
use core::fmt;
use itertools::iproduct;
use log::{debug, info};
use petgraph::unionfind::UnionFind;
use rand::Rng;
use smallvec::SmallVec;

/// Position and heading of the driven agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Agent {
    pub cell: Cell,
    pub heading: Heading,
}

impl Agent {
    /// An agent parked on `cell`, facing east.
    pub fn parked(cell: Cell) -> Agent {
        Agent {
            cell,
            heading: Heading::East,
        }
    }
}

/// [GridWorld] holds the obstacle mask of a fenced field together with the start, goal and agent.
/// The outer ring of cells is always blocked. In addition to the raw mask it maintains the
/// 4-connected components of the free cells in a [UnionFind] so that searches between
/// disconnected cells can be refused without flood-filling.
#[derive(Clone, Debug)]
pub struct GridWorld {
    width: usize,
    height: usize,
    obstacles: Vec<bool>,
    start: Cell,
    goal: Cell,
    agent: Agent,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

impl GridWorld {
    /// Creates a fenced field with every interior cell free. The start is placed in the top-left
    /// interior corner and the goal in the bottom-right one.
    pub fn new(width: usize, height: usize) -> Result<GridWorld> {
        if width < 3 || height < 3 {
            return Err(FieldError::InvalidDimensions { width, height });
        }
        let start = Cell::new(1, 1);
        let mut world = GridWorld {
            width,
            height,
            obstacles: vec![false; width * height],
            start,
            goal: Cell::new(width as i32 - 2, height as i32 - 2),
            agent: Agent::parked(start),
            components: UnionFind::new(width * height),
            components_dirty: false,
        };
        world.reset();
        Ok(world)
    }

    /// Builds a field from a text picture, one string per row. `#` is blocked, `S` and `G` mark
    /// the start and goal, anything else is free. The border is fenced regardless of what the
    /// picture says. Start and goal must be distinct unless the interior is a single cell.
    pub fn from_rows(rows: &[&str]) -> Result<GridWorld> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        if rows.iter().any(|r| r.chars().count() != width) {
            return Err(FieldError::InvalidDimensions { width, height });
        }
        let mut world = GridWorld::new(width, height)?;
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let cell = Cell::new(col as i32, row as i32);
                if world.is_border(&cell) {
                    continue;
                }
                match ch {
                    '#' => {
                        let ix = world.ix(&cell);
                        world.obstacles[ix] = true;
                    }
                    'S' => world.start = cell,
                    'G' => world.goal = cell,
                    _ => {}
                }
            }
        }
        if world.start == world.goal && (width - 2) * (height - 2) > 1 {
            return Err(FieldError::InvalidEdit(EditRejection::StartOrGoal));
        }
        for cell in [world.start, world.goal] {
            let ix = world.ix(&cell);
            world.obstacles[ix] = false;
        }
        world.agent = Agent::parked(world.start);
        world.generate_components();
        Ok(world)
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn start(&self) -> Cell {
        self.start
    }
    pub fn goal(&self) -> Cell {
        self.goal
    }
    pub fn agent(&self) -> Agent {
        self.agent
    }

    /// Moves the agent. Only the drive simulator steers the agent during a drive.
    pub(crate) fn set_agent(&mut self, agent: Agent) {
        self.agent = agent;
    }

    /// Returns the agent to the start, facing east.
    pub fn park_agent(&mut self) {
        self.agent = Agent::parked(self.start);
    }

    fn ix(&self, cell: &Cell) -> usize {
        cell.row as usize * self.width + cell.col as usize
    }

    pub fn in_bounds(&self, cell: &Cell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && (cell.col as usize) < self.width
            && (cell.row as usize) < self.height
    }

    pub fn is_border(&self, cell: &Cell) -> bool {
        self.in_bounds(cell)
            && (cell.col == 0
                || cell.row == 0
                || cell.col as usize == self.width - 1
                || cell.row as usize == self.height - 1)
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_blocked(&self, cell: &Cell) -> bool {
        !self.in_bounds(cell) || self.obstacles[self.ix(cell)]
    }

    pub fn is_free(&self, cell: &Cell) -> bool {
        !self.is_blocked(cell)
    }

    /// Interior cells in row-major order.
    pub fn interior_cells(&self) -> impl Iterator<Item = Cell> {
        iproduct!(1..self.height as i32 - 1, 1..self.width as i32 - 1)
            .map(|(row, col)| Cell::new(col, row))
    }

    pub fn free_cell_count(&self) -> usize {
        self.interior_cells().filter(|c| self.is_free(c)).count()
    }

    /// The free 4-connected neighbours of `cell`.
    pub fn neighbours(&self, cell: &Cell) -> SmallVec<[Cell; 4]> {
        cell.neumann_neighborhood()
            .into_iter()
            .filter(|n| self.is_free(n))
            .collect()
    }

    /// Clears every interior cell, re-fences the border and parks the agent on the start.
    pub fn reset(&mut self) {
        for (col, row) in iproduct!(0..self.width as i32, 0..self.height as i32) {
            let cell = Cell::new(col, row);
            let ix = self.ix(&cell);
            let border = self.is_border(&cell);
            self.obstacles[ix] = border;
        }
        self.agent = Agent::parked(self.start);
        self.generate_components();
    }

    /// Resets the field, then blocks each interior cell other than start and goal independently
    /// with probability `rate`. Rates outside [0, 1] are clamped.
    pub fn randomize_obstacles<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) {
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self.reset();
        let cells = self
            .interior_cells()
            .filter(|c| *c != self.start && *c != self.goal)
            .collect::<Vec<_>>();
        for cell in cells {
            let ix = self.ix(&cell);
            self.obstacles[ix] = rng.gen_bool(rate);
        }
        self.generate_components();
        info!(
            "Randomized obstacles at rate {:.2}: {} free cells",
            rate,
            self.free_cell_count()
        );
    }

    /// Flips the obstacle state of an interior cell that is neither start, goal nor under the
    /// agent, and returns whether the cell is now blocked. Freeing a cell joins the components around it, blocking one
    /// flags the components as dirty since they may have been split.
    pub fn toggle_obstacle(&mut self, cell: Cell) -> Result<bool> {
        if !self.in_bounds(&cell) {
            return Err(FieldError::InvalidEdit(EditRejection::OutOfBounds));
        }
        if self.is_border(&cell) {
            return Err(FieldError::InvalidEdit(EditRejection::Border));
        }
        if cell == self.start || cell == self.goal {
            return Err(FieldError::InvalidEdit(EditRejection::StartOrGoal));
        }
        if cell == self.agent.cell {
            return Err(FieldError::InvalidEdit(EditRejection::Agent));
        }
        let ix = self.ix(&cell);
        let blocked = !self.obstacles[ix];
        self.obstacles[ix] = blocked;
        if blocked {
            self.components_dirty = true;
        } else {
            for n in self.neighbours(&cell) {
                let n_ix = self.ix(&n);
                self.components.union(ix, n_ix);
            }
        }
        debug!("Toggled {} to blocked={}", cell, blocked);
        Ok(blocked)
    }

    fn check_relocation(&self, cell: &Cell, other: &Cell) -> Result<()> {
        let rejection = if !self.in_bounds(cell) {
            EditRejection::OutOfBounds
        } else if self.is_border(cell) {
            EditRejection::Border
        } else if self.is_blocked(cell) {
            EditRejection::Blocked
        } else if cell == other {
            EditRejection::StartOrGoal
        } else {
            return Ok(());
        };
        Err(FieldError::InvalidEdit(rejection))
    }

    /// Moves the start and parks the agent there.
    pub fn set_start(&mut self, cell: Cell) -> Result<()> {
        self.check_relocation(&cell, &self.goal)?;
        self.start = cell;
        self.agent = Agent::parked(cell);
        Ok(())
    }

    pub fn set_goal(&mut self, cell: Cell) -> Result<()> {
        self.check_relocation(&cell, &self.start)?;
        self.goal = cell;
        Ok(())
    }

    /// Checks if two cells are on the same component. Only meaningful while the components are
    /// not dirty, see [update](Self::update).
    pub fn reachable(&self, a: &Cell, b: &Cell) -> bool {
        self.is_free(a) && self.is_free(b) && self.components.equiv(self.ix(a), self.ix(b))
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up free grid neighbours to the same
    /// components. Linking south and east suffices to cover every 4-connected pair.
    pub fn generate_components(&mut self) {
        self.components = UnionFind::new(self.width * self.height);
        self.components_dirty = false;
        let free = self
            .interior_cells()
            .filter(|c| self.is_free(c))
            .collect::<Vec<_>>();
        for cell in free {
            let ix = self.ix(&cell);
            for n in [cell + Heading::South, cell + Heading::East] {
                if self.is_free(&n) {
                    let n_ix = self.ix(&n);
                    self.components.union(ix, n_ix);
                }
            }
        }
    }
}

impl fmt::Display for GridWorld {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..self.height as i32 {
            for col in 0..self.width as i32 {
                let cell = Cell::new(col, row);
                let ch = if cell == self.agent.cell {
                    'A'
                } else if cell == self.start {
                    'S'
                } else if cell == self.goal {
                    'G'
                } else if self.is_blocked(&cell) {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
