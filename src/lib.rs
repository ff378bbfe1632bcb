//! # field_pathing
//!
//! Plans and simulates the motion of a single agent over a fenced grid with static obstacles.
//! Movement is 4-connected and every free cell costs the same, so
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) with the Manhattan distance as
//! heuristic yields shortest paths. Connected components of the free cells are kept up to date
//! to refuse searches between disconnected cells without flood-filling.
//!
//! On top of single-pair search, [coverage::CoveragePlanner] visits every reachable free cell in
//! boustrophedon order by chaining searches, and [drive::DriveSimulator] replays a path one cell
//! at a time on a cancellable, speed-adjustable timer while counting steps and turns.
//! [session::FieldSession] ties these together behind the operations a front end needs.
//!
//! ```
//! use field_pathing::{FieldConfig, FieldSession};
//!
//! let config = FieldConfig {
//!     obstacle_rate: 0.0,
//!     ..FieldConfig::default()
//! };
//! let mut session = FieldSession::new(&config).unwrap();
//! let steps = session.plan_path().unwrap().len();
//! assert_eq!(steps, 27 + 17);
//! ```
mod astar_search;
pub mod cell;
pub mod config;
pub mod coverage;
pub mod drive;
pub mod error;
pub mod grid_world;
pub mod session;
pub mod solver;

pub use cell::{Cell, Heading};
pub use config::FieldConfig;
pub use coverage::CoveragePlanner;
pub use drive::{DriveHandle, DriveMetrics, DriveOutcome, DriveSimulator, DriveState, DriveTiming};
pub use error::{FieldError, Result};
pub use grid_world::{Agent, GridWorld};
pub use session::FieldSession;
pub use solver::{astar::AstarSolver, dijkstra::DijkstraSolver, GridSolver};

/// Cost of moving to any neighbouring free cell.
pub const MOVE_COST: i32 = 1;

/// A sequence of 4-adjacent free cells to be driven in order. The cell the agent starts on is not
/// part of it.
pub type Path = Vec<Cell>;
