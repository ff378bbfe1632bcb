//! Failure kinds reported by [FieldSession](crate::session::FieldSession) and the
//! [DriveSimulator](crate::drive::DriveSimulator). The planners themselves never fail, they
//! return empty paths.

use crate::cell::Cell;
use thiserror::Error;

/// Why an obstacle toggle or start/goal relocation was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditRejection {
    OutOfBounds,
    Border,
    Blocked,
    /// The cell is occupied by the start or goal.
    StartOrGoal,
    /// The agent stands on the cell.
    Agent,
    Driving,
}

/// Why a drive could not be started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveRejection {
    AlreadyDriving,
    EmptyPath,
    AlreadyAtGoal,
}

#[derive(Error, Debug)]
pub enum FieldError {
    #[error("no route from {from} to {to}")]
    NoRouteFound { from: Cell, to: Cell },

    #[error("nothing to cover: no free cell is reachable")]
    NothingToCover,

    #[error("invalid edit: {0:?}")]
    InvalidEdit(EditRejection),

    #[error("drive not startable: {0:?}")]
    DriveNotStartable(DriveRejection),

    #[error("field must be at least 3x3, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for FieldError {
    fn from(e: toml::de::Error) -> Self {
        FieldError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FieldError>;
