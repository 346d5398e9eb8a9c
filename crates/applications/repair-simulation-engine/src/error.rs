//! Error types for the simulation engine

use crate::types::{MachineType, WorkerId};
use thiserror::Error;

/// Simulation result type
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur before a run starts.
///
/// Everything that can go wrong once the event loop is running is an
/// invariant violation and panics instead.
#[derive(Error, Debug)]
pub enum SimError {
    /// A `[min, max]` hour range is unusable
    #[error("Invalid {what} range: [{min}, {max}]")]
    InvalidRange {
        what: String,
        min: f64,
        max: f64,
    },

    /// Horizon must be a positive, finite number of hours
    #[error("Invalid horizon: {0} hours")]
    InvalidHorizon(f64),

    /// Shift windows must both be positive
    #[error("Invalid shift schedule: work {work}h, rest {rest}h")]
    InvalidShift { work: f64, rest: f64 },

    /// No machines to simulate
    #[error("Fleet is empty: total machine population is zero")]
    EmptyFleet,

    /// No repair workers configured
    #[error("No repair workers configured")]
    NoWorkers,

    /// Same machine type configured twice
    #[error("Machine type {0} configured more than once")]
    DuplicateMachineType(MachineType),

    /// Same worker id configured twice
    #[error("Worker {0} configured more than once")]
    DuplicateWorker(WorkerId),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// Create an invalid range error
    pub fn invalid_range(what: impl Into<String>, min: f64, max: f64) -> Self {
        Self::InvalidRange {
            what: what.into(),
            min,
            max,
        }
    }
}
