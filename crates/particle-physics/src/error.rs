//! Error types for particle spawning and stepping.

use std::fmt;

/// Errors that can occur while producing the initial particle layout.
#[derive(Debug)]
pub enum SpawnError {
    /// The rejection-sampling loop ran out of full scans before finding a
    /// layout with no pair below the minimum separation.
    BudgetExhausted { scans: usize, count: usize },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::BudgetExhausted { scans, count } => write!(
                f,
                "Gave up spawning {} non-overlapping particles after {} scans. The box is too small for this count.",
                count, scans
            ),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Errors that can occur while advancing the simulation by one step.
///
/// The CPU strategy never fails; the GPU strategy surfaces device and
/// buffer-exchange failures through this type so the frame driver can
/// decide whether to stop.
#[derive(Debug)]
pub enum StepError {
    /// The execution device rejected a buffer exchange or dispatch.
    Device(String),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::Device(msg) => write!(f, "Simulation step failed on the device: {}", msg),
        }
    }
}

impl std::error::Error for StepError {}
