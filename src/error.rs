//! Error types for startup and the frame loop.

use std::fmt;

use particle_physics::{SpawnError, StepError};
use particle_simulation::GpuError;

/// Errors that can occur while bringing the simulation up.
#[derive(Debug)]
pub enum InitError {
    /// Producing the initial non-overlapping layout failed.
    Spawn(SpawnError),
    /// GPU setup failed.
    Gpu(GpuError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Spawn(e) => write!(f, "Failed to spawn particles: {}", e),
            InitError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for InitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InitError::Spawn(e) => Some(e),
            InitError::Gpu(e) => Some(e),
        }
    }
}

impl From<SpawnError> for InitError {
    fn from(e: SpawnError) -> Self {
        InitError::Spawn(e)
    }
}

impl From<GpuError> for InitError {
    fn from(e: GpuError) -> Self {
        InitError::Gpu(e)
    }
}

/// Errors that can occur while producing one frame.
#[derive(Debug)]
pub enum FrameError {
    /// The surface could not provide a frame.
    Surface(wgpu::SurfaceError),
    /// Advancing the simulation failed.
    Step(StepError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Surface(e) => write!(f, "Surface error: {}", e),
            FrameError::Step(e) => write!(f, "Step error: {}", e),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Surface(e) => Some(e),
            FrameError::Step(e) => Some(e),
        }
    }
}

impl From<wgpu::SurfaceError> for FrameError {
    fn from(e: wgpu::SurfaceError) -> Self {
        FrameError::Surface(e)
    }
}

impl From<StepError> for FrameError {
    fn from(e: StepError) -> Self {
        FrameError::Step(e)
    }
}
