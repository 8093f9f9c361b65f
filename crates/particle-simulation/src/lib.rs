//! # Particle Simulation Engine
//!
//! GPU execution strategy for the particle box: one compute kernel per step
//! with a blocking host/device buffer exchange.

pub mod engine;
pub mod error;
pub mod params;

pub use engine::*;
pub use error::*;
pub use params::*;
