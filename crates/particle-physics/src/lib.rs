//! # Particle Box Physics
//!
//! Rule set, state containers, and the CPU execution strategy for point
//! particles under pairwise gravity inside a bounded 2D box.

pub mod constants;
pub mod engine;
pub mod error;
pub mod particle;
pub mod rules;
pub mod spawn;

pub use constants::*;
pub use engine::*;
pub use error::*;
pub use particle::*;
pub use rules::*;
pub use spawn::*;
