//! # Particle Renderer
//!
//! Point visualization for the particle box simulation.

pub mod renderer;
pub mod view;

pub use renderer::*;
pub use view::*;
