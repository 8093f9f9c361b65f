//! Physics constants for the bounded-box simulation
//!
//! Values are tuned for the default 1800x1000 box, not taken from SI
//! tables; changing them changes the character of the simulation.

/// Gravitational constant
pub const G: f32 = 66.74;

/// Pair distance below which particles collide instead of gravitating
pub const COLLISION_RANGE: f32 = 2.0;

/// Minimum pair separation the spawner guarantees
pub const MIN_SEPARATION: f32 = 10.0;

/// Velocity damping per millisecond of step time (0.0 disables damping)
pub const DAMPING: f32 = 0.00001;
