//! Per-step parameters handed to the compute kernel

use bytemuck::{Pod, Zeroable};
use particle_physics::BoxBounds;

/// Uniform block read by the kernel on every dispatch.
///
/// Refreshed before each step because the delta time changes per frame.
/// Padded to 32 bytes to satisfy uniform buffer layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StepParams {
    pub particle_count: u32,
    /// Frame delta in milliseconds.
    pub delta_ms: f32,
    pub box_width: f32,
    pub box_height: f32,
    pub damping: f32,
    pub _pad: [f32; 3],
}

impl StepParams {
    pub fn new(particle_count: u32, bounds: BoxBounds, damping: f32, delta_ms: f32) -> Self {
        Self {
            particle_count,
            delta_ms,
            box_width: bounds.width,
            box_height: bounds.height,
            damping,
            _pad: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_match_the_kernel_uniform_size() {
        assert_eq!(std::mem::size_of::<StepParams>(), 32);
    }

    #[test]
    fn params_carry_the_box_dimensions() {
        let params = StepParams::new(4000, BoxBounds::new(1800.0, 1000.0), 0.00001, 16.0);

        assert_eq!(params.particle_count, 4000);
        assert_eq!(params.box_width, 1800.0);
        assert_eq!(params.box_height, 1000.0);
        assert_eq!(params.delta_ms, 16.0);
    }
}
