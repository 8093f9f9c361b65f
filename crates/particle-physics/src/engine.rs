//! Execution strategy seam shared by the CPU and GPU steppers

use crate::error::StepError;
use crate::particle::ParticleSystem;
use crate::rules;

/// One strategy for advancing the particle population.
///
/// Both strategies apply the same rule set; they differ only in where the
/// pairwise loop runs. After a successful `step` the flat views expose the
/// new state, interleaved `[x0, y0, x1, y1, ..]` in particle order, ready
/// for upload to a point renderer.
pub trait PhysicsEngine {
    /// Advance the population by `delta_ms` milliseconds.
    fn step(&mut self, delta_ms: f32) -> Result<(), StepError>;

    /// Flat positions after the most recent step.
    fn positions(&self) -> &[f32];

    /// Flat velocities after the most recent step.
    fn velocities(&self) -> &[f32];

    fn particle_count(&self) -> u32;
}

/// Direct pairwise stepper running on the host.
pub struct CpuEngine {
    system: ParticleSystem,
    damping: f32,
    positions: Vec<f32>,
    velocities: Vec<f32>,
}

impl CpuEngine {
    pub fn new(system: ParticleSystem, damping: f32) -> Self {
        let positions = system.positions_flat();
        let velocities = system.velocities_flat();
        Self {
            system,
            damping,
            positions,
            velocities,
        }
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }
}

impl PhysicsEngine for CpuEngine {
    fn step(&mut self, delta_ms: f32) -> Result<(), StepError> {
        let bounds = self.system.bounds();
        rules::step(self.system.particles_mut(), bounds, self.damping, delta_ms);
        self.positions = self.system.positions_flat();
        self.velocities = self.system.velocities_flat();
        Ok(())
    }

    fn positions(&self) -> &[f32] {
        &self.positions
    }

    fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    fn particle_count(&self) -> u32 {
        self.system.len() as u32
    }
}
