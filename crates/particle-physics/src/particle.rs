//! Particle data model shared by both execution strategies

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// A point mass in the box: 2D position and velocity, nothing else.
///
/// GPU-compatible layout: two interleaved x,y pairs, matching the flat
/// buffers the compute kernel reads and writes. Particles carry no
/// identity; pairwise code tells "self" from "other" by index, never by
/// comparing state, so two particles that coincide in position and
/// velocity still interact as a pair.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Position in box space
    pub position: [f32; 2],
    /// Velocity in box units per second
    pub velocity: [f32; 2],
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position: position.to_array(),
            velocity: velocity.to_array(),
        }
    }

    /// A particle at rest at `position`.
    pub fn at_rest(position: Vec2) -> Self {
        Self::new(position, Vec2::ZERO)
    }
}

/// The simulation box. Particle positions stay within
/// `[0, width] x [0, height]`; wall reflection enforces it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxBounds {
    pub width: f32,
    pub height: f32,
}

impl BoxBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A fixed-size particle population together with the box it lives in.
///
/// The population is set once at spawn time and never grows or shrinks
/// during a run. A populated system (at least one particle) is the
/// expected configuration.
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    bounds: BoxBounds,
}

impl ParticleSystem {
    pub fn new(particles: Vec<Particle>, bounds: BoxBounds) -> Self {
        Self { particles, bounds }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn bounds(&self) -> BoxBounds {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Interleaved x,y positions, one pair per particle.
    pub fn positions_flat(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.particles.len() * 2);
        for particle in &self.particles {
            flat.extend_from_slice(&particle.position);
        }
        flat
    }

    /// Interleaved vx,vy velocities, one pair per particle.
    pub fn velocities_flat(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.particles.len() * 2);
        for particle in &self.particles {
            flat.extend_from_slice(&particle.velocity);
        }
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_views_interleave_in_particle_order() {
        let system = ParticleSystem::new(
            vec![
                Particle::new(Vec2::new(1.0, 2.0), Vec2::new(5.0, 6.0)),
                Particle::new(Vec2::new(3.0, 4.0), Vec2::new(7.0, 8.0)),
            ],
            BoxBounds::new(100.0, 100.0),
        );

        assert_eq!(system.positions_flat(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(system.velocities_flat(), vec![5.0, 6.0, 7.0, 8.0]);
    }
}
