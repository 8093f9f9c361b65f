//! Non-overlapping initial layout via rejection sampling

use glam::Vec2;
use rand::Rng;

use crate::constants::MIN_SEPARATION;
use crate::error::SpawnError;
use crate::particle::{BoxBounds, Particle, ParticleSystem};
use crate::rules::pair_range;

/// Full-scan budget for the rejection-sampling loop. Dense configurations
/// (large count relative to box area) may never settle; instead of looping
/// forever the spawn reports failure once this many scans found violations.
pub const MAX_SCANS: usize = 10_000;

fn random_position<R: Rng>(rng: &mut R, bounds: BoxBounds) -> Vec2 {
    Vec2::new(
        rng.random::<f32>() * bounds.width,
        rng.random::<f32>() * bounds.height,
    )
}

/// Spawn `count` particles at rest, uniformly placed in the box, with every
/// pair at least [`MIN_SEPARATION`] apart.
///
/// Each scan walks all unordered pairs; on the first pair found too close,
/// the lower-indexed member is re-randomized and the scan restarts from the
/// top. Only a completely clean scan returns. The loop is bounded by
/// [`MAX_SCANS`], so a box too small for the requested count fails with
/// [`SpawnError::BudgetExhausted`] instead of spinning forever.
pub fn spawn_non_overlapping<R: Rng>(
    rng: &mut R,
    count: usize,
    bounds: BoxBounds,
) -> Result<ParticleSystem, SpawnError> {
    let mut particles: Vec<Particle> = (0..count)
        .map(|_| Particle::at_rest(random_position(rng, bounds)))
        .collect();

    let mut scans = 0;
    'rescan: loop {
        if scans >= MAX_SCANS {
            return Err(SpawnError::BudgetExhausted { scans, count });
        }
        scans += 1;

        for i in 0..particles.len() {
            for j in (i + 1)..particles.len() {
                if pair_range(&particles[i], &particles[j]) < MIN_SEPARATION {
                    particles[i] = Particle::at_rest(random_position(rng, bounds));
                    continue 'rescan;
                }
            }
        }

        return Ok(ParticleSystem::new(particles, bounds));
    }
}
