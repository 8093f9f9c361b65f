//! The physics rule set applied by both execution strategies
//!
//! NOTE: This is the authoritative definition of one simulation step. The
//! WGSL kernel in the simulation crate mirrors these functions; the
//! cross-strategy parity test over there keeps the two in agreement.

use glam::Vec2;

use crate::constants::{COLLISION_RANGE, G};
use crate::particle::{BoxBounds, Particle};

/// Euclidean distance between two particles.
pub fn pair_range(p1: &Particle, p2: &Particle) -> f32 {
    let pos1 = Vec2::from_array(p1.position);
    let pos2 = Vec2::from_array(p2.position);
    pos1.distance(pos2)
}

/// Reflect a particle off the box walls.
///
/// Each wall is checked independently: the velocity component is turned to
/// point back into the box and the position is clamped onto the boundary.
/// A particle sitting exactly on a wall while already moving inward is
/// left alone, so resting on a boundary does not ping-pong the velocity.
pub fn reflect_walls(particle: &mut Particle, bounds: BoxBounds) {
    if particle.position[0] <= 0.0 {
        particle.velocity[0] = particle.velocity[0].abs();
        particle.position[0] = 0.0;
    }
    if particle.position[0] >= bounds.width {
        particle.velocity[0] = -particle.velocity[0].abs();
        particle.position[0] = bounds.width;
    }
    if particle.position[1] <= 0.0 {
        particle.velocity[1] = particle.velocity[1].abs();
        particle.position[1] = 0.0;
    }
    if particle.position[1] >= bounds.height {
        particle.velocity[1] = -particle.velocity[1].abs();
        particle.position[1] = bounds.height;
    }
}

/// Velocity change applied to the first particle of a pair by their mutual
/// gravity over `delta_ms` milliseconds.
///
/// gForce = G / range^2, applied along the unit vector toward the second
/// particle. The second particle receives the exact negation, so every
/// pair exchange conserves momentum by construction rather than by a
/// second computation. Returns zero inside the collision range, where the
/// swap rule applies instead.
pub fn gravity_kick(p1: &Particle, p2: &Particle, delta_ms: f32) -> Vec2 {
    let pos1 = Vec2::from_array(p1.position);
    let pos2 = Vec2::from_array(p2.position);
    let offset = pos2 - pos1;
    let range = offset.length();

    if range < COLLISION_RANGE {
        return Vec2::ZERO;
    }

    let g_force = G / (range * range);
    (offset / range) * (g_force / 1000.0) * delta_ms
}

/// Elastic response for a near pair: the two velocity vectors are
/// exchanged wholesale, regardless of approach angle.
///
/// This is a simplified response valid for equal masses only; it is not a
/// contact-normal elastic collision, and both strategies depend on it
/// staying exactly this simple.
pub fn swap_velocities(particles: &mut [Particle], i: usize, j: usize) {
    let tmp = particles[i].velocity;
    particles[i].velocity = particles[j].velocity;
    particles[j].velocity = tmp;
}

/// First pass of a step: wall reflection plus pairwise gravity and
/// collisions, visiting each unordered pair once in ascending index order.
///
/// Only velocities change here. Positions are untouched apart from wall
/// clamping, so every pair interaction within a step works from the same
/// position snapshot.
pub fn interaction_pass(particles: &mut [Particle], bounds: BoxBounds, delta_ms: f32) {
    for i in 0..particles.len() {
        reflect_walls(&mut particles[i], bounds);

        for j in (i + 1)..particles.len() {
            let range = pair_range(&particles[i], &particles[j]);

            if range >= COLLISION_RANGE {
                let kick = gravity_kick(&particles[i], &particles[j], delta_ms);
                let vel_i = Vec2::from_array(particles[i].velocity) + kick;
                let vel_j = Vec2::from_array(particles[j].velocity) - kick;
                particles[i].velocity = vel_i.to_array();
                particles[j].velocity = vel_j.to_array();
            } else {
                // Index order makes the pair distinct even when the two
                // particles coincide in state.
                swap_velocities(particles, i, j);
            }
        }
    }
}

/// Second pass of a step: damp and integrate every particle independently.
pub fn integration_pass(particles: &mut [Particle], damping: f32, delta_ms: f32) {
    for particle in particles.iter_mut() {
        let vel = Vec2::from_array(particle.velocity) * (1.0 - damping * delta_ms);
        let pos = Vec2::from_array(particle.position) + (vel / 1000.0) * delta_ms;
        particle.velocity = vel.to_array();
        particle.position = pos.to_array();
    }
}

/// Advance a particle population by one step of `delta_ms` milliseconds.
///
/// All interaction effects land before any position moves: the first pass
/// settles every velocity, the second pass then integrates every position
/// with its settled velocity.
pub fn step(particles: &mut [Particle], bounds: BoxBounds, damping: f32, delta_ms: f32) {
    interaction_pass(particles, bounds, delta_ms);
    integration_pass(particles, damping, delta_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DAMPING;

    fn particle(px: f32, py: f32, vx: f32, vy: f32) -> Particle {
        Particle::new(Vec2::new(px, py), Vec2::new(vx, vy))
    }

    fn bounds() -> BoxBounds {
        BoxBounds::new(100.0, 100.0)
    }

    #[test]
    fn collision_swap_exchanges_velocities() {
        let mut particles = vec![particle(40.0, 50.0, 5.0, 0.0), particle(41.0, 50.0, -5.0, 0.0)];

        step(&mut particles, bounds(), DAMPING, 0.0);

        assert_eq!(particles[0].velocity, [-5.0, 0.0]);
        assert_eq!(particles[1].velocity, [5.0, 0.0]);
        assert_eq!(particles[0].position, [40.0, 50.0]);
        assert_eq!(particles[1].position, [41.0, 50.0]);
    }

    #[test]
    fn collision_swap_at_box_corner() {
        // Pair straddling the origin corner: reflection leaves the inward
        // velocities alone, then the swap exchanges them.
        let mut particles = vec![particle(0.0, 0.0, 5.0, 0.0), particle(1.0, 0.0, -5.0, 0.0)];

        step(&mut particles, bounds(), DAMPING, 0.0);

        assert_eq!(particles[0].velocity, [-5.0, 0.0]);
        assert_eq!(particles[1].velocity, [5.0, 0.0]);
        assert_eq!(particles[0].position, [0.0, 0.0]);
        assert_eq!(particles[1].position, [1.0, 0.0]);
    }

    #[test]
    fn wall_reflection_turns_particle_around() {
        let mut particles = vec![particle(0.0, 50.0, -3.0, 0.0)];

        step(&mut particles, bounds(), DAMPING, 0.0);

        assert_eq!(particles[0].velocity, [3.0, 0.0]);
        assert_eq!(particles[0].position, [0.0, 50.0]);
    }

    #[test]
    fn reflected_particle_moves_back_inside() {
        let mut particles = vec![particle(0.0, 50.0, -3.0, 0.0)];

        step(&mut particles, bounds(), 0.0, 10.0);

        assert_eq!(particles[0].velocity, [3.0, 0.0]);
        assert!((particles[0].position[0] - 0.03).abs() < 1e-6);
        assert_eq!(particles[0].position[1], 50.0);
    }

    #[test]
    fn reflection_covers_all_four_walls() {
        let mut particles = vec![
            particle(-2.0, 50.0, -1.0, 0.0),
            particle(103.0, 50.0, 1.0, 0.0),
            particle(50.0, -2.0, 0.0, -1.0),
            particle(50.0, 103.0, 0.0, 1.0),
        ];

        for p in particles.iter_mut() {
            reflect_walls(p, bounds());
        }

        assert_eq!(particles[0].position, [0.0, 50.0]);
        assert_eq!(particles[0].velocity, [1.0, 0.0]);
        assert_eq!(particles[1].position, [100.0, 50.0]);
        assert_eq!(particles[1].velocity, [-1.0, 0.0]);
        assert_eq!(particles[2].position, [50.0, 0.0]);
        assert_eq!(particles[2].velocity, [0.0, 1.0]);
        assert_eq!(particles[3].position, [50.0, 100.0]);
        assert_eq!(particles[3].velocity, [0.0, -1.0]);
    }

    #[test]
    fn gravity_kicks_are_opposite() {
        let p1 = particle(10.0, 10.0, 0.0, 0.0);
        let p2 = particle(20.0, 13.0, 0.0, 0.0);

        let kick_12 = gravity_kick(&p1, &p2, 16.0);
        let kick_21 = gravity_kick(&p2, &p1, 16.0);

        assert_eq!(kick_12, -kick_21);
        assert!(kick_12.length() > 0.0);
    }

    #[test]
    fn gravity_follows_inverse_square() {
        let origin = particle(50.0, 50.0, 0.0, 0.0);
        let near = particle(60.0, 50.0, 0.0, 0.0);
        let far = particle(70.0, 50.0, 0.0, 0.0);

        let kick_near = gravity_kick(&origin, &near, 16.0).length();
        let kick_far = gravity_kick(&origin, &far, 16.0).length();

        // Doubling the range quarters the kick.
        assert!((kick_near / kick_far - 4.0).abs() < 1e-4);
    }

    #[test]
    fn gravity_is_zero_inside_collision_range() {
        let p1 = particle(50.0, 50.0, 0.0, 0.0);
        let p2 = particle(51.0, 50.0, 0.0, 0.0);

        assert_eq!(gravity_kick(&p1, &p2, 16.0), Vec2::ZERO);
    }

    #[test]
    fn swap_preserves_momentum_and_kinetic_energy() {
        // One colliding pair among bystanders; zero delta time keeps
        // gravity out of the picture so the swap's effect is isolated.
        let mut particles = vec![
            particle(30.0, 30.0, 2.0, -1.0),
            particle(31.0, 30.0, -4.0, 3.0),
            particle(60.0, 70.0, 1.0, 1.0),
            particle(80.0, 20.0, -2.0, 5.0),
        ];

        let total = |ps: &[Particle]| {
            ps.iter().fold((Vec2::ZERO, 0.0_f32), |(momentum, energy), p| {
                let vel = Vec2::from_array(p.velocity);
                (momentum + vel, energy + vel.length_squared())
            })
        };

        let (momentum_before, energy_before) = total(&particles);
        interaction_pass(&mut particles, bounds(), 0.0);
        let (momentum_after, energy_after) = total(&particles);

        assert_eq!(momentum_before, momentum_after);
        assert_eq!(energy_before, energy_after);
        // The swap really happened.
        assert_eq!(particles[0].velocity, [-4.0, 3.0]);
        assert_eq!(particles[1].velocity, [2.0, -1.0]);
    }

    #[test]
    fn coincident_particles_still_swap_as_a_pair() {
        // Identical state must not read as "self"; the pair is told apart
        // by index and swaps like any other colliding pair.
        let mut particles = vec![particle(50.0, 50.0, 1.0, 2.0), particle(50.0, 50.0, 3.0, 4.0)];

        interaction_pass(&mut particles, bounds(), 0.0);

        assert_eq!(particles[0].velocity, [3.0, 4.0]);
        assert_eq!(particles[1].velocity, [1.0, 2.0]);
    }

    #[test]
    fn interactions_use_the_position_snapshot() {
        // A fast mover must not drag its mid-step position into the pair
        // computation; the kick on the bystander comes from the starting
        // separation.
        let mover = particle(10.0, 50.0, 1000.0, 0.0);
        let bystander = particle(30.0, 50.0, 0.0, 0.0);
        let expected = -gravity_kick(&mover, &bystander, 100.0);

        let mut particles = vec![mover, bystander];
        step(&mut particles, bounds(), 0.0, 100.0);

        assert_eq!(Vec2::from_array(particles[1].velocity), expected);
    }

    #[test]
    fn damping_scales_with_delta_time() {
        let mut particles = vec![particle(50.0, 50.0, 10.0, -10.0)];

        integration_pass(&mut particles, 0.00001, 100.0);

        let expected = 10.0 * (1.0 - 0.00001 * 100.0);
        assert!((particles[0].velocity[0] - expected).abs() < 1e-6);
        assert!((particles[0].velocity[1] + expected).abs() < 1e-6);
    }

    #[test]
    fn undamped_variant_keeps_speed() {
        let mut particles = vec![particle(50.0, 50.0, 10.0, -10.0)];

        integration_pass(&mut particles, 0.0, 100.0);

        assert_eq!(particles[0].velocity, [10.0, -10.0]);
        assert!((particles[0].position[0] - 51.0).abs() < 1e-4);
        assert!((particles[0].position[1] - 49.0).abs() < 1e-4);
    }

    #[test]
    fn particles_stay_inside_box_across_steps() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let box_bounds = BoxBounds::new(400.0, 300.0);
        let mut rng = StdRng::seed_from_u64(11);
        let mut system = crate::spawn::spawn_non_overlapping(&mut rng, 50, box_bounds)
            .expect("spawn should fit 50 particles in a 400x300 box");

        for _ in 0..20 {
            step(system.particles_mut(), box_bounds, DAMPING, 16.0);
            for p in system.particles() {
                assert!(p.position[0] >= 0.0 && p.position[0] <= box_bounds.width);
                assert!(p.position[1] >= 0.0 && p.position[1] <= box_bounds.height);
            }
        }
    }
}
