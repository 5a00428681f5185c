//! Weakly-compressible SPH solver passes.
//!
//! One sub-step is two data-parallel passes separated by a barrier:
//!
//! 1. [`SphSolver::compute_densities`] predicts every position `lookAhead`
//!    sub-steps ahead and sums kernel-weighted masses around it.
//! 2. [`SphSolver::integrate`] turns density error into pressure, adds
//!    viscosity, gravity and the mouse force, integrates with semi-implicit
//!    Euler and confines the result to the viewport.
//!
//! Pass 2 reads the previous buffer and the transient density buffer and
//! writes only its own output slot, so the rayon map needs no locks.

use bevy::prelude::*;
use rayon::prelude::*;

use super::boundary::BoxBoundary;
use super::kernel::{coincident_direction, SmoothingKernel};
use super::params::SimParams;
use super::particle::Particle;
use super::spatial::{NeighborSearch, Neighborhood, SpatialGrid};

/// Pressure produced by a density sample.
#[inline]
pub fn pressure_from_density(density: f32, params: &SimParams) -> f32 {
    params.pressure_multiplier * (density - params.target_density)
}

/// Radial mouse acceleration at `position`.
///
/// Points away from the cursor for positive strength and toward it for
/// negative strength, fading linearly to zero at `mouse_radius`.
pub fn mouse_acceleration(position: Vec2, params: &SimParams) -> Vec2 {
    if params.mouse_strength == 0.0 || params.mouse_radius <= 0.0 {
        return Vec2::ZERO;
    }
    let offset = position - params.mouse_position();
    let distance = offset.length();
    if distance >= params.mouse_radius {
        return Vec2::ZERO;
    }
    let falloff = 1.0 - distance / params.mouse_radius;
    offset.normalize_or_zero() * params.mouse_strength * falloff
}

/// Scratch state for the SPH passes.
///
/// Predicted positions and densities are rebuilt from scratch every
/// sub-step and never carried over.
#[derive(Clone, Debug, Default)]
pub struct SphSolver {
    search: NeighborSearch,
    grid: SpatialGrid,
    predicted: Vec<Vec2>,
    densities: Vec<f32>,
}

impl SphSolver {
    pub fn new(search: NeighborSearch) -> Self {
        Self {
            search,
            ..default()
        }
    }

    pub fn set_search(&mut self, search: NeighborSearch) {
        self.search = search;
    }

    /// Densities from the most recent density pass.
    pub fn densities(&self) -> &[f32] {
        &self.densities
    }

    /// Density pass: fills the density buffer from `read`.
    pub fn compute_densities(&mut self, read: &[Particle], params: &SimParams) {
        let n = read.len();
        let horizon = params.sub_step_dt() * params.look_ahead;
        let kernel = SmoothingKernel::new(params.smoothing_radius);
        let mass = params.mass;

        self.predicted.resize(n, Vec2::ZERO);
        self.densities.resize(n, 0.0);

        self.predicted
            .par_iter_mut()
            .zip(read.par_iter())
            .for_each(|(predicted, particle)| {
                *predicted = particle.predicted_position(horizon);
            });

        if self.search == NeighborSearch::Grid {
            self.grid.build(
                &self.predicted,
                Vec2::ZERO,
                params.viewport(),
                params.smoothing_radius,
            );
        }

        let Self {
            search,
            grid,
            predicted,
            densities,
        } = self;
        let neighborhood = Neighborhood::new(predicted, *search, grid);

        densities
            .par_iter_mut()
            .zip(predicted.par_iter())
            .for_each(|(density, &position)| {
                let mut sum = 0.0;
                neighborhood.for_each_within(position, kernel.radius(), |_, _, distance| {
                    sum += mass * kernel.weight(distance);
                });
                *density = sum;
            });
    }

    /// Force and integration pass: advances every particle of `read` into
    /// the same slot of `write`.
    ///
    /// Must follow [`compute_densities`](Self::compute_densities) on the same
    /// `read` buffer.
    pub fn integrate(&self, read: &[Particle], write: &mut [Particle], params: &SimParams) {
        debug_assert_eq!(read.len(), write.len());
        debug_assert_eq!(read.len(), self.densities.len());

        let kernel = SmoothingKernel::new(params.smoothing_radius);
        let neighborhood = Neighborhood::new(&self.predicted, self.search, &self.grid);
        let boundary = BoxBoundary::from_params(params);
        let dt = params.sub_step_dt();

        write.par_iter_mut().enumerate().for_each(|(i, out)| {
            let particle = read[i];
            let acceleration = self.acceleration(i, read, params, &kernel, &neighborhood);

            let mut velocity = particle.velocity + acceleration * dt;
            let mut position = particle.position + velocity * dt;
            boundary.apply_collision(&mut position, &mut velocity);

            *out = Particle { position, velocity };
        });
    }

    /// Net acceleration on particle `i`.
    fn acceleration(
        &self,
        i: usize,
        read: &[Particle],
        params: &SimParams,
        kernel: &SmoothingKernel,
        neighborhood: &Neighborhood,
    ) -> Vec2 {
        let particle = read[i];
        let density_i = self.densities[i].max(f32::MIN_POSITIVE);
        let pressure_i = pressure_from_density(density_i, params);
        let mass = params.mass;
        let viscous = params.viscosity_strength > 0.0;

        let mut pressure_force = Vec2::ZERO;
        let mut viscosity_force = Vec2::ZERO;

        neighborhood.for_each_within(self.predicted[i], kernel.radius(), |j, offset, distance| {
            if j == i {
                return;
            }
            let density_j = self.densities[j].max(f32::MIN_POSITIVE);
            let volume_j = mass / density_j;

            let shared_pressure = 0.5 * (pressure_i + pressure_from_density(density_j, params));
            let gradient = kernel.gradient(offset, coincident_direction(i, j));
            pressure_force -= gradient * shared_pressure * volume_j;

            if viscous {
                let weight = kernel.viscosity_weight(distance * distance);
                viscosity_force += (read[j].velocity - particle.velocity) * volume_j * weight;
            }
        });

        let mut acceleration = pressure_force / density_i;
        acceleration += viscosity_force * params.viscosity_strength;
        acceleration.y += params.gravity;
        acceleration += mouse_acceleration(particle.position, params);
        acceleration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_params() -> SimParams {
        SimParams {
            delta_t: 1.0,
            mass: 1.0,
            smoothing_radius: 2.0,
            target_density: 0.0,
            pressure_multiplier: 0.0,
            damping: 0.0,
            gravity: 0.0,
            look_ahead: 0.0,
            sub_steps: 1,
            viewport_width: 100.0,
            viewport_height: 100.0,
            mouse_strength: 0.0,
            viscosity_strength: 0.0,
            ..default()
        }
    }

    fn densities_for(particles: &[Particle], params: &SimParams) -> Vec<f32> {
        let mut solver = SphSolver::new(NeighborSearch::Grid);
        solver.compute_densities(particles, params);
        solver.densities().to_vec()
    }

    #[test]
    fn test_isolated_particle_self_density() {
        let params = quiet_params();
        let particles = [Particle::at(Vec2::new(10.0, 10.0)), Particle::at(Vec2::new(50.0, 50.0))];
        let densities = densities_for(&particles, &params);

        let expected = params.mass * SmoothingKernel::new(params.smoothing_radius).weight(0.0);
        assert!((densities[0] - expected).abs() < 1e-7);
        assert!((densities[1] - expected).abs() < 1e-7);
    }

    #[test]
    fn test_density_symmetry() {
        let params = quiet_params();
        let particles = [Particle::at(Vec2::new(10.0, 10.0)), Particle::at(Vec2::new(11.2, 10.5))];
        let densities = densities_for(&particles, &params);

        assert!(densities[0] > 0.0);
        assert!((densities[0] - densities[1]).abs() < 1e-7);
    }

    #[test]
    fn test_density_uses_predicted_positions() {
        let params = SimParams {
            look_ahead: 1.0,
            ..quiet_params()
        };
        // Currently 3 apart (outside h = 2) but converging to 1 apart
        let particles = [
            Particle::at(Vec2::new(10.0, 10.0)).with_velocity(Vec2::new(1.0, 0.0)),
            Particle::at(Vec2::new(13.0, 10.0)).with_velocity(Vec2::new(-1.0, 0.0)),
        ];
        let densities = densities_for(&particles, &params);

        let self_density = SmoothingKernel::new(2.0).weight(0.0);
        assert!(densities[0] > self_density);
        assert!(densities[1] > self_density);
    }

    #[test]
    fn test_grid_and_brute_force_agree() {
        let params = SimParams {
            smoothing_radius: 9.0,
            viewport_width: 120.0,
            viewport_height: 80.0,
            look_ahead: 1.0,
            delta_t: 0.1,
            ..quiet_params()
        };
        let particles: Vec<Particle> = (0..300)
            .map(|k| {
                let t = k as f32;
                Particle::at(Vec2::new((t * 13.7) % 120.0, (t * 29.3) % 80.0))
                    .with_velocity(Vec2::new((t * 3.1) % 7.0 - 3.5, (t * 5.3) % 9.0 - 4.5))
            })
            .collect();

        let mut grid = SphSolver::new(NeighborSearch::Grid);
        let mut brute = SphSolver::new(NeighborSearch::BruteForce);
        grid.compute_densities(&particles, &params);
        brute.compute_densities(&particles, &params);

        for (a, b) in grid.densities().iter().zip(brute.densities()) {
            assert!((a - b).abs() <= 1e-5 * b.abs().max(1e-3));
        }
    }

    #[test]
    fn test_pressure_pushes_pair_apart() {
        let params = SimParams {
            pressure_multiplier: 1.0,
            ..quiet_params()
        };
        let particles = [Particle::at(Vec2::new(0.0, 0.0)), Particle::at(Vec2::new(1.0, 0.0))];

        let mut solver = SphSolver::new(NeighborSearch::Grid);
        solver.compute_densities(&particles, &params);
        assert!(solver.densities().iter().all(|&d| d > 0.0));

        let kernel = SmoothingKernel::new(params.smoothing_radius);
        let neighborhood = Neighborhood::new(&solver.predicted, solver.search, &solver.grid);
        let a0 = solver.acceleration(0, &particles, &params, &kernel, &neighborhood);
        let a1 = solver.acceleration(1, &particles, &params, &kernel, &neighborhood);

        assert!(a0.x < 0.0);
        assert!(a1.x > 0.0);
        assert!((a0.x + a1.x).abs() < 1e-6);
        assert!(a0.y.abs() < 1e-7 && a1.y.abs() < 1e-7);
    }

    #[test]
    fn test_coincident_particles_separate() {
        let params = SimParams {
            pressure_multiplier: 1.0,
            ..quiet_params()
        };
        let particles = [Particle::at(Vec2::new(50.0, 50.0)), Particle::at(Vec2::new(50.0, 50.0))];

        let mut solver = SphSolver::new(NeighborSearch::Grid);
        solver.compute_densities(&particles, &params);
        let mut next = particles;
        solver.integrate(&particles, &mut next, &params);

        assert!(next.iter().all(|p| p.position.is_finite() && p.velocity.is_finite()));
        assert!(next[0].position != next[1].position);
    }

    #[test]
    fn test_no_forces_pure_drift() {
        let params = quiet_params();
        let particles = [
            Particle::at(Vec2::new(20.0, 20.0)).with_velocity(Vec2::new(3.0, -2.0)),
            Particle::at(Vec2::new(21.0, 20.5)).with_velocity(Vec2::new(-1.0, 4.0)),
        ];

        let mut solver = SphSolver::new(NeighborSearch::Grid);
        solver.compute_densities(&particles, &params);
        let mut next = [Particle::default(); 2];
        solver.integrate(&particles, &mut next, &params);

        for (before, after) in particles.iter().zip(&next) {
            assert_eq!(after.velocity, before.velocity);
            assert_eq!(after.position, before.position + before.velocity * params.delta_t);
        }
    }

    #[test]
    fn test_viscosity_pulls_velocities_together() {
        let params = SimParams {
            viscosity_strength: 0.5,
            delta_t: 0.1,
            ..quiet_params()
        };
        let particles = [
            Particle::at(Vec2::new(20.0, 20.0)).with_velocity(Vec2::new(2.0, 0.0)),
            Particle::at(Vec2::new(21.0, 20.0)).with_velocity(Vec2::new(-2.0, 0.0)),
        ];

        let mut solver = SphSolver::new(NeighborSearch::Grid);
        solver.compute_densities(&particles, &params);
        let mut next = [Particle::default(); 2];
        solver.integrate(&particles, &mut next, &params);

        assert!(next[0].velocity.x < 2.0);
        assert!(next[1].velocity.x > -2.0);
    }

    #[test]
    fn test_gravity_points_down_screen() {
        let params = SimParams {
            gravity: 10.0,
            delta_t: 0.1,
            ..quiet_params()
        };
        let particles = [Particle::at(Vec2::new(50.0, 50.0))];

        let mut solver = SphSolver::new(NeighborSearch::Grid);
        solver.compute_densities(&particles, &params);
        let mut next = [Particle::default()];
        solver.integrate(&particles, &mut next, &params);

        assert!((next[0].velocity.y - 1.0).abs() < 1e-6);
        assert!(next[0].position.y > 50.0);
    }

    #[test]
    fn test_mouse_force_sign() {
        let position = Vec2::new(110.0, 100.0);

        let repel = SimParams::default().with_mouse(100.0, 100.0, 50.0);
        assert!(mouse_acceleration(position, &repel).x > 0.0);

        let attract = SimParams::default().with_mouse(100.0, 100.0, -50.0);
        assert!(mouse_acceleration(position, &attract).x < 0.0);

        let idle = SimParams::default().with_mouse(100.0, 100.0, 0.0);
        assert_eq!(mouse_acceleration(position, &idle), Vec2::ZERO);
    }

    #[test]
    fn test_mouse_force_falls_off() {
        let params = SimParams {
            mouse_radius: 100.0,
            ..SimParams::default().with_mouse(0.0, 0.0, 100.0)
        };

        let near = mouse_acceleration(Vec2::new(10.0, 0.0), &params).length();
        let far = mouse_acceleration(Vec2::new(90.0, 0.0), &params).length();
        let outside = mouse_acceleration(Vec2::new(150.0, 0.0), &params);

        assert!((near - 90.0).abs() < 1e-4);
        assert!((far - 10.0).abs() < 1e-4);
        assert_eq!(outside, Vec2::ZERO);
        // Cursor exactly on a particle has no direction
        assert_eq!(mouse_acceleration(Vec2::ZERO, &params), Vec2::ZERO);
    }
}
