//! Double-buffered particle state and the sub-step orchestrator.
//!
//! [`ParticleStore`] owns two equally sized particle buffers. Exactly one is
//! the authoritative "read" buffer; the other is scratch space the next
//! sub-step writes into. Only the orchestrator flips the roles, once per
//! sub-step, and callers can only see the authoritative buffer.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::error::{FluidError, FluidResult};
use super::params::SimParams;
use super::particle::{scatter_uniform, GpuParticle, Particle};
use super::solver::SphSolver;
use super::spatial::NeighborSearch;

/// One of the two particle buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferSlot {
    A,
    B,
}

impl BufferSlot {
    fn index(self) -> usize {
        match self {
            BufferSlot::A => 0,
            BufferSlot::B => 1,
        }
    }

    /// The other slot.
    pub fn flipped(self) -> Self {
        match self {
            BufferSlot::A => BufferSlot::B,
            BufferSlot::B => BufferSlot::A,
        }
    }
}

/// Ping-pong pair of particle buffers.
#[derive(Clone, Debug)]
pub struct ParticleStore {
    buffers: [Vec<Particle>; 2],
    active: BufferSlot,
}

impl ParticleStore {
    /// Create a store whose buffers both start as `particles`, with A
    /// authoritative.
    pub fn new(particles: Vec<Particle>) -> FluidResult<Self> {
        if particles.is_empty() {
            return Err(FluidError::EmptyPopulation);
        }
        Ok(Self {
            buffers: [particles.clone(), particles],
            active: BufferSlot::A,
        })
    }

    pub fn len(&self) -> usize {
        self.buffers[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers[0].is_empty()
    }

    /// Which slot currently holds the authoritative state.
    pub fn active_slot(&self) -> BufferSlot {
        self.active
    }

    /// The authoritative buffer.
    pub fn current(&self) -> &[Particle] {
        &self.buffers[self.active.index()]
    }

    /// Authoritative buffer in GPU layout.
    pub fn to_gpu(&self) -> Vec<GpuParticle> {
        self.current().iter().map(GpuParticle::from).collect()
    }

    /// Read buffer and write buffer for the next sub-step.
    fn split(&mut self) -> (&[Particle], &mut [Particle]) {
        let [a, b] = &mut self.buffers;
        match self.active {
            BufferSlot::A => (a.as_slice(), b.as_mut_slice()),
            BufferSlot::B => (b.as_slice(), a.as_mut_slice()),
        }
    }

    /// Promote the write buffer to authoritative.
    fn swap(&mut self) {
        self.active = self.active.flipped();
    }
}

/// Main fluid simulation resource.
///
/// Holds the particle store, the solver scratch buffers and the last
/// accepted parameter snapshot.
#[derive(Resource, Debug)]
pub struct FluidSimulation {
    store: ParticleStore,
    solver: SphSolver,
    params: SimParams,
    frame: u64,
}

impl FluidSimulation {
    /// Scatter `count` particles over the viewport using OS entropy.
    pub fn new(count: usize, params: SimParams) -> FluidResult<Self> {
        Self::seeded(count, params, &mut StdRng::from_entropy())
    }

    /// Scatter `count` particles over the viewport from a fixed seed.
    pub fn with_seed(count: usize, params: SimParams, seed: u64) -> FluidResult<Self> {
        Self::seeded(count, params, &mut StdRng::seed_from_u64(seed))
    }

    fn seeded(count: usize, params: SimParams, rng: &mut StdRng) -> FluidResult<Self> {
        if count == 0 {
            return Err(FluidError::EmptyPopulation);
        }
        params.validate()?;
        let particles = scatter_uniform(count, params.viewport(), rng);
        Self::from_particles(particles, params)
    }

    /// Start from explicit particle state.
    pub fn from_particles(particles: Vec<Particle>, params: SimParams) -> FluidResult<Self> {
        params.validate()?;
        let store = ParticleStore::new(particles)?;
        info!(
            "Fluid simulation ready: {} particles in a {}x{} viewport",
            store.len(),
            params.viewport_width,
            params.viewport_height
        );
        Ok(Self {
            store,
            solver: SphSolver::new(NeighborSearch::Grid),
            params,
            frame: 0,
        })
    }

    /// Select the neighbor search strategy.
    pub fn with_neighbor_search(mut self, search: NeighborSearch) -> Self {
        self.solver.set_search(search);
        self
    }

    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    /// Authoritative particle state after the last completed sub-step.
    pub fn particles(&self) -> &[Particle] {
        self.store.current()
    }

    /// Authoritative particle state in GPU layout.
    pub fn gpu_particles(&self) -> Vec<GpuParticle> {
        self.store.to_gpu()
    }

    pub fn active_slot(&self) -> BufferSlot {
        self.store.active_slot()
    }

    /// Densities sampled by the last sub-step (empty before the first step).
    pub fn densities(&self) -> &[f32] {
        self.solver.densities()
    }

    /// Last accepted parameter snapshot.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Number of frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance one frame with a fresh parameter snapshot.
    ///
    /// An invalid snapshot is rejected before any particle state changes.
    pub fn step_frame(&mut self, params: &SimParams) -> FluidResult<()> {
        params.validate()?;
        self.params = *params;

        for _ in 0..params.sub_steps {
            self.sub_step(params);
        }
        self.frame += 1;
        Ok(())
    }

    /// Density pass, barrier, force pass, then flip buffers.
    fn sub_step(&mut self, params: &SimParams) {
        let (read, write) = self.store.split();
        self.solver.compute_densities(read, params);
        self.solver.integrate(read, write, params);
        self.store.swap();
    }

    /// Mean relative deviation from the target density.
    ///
    /// Falls back to the mean absolute deviation when the target is zero.
    pub fn average_density_error(&self) -> f32 {
        let densities = self.solver.densities();
        if densities.is_empty() {
            return 0.0;
        }
        let target = self.params.target_density;
        let sum: f32 = densities.iter().map(|&d| (d - target).abs()).sum();
        let mean = sum / densities.len() as f32;
        if target > 0.0 {
            mean / target
        } else {
            mean
        }
    }

    /// Total kinetic energy `½ Σ m |v|²`.
    pub fn kinetic_energy(&self) -> f64 {
        let mass = self.params.mass as f64;
        self.particles()
            .iter()
            .map(|p| 0.5 * mass * p.velocity.length_squared() as f64)
            .sum()
    }
}
