//! 2D Smoothed Particle Hydrodynamics simulation module for Bevy.
//!
//! Each frame is split into sub-steps. A sub-step samples densities at
//! predicted positions, then accumulates pressure, viscosity, gravity and
//! mouse forces and integrates into the second particle buffer, which
//! becomes authoritative once the whole population is written.
//!
//! # Architecture
//!
//! - [`params`]: Per-frame parameter snapshot and GPU uniform layout
//! - [`particle`]: Particle state and initial scatter
//! - [`kernel`]: Smoothing kernels
//! - [`spatial`]: Uniform grid for neighbor search
//! - [`solver`]: Density pass and force/integration pass
//! - [`boundary`]: Viewport walls
//! - [`simulation`]: Double-buffered store and sub-step orchestration
//! - [`preset`]: Named parameter presets
//! - [`plugin`]: Bevy plugin for easy integration

pub mod boundary;
pub mod error;
pub mod kernel;
pub mod params;
pub mod particle;
pub mod plugin;
pub mod preset;
pub mod simulation;
pub mod solver;
pub mod spatial;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::boundary::*;
    pub use super::error::*;
    pub use super::kernel::*;
    pub use super::params::*;
    pub use super::particle::*;
    pub use super::plugin::*;
    pub use super::preset::*;
    pub use super::simulation::*;
    pub use super::solver::*;
    pub use super::spatial::*;
}
