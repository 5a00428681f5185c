//! Ripple - interactive 2D SPH fluid simulation for Bevy
//!
//! A few thousand particles in a screen-sized box, pushed around by
//! pressure, gravity and the mouse.
//!
//! # Features
//!
//! - **Double-buffered state**: every particle in a sub-step reads the same
//!   snapshot, so the passes run in parallel on rayon without locks
//! - **Predicted positions**: densities are sampled a short horizon ahead
//!   for stability
//! - **Uniform grid**: neighbor search in O(n) for bounded local density
//! - **GPU layouts**: `bytemuck` structs matching the renderer's buffers
//! - **Presets**: built-in water, sand and viscous settings, JSON loadable
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use ripple::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(MinimalPlugins)
//!         .add_plugins(
//!             FluidPlugin::with_params(SimParams::water().with_viewport(1280.0, 720.0))
//!                 .with_particle_count(4000),
//!         )
//!         .add_systems(Update, stir)
//!         .run();
//! }
//!
//! fn stir(mut params: ResMut<SimParams>) {
//!     // Repel particles around the viewport center
//!     params.mouse_x = 640.0;
//!     params.mouse_y = 360.0;
//!     params.mouse_strength = MOUSE_STRENGTH;
//! }
//! ```
//!
//! Without Bevy's scheduler, drive [`fluid::simulation::FluidSimulation`]
//! directly:
//!
//! ```rust
//! use ripple::prelude::*;
//!
//! let params = SimParams::default();
//! let mut sim = FluidSimulation::with_seed(500, params, 7).unwrap();
//! sim.step_frame(&params).unwrap();
//! assert_eq!(sim.particles().len(), 500);
//! ```
//!
//! # Architecture
//!
//! - [`fluid`]: Core fluid simulation module
//!   - [`fluid::params`]: Simulation parameters
//!   - [`fluid::particle`]: Particle data structures
//!   - [`fluid::kernel`]: Smoothing kernels
//!   - [`fluid::spatial`]: Grid neighbor search
//!   - [`fluid::solver`]: Density and force passes
//!   - [`fluid::boundary`]: Boundary handling
//!   - [`fluid::simulation`]: Buffer ping-pong and sub-steps
//!   - [`fluid::preset`]: Parameter presets
//!   - [`fluid::plugin`]: Bevy plugin

pub mod fluid;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::fluid::prelude::*;
}
