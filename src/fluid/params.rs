//! Fluid simulation parameters.
//!
//! A [`SimParams`] value is an immutable snapshot of every tunable scalar the
//! solver reads. The host builds a fresh snapshot each frame (time step, mouse
//! state, viewport) and hands it to the step call; the solver never mutates it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{FluidError, FluidResult};

/// Magnitude applied to `mouse_strength` while a mouse button is held.
pub const MOUSE_STRENGTH: f32 = 3000.0;

/// Parameters controlling the fluid simulation behavior.
///
/// Coordinates are screen-space pixels with `y` growing downward, so a
/// positive `gravity` pulls particles toward the bottom of the viewport.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Frame time step in seconds, split evenly across `sub_steps`.
    pub delta_t: f32,

    /// Mass carried by every particle.
    pub mass: f32,

    /// Smoothing kernel radius (h) in pixels.
    /// Very small values make the fluid behave like sand.
    pub smoothing_radius: f32,

    /// Density the pressure term drives each particle toward.
    pub target_density: f32,

    /// Stiffness converting density error into pressure.
    pub pressure_multiplier: f32,

    /// Fraction of the normal velocity kept after hitting a wall.
    /// 0.0 = stick, 1.0 = perfect bounce. Values outside [0, 1] are
    /// clamped when applied.
    pub damping: f32,

    /// Downward acceleration in px/s².
    pub gravity: f32,

    /// How many sub-step lengths ahead density is sampled.
    pub look_ahead: f32,

    /// Number of sub-steps per frame.
    pub sub_steps: u32,

    /// Simulation domain width in pixels.
    pub viewport_width: f32,

    /// Simulation domain height in pixels.
    pub viewport_height: f32,

    /// Outer window width, forwarded to the renderer.
    pub window_width: f32,

    /// Outer window height, forwarded to the renderer.
    pub window_height: f32,

    /// Cursor x in pixels.
    pub mouse_x: f32,

    /// Cursor y in pixels.
    pub mouse_y: f32,

    /// Signed mouse force. Positive repels, negative attracts, zero disables.
    pub mouse_strength: f32,

    /// Radius of the mouse force in pixels.
    pub mouse_radius: f32,

    /// Rate (1/s) at which a particle's velocity relaxes toward its
    /// neighbors' velocities.
    pub viscosity_strength: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            delta_t: 1.0 / 60.0,
            mass: 1.0,
            smoothing_radius: 25.0,
            target_density: 0.01,
            pressure_multiplier: 30_000.0,
            damping: 0.5,
            gravity: 400.0,
            look_ahead: 1.0,
            sub_steps: 1,
            viewport_width: 1280.0,
            viewport_height: 720.0,
            window_width: 1280.0,
            window_height: 720.0,
            mouse_x: 0.0,
            mouse_y: 0.0,
            mouse_strength: 0.0,
            mouse_radius: 120.0,
            viscosity_strength: 0.0,
        }
    }
}

impl SimParams {
    /// Default water-like behavior.
    pub fn water() -> Self {
        Self::default()
    }

    /// Tiny smoothing radius: grains barely interact and pile up like sand.
    pub fn sand() -> Self {
        Self {
            smoothing_radius: 10.0,
            target_density: 0.02,
            sub_steps: 2,
            ..Self::default()
        }
    }

    /// Thick, slow-moving fluid.
    pub fn viscous() -> Self {
        Self {
            viscosity_strength: 8.0,
            damping: 0.2,
            sub_steps: 2,
            ..Self::default()
        }
    }

    /// Set the simulation domain, e.g. after a window resize.
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the outer window size forwarded to the renderer.
    pub fn with_window(mut self, width: f32, height: f32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set cursor position and force.
    pub fn with_mouse(mut self, x: f32, y: f32, strength: f32) -> Self {
        self.mouse_x = x;
        self.mouse_y = y;
        self.mouse_strength = strength;
        self
    }

    /// Set the number of sub-steps per frame.
    pub fn with_sub_steps(mut self, sub_steps: u32) -> Self {
        self.sub_steps = sub_steps;
        self
    }

    /// Set the frame time step.
    pub fn with_delta_t(mut self, delta_t: f32) -> Self {
        self.delta_t = delta_t;
        self
    }

    /// Time advanced by a single sub-step.
    pub fn sub_step_dt(&self) -> f32 {
        self.delta_t / self.sub_steps.max(1) as f32
    }

    /// Simulation domain as a vector.
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height)
    }

    /// Cursor position as a vector.
    pub fn mouse_position(&self) -> Vec2 {
        Vec2::new(self.mouse_x, self.mouse_y)
    }

    /// Check every invariant the solver relies on.
    pub fn validate(&self) -> FluidResult<()> {
        let scalars = [
            ("delta_t", self.delta_t),
            ("mass", self.mass),
            ("smoothing_radius", self.smoothing_radius),
            ("target_density", self.target_density),
            ("pressure_multiplier", self.pressure_multiplier),
            ("damping", self.damping),
            ("gravity", self.gravity),
            ("look_ahead", self.look_ahead),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("window_width", self.window_width),
            ("window_height", self.window_height),
            ("mouse_x", self.mouse_x),
            ("mouse_y", self.mouse_y),
            ("mouse_strength", self.mouse_strength),
            ("mouse_radius", self.mouse_radius),
            ("viscosity_strength", self.viscosity_strength),
        ];
        if let Some((name, value)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(FluidError::InvalidConfig(format!(
                "{name} must be finite (got {value})"
            )));
        }

        let positive = [
            ("delta_t", self.delta_t),
            ("mass", self.mass),
            ("smoothing_radius", self.smoothing_radius),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(FluidError::InvalidConfig(format!(
                "{name} must be positive (got {value})"
            )));
        }

        let non_negative = [
            ("target_density", self.target_density),
            ("look_ahead", self.look_ahead),
            ("mouse_radius", self.mouse_radius),
            ("viscosity_strength", self.viscosity_strength),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return Err(FluidError::InvalidConfig(format!(
                "{name} must not be negative (got {value})"
            )));
        }

        if self.sub_steps == 0 {
            return Err(FluidError::InvalidConfig(
                "sub_steps must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// GPU-compatible uniform buffer for shader parameters.
///
/// Field order follows the host's uniform upload; the trailing padding rounds
/// the struct up to a 16-byte multiple.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimParamsUniform {
    pub delta_t: f32,
    pub mass: f32,
    pub smoothing_radius: f32,
    pub target_density: f32,

    pub pressure_multiplier: f32,
    pub damping: f32,
    pub gravity: f32,
    pub look_ahead: f32,

    pub sub_steps: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub window_width: f32,

    pub window_height: f32,
    pub mouse_x: f32,
    pub mouse_y: f32,
    pub mouse_strength: f32,

    pub mouse_radius: f32,
    pub viscosity_strength: f32,
    pub _padding: [f32; 2],
}

impl From<&SimParams> for SimParamsUniform {
    fn from(params: &SimParams) -> Self {
        Self {
            delta_t: params.delta_t,
            mass: params.mass,
            smoothing_radius: params.smoothing_radius,
            target_density: params.target_density,
            pressure_multiplier: params.pressure_multiplier,
            damping: params.damping,
            gravity: params.gravity,
            look_ahead: params.look_ahead,
            sub_steps: params.sub_steps as f32,
            viewport_width: params.viewport_width,
            viewport_height: params.viewport_height,
            window_width: params.window_width,
            window_height: params.window_height,
            mouse_x: params.mouse_x,
            mouse_y: params.mouse_y,
            mouse_strength: params.mouse_strength,
            mouse_radius: params.mouse_radius,
            viscosity_strength: params.viscosity_strength,
            _padding: [0.0; 2],
        }
    }
}
