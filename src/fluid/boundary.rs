//! Viewport boundary handling.
//!
//! Particles are confined to the axis-aligned viewport rectangle. A particle
//! that crosses a wall is clamped back onto it and the offending velocity
//! component is reflected inward and scaled by the damping factor, so
//! collisions can only remove energy.
//!
//! Runaway states are contained too: a NaN coordinate is reset to the box
//! center, infinite coordinates land on the matching wall, and non-finite
//! velocity components are zeroed.

use bevy::prelude::*;

use super::params::SimParams;

/// Axis-aligned box boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxBoundary {
    /// Minimum corner of the box.
    pub min: Vec2,
    /// Maximum corner of the box.
    pub max: Vec2,
    /// Fraction of the normal velocity kept after a collision.
    pub damping: f32,
}

impl Default for BoxBoundary {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(1280.0, 720.0),
            damping: 0.5,
        }
    }
}

impl BoxBoundary {
    /// Create a box boundary with custom bounds.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min,
            max,
            ..default()
        }
    }

    /// The viewport rectangle of a parameter snapshot.
    pub fn from_params(params: &SimParams) -> Self {
        Self {
            min: Vec2::ZERO,
            max: params.viewport(),
            damping: params.damping.clamp(0.0, 1.0),
        }
    }

    /// Set damping.
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Check if a point is inside the boundary.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Clamp a particle back inside and damp the velocity along any wall it
    /// crossed. The result is always finite and inside the box.
    pub fn apply_collision(&self, position: &mut Vec2, velocity: &mut Vec2) {
        let center = (self.min + self.max) * 0.5;
        if position.x.is_nan() {
            position.x = center.x;
        }
        if position.y.is_nan() {
            position.y = center.y;
        }

        if position.x < self.min.x {
            position.x = self.min.x;
            velocity.x = velocity.x.abs() * self.damping;
        } else if position.x > self.max.x {
            position.x = self.max.x;
            velocity.x = -velocity.x.abs() * self.damping;
        }

        if position.y < self.min.y {
            position.y = self.min.y;
            velocity.y = velocity.y.abs() * self.damping;
        } else if position.y > self.max.y {
            position.y = self.max.y;
            velocity.y = -velocity.y.abs() * self.damping;
        }

        // inf * 0 damping is NaN
        if !velocity.x.is_finite() {
            velocity.x = 0.0;
        }
        if !velocity.y.is_finite() {
            velocity.y = 0.0;
        }
    }
}
