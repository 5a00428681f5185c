//! 2D SPH smoothing kernels.
//!
//! Every kernel here integrates to one over the disk of radius `h`, so
//! densities keep the same scale when the smoothing radius is tuned.
//!
//! - Spiky²: `W(r) = 6 / (πh⁴) · (h - r)²` for density and pressure.
//!   Its slope `-12 / (πh⁴) · (h - r)` is finite at `r = 0` and both reach
//!   zero at `r = h`.
//! - Poly6: `W(r) = 4 / (πh⁸) · (h² - r²)³` for viscosity.

use std::f32::consts::PI;

use bevy::prelude::*;

/// Below this distance two particles are treated as coincident.
pub const COINCIDENT_EPSILON: f32 = 1e-6;

/// Kernel functions for one smoothing radius, with coefficients precomputed.
#[derive(Clone, Copy, Debug)]
pub struct SmoothingKernel {
    radius: f32,
    radius_sq: f32,
    spiky_coeff: f32,
    spiky_slope_coeff: f32,
    poly6_coeff: f32,
}

impl SmoothingKernel {
    pub fn new(radius: f32) -> Self {
        let h2 = radius * radius;
        let h4 = h2 * h2;
        Self {
            radius,
            radius_sq: h2,
            spiky_coeff: 6.0 / (PI * h4),
            spiky_slope_coeff: 12.0 / (PI * h4),
            poly6_coeff: 4.0 / (PI * h4 * h4),
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Density weight at `distance`.
    #[inline]
    pub fn weight(&self, distance: f32) -> f32 {
        if distance >= self.radius {
            return 0.0;
        }
        let h_minus_r = self.radius - distance;
        self.spiky_coeff * h_minus_r * h_minus_r
    }

    /// dW/dr at `distance`. Never positive.
    #[inline]
    pub fn slope(&self, distance: f32) -> f32 {
        if distance >= self.radius {
            return 0.0;
        }
        -self.spiky_slope_coeff * (self.radius - distance)
    }

    /// Gradient of `W(|offset|)` with respect to the particle at the tail of
    /// `offset` (`offset = x_i - x_j`).
    ///
    /// Coincident particles have no defined direction, so `fallback` (a unit
    /// vector) is used instead. Callers pass opposite fallbacks for the two
    /// sides of a pair so the resulting forces stay antisymmetric.
    #[inline]
    pub fn gradient(&self, offset: Vec2, fallback: Vec2) -> Vec2 {
        let distance = offset.length();
        if distance >= self.radius {
            return Vec2::ZERO;
        }
        let direction = if distance > COINCIDENT_EPSILON {
            offset / distance
        } else {
            fallback
        };
        direction * self.slope(distance)
    }

    /// Viscosity weight for a squared distance.
    #[inline]
    pub fn viscosity_weight(&self, distance_sq: f32) -> f32 {
        if distance_sq >= self.radius_sq {
            return 0.0;
        }
        let diff = self.radius_sq - distance_sq;
        self.poly6_coeff * diff * diff * diff
    }
}

/// Stable direction for a coincident pair `(i, j)`; swapping the indices
/// flips the sign.
#[inline]
pub fn coincident_direction(i: usize, j: usize) -> Vec2 {
    if i < j {
        Vec2::NEG_X
    } else {
        Vec2::X
    }
}
