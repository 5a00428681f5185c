//! Particle data structures and seeding.

use bevy::prelude::*;
use rand::Rng;

/// State of a single fluid particle.
///
/// Particles have no identity beyond their slot index in a buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Particle {
    /// Create a particle at rest.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }

    /// Set initial velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Position extrapolated `horizon` seconds ahead.
    #[inline]
    pub fn predicted_position(&self, horizon: f32) -> Vec2 {
        self.position + self.velocity * horizon
    }
}

/// Scatter `count` particles uniformly over `[0, viewport.x] × [0, viewport.y]`
/// with zero velocity.
pub fn scatter_uniform<R: Rng>(count: usize, viewport: Vec2, rng: &mut R) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            Particle::at(Vec2::new(
                rng.gen::<f32>() * viewport.x,
                rng.gen::<f32>() * viewport.y,
            ))
        })
        .collect()
}

/// GPU-compatible particle layout: position (xy) followed by velocity (xy).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuParticle {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
}

impl From<&Particle> for GpuParticle {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            velocity: p.velocity.to_array(),
        }
    }
}

impl From<GpuParticle> for Particle {
    fn from(p: GpuParticle) -> Self {
        Self {
            position: Vec2::from_array(p.position),
            velocity: Vec2::from_array(p.velocity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_scatter_stays_in_viewport() {
        let mut rng = StdRng::seed_from_u64(3);
        let viewport = Vec2::new(640.0, 480.0);
        let particles = scatter_uniform(500, viewport, &mut rng);

        assert_eq!(particles.len(), 500);
        for p in &particles {
            assert!(p.position.x >= 0.0 && p.position.x <= viewport.x);
            assert!(p.position.y >= 0.0 && p.position.y <= viewport.y);
            assert_eq!(p.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_predicted_position() {
        let p = Particle::at(Vec2::new(1.0, 2.0)).with_velocity(Vec2::new(10.0, -4.0));
        assert_eq!(p.predicted_position(0.5), Vec2::new(6.0, 0.0));
        assert_eq!(p.predicted_position(0.0), p.position);
    }

    #[test]
    fn test_gpu_particle_layout() {
        // Renderer reads instances with a 16-byte stride
        assert_eq!(std::mem::size_of::<GpuParticle>(), 16);

        let p = Particle::at(Vec2::new(3.0, 4.0)).with_velocity(Vec2::new(-1.0, 2.0));
        let gpu = GpuParticle::from(&p);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&gpu));
        assert_eq!(floats, &[3.0, 4.0, -1.0, 2.0]);
    }
}
