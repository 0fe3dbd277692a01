//! Point-mass body: mass, position, velocity, and accumulated acceleration.

use orrery_math::Vec3;
use serde::{Deserialize, Serialize};

/// A point mass participating in the simulation.
///
/// Bodies with `m == 0` are test particles: they feel forces but do not
/// exert them (unless the simulation requests symmetric treatment, see
/// [`crate::TestParticleKind`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Mass.
    pub m: f64,
    /// Position.
    pub pos: Vec3,
    /// Velocity.
    pub vel: Vec3,
    /// Acceleration accumulated by the most recent interaction evaluation.
    pub acc: Vec3,
}

impl Body {
    /// Create a body at rest acceleration-wise.
    pub fn new(m: f64, pos: Vec3, vel: Vec3) -> Self {
        Self {
            m,
            pos,
            vel,
            acc: Vec3::zeros(),
        }
    }

    /// Create a massless test particle.
    pub fn test_particle(pos: Vec3, vel: Vec3) -> Self {
        Self::new(0.0, pos, vel)
    }

    /// Kinetic energy of this body.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * self.vel.norm_squared()
    }
}
