//! orrery — hierarchical multi-shell symplectic N-body integration.
//!
//! This is the umbrella crate: it re-exports the core types from the
//! sub-crates and provides a small convenience driver for stepping a
//! simulation. The integrator itself lives in `orrery-shells`; body and
//! simulation state types in `orrery-model`.
//!
//! # Example
//!
//! ```
//! use orrery::{Body, Orrery, Simulation, Vec3};
//!
//! let mut sim = Simulation::new();
//! sim.dt = 0.01;
//! sim.add(Body::new(1.0, Vec3::zeros(), Vec3::zeros())).unwrap();
//! sim.add(Body::new(1e-3, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)))
//!     .unwrap();
//!
//! let mut orrery = Orrery::new(sim);
//! orrery.integrate(100);
//! assert!(orrery.sim.t > 0.99);
//! ```

pub mod diagnostics;

pub use orrery_math::{Vec3, TWO_PI};
pub use orrery_model::{
    orbital_elements, Body, CollisionMode, ForceHook, GravityMode, ModelError, OrbitalElements,
    Simulation, TestParticleKind,
};
pub use orrery_shells::{Op, Scheme, ShellIntegrator, Switching};

pub use diagnostics::{total_angular_momentum, total_energy, total_momentum};

/// A simulation bundled with a shell integrator.
///
/// The enclosing time loop, I/O, and collision resolution stay with the
/// caller; this driver only sequences the integrator's per-step operations
/// in the required order.
pub struct Orrery {
    pub sim: Simulation,
    pub integrator: ShellIntegrator,
}

impl Orrery {
    /// Wrap a simulation with a default-configured integrator.
    pub fn new(sim: Simulation) -> Self {
        Self {
            sim,
            integrator: ShellIntegrator::default(),
        }
    }

    /// Advance the simulation by one macro step.
    pub fn step(&mut self) {
        self.integrator.part1(&mut self.sim);
        self.integrator.part2(&mut self.sim);
    }

    /// Advance the simulation by `steps` macro steps.
    pub fn integrate(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Bring positions and velocities to a consistent state. Required
    /// before reading them out unless safe mode is on.
    pub fn synchronize(&mut self) {
        self.integrator.synchronize(&mut self.sim);
    }
}
