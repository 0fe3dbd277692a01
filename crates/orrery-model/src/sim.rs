//! Simulation state — the body array plus the global parameters the
//! integrator consumes.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::error::{ModelError, Result};

/// How zero-mass bodies couple back to massive ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestParticleKind {
    /// Test particles feel forces but exert none (default).
    Passive,
    /// Test particles also exert forces on active bodies.
    Interacting,
}

/// Collision detection mode requested by the driver.
///
/// The integrator itself performs no collision search; it only validates
/// that the requested mode is one it can coexist with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionMode {
    None,
    Direct,
    Tree,
}

/// Gravity routine selected on the simulation.
///
/// The shell integrator brings its own force evaluation and overrides this
/// to `None` during stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GravityMode {
    None,
    Basic,
    Tree,
}

/// A single externally supplied acceleration hook. Applied to the
/// accumulated accelerations of the outermost shell before each velocity
/// update; everything beyond this hook is out of scope for the integrator.
pub type ForceHook = fn(&mut Simulation);

/// Owning container for the simulated system.
#[derive(Debug)]
pub struct Simulation {
    /// Bodies, active ones first.
    pub bodies: Vec<Body>,
    /// Current simulation time.
    pub t: f64,
    /// Macro time step. Fixed; the integrator subdivides internally.
    pub dt: f64,
    /// Length of the last completed macro step.
    pub dt_last_done: f64,
    /// Gravitational constant.
    pub g: f64,
    /// Number of force-exerting bodies; `None` means all of them.
    /// Bodies at indices `>= n_active` are test particles.
    pub n_active: Option<usize>,
    /// Back-reaction policy for test particles.
    pub testparticle_kind: TestParticleKind,
    /// Collision mode requested by the driver.
    pub collision: CollisionMode,
    /// Gravity routine requested by the driver.
    pub gravity: GravityMode,
    /// Number of attached variational particles. The shell integrator does
    /// not propagate variational equations and warns when this is nonzero.
    pub n_var: usize,
    /// Optional external acceleration hook.
    pub additional_forces: Option<ForceHook>,
    interrupt: AtomicBool,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            t: 0.0,
            dt: 0.001,
            dt_last_done: 0.0,
            g: 1.0,
            n_active: None,
            testparticle_kind: TestParticleKind::Passive,
            collision: CollisionMode::None,
            gravity: GravityMode::Basic,
            n_var: 0,
            additional_forces: None,
            interrupt: AtomicBool::new(false),
        }
    }

    /// Append a body, validating that its state is finite and its mass
    /// non-negative. Returns the body's index.
    pub fn add(&mut self, body: Body) -> Result<usize> {
        if body.m < 0.0 {
            return Err(ModelError::NegativeMass(body.m));
        }
        let finite = body.m.is_finite()
            && body.pos.iter().all(|c| c.is_finite())
            && body.vel.iter().all(|c| c.is_finite());
        if !finite {
            return Err(ModelError::NonFiniteBody);
        }
        self.bodies.push(body);
        Ok(self.bodies.len() - 1)
    }

    /// Number of bodies.
    pub fn n(&self) -> usize {
        self.bodies.len()
    }

    /// Number of force-exerting bodies.
    pub fn n_active_resolved(&self) -> usize {
        self.n_active.unwrap_or(self.bodies.len()).min(self.bodies.len())
    }

    /// Restrict force exertion to the first `n_active` bodies.
    pub fn set_n_active(&mut self, n_active: usize) -> Result<()> {
        if n_active > self.bodies.len() {
            return Err(ModelError::ActiveCountOutOfRange {
                n_active,
                n: self.bodies.len(),
            });
        }
        self.n_active = Some(n_active);
        Ok(())
    }

    /// Request cooperative cancellation of the evaluation in progress.
    /// Safe to call from a signal handler thread.
    pub fn request_interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Clear a pending interrupt request.
    pub fn clear_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn interrupt_requested(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
