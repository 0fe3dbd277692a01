//! Body and simulation state types for the orrery N-body integrator.
//!
//! `Simulation` owns the body array and the handful of global parameters the
//! integrator consumes (time, step, gravitational constant, active count,
//! cooperative interrupt flag). The integrator itself lives in
//! `orrery-shells` and operates on a `&mut Simulation`.

pub mod body;
pub mod error;
pub mod orbit;
pub mod sim;

pub use body::Body;
pub use error::ModelError;
pub use orbit::{OrbitalElements, orbital_elements};
pub use sim::{CollisionMode, ForceHook, GravityMode, Simulation, TestParticleKind};
