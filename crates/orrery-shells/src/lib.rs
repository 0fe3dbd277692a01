//! Hierarchical multi-shell symplectic N-body integrator.
//!
//! Advances a gravitational system by a fixed macro step using an
//! operator-splitting scheme. Whenever a pair of bodies approaches within
//! its critical distance, the pair is handed to a nested inner integrator
//! running a finer step, with the interaction smoothly partitioned between
//! the layers by a C^∞ switching function. The construction stays
//! time-symmetric, so close encounters are handled without giving up the
//! bounded energy behavior of symplectic integrators.
//!
//! Entry points mirror the three operations a driver needs:
//! [`ShellIntegrator::part1`] (pre-step bookkeeping),
//! [`ShellIntegrator::part2`] (the macro step), and
//! [`ShellIntegrator::synchronize`] (idempotent postprocessing before any
//! inspection of positions and velocities).

pub mod encounter;
pub mod integrator;
pub mod scheme;
pub mod switching;

pub use integrator::ShellIntegrator;
pub use scheme::{Op, Scheme};
pub use switching::{Switching, SwitchingFn, dl_dd_infinity, l_infinity};
