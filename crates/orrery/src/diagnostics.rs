//! Conserved-quantity diagnostics: energy, momentum, angular momentum.
//!
//! These are driver-side conveniences; the integrator never consumes them.
//! Call them on a synchronized simulation only.

use orrery_math::Vec3;
use orrery_model::Simulation;

/// Total energy: kinetic plus pairwise gravitational potential.
pub fn total_energy(sim: &Simulation) -> f64 {
    let mut e = 0.0;
    for b in &sim.bodies {
        e += b.kinetic_energy();
    }
    let n = sim.bodies.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (sim.bodies[i].pos - sim.bodies[j].pos).norm();
            e -= sim.g * sim.bodies[i].m * sim.bodies[j].m / d;
        }
    }
    e
}

/// Total linear momentum.
pub fn total_momentum(sim: &Simulation) -> Vec3 {
    let mut p = Vec3::zeros();
    for b in &sim.bodies {
        p += b.vel * b.m;
    }
    p
}

/// Total angular momentum about the origin.
pub fn total_angular_momentum(sim: &Simulation) -> Vec3 {
    let mut l = Vec3::zeros();
    for b in &sim.bodies {
        l += b.pos.cross(&b.vel) * b.m;
    }
    l
}
