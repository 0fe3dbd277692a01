//! Osculating orbital elements from a relative state vector.
//!
//! Used by the test-suite and by drivers for diagnostics; the integrator
//! itself never needs elements.

use orrery_math::Vec3;
use serde::{Deserialize, Serialize};

/// Keplerian elements of a bound two-body orbit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis.
    pub a: f64,
    /// Eccentricity.
    pub e: f64,
    /// Inclination.
    pub inc: f64,
    /// Longitude of the ascending node.
    pub raan: f64,
    /// Argument of periapsis.
    pub arg_peri: f64,
    /// True anomaly.
    pub true_anomaly: f64,
}

/// Compute osculating elements from the relative position and velocity of a
/// secondary about a primary with gravitational parameter `mu = G (m1 + m2)`.
pub fn orbital_elements(x: Vec3, v: Vec3, mu: f64) -> OrbitalElements {
    use std::f64::consts::PI;

    let r = x.norm();
    let v2 = v.norm_squared();

    // Specific orbital energy and angular momentum.
    let energy = v2 / 2.0 - mu / r;
    let h = x.cross(&v);
    let h_mag = h.norm();

    let a = -mu / (2.0 * energy);

    // Eccentricity vector: e = (v × h) / μ - r̂
    let e_vec = v.cross(&h) / mu - x / r;
    let e = e_vec.norm();

    let inc = (h.z / h_mag).acos();

    // Node vector lies in the equatorial plane.
    let n = Vec3::new(-h.y, h.x, 0.0);
    let n_mag = n.norm();
    let raan = if n_mag > 1e-10 {
        let raw = (n.x / n_mag).acos();
        if n.y < 0.0 { 2.0 * PI - raw } else { raw }
    } else {
        0.0
    };

    let arg_peri = if n_mag > 1e-10 && e > 1e-10 {
        let raw = (n.dot(&e_vec) / (n_mag * e)).clamp(-1.0, 1.0).acos();
        if e_vec.z < 0.0 { 2.0 * PI - raw } else { raw }
    } else {
        0.0
    };

    let true_anomaly = if e > 1e-10 {
        let raw = (e_vec.dot(&x) / (e * r)).clamp(-1.0, 1.0).acos();
        if x.dot(&v) < 0.0 { 2.0 * PI - raw } else { raw }
    } else {
        0.0
    };

    OrbitalElements {
        a,
        e,
        inc,
        raan,
        arg_peri,
        true_anomaly,
    }
}
