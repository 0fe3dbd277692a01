//! Math primitives shared across the orrery crates.

/// 3D vector alias.
pub type Vec3 = nalgebra::Vector3<f64>;

/// One full turn.
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// Machine-independent cube root via Newton's method.
///
/// `pow(a, 1./3.)` differs in the last ulps between libm implementations,
/// and the critical radii derived from it must be reproducible bit-for-bit
/// across platforms. Speed is not a concern here; the iteration count covers
/// the full double range (the linear phase needs ~110 iterations for inputs
/// near 1e30 before quadratic convergence takes over).
pub fn sqrt3(a: f64) -> f64 {
    let mut x = 1.0_f64;
    for _ in 0..200 {
        let x2 = x * x;
        x += (a / x2 - x) / 3.0;
    }
    x
}
