//! Straight-line closest-approach prediction for encounter detection.

use orrery_model::Body;

/// Predict the minimum squared separation two bodies attain over the next
/// `dt`, assuming unaccelerated motion.
///
/// Returns `(rmin2_ab, rmin2_abc)`: the minimum over the two endpoints, and
/// the minimum additionally considering the interior closest approach when
/// it falls inside the interval. `dt` may be negative (reverse sub-steps
/// arise inside postprocessors); the sign is folded into the relative
/// velocity so the prediction covers the interval actually being traversed.
pub fn predict_rmin2(p1: &Body, p2: &Body, dt: f64) -> (f64, f64) {
    let dts = if dt < 0.0 { -1.0 } else { 1.0 };
    let dt = dt.abs();
    let dr = p1.pos - p2.pos;
    let dv = (p1.vel - p2.vel) * dts;
    let r1 = dr.norm_squared();
    let r2 = (dr + dv * dt).norm_squared();
    // Minimum of |dr + t dv|^2 over unconstrained t.
    let t_closest = -dr.dot(&dv) / dv.norm_squared();
    let r3 = (dr + dv * t_closest).norm_squared();

    let rmin2_ab = r1.min(r2);
    let frac = t_closest / dt;
    let rmin2_abc = if (0.0..=1.0).contains(&frac) {
        rmin2_ab.min(r3)
    } else {
        rmin2_ab
    };
    (rmin2_ab, rmin2_abc)
}
