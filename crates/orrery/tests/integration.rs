//! Integration tests for the shell integrator.
//!
//! Tolerances are set with wide margins around analytic error estimates for
//! the chosen step sizes; the suite asserts the qualitative guarantees of a
//! symplectic method (bounded energy oscillation, exact reversal, exact
//! momentum exchange) rather than chasing the last decimal digit.

use approx::assert_relative_eq;
use orrery::{
    orbital_elements, total_energy, total_momentum, Body, Orrery, Scheme, Simulation,
    TestParticleKind, Vec3, TWO_PI,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Star at the origin (at rest) plus one planet starting at periapsis.
fn kepler_sim(m_star: f64, m_planet: f64, a: f64, e: f64, dt: f64) -> Simulation {
    let mut sim = Simulation::new();
    sim.dt = dt;
    let mu = sim.g * (m_star + m_planet);
    let r = a * (1.0 - e);
    let v = (mu * (1.0 + e) / r).sqrt();
    sim.add(Body::new(m_star, Vec3::zeros(), Vec3::zeros())).unwrap();
    sim.add(Body::new(m_planet, Vec3::new(r, 0.0, 0.0), Vec3::new(0.0, v, 0.0)))
        .unwrap();
    sim
}

fn relative_state(sim: &Simulation) -> (Vec3, Vec3) {
    (
        sim.bodies[1].pos - sim.bodies[0].pos,
        sim.bodies[1].vel - sim.bodies[0].vel,
    )
}

fn assert_all_finite(sim: &Simulation) {
    for (i, b) in sim.bodies.iter().enumerate() {
        assert!(
            b.pos.iter().all(|c| c.is_finite()) && b.vel.iter().all(|c| c.is_finite()),
            "body {i} has non-finite state: {b:?}"
        );
    }
}

#[test]
fn kepler_circular_orbit_elements_stay_put() {
    let dt = TWO_PI / 300.0;
    let sim = kepler_sim(1.0, 1e-3, 1.0, 0.0, dt);
    let mu = sim.g * (1.0 + 1e-3);
    let mut orrery = Orrery::new(sim);

    orrery.integrate(10_000);

    let (x, v) = relative_state(&orrery.sim);
    let el = orbital_elements(x, v, mu);
    assert!(
        (el.a - 1.0).abs() < 1e-4,
        "semimajor axis drifted: a = {}",
        el.a
    );
    assert!(el.e < 3e-4, "orbit gained eccentricity: e = {}", el.e);
}

#[test]
fn kepler_eccentric_energy_drift_is_bounded() {
    let dt = TWO_PI / 4000.0;
    let sim = kepler_sim(1.0, 1e-3, 1.0, 0.2, dt);
    let mut orrery = Orrery::new(sim);

    let e0 = total_energy(&orrery.sim);
    orrery.integrate(10_000);
    let e1 = total_energy(&orrery.sim);

    let drift = ((e1 - e0) / e0).abs();
    assert!(
        drift < 1e-6,
        "relative energy drift {drift:e} over 10^4 steps (e0 = {e0}, e1 = {e1})"
    );
}

#[test]
fn sixth_order_scheme_conserves_energy() {
    let dt = TWO_PI / 300.0;
    let sim = kepler_sim(1.0, 1e-3, 1.0, 0.0, dt);
    let mut orrery = Orrery::new(sim);
    orrery.integrator.whsplitting = false;
    orrery.integrator.scheme_outer = Scheme::Lf6;

    let e0 = total_energy(&orrery.sim);
    orrery.integrate(3000);
    let e1 = total_energy(&orrery.sim);

    let drift = ((e1 - e0) / e0).abs();
    assert!(drift < 1e-5, "LF6 energy drift {drift:e}");
}

#[test]
fn forward_backward_integration_reverses_exactly() {
    let dt = TWO_PI / 1000.0;
    let sim = kepler_sim(1.0, 1e-3, 1.0, 0.2, dt);
    let mut orrery = Orrery::new(sim);

    let pos0: Vec<Vec3> = orrery.sim.bodies.iter().map(|b| b.pos).collect();
    let vel0: Vec<Vec3> = orrery.sim.bodies.iter().map(|b| b.vel).collect();

    orrery.integrate(1000);
    orrery.sim.dt = -dt;
    orrery.integrate(1000);

    for (i, b) in orrery.sim.bodies.iter().enumerate() {
        for k in 0..3 {
            assert!(
                (b.pos[k] - pos0[i][k]).abs() < 1e-10,
                "body {i} coordinate {k} did not return: {} vs {}",
                b.pos[k],
                pos0[i][k]
            );
            assert!(
                (b.vel[k] - vel0[i][k]).abs() < 1e-10,
                "body {i} velocity {k} did not return"
            );
        }
    }
    assert!(orrery.sim.t.abs() < 1e-12, "time did not return to zero");
}

#[test]
fn fourth_order_reversal_without_wh_splitting() {
    let dt = TWO_PI / 500.0;
    let sim = kepler_sim(1.0, 1e-3, 1.0, 0.2, dt);
    let mut orrery = Orrery::new(sim);
    orrery.integrator.whsplitting = false;
    orrery.integrator.scheme_outer = Scheme::Lf4;

    let pos0: Vec<Vec3> = orrery.sim.bodies.iter().map(|b| b.pos).collect();
    orrery.integrate(500);
    orrery.sim.dt = -dt;
    orrery.integrate(500);

    for (i, b) in orrery.sim.bodies.iter().enumerate() {
        for k in 0..3 {
            assert!(
                (b.pos[k] - pos0[i][k]).abs() < 1e-10,
                "body {i} coordinate {k} did not return"
            );
        }
    }
}

#[test]
fn processed_scheme_safe_mode_matches_deferred_synchronization() {
    let dt = TWO_PI / 100.0;

    let make = |safe: bool| {
        let sim = kepler_sim(1.0, 1e-3, 1.0, 0.1, dt);
        let mut orrery = Orrery::new(sim);
        orrery.integrator.whsplitting = false;
        orrery.integrator.scheme_outer = Scheme::Plf764;
        orrery.integrator.safe_mode = safe;
        orrery
    };

    let mut a = make(true);
    a.integrate(5);

    let mut b = make(false);
    b.integrate(5);
    b.synchronize();

    for (ba, bb) in a.sim.bodies.iter().zip(b.sim.bodies.iter()) {
        for k in 0..3 {
            assert!(
                (ba.pos[k] - bb.pos[k]).abs() < 1e-12,
                "safe-mode and deferred synchronization disagree: {} vs {}",
                ba.pos[k],
                bb.pos[k]
            );
        }
    }
}

#[test]
fn synchronize_is_idempotent() {
    let dt = TWO_PI / 100.0;
    let sim = kepler_sim(1.0, 1e-3, 1.0, 0.1, dt);
    let mut orrery = Orrery::new(sim);
    orrery.integrator.whsplitting = false;
    orrery.integrator.scheme_outer = Scheme::Pmlf4;
    orrery.integrator.safe_mode = false;

    orrery.integrate(3);
    orrery.synchronize();
    let snapshot = orrery.sim.bodies.clone();
    orrery.synchronize();
    assert_eq!(orrery.sim.bodies, snapshot);
    assert!(orrery.integrator.is_synchronized());
}

#[test]
fn close_encounter_is_captured_by_inner_shell() {
    // A tight planet pair (a binary well inside its Hill sphere) orbiting a
    // star: the pair separation sits far below the critical sums, so the
    // interaction must be handed down to the inner shells while the outer
    // energy stays bounded.
    let dt = TWO_PI / 100.0;
    let mut sim = Simulation::new();
    sim.dt = dt;
    let m = 1e-4;
    let d_bin = 1e-3;
    // Mutual circular orbit superposed on a circular orbit of the pair's
    // barycenter around the star.
    let v_bin = (sim.g * 2.0 * m / d_bin).sqrt() / 2.0;
    sim.add(Body::new(1.0, Vec3::zeros(), Vec3::zeros())).unwrap();
    sim.add(Body::new(
        m,
        Vec3::new(1.0 - d_bin / 2.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0 - v_bin, 0.0),
    ))
    .unwrap();
    sim.add(Body::new(
        m,
        Vec3::new(1.0 + d_bin / 2.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0 + v_bin, 0.0),
    ))
    .unwrap();

    let mut orrery = Orrery::new(sim);
    orrery.integrator.whsplitting = false;
    orrery.integrator.max_shells = 3;

    let e0 = total_energy(&orrery.sim);
    orrery.integrate(100);
    let e1 = total_energy(&orrery.sim);

    assert_all_finite(&orrery.sim);
    assert!(
        orrery.integrator.max_shell_used() >= 2,
        "pair was never promoted to an inner shell (max shell used = {})",
        orrery.integrator.max_shell_used()
    );
    let drift = ((e1 - e0) / e0).abs();
    assert!(drift < 5e-3, "energy drift through encounter: {drift:e}");
}

#[test]
fn capacity_limit_degrades_gracefully() {
    // A hard binary that always sits below the shell-1 critical sum, with
    // only two shells allowed: the innermost shell absorbs the encounter at
    // its own resolution instead of failing.
    let mut sim = Simulation::new();
    sim.dt = 1.0;
    let v_half = (sim.g * 2.0 / 0.2f64).sqrt() / 2.0;
    sim.add(Body::new(1.0, Vec3::new(-0.1, 0.0, 0.0), Vec3::new(0.0, -v_half, 0.0)))
        .unwrap();
    sim.add(Body::new(1.0, Vec3::new(0.1, 0.0, 0.0), Vec3::new(0.0, v_half, 0.0)))
        .unwrap();

    let mut orrery = Orrery::new(sim);
    orrery.integrator.whsplitting = false;
    orrery.integrator.max_shells = 2;

    orrery.integrate(3);

    assert_all_finite(&orrery.sim);
    assert_eq!(
        orrery.integrator.max_shell_used(),
        2,
        "expected the shell budget to be exhausted"
    );
}

#[test]
fn interrupt_leaves_state_at_sub_step_boundary() {
    let dt = TWO_PI / 100.0;
    let sim = kepler_sim(1.0, 1e-3, 1.0, 0.0, dt);
    let mut orrery = Orrery::new(sim);

    orrery.step();
    let pos_before: Vec<Vec3> = orrery.sim.bodies.iter().map(|b| b.pos).collect();
    let vel_before: Vec<Vec3> = orrery.sim.bodies.iter().map(|b| b.vel).collect();
    let t_before = orrery.sim.t;

    orrery.sim.request_interrupt();
    orrery.step();

    // Kicks returned early: velocities are untouched, positions advanced
    // linearly by the full drift span.
    let vel_after: Vec<Vec3> = orrery.sim.bodies.iter().map(|b| b.vel).collect();
    assert_eq!(vel_after, vel_before);
    for (i, b) in orrery.sim.bodies.iter().enumerate() {
        let expected = pos_before[i] + vel_before[i] * dt;
        for k in 0..3 {
            assert!(
                (b.pos[k] - expected[k]).abs() < 1e-12,
                "body {i} did not drift linearly under interrupt"
            );
        }
    }
    assert_relative_eq!(orrery.sim.t, t_before + dt, epsilon = 1e-15);

    // Recovery: clear the flag, synchronize, and keep stepping.
    orrery.sim.clear_interrupt();
    orrery.synchronize();
    assert!(orrery.integrator.is_synchronized());
    orrery.step();
    assert_all_finite(&orrery.sim);
    let vel_final: Vec<Vec3> = orrery.sim.bodies.iter().map(|b| b.vel).collect();
    assert_ne!(vel_final, vel_before, "kicks should resume after recovery");
}

#[test]
fn passive_probe_does_not_perturb_active_bodies() {
    let dt = TWO_PI / 300.0;

    let mut with_probe = kepler_sim(1.0, 1e-3, 1.0, 0.0, dt);
    with_probe
        .add(Body::test_particle(
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, (1.0f64 / 2.0).sqrt(), 0.0),
        ))
        .unwrap();
    with_probe.set_n_active(2).unwrap();
    let mut a = Orrery::new(with_probe);

    let without_probe = kepler_sim(1.0, 1e-3, 1.0, 0.0, dt);
    let mut b = Orrery::new(without_probe);

    a.integrate(500);
    b.integrate(500);

    // The probe must leave the active bodies bit-for-bit untouched.
    for i in 0..2 {
        assert_eq!(a.sim.bodies[i].pos, b.sim.bodies[i].pos, "body {i} position");
        assert_eq!(a.sim.bodies[i].vel, b.sim.bodies[i].vel, "body {i} velocity");
    }

    // And itself stay on a sensible orbit around the star.
    let r = (a.sim.bodies[2].pos - a.sim.bodies[0].pos).norm();
    assert!(
        (1.8..2.2).contains(&r),
        "probe wandered off its orbit: r = {r}"
    );
}

#[test]
fn interacting_test_particles_conserve_momentum() {
    let dt = TWO_PI / 200.0;

    let build = |kind: TestParticleKind| {
        let mut sim = kepler_sim(1.0, 1e-3, 1.0, 0.0, dt);
        sim.add(Body::new(
            1e-4,
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, (1.0f64 / 2.0).sqrt(), 0.0),
        ))
        .unwrap();
        sim.set_n_active(2).unwrap();
        sim.testparticle_kind = kind;
        Orrery::new(sim)
    };

    let mut symmetric = build(TestParticleKind::Interacting);
    let p0 = total_momentum(&symmetric.sim);
    symmetric.integrate(100);
    let dp = (total_momentum(&symmetric.sim) - p0).norm();
    assert!(dp < 1e-12, "momentum drift with back-reaction: {dp:e}");

    // Without back-reaction the massive passive body soaks up momentum
    // that is never returned to the active pair.
    let mut one_sided = build(TestParticleKind::Passive);
    let p0 = total_momentum(&one_sided.sim);
    one_sided.integrate(100);
    let dp = (total_momentum(&one_sided.sim) - p0).norm();
    assert!(dp > 1e-7, "expected visible momentum drift, got {dp:e}");
}

#[test]
fn momentum_is_conserved_in_a_randomized_system() {
    let mut rng = StdRng::seed_from_u64(42);
    let dt = TWO_PI / 200.0;
    let mut sim = Simulation::new();
    sim.dt = dt;
    sim.add(Body::new(1.0, Vec3::zeros(), Vec3::zeros())).unwrap();
    for _ in 0..5 {
        let r = rng.gen_range(0.8..1.5);
        let phi = rng.gen_range(0.0..TWO_PI);
        let v = (1.0f64 / r).sqrt() * rng.gen_range(0.95..1.05);
        sim.add(Body::new(
            rng.gen_range(1e-4..1e-3),
            Vec3::new(r * phi.cos(), r * phi.sin(), rng.gen_range(-0.01..0.01)),
            Vec3::new(-v * phi.sin(), v * phi.cos(), 0.0),
        ))
        .unwrap();
    }

    let mut orrery = Orrery::new(sim);
    let p0 = total_momentum(&orrery.sim);
    orrery.integrate(200);
    assert_all_finite(&orrery.sim);
    let dp = (total_momentum(&orrery.sim) - p0).norm();
    assert!(dp < 1e-11, "momentum drift {dp:e}");
}

#[test]
fn every_scheme_steps_a_two_body_orbit() {
    let dt = TWO_PI / 2000.0;
    for scheme in Scheme::ALL {
        let sim = kepler_sim(1.0, 1e-3, 1.0, 0.0, dt);
        let mut orrery = Orrery::new(sim);
        orrery.integrator.whsplitting = false;
        orrery.integrator.scheme_outer = scheme;

        let e0 = total_energy(&orrery.sim);
        let p0 = total_momentum(&orrery.sim);
        orrery.integrate(200);

        assert_all_finite(&orrery.sim);
        let drift = ((total_energy(&orrery.sim) - e0) / e0).abs();
        assert!(drift < 1e-3, "{scheme:?}: energy drift {drift:e}");
        let dp = (total_momentum(&orrery.sim) - p0).norm();
        assert!(dp < 1e-10, "{scheme:?}: momentum drift {dp:e}");
    }
}

#[test]
fn growing_the_system_reallocates_shell_buffers() {
    let dt = TWO_PI / 100.0;
    let sim = kepler_sim(1.0, 1e-3, 1.0, 0.0, dt);
    let mut orrery = Orrery::new(sim);
    orrery.integrate(10);

    orrery
        .sim
        .add(Body::test_particle(
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
        ))
        .unwrap();
    orrery.integrate(10);

    assert_all_finite(&orrery.sim);
    assert_eq!(orrery.integrator.dcrit(0).len(), 3);
    assert_eq!(orrery.integrator.shell_bodies(0).len(), 3);
}

#[test]
fn dcrit_recalculation_forces_synchronization() {
    let dt = TWO_PI / 100.0;
    let sim = kepler_sim(1.0, 1e-3, 1.0, 0.1, dt);
    let mut orrery = Orrery::new(sim);
    orrery.integrator.whsplitting = false;
    orrery.integrator.scheme_outer = Scheme::Plf764;
    orrery.integrator.safe_mode = false;

    orrery.integrate(3);
    assert!(!orrery.integrator.is_synchronized());

    orrery.integrator.recalculate_dcrit = true;
    orrery.integrator.part1(&mut orrery.sim);
    assert!(
        orrery.integrator.is_synchronized(),
        "part1 must synchronize before rebuilding critical radii"
    );

    orrery.integrate(3);
    assert_all_finite(&orrery.sim);
}

#[test]
fn reset_restores_defaults() {
    let dt = TWO_PI / 100.0;
    let sim = kepler_sim(1.0, 1e-3, 1.0, 0.0, dt);
    let mut orrery = Orrery::new(sim);
    orrery.integrator.scheme_outer = Scheme::Lf8;
    orrery.integrator.n = 4;
    orrery.integrator.safe_mode = false;
    orrery.integrator.max_shells = 3;
    orrery.integrate(5);

    orrery.integrator.reset();

    assert_eq!(orrery.integrator.scheme_outer, Scheme::Leapfrog);
    assert_eq!(orrery.integrator.scheme_inner, Scheme::Leapfrog);
    assert_eq!(orrery.integrator.n, 10);
    assert!(orrery.integrator.whsplitting);
    assert!(orrery.integrator.safe_mode);
    assert_relative_eq!(orrery.integrator.dt_frac, 0.1);
    assert_eq!(orrery.integrator.max_shells, 10);
    assert_eq!(orrery.integrator.max_shell_used(), 1);
    assert!(orrery.integrator.is_synchronized());

    // And the integrator still works from a cold start.
    orrery.integrate(5);
    assert_all_finite(&orrery.sim);
}
