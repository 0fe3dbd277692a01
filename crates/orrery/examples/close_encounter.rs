//! Close-encounter demonstration.
//!
//! A tight planet pair orbits a star with a separation far below its
//! critical radii. The shell integrator hands the pair interaction down to
//! nested inner shells; the run prints the deepest shell used and the
//! energy drift across the interaction.

use orrery::{total_energy, Body, Orrery, Simulation, Vec3, TWO_PI};

fn main() {
    println!("=== Close planet pair around a star ===\n");

    let mut sim = Simulation::new();
    sim.dt = TWO_PI / 100.0;
    let m = 1e-4;
    let d_bin = 1e-3;
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
    orrery.integrator.max_shells = 5;
    orrery.integrator.n = 10;

    let e0 = total_energy(&orrery.sim);
    println!("initial energy: {e0:.12}");

    for _ in 0..10 {
        orrery.integrate(100);
        let sep = (orrery.sim.bodies[2].pos - orrery.sim.bodies[1].pos).norm();
        println!(
            "t = {:>7.3}: pair separation = {:.6}, deepest shell used = {}, dE/E = {:+.3e}",
            orrery.sim.t,
            sep,
            orrery.integrator.max_shell_used(),
            (total_energy(&orrery.sim) - e0) / e0,
        );
    }
}
