//! Two-body Kepler orbit demonstration.
//!
//! Integrates a star-planet system for a few hundred orbits with the default
//! leapfrog/WH-splitting configuration and prints the long-term energy and
//! orbital-element behavior expected from a symplectic method.

use orrery::{orbital_elements, total_energy, Body, Orrery, Simulation, Vec3, TWO_PI};

fn main() {
    println!("=== Kepler two-body orbit ===\n");

    let m_star = 1.0;
    let m_planet = 1e-3;
    let a = 1.0;
    let e = 0.2;

    let mut sim = Simulation::new();
    sim.dt = TWO_PI / 500.0;
    let mu = sim.g * (m_star + m_planet);
    let r_peri = a * (1.0 - e);
    let v_peri = (mu * (1.0 + e) / r_peri).sqrt();
    sim.add(Body::new(m_star, Vec3::zeros(), Vec3::zeros())).unwrap();
    sim.add(Body::new(
        m_planet,
        Vec3::new(r_peri, 0.0, 0.0),
        Vec3::new(0.0, v_peri, 0.0),
    ))
    .unwrap();

    let mut orrery = Orrery::new(sim);

    println!("Initial conditions:");
    println!("  a = {a}, e = {e}, dt = T/500");
    let e0 = total_energy(&orrery.sim);
    println!("  total energy: {e0:.12}\n");

    let steps_per_orbit = 500;
    for orbit in 1..=200 {
        orrery.integrate(steps_per_orbit);
        if orbit % 40 == 0 {
            let el = orbital_elements(
                orrery.sim.bodies[1].pos - orrery.sim.bodies[0].pos,
                orrery.sim.bodies[1].vel - orrery.sim.bodies[0].vel,
                mu,
            );
            let de = (total_energy(&orrery.sim) - e0) / e0;
            println!(
                "Orbit {orbit:>4}: a = {:.10}, e = {:.10}, dE/E = {:+.3e}",
                el.a, el.e, de
            );
        }
    }

    println!("\nDeepest shell used: {}", orrery.integrator.max_shell_used());
}
