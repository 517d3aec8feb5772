//! Particle filter demo: two simultaneous ball throws
//!
//! Tracks two projectiles at once with a 70-particle filter over 100 steps
//! of noisy observations, then prints per-ball tracking error statistics.

use balltrack::{
    run_particle_tracker, Launch, ParticleConfig, ParticleFilter, SimpleRng, SimulatorConfig,
    TrajectorySimulator,
};
use nalgebra::Vector2;

fn main() {
    println!("=== Particle Filter Two-Ball Tracking Demo ===\n");

    let dt = 0.1;
    let gravity = 9.8;
    let num_steps = 100;
    let num_particles = 70;
    let noise_level = 10.0;

    println!("  dt: {} s, steps: {}", dt, num_steps);
    println!("  particles: {}, noise sigma: {}\n", num_particles, noise_level);

    let config = SimulatorConfig::new(
        dt,
        gravity,
        noise_level,
        0.0,
        vec![
            Launch::with_velocity(Vector2::new(0.0, 0.0), Vector2::new(50.0, 45.0)),
            Launch::with_velocity(Vector2::new(0.0, 50.0), Vector2::new(50.0, 45.0)),
        ],
    )
    .expect("valid simulator configuration");
    let mut simulator = TrajectorySimulator::new(config);

    let initial = simulator.states().to_vec();
    let mut filter = ParticleFilter::new(
        &initial,
        ParticleConfig::new(num_particles, noise_level, dt, gravity)
            .expect("valid particle configuration"),
    )
    .expect("valid initial state");

    let mut rng = SimpleRng::new(42);
    let records = run_particle_tracker(&mut rng, &mut simulator, &mut filter, num_steps)
        .expect("tracker run failed");

    for ball in 0..2 {
        let errors: Vec<f64> = records
            .iter()
            .map(|r| (r.estimate[ball].position - r.truth[ball].position).norm())
            .collect();
        let mean = errors.iter().sum::<f64>() / errors.len() as f64;
        let max = errors.iter().fold(0.0_f64, |acc, &e| acc.max(e));
        println!("ball {}: mean position error {:.3} m, max {:.3} m", ball + 1, mean, max);
    }

    let last = records.last().unwrap();
    println!("\nfinal step {}:", last.step);
    for (ball, (truth, estimate)) in last.truth.iter().zip(&last.estimate).enumerate() {
        println!(
            "  ball {}: true ({:.2}, {:.2}) estimated ({:.2}, {:.2})",
            ball + 1,
            truth.position.x,
            truth.position.y,
            estimate.position.x,
            estimate.position.y
        );
    }
}
