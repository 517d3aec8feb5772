//! Kalman filter demo: single ball throw
//!
//! Simulates a 70-step projectile flight with noisy, intermittently missing
//! position measurements, runs the Kalman filter over it, and prints the
//! (truth, observation, estimate) table for plotting.

use balltrack::{
    run_kalman_tracker, KalmanFilter, Launch, SimpleRng, SimulatorConfig, TrajectorySimulator,
};
use nalgebra::{DMatrix, DVector, Vector2};

fn main() {
    println!("=== Kalman Filter Ball Tracking Demo ===\n");

    let dt = 0.1;
    let num_steps = 70;
    let launch_speed = 50.0; // m/s
    let launch_angle = 45.0; // degrees
    let measurement_noise = 7.0;
    let dropout_rate = 0.1;

    println!("  dt: {} s, steps: {}", dt, num_steps);
    println!("  launch: {} m/s at {} deg", launch_speed, launch_angle);
    println!(
        "  measurement noise: {}, dropout: {}\n",
        measurement_noise, dropout_rate
    );

    let config = SimulatorConfig::new(
        dt,
        9.81,
        measurement_noise,
        dropout_rate,
        vec![Launch::new(Vector2::new(0.0, 0.0), launch_speed, launch_angle)],
    )
    .expect("valid simulator configuration");
    let mut simulator = TrajectorySimulator::new(config);

    let launch = simulator.states()[0];
    let mut filter = KalmanFilter::new(
        dt,
        DMatrix::identity(2, 2) * measurement_noise,
        DMatrix::identity(4, 4),
        DMatrix::identity(4, 4),
        DVector::from_vec(vec![
            launch.position.x,
            launch.position.y,
            launch.velocity.x,
            launch.velocity.y,
        ]),
    )
    .expect("valid filter configuration");

    let mut rng = SimpleRng::new(42);
    let records = run_kalman_tracker(&mut rng, &mut simulator, &mut filter, num_steps)
        .expect("tracker run failed");

    println!("step |   true x    true y | observed x observed y | estimated x estimated y");
    for record in &records {
        let truth = record.truth[0];
        let estimate = record.estimate[0];
        let observed = match &record.observation {
            Some(z) => format!("{:10.3} {:10.3}", z[0].x, z[0].y),
            None => "      ----       ----".to_string(),
        };
        println!(
            "{:>4} | {:9.3} {:9.3} | {} | {:11.3} {:11.3}",
            record.step, truth.position.x, truth.position.y, observed, estimate.position.x,
            estimate.position.y
        );
    }

    let last = records.last().unwrap();
    let error = (last.estimate[0].position - last.truth[0].position).norm();
    let dropped = records.iter().filter(|r| r.observation.is_none()).count();
    println!("\n  dropped observations: {}/{}", dropped, num_steps);
    println!("  final position error: {:.3} m", error);
}
