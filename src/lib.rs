/*!
# Balltrack - Projectile state estimation library

Recursive 2D position/velocity tracking of projectiles from noisy,
intermittently missing observations, with two alternative estimators that
can be benchmarked against identical simulated ground truth.

## Features

- Linear-Gaussian Kalman filter over a constant-velocity-with-known-
  acceleration motion model
- Multi-object particle filter with importance weighting and
  cumulative-sum resampling
- Deterministic trajectory simulator producing ground truth and a
  noisy/lossy measurement stream
- A harness driving simulate -> observe -> predict -> correct -> record

## Modules

- [`simulator`] - Ground truth and measurement generation
- [`kalman`] - Linear-Gaussian recursive estimator
- [`particle`] - Weighted-particle recursive estimator
- [`harness`] - Step loop and run records
- [`config`] - Constructor-time configuration types
- [`common`] - Low-level utilities (linear algebra guards, RNG)

## Example

```rust,no_run
use balltrack::{
    run_kalman_tracker, KalmanFilter, Launch, SimpleRng, SimulatorConfig,
    TrajectorySimulator,
};
use nalgebra::{DMatrix, DVector, Vector2};

let config = SimulatorConfig::new(
    0.1,                       // dt
    9.81,                      // gravity
    7.0,                       // measurement noise
    0.1,                       // dropout probability
    vec![Launch::new(Vector2::new(0.0, 0.0), 50.0, 45.0)],
)
.unwrap();
let mut simulator = TrajectorySimulator::new(config);

let launch = simulator.states()[0];
let mut filter = KalmanFilter::new(
    0.1,
    DMatrix::identity(2, 2) * 7.0,  // R
    DMatrix::identity(4, 4),        // Q
    DMatrix::identity(4, 4),        // P0
    DVector::from_vec(vec![
        launch.position.x,
        launch.position.y,
        launch.velocity.x,
        launch.velocity.y,
    ]),
)
.unwrap();

let mut rng = SimpleRng::new(42);
let records = run_kalman_tracker(&mut rng, &mut simulator, &mut filter, 70).unwrap();
for record in &records {
    println!("{}: {:?}", record.step, record.estimate[0].position);
}
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Ground truth and measurement generation
pub mod simulator;

/// Linear-Gaussian Kalman filter
pub mod kalman;

/// Sampling-based particle filter
pub mod particle;

/// Step loop wiring simulator -> estimator -> record
pub mod harness;

/// Constructor-time configuration types
pub mod config;

/// Error types
pub mod errors;

/// Low-level utilities (linear algebra guards, RNG)
pub mod common;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use config::{Launch, MotionModel, ObservationModel, ParticleConfig, SimulatorConfig};
pub use simulator::{Observation, ProjectileState, TrajectorySimulator};

// Estimators
pub use kalman::KalmanFilter;
pub use particle::{Particle, ParticleFilter};

// Harness
pub use harness::{observations_of, run_kalman_tracker, run_particle_tracker, StepRecord};

// Errors
pub use errors::{FilterError, StepError};

// RNG
pub use common::rng::{RandRng, Rng, SimpleRng};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
