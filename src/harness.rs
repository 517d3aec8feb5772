//! Estimation harness
//!
//! Drives a fixed number of discrete steps, wiring
//! simulator -> estimator -> record. Each step pulls one ground-truth
//! state, derives a possibly-missing observation, feeds the active
//! estimator, and records the (truth, observation, estimate) triple.
//!
//! The harness never retries: every failure is returned with its step
//! index, and recovery decisions (skip, abort, re-seed) belong to the
//! caller.

use nalgebra::Vector2;
use serde::Serialize;

use crate::common::rng::Rng;
use crate::errors::{FilterError, StepError};
use crate::kalman::KalmanFilter;
use crate::particle::ParticleFilter;
use crate::simulator::{Observation, ProjectileState, TrajectorySimulator};

/// One recorded step: truth, observation (or dropout) and estimate
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Zero-based step index
    pub step: usize,
    /// True state per projectile
    pub truth: Vec<ProjectileState>,
    /// Noisy position per projectile, or `None` on a dropout step
    pub observation: Option<Vec<Vector2<f64>>>,
    /// Estimated state per projectile
    pub estimate: Vec<ProjectileState>,
}

/// Run the Kalman filter against the simulator for a fixed step count
///
/// Per step: advance the simulator, derive an observation, predict
/// open-loop under gravity, and correct only when the observation is
/// present. The Kalman filter tracks a single projectile; a multi-object
/// simulator is a contract violation reported before the first step.
pub fn run_kalman_tracker(
    rng: &mut impl Rng,
    simulator: &mut TrajectorySimulator,
    filter: &mut KalmanFilter,
    num_steps: usize,
) -> Result<Vec<StepRecord>, StepError> {
    if simulator.num_objects() != 1 {
        return Err(StepError::at(
            0,
            FilterError::DimensionMismatch {
                expected: 1,
                actual: simulator.num_objects(),
                context: "Kalman tracker object count".to_string(),
            },
        ));
    }

    let control = Vector2::new(0.0, -simulator.gravity());
    let mut records = Vec::with_capacity(num_steps);

    for step in 0..num_steps {
        let truth = simulator.advance();
        let observation = simulator.observe(rng, &truth);

        // Open-loop propagation runs every step, measurement or not
        filter.predict(control);
        if let Some(z) = observation.as_ref() {
            filter
                .update(&z[0])
                .map_err(|e| StepError::at(step, e))?;
        } else {
            log::debug!("step {}: dropout, prediction only", step);
        }

        records.push(StepRecord {
            step,
            truth,
            observation,
            estimate: vec![filter.estimate()],
        });
    }

    log::info!("Kalman tracker finished: {} steps recorded", records.len());
    Ok(records)
}

/// Run the particle filter against the simulator for a fixed step count
///
/// Per step: advance the simulator, derive an observation, predict every
/// particle, then weight, normalize and resample only when the observation
/// is present. On dropout steps the predicted particles keep their prior
/// weights.
pub fn run_particle_tracker(
    rng: &mut impl Rng,
    simulator: &mut TrajectorySimulator,
    filter: &mut ParticleFilter,
    num_steps: usize,
) -> Result<Vec<StepRecord>, StepError> {
    if simulator.num_objects() != filter.num_objects() {
        return Err(StepError::at(
            0,
            FilterError::DimensionMismatch {
                expected: filter.num_objects(),
                actual: simulator.num_objects(),
                context: "particle tracker object count".to_string(),
            },
        ));
    }

    let mut records = Vec::with_capacity(num_steps);

    for step in 0..num_steps {
        let truth = simulator.advance();
        let observation = simulator.observe(rng, &truth);

        filter.predict();
        if let Some(z) = observation.as_ref() {
            filter.weight(z).map_err(|e| StepError::at(step, e))?;
            filter.normalize().map_err(|e| StepError::at(step, e))?;
            filter.resample(rng);
        } else {
            log::debug!("step {}: dropout, particles keep prior weights", step);
        }

        records.push(StepRecord {
            step,
            truth,
            observation,
            estimate: filter.estimate(),
        });
    }

    log::info!(
        "particle tracker finished: {} steps, {} particles",
        records.len(),
        filter.num_particles()
    );
    Ok(records)
}

/// Derive per-step observations from a pre-recorded run, for callers that
/// replay a measurement stream instead of simulating one
pub fn observations_of(records: &[StepRecord]) -> Vec<Observation> {
    records.iter().map(|r| r.observation.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::rng::SimpleRng;
    use crate::config::{Launch, ParticleConfig, SimulatorConfig};
    use nalgebra::{DMatrix, DVector};

    fn single_ball_sim(noise: f64, dropout: f64) -> TrajectorySimulator {
        TrajectorySimulator::new(
            SimulatorConfig::new(
                0.1,
                9.81,
                noise,
                dropout,
                vec![Launch::new(Vector2::new(0.0, 0.0), 50.0, 45.0)],
            )
            .unwrap(),
        )
    }

    fn kalman_for(sim: &TrajectorySimulator) -> KalmanFilter {
        let launch = &sim.states()[0];
        KalmanFilter::new(
            sim.dt(),
            DMatrix::identity(2, 2) * 7.0,
            DMatrix::identity(4, 4),
            DMatrix::identity(4, 4),
            DVector::from_vec(vec![
                launch.position.x,
                launch.position.y,
                launch.velocity.x,
                launch.velocity.y,
            ]),
        )
        .unwrap()
    }

    #[test]
    fn test_kalman_run_records_every_step() {
        let mut sim = single_ball_sim(7.0, 0.1);
        let mut kf = kalman_for(&sim);
        let mut rng = SimpleRng::new(42);

        let records = run_kalman_tracker(&mut rng, &mut sim, &mut kf, 70).unwrap();
        assert_eq!(records.len(), 70);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.step, i);
            assert_eq!(record.truth.len(), 1);
            assert_eq!(record.estimate.len(), 1);
        }
    }

    #[test]
    fn test_kalman_rejects_multi_object_simulator() {
        let mut sim = TrajectorySimulator::new(
            SimulatorConfig::new(
                0.1,
                9.81,
                7.0,
                0.0,
                vec![
                    Launch::new(Vector2::new(0.0, 0.0), 50.0, 45.0),
                    Launch::new(Vector2::new(0.0, 50.0), 50.0, 45.0),
                ],
            )
            .unwrap(),
        );
        let mut kf = kalman_for(&single_ball_sim(7.0, 0.0));
        let mut rng = SimpleRng::new(42);

        let err = run_kalman_tracker(&mut rng, &mut sim, &mut kf, 10).unwrap_err();
        assert!(matches!(err.source, FilterError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_particle_run_records_every_step() {
        let mut sim = single_ball_sim(10.0, 0.0);
        let initial = sim.states().to_vec();
        let mut pf =
            ParticleFilter::new(&initial, ParticleConfig::new(70, 10.0, 0.1, 9.81).unwrap())
                .unwrap();
        let mut rng = SimpleRng::new(42);

        let records = run_particle_tracker(&mut rng, &mut sim, &mut pf, 50).unwrap();
        assert_eq!(records.len(), 50);
        assert_eq!(pf.num_particles(), 70);
    }

    #[test]
    fn test_particle_failure_carries_step_index() {
        let mut sim = single_ball_sim(0.0, 0.0);
        // Particles seeded absurdly far from the truth: every weight
        // underflows to zero and normalize() fails on the first step.
        let mut pf = ParticleFilter::new(
            &[ProjectileState::new(
                Vector2::new(1e9, 1e9),
                Vector2::new(0.0, 0.0),
            )],
            ParticleConfig::new(10, 1.0, 0.1, 9.81).unwrap(),
        )
        .unwrap();
        let mut rng = SimpleRng::new(42);

        let err = run_particle_tracker(&mut rng, &mut sim, &mut pf, 10).unwrap_err();
        assert_eq!(err.step, 0);
        assert!(matches!(err.source, FilterError::DegenerateWeights { .. }));
    }

    #[test]
    fn test_observations_of_preserves_dropouts() {
        let mut sim = single_ball_sim(7.0, 1.0);
        let mut kf = kalman_for(&sim);
        let mut rng = SimpleRng::new(42);

        let records = run_kalman_tracker(&mut rng, &mut sim, &mut kf, 20).unwrap();
        let observations = observations_of(&records);
        assert_eq!(observations.len(), 20);
        assert!(observations.iter().all(|o| o.is_none()));
    }
}
