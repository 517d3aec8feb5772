//! Ground truth and measurement generation
//!
//! Simulates projectile trajectories under constant gravitational
//! deceleration and derives noisy, intermittently missing observations
//! for benchmarking the estimators.

use nalgebra::Vector2;
use serde::Serialize;

use crate::common::rng::Rng;
use crate::config::SimulatorConfig;

/// Full kinematic state of one projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileState {
    /// Position in 2D
    pub position: Vector2<f64>,
    /// Velocity in 2D
    pub velocity: Vector2<f64>,
}

impl ProjectileState {
    /// Create a state from position and velocity
    pub fn new(position: Vector2<f64>, velocity: Vector2<f64>) -> Self {
        Self { position, velocity }
    }

    /// Advance one Euler step under constant gravity
    ///
    /// `x += vx*dt`, `y += vy*dt - g*dt^2/2`, `vy -= g*dt`. The same step is
    /// used by the simulator and by particle prediction, so a noise-free run
    /// keeps both in lockstep.
    pub fn step(&mut self, dt: f64, gravity: f64) {
        self.position.x += self.velocity.x * dt;
        self.position.y += self.velocity.y * dt - 0.5 * gravity * dt * dt;
        self.velocity.y -= gravity * dt;
    }
}

/// A per-step observation: one noisy position per projectile, or absent
///
/// `None` marks a dropout step and is distinguishable from a valid (0, 0)
/// reading.
pub type Observation = Option<Vec<Vector2<f64>>>;

/// Deterministic-physics generator of true projectile state plus a
/// noisy/lossy measurement stream
///
/// The simulator owns its state exclusively; there is no shared mutable
/// position/velocity outside this struct.
#[derive(Debug, Clone)]
pub struct TrajectorySimulator {
    config: SimulatorConfig,
    states: Vec<ProjectileState>,
}

impl TrajectorySimulator {
    /// Create a simulator from a validated configuration
    pub fn new(config: SimulatorConfig) -> Self {
        let states = config
            .launches
            .iter()
            .map(|l| ProjectileState::new(l.position, l.velocity))
            .collect();
        Self { config, states }
    }

    /// Number of simulated projectiles
    #[inline]
    pub fn num_objects(&self) -> usize {
        self.states.len()
    }

    /// Gravitational constant in use
    #[inline]
    pub fn gravity(&self) -> f64 {
        self.config.gravity
    }

    /// Time step in use
    #[inline]
    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    /// Current true states
    #[inline]
    pub fn states(&self) -> &[ProjectileState] {
        &self.states
    }

    /// Integrate every projectile one Euler step and return the new truth
    ///
    /// There is no guard against y < 0; a run lasts a fixed step count
    /// regardless of "landing".
    pub fn advance(&mut self) -> Vec<ProjectileState> {
        let (dt, g) = (self.config.dt, self.config.gravity);
        for state in &mut self.states {
            state.step(dt, g);
        }
        self.states.clone()
    }

    /// Derive a noisy observation of the given truth, or a dropout
    ///
    /// With probability `dropout_probability` the whole step is absent.
    /// Otherwise each axis of each projectile is perturbed independently by
    /// `U(-noise/2, +noise/2)`, drawn fresh per call.
    pub fn observe(&self, rng: &mut impl Rng, truth: &[ProjectileState]) -> Observation {
        if rng.rand() < self.config.dropout_probability {
            return None;
        }

        let noise = self.config.measurement_noise;
        Some(
            truth
                .iter()
                .map(|state| {
                    Vector2::new(
                        state.position.x + noise * (rng.rand() - 0.5),
                        state.position.y + noise * (rng.rand() - 0.5),
                    )
                })
                .collect(),
        )
    }
}
