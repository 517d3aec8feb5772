//! Configuration types for the simulator and the estimators
//!
//! All configuration is fixed at construction time and read-only for the
//! lifetime of the component that consumes it.

use nalgebra::{DMatrix, Vector2};
use serde::Serialize;

use crate::errors::FilterError;

/// Motion model for the constant-velocity-with-known-acceleration kinematics
///
/// State ordering is `[x, y, vx, vy]`.
#[derive(Debug, Clone)]
pub struct MotionModel {
    /// State transition matrix (F), 4x4
    pub transition: DMatrix<f64>,
    /// Control matrix (B), 4x2, maps a 2D acceleration input
    pub control: DMatrix<f64>,
    /// Time step
    pub dt: f64,
}

impl MotionModel {
    /// Create a constant velocity motion model in 2D
    ///
    /// Position rows advance by velocity times `dt`; velocity rows pass
    /// through unchanged. `B` maps acceleration via `dt^2/2` / `dt` terms.
    pub fn constant_velocity_2d(dt: f64) -> Result<Self, FilterError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(FilterError::Configuration {
                description: format!("time step must be positive, got {}", dt),
            });
        }

        #[rustfmt::skip]
        let f = DMatrix::from_row_slice(4, 4, &[
            1.0, 0.0, dt,  0.0,   // x'  = x + dt*vx
            0.0, 1.0, 0.0, dt,    // y'  = y + dt*vy
            0.0, 0.0, 1.0, 0.0,   // vx' = vx
            0.0, 0.0, 0.0, 1.0,   // vy' = vy
        ]);

        let half_dt2 = 0.5 * dt * dt;
        #[rustfmt::skip]
        let b = DMatrix::from_row_slice(4, 2, &[
            half_dt2, 0.0,
            0.0,      half_dt2,
            dt,       0.0,
            0.0,      dt,
        ]);

        Ok(Self {
            transition: f,
            control: b,
            dt,
        })
    }

    /// State dimension
    #[inline]
    pub fn x_dim(&self) -> usize {
        self.transition.nrows()
    }

    /// Control input dimension
    #[inline]
    pub fn u_dim(&self) -> usize {
        self.control.ncols()
    }
}

/// Observation model mapping state to measurement space
#[derive(Debug, Clone)]
pub struct ObservationModel {
    /// Observation matrix (H), 2x4
    pub observation: DMatrix<f64>,
}

impl ObservationModel {
    /// Position-only sensor for the 4D state `[x, y, vx, vy]`
    pub fn position_2d() -> Self {
        #[rustfmt::skip]
        let h = DMatrix::from_row_slice(2, 4, &[
            1.0, 0.0, 0.0, 0.0,   // z[0] = x
            0.0, 1.0, 0.0, 0.0,   // z[1] = y
        ]);
        Self { observation: h }
    }

    /// Measurement dimension
    #[inline]
    pub fn z_dim(&self) -> usize {
        self.observation.nrows()
    }
}

/// Launch parameters for a single projectile
#[derive(Debug, Clone, Serialize)]
pub struct Launch {
    /// Initial position
    pub position: Vector2<f64>,
    /// Initial velocity
    pub velocity: Vector2<f64>,
}

impl Launch {
    /// Launch from a position with a speed and an angle in degrees
    pub fn new(position: Vector2<f64>, speed: f64, angle_deg: f64) -> Self {
        let angle = angle_deg.to_radians();
        Self {
            position,
            velocity: Vector2::new(speed * angle.cos(), speed * angle.sin()),
        }
    }

    /// Launch from a position with explicit velocity components
    pub fn with_velocity(position: Vector2<f64>, velocity: Vector2<f64>) -> Self {
        Self { position, velocity }
    }
}

/// Configuration for the trajectory simulator
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorConfig {
    /// Time step
    pub dt: f64,
    /// Gravitational constant
    pub gravity: f64,
    /// Measurement noise magnitude (each axis perturbed by U(-noise/2, noise/2))
    pub measurement_noise: f64,
    /// Probability that a step yields no observation at all
    pub dropout_probability: f64,
    /// One launch per tracked projectile
    pub launches: Vec<Launch>,
}

impl SimulatorConfig {
    /// Validate and build a simulator configuration
    pub fn new(
        dt: f64,
        gravity: f64,
        measurement_noise: f64,
        dropout_probability: f64,
        launches: Vec<Launch>,
    ) -> Result<Self, FilterError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(FilterError::Configuration {
                description: format!("time step must be positive, got {}", dt),
            });
        }
        if !measurement_noise.is_finite() || measurement_noise < 0.0 {
            return Err(FilterError::Configuration {
                description: format!(
                    "measurement noise must be non-negative, got {}",
                    measurement_noise
                ),
            });
        }
        if !(0.0..=1.0).contains(&dropout_probability) {
            return Err(FilterError::Configuration {
                description: format!(
                    "dropout probability must be in [0, 1], got {}",
                    dropout_probability
                ),
            });
        }
        if launches.is_empty() {
            return Err(FilterError::Configuration {
                description: "at least one launch is required".to_string(),
            });
        }

        Ok(Self {
            dt,
            gravity,
            measurement_noise,
            dropout_probability,
            launches,
        })
    }

    /// Number of tracked projectiles
    #[inline]
    pub fn num_objects(&self) -> usize {
        self.launches.len()
    }
}

/// Configuration for the particle filter
#[derive(Debug, Clone, Serialize)]
pub struct ParticleConfig {
    /// Number of particles, fixed for the filter's lifetime
    pub num_particles: usize,
    /// Likelihood bandwidth sigma used when weighting against observations
    pub noise_sigma: f64,
    /// Time step
    pub dt: f64,
    /// Gravitational constant
    pub gravity: f64,
}

impl ParticleConfig {
    /// Validate and build a particle filter configuration
    pub fn new(
        num_particles: usize,
        noise_sigma: f64,
        dt: f64,
        gravity: f64,
    ) -> Result<Self, FilterError> {
        if num_particles == 0 {
            return Err(FilterError::Configuration {
                description: "particle count must be at least 1".to_string(),
            });
        }
        if !noise_sigma.is_finite() || noise_sigma <= 0.0 {
            return Err(FilterError::Configuration {
                description: format!("noise sigma must be positive, got {}", noise_sigma),
            });
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(FilterError::Configuration {
                description: format!("time step must be positive, got {}", dt),
            });
        }

        Ok(Self {
            num_particles,
            noise_sigma,
            dt,
            gravity,
        })
    }
}
