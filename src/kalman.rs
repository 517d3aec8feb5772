//! Linear-Gaussian Kalman filter over a constant-velocity motion model
//!
//! Maintains a Gaussian belief `(x, P)` over a single projectile's
//! `[x, y, vx, vy]` state. Prediction propagates the belief open-loop and
//! can run every step; the measurement update is only applied when an
//! observation is present.

use nalgebra::{DMatrix, DVector, Vector2};

use crate::common::linalg::symmetrize;
use crate::config::{MotionModel, ObservationModel};
use crate::errors::FilterError;
use crate::simulator::ProjectileState;

/// Recursive linear-Gaussian estimator
///
/// The filter owns its state and covariance exclusively. Output is a pure
/// function of the accumulated predict/update sequence and the fixed
/// matrices; there is no internal randomness.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion: MotionModel,
    sensor: ObservationModel,
    /// Measurement noise covariance (R), 2x2
    r: DMatrix<f64>,
    /// Process noise covariance (Q), 4x4
    q: DMatrix<f64>,
    /// State estimate [x, y, vx, vy]
    x: DVector<f64>,
    /// Estimate covariance (P), kept symmetric
    p: DMatrix<f64>,
}

impl KalmanFilter {
    /// Build a filter from the time step, noise covariances, initial
    /// covariance and initial state
    ///
    /// The transition, control and observation matrices are derived from
    /// `dt` and fixed for the filter's lifetime. Dimension mismatches are
    /// fatal at construction.
    pub fn new(
        dt: f64,
        r: DMatrix<f64>,
        q: DMatrix<f64>,
        p0: DMatrix<f64>,
        x0: DVector<f64>,
    ) -> Result<Self, FilterError> {
        let motion = MotionModel::constant_velocity_2d(dt)?;
        let sensor = ObservationModel::position_2d();

        let x_dim = motion.x_dim();
        let z_dim = sensor.z_dim();

        check_square(&r, z_dim, "measurement noise covariance R")?;
        check_square(&q, x_dim, "process noise covariance Q")?;
        check_square(&p0, x_dim, "initial covariance P")?;
        if x0.len() != x_dim {
            return Err(FilterError::DimensionMismatch {
                expected: x_dim,
                actual: x0.len(),
                context: "initial state".to_string(),
            });
        }

        Ok(Self {
            motion,
            sensor,
            r,
            q,
            x: x0,
            p: symmetrize(&p0),
        })
    }

    /// Current state estimate
    #[inline]
    pub fn state(&self) -> &DVector<f64> {
        &self.x
    }

    /// Current estimate covariance
    #[inline]
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.p
    }

    /// Current state as a projectile value
    pub fn estimate(&self) -> ProjectileState {
        ProjectileState::new(
            Vector2::new(self.x[0], self.x[1]),
            Vector2::new(self.x[2], self.x[3]),
        )
    }

    /// Propagate the belief one step under the control input `u`
    ///
    /// `x <- F*x + B*u`, `P <- F*P*F' + Q`. Callable every step regardless
    /// of measurement availability; returns the new state for convenience.
    pub fn predict(&mut self, u: Vector2<f64>) -> &DVector<f64> {
        let u = DVector::from_column_slice(&[u.x, u.y]);

        self.x = &self.motion.transition * &self.x + &self.motion.control * u;
        self.p = symmetrize(
            &(&self.motion.transition * &self.p * self.motion.transition.transpose() + &self.q),
        );

        &self.x
    }

    /// Correct the belief with a position measurement
    ///
    /// Residual `y = z - H*x`, innovation covariance `S = H*P*H' + R`,
    /// gain `K = P*H'*S^-1`, then `x <- x + K*y`, `P <- (I - K*H)*P`.
    /// A singular `S` is reported, never coerced; the caller must not call
    /// this with degenerate `R`/`P`.
    pub fn update(&mut self, z: &Vector2<f64>) -> Result<&DVector<f64>, FilterError> {
        let h = &self.sensor.observation;
        let z = DVector::from_column_slice(&[z.x, z.y]);

        // Measurement residual
        let y = &z - h * &self.x;

        // Innovation covariance
        let s = h * &self.p * h.transpose() + &self.r;
        let s_inv = s.try_inverse().ok_or_else(|| FilterError::SingularMatrix {
            context: "innovation covariance".to_string(),
        })?;

        // Kalman gain
        let k = &self.p * h.transpose() * s_inv;

        // Update state estimate and error covariance
        self.x += &k * y;
        let i = DMatrix::identity(self.x.len(), self.x.len());
        self.p = symmetrize(&((i - &k * h) * &self.p));

        Ok(&self.x)
    }
}

fn check_square(m: &DMatrix<f64>, dim: usize, context: &str) -> Result<(), FilterError> {
    if m.nrows() != dim {
        return Err(FilterError::DimensionMismatch {
            expected: dim,
            actual: m.nrows(),
            context: format!("{} rows", context),
        });
    }
    if m.ncols() != dim {
        return Err(FilterError::DimensionMismatch {
            expected: dim,
            actual: m.ncols(),
            context: format!("{} columns", context),
        });
    }
    Ok(())
}
