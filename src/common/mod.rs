//! Common utilities shared by the estimators.
//!
//! This module contains linear algebra guards and the deterministic RNG
//! used by the simulator and the particle filter.

pub mod linalg;
pub mod rng;
