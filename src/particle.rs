//! Sampling-based particle filter for one or more projectiles
//!
//! Represents the belief as a weighted population of `N` candidate states.
//! Prediction applies the same deterministic Euler step as the simulator,
//! weighting scores each particle against an observation, and resampling
//! draws a fresh generation proportional to weight to counter degeneracy.
//!
//! No process noise is injected during prediction; diversity comes entirely
//! from observation noise and resampling. Over long runs this can collapse
//! the population onto a single hypothesis (known limitation of the
//! reference behavior, kept as-is).

use nalgebra::Vector2;
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::common::rng::Rng;
use crate::config::ParticleConfig;
use crate::errors::FilterError;
use crate::simulator::ProjectileState;

/// One hypothesis: a full candidate state per tracked object, plus a weight
///
/// Particles are plain values. Resampling clones them; old and new
/// generations never share mutable state.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Candidate state for each tracked object (typically 1 or 2)
    pub objects: SmallVec<[ProjectileState; 2]>,
    /// Non-negative importance weight
    pub weight: f64,
}

/// Weighted-particle recursive estimator
#[derive(Debug, Clone)]
pub struct ParticleFilter {
    config: ParticleConfig,
    particles: Vec<Particle>,
    num_objects: usize,
}

impl ParticleFilter {
    /// Seed all `N` particles identically from the true initial state
    ///
    /// Identical seeding is a deliberate simplification; the first weighting
    /// and resampling passes introduce no diversity until observations do.
    pub fn new(initial: &[ProjectileState], config: ParticleConfig) -> Result<Self, FilterError> {
        if initial.is_empty() {
            return Err(FilterError::Configuration {
                description: "at least one tracked object is required".to_string(),
            });
        }

        let objects: SmallVec<[ProjectileState; 2]> = initial.iter().copied().collect();
        let uniform = 1.0 / config.num_particles as f64;
        let particles = vec![
            Particle {
                objects,
                weight: uniform,
            };
            config.num_particles
        ];

        Ok(Self {
            num_objects: initial.len(),
            config,
            particles,
        })
    }

    /// Number of particles, fixed for the filter's lifetime
    #[inline]
    pub fn num_particles(&self) -> usize {
        self.config.num_particles
    }

    /// Number of tracked objects
    #[inline]
    pub fn num_objects(&self) -> usize {
        self.num_objects
    }

    /// Current particle population
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Advance every particle one deterministic motion step
    ///
    /// Per-particle work is independent, so it runs in parallel; the
    /// population is only read again once the whole pass has finished.
    pub fn predict(&mut self) {
        let (dt, g) = (self.config.dt, self.config.gravity);
        self.particles.par_iter_mut().for_each(|particle| {
            for object in &mut particle.objects {
                object.step(dt, g);
            }
        });
    }

    /// Score every particle against an observation
    ///
    /// Per object, the weight factor is `exp(-error / (2*sigma^2))` with
    /// `error` the Euclidean position distance to the observed sample;
    /// factors combine multiplicatively across objects. Only call this on
    /// steps with a real measurement; on dropout steps the caller keeps the
    /// prior weights.
    pub fn weight(&mut self, observation: &[Vector2<f64>]) -> Result<(), FilterError> {
        if observation.len() != self.num_objects {
            return Err(FilterError::DimensionMismatch {
                expected: self.num_objects,
                actual: observation.len(),
                context: "observation count".to_string(),
            });
        }

        let two_sigma_sq = 2.0 * self.config.noise_sigma * self.config.noise_sigma;
        self.particles.par_iter_mut().for_each(|particle| {
            particle.weight = particle
                .objects
                .iter()
                .zip(observation)
                .map(|(object, z)| {
                    let error = (object.position - z).norm();
                    (-error / two_sigma_sq).exp()
                })
                .product();
        });

        Ok(())
    }

    /// Divide all weights by their sum
    ///
    /// A zero or non-finite sum means every particle is implausible; that is
    /// reported to the caller instead of dividing by zero.
    pub fn normalize(&mut self) -> Result<(), FilterError> {
        let total: f64 = self.particles.iter().map(|p| p.weight).sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(FilterError::DegenerateWeights { total });
        }

        for particle in &mut self.particles {
            particle.weight /= total;
        }
        Ok(())
    }

    /// Draw a fresh generation of exactly `N` particles with replacement,
    /// probability proportional to weight
    ///
    /// Cumulative-sum inverse-CDF sampling: draw uniform `r` in `[0, 1)`,
    /// select the first index whose weight prefix sum reaches `r`, falling
    /// back to the last particle if rounding leaves `r` beyond the final
    /// prefix sum. Weights must be normalized first. The new generation is
    /// a deep copy with weights reset to `1/N`.
    pub fn resample(&mut self, rng: &mut impl Rng) {
        let n = self.particles.len();
        let uniform = 1.0 / n as f64;

        let mut next = Vec::with_capacity(n);
        for _ in 0..n {
            let idx = self.weighted_choice(rng.rand());
            let mut particle = self.particles[idx].clone();
            particle.weight = uniform;
            next.push(particle);
        }
        self.particles = next;
    }

    fn weighted_choice(&self, r: f64) -> usize {
        let mut cumulative = 0.0;
        for (i, particle) in self.particles.iter().enumerate() {
            cumulative += particle.weight;
            if r <= cumulative {
                return i;
            }
        }
        self.particles.len() - 1
    }

    /// Weighted mean of position and velocity per tracked object
    ///
    /// Pure read; assumes normalized weights.
    pub fn estimate(&self) -> Vec<ProjectileState> {
        let zero = ProjectileState::new(Vector2::zeros(), Vector2::zeros());
        let mut means = vec![zero; self.num_objects];

        for particle in &self.particles {
            for (mean, object) in means.iter_mut().zip(&particle.objects) {
                mean.position += object.position * particle.weight;
                mean.velocity += object.velocity * particle.weight;
            }
        }
        means
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::rng::SimpleRng;

    fn initial_state() -> Vec<ProjectileState> {
        vec![
            ProjectileState::new(Vector2::new(0.0, 0.0), Vector2::new(50.0, 45.0)),
            ProjectileState::new(Vector2::new(0.0, 50.0), Vector2::new(50.0, 45.0)),
        ]
    }

    fn test_filter(n: usize) -> ParticleFilter {
        let config = ParticleConfig::new(n, 10.0, 0.1, 9.8).unwrap();
        ParticleFilter::new(&initial_state(), config).unwrap()
    }

    #[test]
    fn test_seeding_is_uniform_and_identical() {
        let pf = test_filter(70);
        assert_eq!(pf.num_particles(), 70);
        assert_eq!(pf.num_objects(), 2);

        for particle in pf.particles() {
            assert!((particle.weight - 1.0 / 70.0).abs() < 1e-15);
            assert_eq!(particle.objects[0], initial_state()[0]);
            assert_eq!(particle.objects[1], initial_state()[1]);
        }
    }

    #[test]
    fn test_predict_matches_simulator_step() {
        let mut pf = test_filter(5);
        let mut expected = initial_state();
        for state in &mut expected {
            state.step(0.1, 9.8);
        }

        pf.predict();
        for particle in pf.particles() {
            assert_eq!(particle.objects[0], expected[0]);
            assert_eq!(particle.objects[1], expected[1]);
        }
    }

    #[test]
    fn test_weight_rejects_wrong_observation_count() {
        let mut pf = test_filter(5);
        let err = pf.weight(&[Vector2::new(0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, FilterError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_weight_prefers_closer_particles() {
        let mut pf = test_filter(2);
        // Separate the two particles by hand
        pf.particles[1].objects[0].position = Vector2::new(100.0, 100.0);

        let obs = vec![Vector2::new(0.0, 0.0), Vector2::new(0.0, 50.0)];
        pf.weight(&obs).unwrap();
        assert!(pf.particles[0].weight > pf.particles[1].weight);
    }

    #[test]
    fn test_normalize_sums_to_one() {
        let mut pf = test_filter(70);
        let obs = vec![Vector2::new(1.0, 1.0), Vector2::new(1.0, 51.0)];
        pf.weight(&obs).unwrap();
        pf.normalize().unwrap();

        let total: f64 = pf.particles().iter().map(|p| p.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_reports_zero_total() {
        let mut pf = test_filter(10);
        // An observation absurdly far away underflows every weight to zero
        let obs = vec![Vector2::new(1e9, 1e9), Vector2::new(1e9, 1e9)];
        pf.weight(&obs).unwrap();

        let err = pf.normalize().unwrap_err();
        assert!(matches!(err, FilterError::DegenerateWeights { .. }));
    }

    #[test]
    fn test_resample_invariants() {
        let mut pf = test_filter(70);
        let obs = vec![Vector2::new(2.0, 1.0), Vector2::new(2.0, 51.0)];
        pf.weight(&obs).unwrap();
        pf.normalize().unwrap();

        let mut rng = SimpleRng::new(42);
        pf.resample(&mut rng);

        assert_eq!(pf.particles().len(), 70);
        for particle in pf.particles() {
            assert!((particle.weight - 1.0 / 70.0).abs() < 1e-15);
        }
    }

    #[test]
    fn test_resample_concentrates_on_heavy_particle() {
        let mut pf = test_filter(50);
        // Give all mass to particle 7
        for (i, particle) in pf.particles.iter_mut().enumerate() {
            particle.weight = if i == 7 { 1.0 } else { 0.0 };
            particle.objects[0].position = Vector2::new(i as f64, 0.0);
        }

        let mut rng = SimpleRng::new(42);
        pf.resample(&mut rng);

        for particle in pf.particles() {
            assert_eq!(particle.objects[0].position.x, 7.0);
        }
    }

    #[test]
    fn test_weighted_choice_fallback_selects_last() {
        let mut pf = test_filter(3);
        // Rounding can leave the prefix sum slightly below 1.0
        for particle in &mut pf.particles {
            particle.weight = 0.3333333;
        }
        assert_eq!(pf.weighted_choice(0.9999999999), 2);
    }

    #[test]
    fn test_estimate_is_weighted_mean() {
        let mut pf = test_filter(2);
        pf.particles[0].objects[0].position = Vector2::new(0.0, 0.0);
        pf.particles[1].objects[0].position = Vector2::new(10.0, 0.0);
        pf.particles[0].weight = 0.25;
        pf.particles[1].weight = 0.75;

        let estimate = pf.estimate();
        assert!((estimate[0].position.x - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_particle_degenerates_to_deterministic_motion() {
        let config = ParticleConfig::new(1, 10.0, 0.1, 9.8).unwrap();
        let mut pf = ParticleFilter::new(&initial_state(), config).unwrap();
        let mut reference = initial_state();
        let mut rng = SimpleRng::new(42);

        for _ in 0..20 {
            pf.predict();
            for state in &mut reference {
                state.step(0.1, 9.8);
            }

            let obs: Vec<Vector2<f64>> = reference.iter().map(|s| s.position).collect();
            pf.weight(&obs).unwrap();
            pf.normalize().unwrap();
            pf.resample(&mut rng);

            let estimate = pf.estimate();
            assert_eq!(estimate[0], reference[0]);
            assert_eq!(estimate[1], reference[1]);
        }
    }
}
