/// Random number generator trait for deterministic testing.
///
/// This trait provides the minimal interface the simulator and the particle
/// filter need (uniform draws in `[0, 1)`), so that tests can run bit-for-bit
/// reproducibly while production callers plug in any `rand` generator.
pub trait Rng {
    /// Generate the next uint64 value
    fn next_u64(&mut self) -> u64;

    /// Generate a random f64 in [0, 1)
    fn rand(&mut self) -> f64 {
        self.next_u64() as f64 / (u64::MAX as f64 + 1.0)
    }
}

/// Simple deterministic random number generator using Xorshift64.
///
/// This PRNG is:
/// - Minimal (~5 lines of bit operations)
/// - Fast (no lookup tables, no heavy math)
/// - Deterministic (identical output for the same seed)
/// - Good enough quality for testing
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a new SimpleRng with the given seed.
    /// If seed is 0, uses 1 instead to avoid degenerate state.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }
}

impl Rng for SimpleRng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

// Implement rand::RngCore so SimpleRng also works with rand-based APIs
impl rand::RngCore for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        Rng::next_u64(self) as u32
    }

    fn next_u64(&mut self) -> u64 {
        Rng::next_u64(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut i = 0;
        let len = dest.len();
        while i + 8 <= len {
            let bytes = Rng::next_u64(self).to_le_bytes();
            dest[i..i + 8].copy_from_slice(&bytes);
            i += 8;
        }
        if i < len {
            let bytes = Rng::next_u64(self).to_le_bytes();
            let remaining = len - i;
            dest[i..].copy_from_slice(&bytes[..remaining]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Adapter so any `rand` generator (e.g. `StdRng`) satisfies the crate trait.
pub struct RandRng<R: rand::RngCore>(pub R);

impl<R: rand::RngCore> Rng for RandRng<R> {
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_simple_rng_seed_zero() {
        let mut rng = SimpleRng::new(0);
        // Should use state = 1 when seed is 0
        assert_eq!(rng.state, 1);
        let val = Rng::next_u64(&mut rng);
        assert_ne!(val, 0);
    }

    #[test]
    fn test_simple_rng_deterministic() {
        let mut rng1 = SimpleRng::new(42);
        let mut rng2 = SimpleRng::new(42);

        // Same seed should produce identical sequences
        for _ in 0..100 {
            assert_eq!(Rng::next_u64(&mut rng1), Rng::next_u64(&mut rng2));
        }
    }

    #[test]
    fn test_rand_range() {
        let mut rng = SimpleRng::new(42);

        for _ in 0..100 {
            let val = rng.rand();
            assert!(val >= 0.0 && val < 1.0, "rand() should return [0, 1)");
        }
    }

    #[test]
    fn test_rand_adapter() {
        let mut rng = RandRng(rand::rngs::StdRng::seed_from_u64(7));
        for _ in 0..100 {
            let val = rng.rand();
            assert!(val >= 0.0 && val < 1.0);
        }
    }
}
