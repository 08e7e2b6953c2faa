//! Seedable randomness for spawn parameters and verdict messages.
//!
//! Gameplay pulls every random decision (drop size, horizontal position,
//! bad-drop rolls, end-of-game message pick) through the [`RngSource`] trait so
//! sessions can be replayed deterministically in tests. The browser adapter
//! seeds a [`SplitMix64`] from `getrandom` (feature `rng`) or the performance
//! clock.

/// Source of uniform randomness. Implementors only provide raw `u64`s; the
/// float / Bernoulli helpers are derived.
pub trait RngSource {
    fn next_u64(&mut self) -> u64;

    /// Uniform f64 in [0, 1), built from the top 53 bits so every value is
    /// exactly representable.
    fn unit_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform f64 in [lo, hi). Degenerate ranges (hi <= lo) collapse to lo.
    fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            lo
        } else {
            lo + (hi - lo) * self.unit_f64()
        }
    }

    /// Bernoulli draw: true with probability `p` (clamped behavior follows
    /// from the comparison; p <= 0 is never, p >= 1 is always).
    fn chance(&mut self, p: f64) -> bool {
        self.unit_f64() < p
    }

    /// Uniform index in [0, len). `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        ((self.unit_f64() * len as f64) as usize).min(len - 1)
    }
}

/// SplitMix64: tiny, fast, and plenty for arcade spawn jitter. Not
/// cryptographic.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl RngSource for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_f64_stays_in_half_open_range() {
        let mut rng = SplitMix64::new(1);
        for _ in 0..10_000 {
            let v = rng.unit_f64();
            assert!((0.0..1.0).contains(&v), "unit_f64 produced {v}");
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = SplitMix64::new(42);
        let mut b = SplitMix64::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn range_f64_respects_bounds() {
        let mut rng = SplitMix64::new(7);
        for _ in 0..1_000 {
            let v = rng.range_f64(30.0, 78.0);
            assert!((30.0..78.0).contains(&v));
        }
        // degenerate range collapses to lo
        assert_eq!(rng.range_f64(5.0, 5.0), 5.0);
        assert_eq!(rng.range_f64(5.0, -1.0), 5.0);
    }

    #[test]
    fn chance_extremes() {
        let mut rng = SplitMix64::new(9);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn index_covers_all_slots() {
        let mut rng = SplitMix64::new(3);
        let mut seen = [false; 5];
        for _ in 0..1_000 {
            seen[rng.index(5)] = true;
        }
        assert!(seen.iter().all(|s| *s), "index(5) never hit some slot");
    }
}
