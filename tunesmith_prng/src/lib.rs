// Portable pseudo-random source for composition.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding,
// hand-rolled so that the same seed yields the same piece on every platform.
//
// Every random decision in `tunesmith_music` (melody walk, durations,
// velocities, progression and drum-template choice) draws from a `TuneRng`
// that the caller owns and passes down as `&mut TuneRng`. There is no global
// generator: each generation request builds its own, either from an explicit
// seed (reproducible output) or from `TuneRng::from_entropy()`.
//
// The generator uses integer arithmetic only, so sequences do not depend on
// the platform's floating-point behavior.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Xoshiro256++ generator used for all composition randomness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TuneRng {
    s: [u64; 4],
}

impl TuneRng {
    /// Create a generator from a `u64` seed.
    ///
    /// SplitMix64 expands the seed into the 256-bit state, so two generators
    /// built from the same seed produce identical sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Create a generator from an unpredictable seed.
    ///
    /// Mixes the wall clock with the per-thread random keys of
    /// `RandomState`, so generators created concurrently on different threads
    /// (or back to back on one thread) start from different states.
    pub fn from_entropy() -> Self {
        Self::new(entropy_seed())
    }

    /// Next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[low, high)`.
    ///
    /// Rejection sampling avoids modulo bias. Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Uniform `usize` in `[low, high)`. Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Uniform `usize` in `[low, high]`. Panics if `low > high`.
    pub fn range_usize_inclusive(&mut self, low: usize, high: usize) -> usize {
        assert!(low <= high, "range_usize_inclusive: low must be <= high");
        self.range_u64(low as u64, high as u64 + 1) as usize
    }

    /// Uniform `u8` in `[low, high]`. Panics if `low > high`.
    pub fn range_u8_inclusive(&mut self, low: u8, high: u8) -> u8 {
        assert!(low <= high, "range_u8_inclusive: low must be <= high");
        self.range_u64(u64::from(low), u64::from(high) + 1) as u8
    }
}

/// SplitMix64 step, used only to expand a seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn entropy_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u128(nanos);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism_same_seed_same_output() {
        let mut a = TuneRng::new(42);
        let mut b = TuneRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_different_output() {
        let mut a = TuneRng::new(42);
        let mut b = TuneRng::new(43);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn entropy_generators_diverge() {
        let mut a = TuneRng::from_entropy();
        let mut b = TuneRng::from_entropy();
        let va: Vec<u64> = (0..4).map(|_| a.next_u64()).collect();
        let vb: Vec<u64> = (0..4).map(|_| b.next_u64()).collect();
        assert_ne!(va, vb);
    }

    #[test]
    fn range_u64_within_bounds() {
        let mut rng = TuneRng::new(999);
        for _ in 0..10_000 {
            let v = rng.range_u64(10, 20);
            assert!((10..20).contains(&v), "range_u64 out of range: {v}");
        }
    }

    #[test]
    fn range_usize_inclusive_reaches_both_ends() {
        let mut rng = TuneRng::new(666);
        let mut seen = [false; 6];
        for _ in 0..10_000 {
            let v = rng.range_usize_inclusive(5, 10);
            assert!((5..=10).contains(&v), "out of range: {v}");
            seen[v - 5] = true;
        }
        assert!(seen.iter().all(|&s| s), "every value should appear: {seen:?}");
    }

    #[test]
    fn range_u8_inclusive_covers_velocity_band() {
        let mut rng = TuneRng::new(888);
        let mut saw_low = false;
        let mut saw_high = false;
        for _ in 0..10_000 {
            let v = rng.range_u8_inclusive(85, 110);
            assert!((85..=110).contains(&v), "out of range: {v}");
            saw_low |= v == 85;
            saw_high |= v == 110;
        }
        assert!(saw_low && saw_high);
    }

    #[test]
    fn range_usize_is_uniform_enough() {
        let mut rng = TuneRng::new(7);
        let mut counts = [0u32; 3];
        for _ in 0..9_000 {
            counts[rng.range_usize(0, 3)] += 1;
        }
        for c in counts {
            assert!((2_700..3_300).contains(&c), "skewed choice: {counts:?}");
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let mut rng = TuneRng::new(42);
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: TuneRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
