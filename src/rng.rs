use std::time::{SystemTime, UNIX_EPOCH};

// --- Pseudo-Random Number Generator ---
// Algorithm: xoshiro256** (StarStar)
// Reference: https://prng.di.unimi.it/

/// Uniform values for the draw engine.
pub trait RandomSource {
    /// Returns `k / 1000.0` for `k` uniform in `[0, max_exclusive)`.
    fn next_scaled(&mut self, max_exclusive: u32) -> f64;
}

pub struct Rng {
    state: [u64; 4],
    reseed_each_draw: bool,
}

fn splitmix64(s: &mut u64) -> u64 {
    *s = s.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = *s;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

fn clock_nanos() -> u64 {
    // A clock before the epoch only costs entropy, never correctness.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

impl Rng {
    /// Deterministic generator. Two generators built from the same seed
    /// produce the same stream.
    pub fn from_seed(mut seed: u64) -> Self {
        Rng {
            state: [
                splitmix64(&mut seed),
                splitmix64(&mut seed),
                splitmix64(&mut seed),
                splitmix64(&mut seed),
            ],
            reseed_each_draw: false,
        }
    }

    /// Entropy-seeded generator that also stirs the clock into its state
    /// before every scaled draw.
    pub fn new() -> Self {
        // Mix the clock with the address of a heap allocation (ASLR).
        let heap_var = Box::new(0);
        let ptr_val = &*heap_var as *const i32 as u64;
        let mut rng = Self::from_seed(clock_nanos() ^ ptr_val);
        rng.reseed_each_draw = true;
        rng
    }

    #[cfg(test)]
    pub fn reseeds_each_draw(&self) -> bool {
        self.reseed_each_draw
    }

    /// Folds fresh clock entropy into the state. The previous state is kept,
    /// so two stirs in the same clock tick still yield different streams.
    fn stir(&mut self) {
        let mut s = clock_nanos();
        self.state[0] ^= splitmix64(&mut s);
        self.state[2] ^= splitmix64(&mut s);
        if self.state.iter().all(|&w| w == 0) {
            self.state[1] = 0x9e3779b97f4a7c15;
        }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let result = self.state[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);

        let t = self.state[1] << 17;

        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];

        self.state[2] ^= t;

        self.state[3] = self.state[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[0, range)` by rejection sampling, without modulo bias.
    /// Reference: https://lemire.me/blog/2019/06/06/nearly-divisionless-random-integer-generation-on-various-systems/
    pub fn next_u64_bounded(&mut self, range: u64) -> u64 {
        debug_assert!(range > 0);
        let threshold = (0u64.wrapping_sub(range)) % range;
        loop {
            let x = self.next_u64();
            if x >= threshold {
                return x % range;
            }
        }
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for Rng {
    fn next_scaled(&mut self, max_exclusive: u32) -> f64 {
        if max_exclusive == 0 {
            return 0.0;
        }
        if self.reseed_each_draw {
            self.stir();
        }
        self.next_u64_bounded(max_exclusive as u64) as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Rng::from_seed(42);
        let mut b = Rng::from_seed(42);
        let xs: Vec<u64> = (0..16).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..16).map(|_| b.next_u64()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn scaled_values_stay_in_range_with_three_decimals() {
        let mut rng = Rng::from_seed(7);
        for _ in 0..10_000 {
            let v = rng.next_scaled(100_000);
            assert!((0.0..100.0).contains(&v));
            let milli = v * 1000.0;
            assert!((milli - milli.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn scaled_zero_range_is_zero() {
        let mut rng = Rng::from_seed(1);
        assert_eq!(rng.next_scaled(0), 0.0);
    }

    #[test]
    fn entropy_rng_reseeds_and_stays_in_range() {
        let mut rng = Rng::new();
        assert!(rng.reseeds_each_draw());
        assert!(!Rng::from_seed(3).reseeds_each_draw());
        for _ in 0..1_000 {
            let v = rng.next_scaled(100_000);
            assert!((0.0..100.0).contains(&v));
        }
    }

    #[test]
    fn bounded_covers_every_bucket() {
        let mut rng = Rng::from_seed(99);
        let mut seen = [false; 10];
        for _ in 0..1_000 {
            seen[rng.next_u64_bounded(10) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
