//! Test data generator for codec benchmarks.
//!
//! Produces a payload file of pseudo-random 57-bit values and a matching
//! noise script. Blocks receive zero, one or two bit flips so that a replay
//! exercises the clean, correctable and uncorrectable paths of the decoder.

use anyhow::{Result, ensure};
use secded_common::layout::{BLOCK_BITS, PAYLOAD_MASK};
use secded_io::loader::store_words;
use secded_io::parser::{NoiseEvent, store_noise_file};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Xorshift64 generator.
///
/// Cheap and reproducible from a seed; statistical quality is irrelevant for
/// picking payloads and flip positions.
#[derive(Debug, Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        // an all-zero state never leaves zero
        let state = if seed == 0 { 0x2545_F491_4F6C_DD1D } else { seed };
        Self { state }
    }

    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform value in `0..bound`.
    #[inline(always)]
    pub fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    #[inline(always)]
    pub fn payload(&mut self) -> u64 {
        self.next_u64() & PAYLOAD_MASK
    }

    #[inline(always)]
    pub fn position(&mut self) -> u32 {
        self.below(BLOCK_BITS as u64) as u32
    }

    /// Two distinct bit positions.
    pub fn position_pair(&mut self) -> (u32, u32) {
        let first = self.position();
        let mut second = self.position();
        while second == first {
            second = self.position();
        }
        (first, second)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        if p >= 1.0 {
            return true;
        }
        (self.next_u64() as f64) / (u64::MAX as f64) < p
    }
}

/// Seed derived from the wall clock, in microseconds.
pub fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(1)
}

/// Every block gets at least one flip unless asked otherwise.
pub const DEFAULT_CLEAN_RATE: f64 = 0.0;
pub const DEFAULT_DOUBLE_RATE: f64 = 0.05;

/// Error mix used when generating noise scripts.
#[derive(Debug, Clone, Copy)]
pub struct NoiseProfile {
    /// Probability that a block is left untouched.
    pub clean_rate: f64,
    /// Probability that a touched block receives a second flip.
    pub double_rate: f64,
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self {
            clean_rate: DEFAULT_CLEAN_RATE,
            double_rate: DEFAULT_DOUBLE_RATE,
        }
    }
}

/// Draws the noise events for `count` blocks.
pub fn generate_noise(
    rng: &mut XorShift64,
    count: usize,
    profile: NoiseProfile,
) -> Vec<NoiseEvent> {
    let mut events = Vec::with_capacity(count);
    for block in 0..count {
        if rng.chance(profile.clean_rate) {
            continue;
        }
        let positions = if rng.chance(profile.double_rate) {
            let (a, b) = rng.position_pair();
            vec![a, b]
        } else {
            vec![rng.position()]
        };
        events.push(NoiseEvent { block, positions });
    }
    events
}

/// Writes `count` payloads and a noise script for them.
///
/// # Arguments
///
/// * `payload_path` - Destination of the little-endian payload file.
/// * `noise_path` - Destination of the noise script.
/// * `count` - Number of blocks to generate.
/// * `profile` - Fraction of clean blocks and of two-flip blocks.
/// * `seed` - Seed for the xorshift generator; equal seeds give equal files.
///
/// # Returns
///
/// `Ok(())` once both files are written. Fails when a rate lies outside
/// `[0, 1]` or either file cannot be written.
pub fn generate_block_data(
    payload_path: &str,
    noise_path: &str,
    count: usize,
    profile: NoiseProfile,
    seed: u64,
) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&profile.clean_rate) && (0.0..=1.0).contains(&profile.double_rate),
        "noise rates must lie in [0, 1]"
    );

    info!(count, seed, ?profile, "generating block data");
    let mut rng = XorShift64::new(seed);

    let payloads: Vec<u64> = (0..count).map(|_| rng.payload()).collect();
    store_words(payload_path, &payloads)?;

    let events = generate_noise(&mut rng, count, profile);
    let doubles = events.iter().filter(|e| e.positions.len() == 2).count();
    store_noise_file(noise_path, &events)?;

    info!(
        payloads = payload_path,
        noise = noise_path,
        clean = count - events.len(),
        single = events.len() - doubles,
        double = doubles,
        "done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = XorShift64::new(99);
        let mut b = XorShift64::new(99);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn zero_seed_still_moves() {
        let mut rng = XorShift64::new(0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn draws_stay_in_range() {
        let mut rng = XorShift64::new(7);
        for _ in 0..10_000 {
            assert!(rng.payload() <= PAYLOAD_MASK);
            assert!(rng.position() < 64);
            let (a, b) = rng.position_pair();
            assert_ne!(a, b);
        }
    }

    #[test]
    fn default_profile_flips_every_block() {
        let mut rng = XorShift64::new(11);
        let events = generate_noise(&mut rng, 1000, NoiseProfile::default());
        assert_eq!(events.len(), 1000);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.block, i);
            assert!(!event.positions.is_empty());
        }
        assert!(events.iter().any(|e| e.positions.len() == 2));
    }

    #[test]
    fn noise_profile_extremes() {
        let mut rng = XorShift64::new(3);
        let none = generate_noise(
            &mut rng,
            100,
            NoiseProfile {
                clean_rate: 1.0,
                double_rate: 0.0,
            },
        );
        assert!(none.is_empty());

        let doubles = generate_noise(
            &mut rng,
            100,
            NoiseProfile {
                clean_rate: 0.0,
                double_rate: 1.0,
            },
        );
        assert_eq!(doubles.len(), 100);
        assert!(doubles.iter().all(|e| e.positions.len() == 2));
    }
}
