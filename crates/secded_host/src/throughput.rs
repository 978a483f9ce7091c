use crate::generator::XorShift64;
use crate::stats::{PhaseTiming, Verification};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use secded_core::popcount::popcount;
use secded_core::{BatchReport, decode_slice, encode, encode_slice, try_encode};
use secded_io::{loader, parser};
use std::time::Instant;
use tracing::{debug, info, warn};

// Blocks per rayon task; large enough to amortise scheduling.
const CHUNK: usize = 1 << 14;

// Individual failures logged before the rest are only counted.
const MAX_LOGGED_FAILURES: usize = 16;

fn encode_blocks(blocks: &mut [u64], parallel: bool) -> PhaseTiming {
    let start = Instant::now();
    if parallel {
        blocks.par_chunks_mut(CHUNK).for_each(encode_slice);
    } else {
        encode_slice(blocks);
    }
    PhaseTiming::new("Encode", blocks.len(), start.elapsed())
}

/// Decodes in place and returns the outcome counts plus a per-block failure flag.
fn decode_blocks(blocks: &mut [u64], parallel: bool) -> (BatchReport, Vec<bool>, PhaseTiming) {
    let start = Instant::now();
    let (report, failed_idx) = if parallel {
        blocks
            .par_chunks_mut(CHUNK)
            .enumerate()
            .map(|(c, chunk)| {
                let mut failed = Vec::new();
                let report = decode_slice(chunk, |i, _| failed.push(c * CHUNK + i));
                (report, failed)
            })
            .reduce(
                || (BatchReport::default(), Vec::new()),
                |(ra, mut fa), (rb, fb)| {
                    fa.extend(fb);
                    (ra.merge(rb), fa)
                },
            )
    } else {
        let mut failed = Vec::new();
        let report = decode_slice(blocks, |i, _| failed.push(i));
        (report, failed)
    };
    let timing = PhaseTiming::new("Decode", blocks.len(), start.elapsed());

    let mut failed = vec![false; blocks.len()];
    for (n, &i) in failed_idx.iter().enumerate() {
        if n < MAX_LOGGED_FAILURES {
            warn!(block = i, "decode failed, block left as codeword");
        }
        failed[i] = true;
    }
    if failed_idx.len() > MAX_LOGGED_FAILURES {
        warn!(
            more = failed_idx.len() - MAX_LOGGED_FAILURES,
            "further decode failures not logged"
        );
    }

    (report, failed, timing)
}

/// Judges every decoded block against its payload and the flips it received.
fn verify(payloads: &[u64], masks: &[u64], decoded: &[u64], failed: &[bool]) -> Verification {
    (0..payloads.len())
        .into_par_iter()
        .map(|i| {
            let mut v = Verification::default();
            match popcount(masks[i]) {
                0 | 1 => {
                    if !failed[i] && decoded[i] == payloads[i] {
                        v.recovered = 1;
                    } else {
                        v.lost = 1;
                    }
                }
                2 => {
                    let corrupted = encode(payloads[i]) ^ masks[i];
                    if failed[i] && decoded[i] == corrupted {
                        v.detected = 1;
                    } else {
                        v.miscorrected = 1;
                    }
                }
                _ => v.unjudged = 1,
            }
            v
        })
        .reduce(Verification::default, Verification::merge)
}

fn print_outcomes(report: &BatchReport) {
    println!("\nDecoder Outcomes");
    println!("Clean:         {}", report.clean);
    println!("Corrected:     {}", report.corrected);
    println!("Uncorrectable: {}", report.uncorrectable);
}

fn finish(verification: Verification, total: usize) -> Result<()> {
    verification.print_report();
    if !verification.is_clean() {
        bail!(
            "{} of {} blocks failed verification",
            verification.failed(),
            total
        );
    }
    Ok(())
}

/// Replays a generated payload file and noise script through the codec.
///
/// # Arguments
///
/// * `payload_path` - Payload file written by `gen`; every word must fit in
///   57 bits.
/// * `noise_path` - Noise script naming the flips for each block.
/// * `parallel` - Split encode, decode and verification across rayon workers.
///
/// # Returns
///
/// `Ok(())` when every judged block behaves as SEC-DED requires. Fails on
/// I/O or parse errors, on an out-of-range payload, on noise that targets a
/// missing block, and when verification finds a lost or miscorrected block.
pub fn run_files(payload_path: &str, noise_path: &str, parallel: bool) -> Result<()> {
    println!("Loading payloads from {}...", payload_path);
    let payloads = loader::load_words(payload_path)?;
    for (i, &p) in payloads.iter().enumerate() {
        try_encode(p).with_context(|| format!("{} block {}", payload_path, i))?;
    }

    println!("Loading noise from {}...", noise_path);
    let events = parser::load_noise_file(noise_path)?;
    let masks = parser::noise_masks(payloads.len(), &events)?;
    println!("Loaded {} blocks, {} noise entries.", payloads.len(), events.len());

    let mut blocks = payloads.clone();
    let encode_timing = encode_blocks(&mut blocks, parallel);
    parser::apply_noise(&mut blocks, &events)?;
    let (report, failed, decode_timing) = decode_blocks(&mut blocks, parallel);

    println!("\nResults ({})", if parallel { "parallel" } else { "sequential" });
    encode_timing.print();
    decode_timing.print();
    print_outcomes(&report);

    finish(verify(&payloads, &masks, &blocks, &failed), payloads.len())
}

/// In-memory encode/noise/decode benchmark.
///
/// Every block receives one random flip, and one randomly chosen block a
/// second, so the run must end with exactly one uncorrectable block unless
/// both flips land on the same bit.
///
/// # Arguments
///
/// * `count` - Number of blocks to encode and decode.
/// * `seed` - Seed for payloads and flip positions.
/// * `parallel` - Use rayon workers instead of a single thread.
///
/// # Returns
///
/// `Ok(())` after printing timings, or an error when verification finds a
/// lost or miscorrected block.
pub fn run_bench(count: usize, seed: u64, parallel: bool) -> Result<()> {
    if count == 0 {
        bail!("block count must be positive");
    }
    info!(count, seed, parallel, "preparing bench");

    let mut rng = XorShift64::new(seed);
    let payloads: Vec<u64> = (0..count).map(|_| rng.payload()).collect();
    let mut blocks = payloads.clone();

    println!("Running encode bench...");
    let encode_timing = encode_blocks(&mut blocks, parallel);
    encode_timing.print();

    println!("Adding noise on blocks...");
    let mut masks: Vec<u64> = (0..count).map(|_| 1 << rng.position()).collect();
    let extra_block = rng.below(count as u64) as usize;
    let extra_pos = rng.position();
    masks[extra_block] ^= 1 << extra_pos;
    println!("Added extra noise on block {} bit {}.", extra_block, extra_pos);
    for (block, mask) in blocks.iter_mut().zip(&masks) {
        *block ^= mask;
    }

    println!("Running decode bench...");
    let (report, failed, decode_timing) = decode_blocks(&mut blocks, parallel);
    decode_timing.print();
    print_outcomes(&report);
    debug!(?report, "decode finished");

    finish(verify(&payloads, &masks, &blocks, &failed), count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(count: usize, seed: u64) -> (Vec<u64>, Vec<u64>) {
        let mut rng = XorShift64::new(seed);
        let payloads: Vec<u64> = (0..count).map(|_| rng.payload()).collect();
        let masks = (0..count)
            .map(|i| match i % 3 {
                0 => 0,
                1 => 1 << rng.position(),
                _ => {
                    let (a, b) = rng.position_pair();
                    (1 << a) | (1 << b)
                }
            })
            .collect();
        (payloads, masks)
    }

    fn round_trip(parallel: bool) {
        let count = 3 * CHUNK + 17;
        let (payloads, masks) = sample(count, 11);

        let mut blocks = payloads.clone();
        encode_blocks(&mut blocks, parallel);
        for (b, m) in blocks.iter_mut().zip(&masks) {
            *b ^= m;
        }
        let (report, failed, _) = decode_blocks(&mut blocks, parallel);

        assert_eq!(report.uncorrectable, count / 3);
        assert_eq!(failed.iter().filter(|&&f| f).count(), count / 3);

        let v = verify(&payloads, &masks, &blocks, &failed);
        assert!(v.is_clean(), "{v:?}");
        assert_eq!(v.passed(), count);
        assert_eq!(v.detected, count / 3);
    }

    #[test]
    fn sequential_round_trip_verifies() {
        round_trip(false);
    }

    #[test]
    fn parallel_round_trip_verifies() {
        round_trip(true);
    }

    #[test]
    fn wrong_payload_is_flagged_lost() {
        let payloads = [5u64];
        let masks = [0u64];
        let v = verify(&payloads, &masks, &[6], &[false]);
        assert_eq!(v.lost, 1);
    }

    #[test]
    fn small_bench_passes() {
        run_bench(1000, 42, true).unwrap();
        run_bench(1000, 42, false).unwrap();
    }
}
