//! Randomized self-test of the codec.
//!
//! Each iteration draws a payload and checks, in order: the layout round
//! trip, that the syndrome names an injected single flip, that decoding the
//! clean codeword recovers the payload, and that two distinct flips are
//! refused. The first violation is logged with rendered blocks and aborts
//! the run.

use crate::generator::XorShift64;
use anyhow::{Result, bail};
use secded_core::{decode, encode, find_error_position, unreposition};
use secded_io::render::{render_bits, render_block};
use std::time::Instant;
use tracing::{error, info};

/// Runs the randomized correctness check.
///
/// # Arguments
///
/// * `iterations` - Number of random payloads to exercise.
/// * `seed` - Seed for payloads and flip positions.
///
/// # Returns
///
/// `Ok(())` when every iteration passes. The first failure is logged with
/// rendered blocks and returned as an error.
pub fn run_self_test(iterations: usize, seed: u64) -> Result<()> {
    info!(iterations, seed, "running self-test");
    let start = Instant::now();
    let mut rng = XorShift64::new(seed);

    for i in 0..iterations {
        let data = rng.payload();
        let codeword = encode(data);

        let gathered = unreposition(codeword);
        if gathered != data {
            error!(
                iteration = i,
                "layout round trip failed\n{}payload   {}\ngathered  {}",
                render_block(codeword, false),
                render_bits(data, 57),
                render_bits(gathered, 57)
            );
            bail!("layout round trip failed on iteration {} (payload {:#x})", i, data);
        }

        let err_pos = rng.position();
        let hit = codeword ^ (1 << err_pos);
        let found = find_error_position(hit);
        if found != err_pos {
            error!(
                iteration = i,
                "syndrome mismatch\n{}\n{}",
                render_block(codeword, false),
                render_block(hit, false)
            );
            bail!("error at bit {} located at bit {}", err_pos, found);
        }

        let mut word = codeword;
        if !decode(&mut word) {
            bail!("decode failed on clean block {} (payload {:#x})", i, data);
        }
        if word != data {
            error!(
                iteration = i,
                "decode mismatch\npayload   {}\ndecoded   {}",
                render_bits(data, 57),
                render_bits(word, 57)
            );
            bail!("decode mismatch on iteration {} (payload {:#x})", i, data);
        }

        let (a, b) = rng.position_pair();
        let mut unrecoverable = codeword ^ (1 << a) ^ (1 << b);
        if decode(&mut unrecoverable) {
            bail!(
                "decode accepted two flips (bits {} and {}) on iteration {} (payload {:#x})",
                a,
                b,
                i,
                data
            );
        }
    }

    info!(elapsed = ?start.elapsed(), "self-test passed");
    println!("Test PASS ({} iterations).", iterations);
    Ok(())
}
