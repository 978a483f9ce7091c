//! Single-block inspection for the `show` command.

use anyhow::{Context, Result, ensure};
use secded_common::layout::BLOCK_BITS;
use secded_core::bit_utils::BitPack;
use secded_core::{Correction, classify, find_error_position, try_decode, try_encode};
use secded_io::render::{render_bits, render_block};

/// Parses a decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid integer '{}': {}", s, e))
}

/// Encodes `payload`, flips `flips`, and prints every stage.
///
/// # Arguments
///
/// * `payload` - Value to encode; must fit in 57 bits.
/// * `flips` - Codeword bit positions to flip, each below 64.
///
/// # Returns
///
/// `Ok(())` after printing, or an error for an out-of-range payload or bit
/// position.
pub fn show_block(payload: u64, flips: &[u32]) -> Result<()> {
    for &p in flips {
        ensure!(p < BLOCK_BITS, "bit position {} is outside the block", p);
    }
    let codeword = try_encode(payload).context("cannot encode payload")?;

    println!("Payload   {:#018x}", payload);
    println!("          {}", render_bits(payload, 57));
    println!("\nCodeword  {:#018x} (parity masked)", codeword);
    print!("{}", render_block(codeword, true));
    println!("\nCodeword  {:#018x}", codeword);
    print!("{}", render_block(codeword, false));

    if flips.is_empty() {
        return Ok(());
    }

    let received = BitPack::flipped(codeword, flips);
    println!("\nReceived  {:#018x} (flipped {:?})", received, flips);
    print!("{}", render_block(received, false));
    println!("Syndrome  {}", find_error_position(received));

    match classify(received) {
        Correction::Clean => println!("Outcome   clean"),
        Correction::Corrected { position } => println!("Outcome   corrected bit {}", position),
        Correction::Uncorrectable { syndrome } => {
            println!("Outcome   uncorrectable (syndrome {})", syndrome)
        }
    }

    match try_decode(received) {
        Ok(decoded) if decoded.payload == payload => {
            println!("Decoded   {:#018x} (matches)", decoded.payload)
        }
        Ok(decoded) => println!(
            "Decoded   {:#018x} (WRONG: {} flips exceed the code's guarantees)",
            decoded.payload,
            flips.len()
        ),
        Err(e) => println!("Decoded   refused: {}", e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_u64("42"), Ok(42));
        assert_eq!(parse_u64("0x1F"), Ok(31));
        assert_eq!(parse_u64("0x01FF_FFFF_FFFF_FFFF"), Ok((1 << 57) - 1));
        assert_eq!(parse_u64("1_000"), Ok(1000));
        assert!(parse_u64("0xZZ").is_err());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(show_block(1 << 57, &[]).is_err());
        assert!(show_block(1, &[64]).is_err());
        assert!(show_block(1, &[3, 9]).is_ok());
    }
}
