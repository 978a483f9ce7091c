//! Parser for noise scripts.
//!
//! Each non-empty line names one block and the codeword bits to flip in it:
//!
//! ```text
//! # block 7 gets a correctable error, block 9 an uncorrectable one
//! flip(7) B12
//! flip(9) B0 B1
//! ```
//!
//! Lines starting with `#` are comments. Positions must lie in `0..64` and may
//! not repeat within a line. Several lines may name the same block; their
//! flips accumulate.

use anyhow::{Context, Result, anyhow, bail};
use nom::IResult;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, space0, space1};
use nom::combinator::{all_consuming, map_res};
use nom::multi::many1;
use nom::sequence::{delimited, preceded, terminated};
use secded_common::layout::BLOCK_BITS;
use secded_core::bit_utils::BitPack;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Bit flips to apply to one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseEvent {
    pub block: usize,
    pub positions: Vec<u32>,
}

impl NoiseEvent {
    /// XOR mask with one bit set per flipped position.
    pub fn mask(&self) -> u64 {
        BitPack::flipped(0, &self.positions)
    }
}

fn block_index(input: &str) -> IResult<&str, usize> {
    delimited(tag("flip("), map_res(digit1, str::parse::<usize>), char(')'))(input)
}

fn position(input: &str) -> IResult<&str, u32> {
    preceded(space1, preceded(char('B'), map_res(digit1, str::parse::<u32>)))(input)
}

fn event(input: &str) -> IResult<&str, (usize, Vec<u32>)> {
    let (input, block) = block_index(input)?;
    let (input, positions) = terminated(many1(position), space0)(input)?;
    Ok((input, (block, positions)))
}

fn parse_line(line: &str) -> Result<NoiseEvent> {
    let (_, (block, positions)) =
        all_consuming(event)(line).map_err(|e| anyhow!("malformed noise entry: {}", e))?;

    for (i, &p) in positions.iter().enumerate() {
        if p >= BLOCK_BITS {
            bail!("bit position {} is outside the {}-bit block", p, BLOCK_BITS);
        }
        if positions[..i].contains(&p) {
            bail!("bit position {} is listed twice", p);
        }
    }

    Ok(NoiseEvent { block, positions })
}

/// Parses a complete noise script held in memory.
pub fn parse_noise_script(text: &str) -> Result<Vec<NoiseEvent>> {
    let mut events = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        events.push(parse_line(trimmed).with_context(|| format!("line {}", n + 1))?);
    }
    Ok(events)
}

/// Loads a noise script from disk.
///
/// # Arguments
///
/// * `path` - Path of the script to read.
///
/// # Returns
///
/// The events in file order. Parse errors carry the path and the 1-based line
/// number of the offending entry.
pub fn load_noise_file<P: AsRef<Path>>(path: P) -> Result<Vec<NoiseEvent>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open noise file {}", path.display()))?;
    let events = parse_noise_script(&text).with_context(|| path.display().to_string())?;

    debug!(path = %path.display(), events = events.len(), "loaded noise file");
    Ok(events)
}

/// Writes a noise script, one line per event.
///
/// # Arguments
///
/// * `path` - Destination file, created or truncated.
/// * `events` - Events to write, in order.
///
/// # Returns
///
/// `Ok(())` once the file is flushed.
pub fn store_noise_file<P: AsRef<Path>>(path: P, events: &[NoiseEvent]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create noise file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for event in events {
        write!(writer, "flip({})", event.block)?;
        for p in &event.positions {
            write!(writer, " B{}", p)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), events = events.len(), "stored noise file");
    Ok(())
}

/// XORs every event into `blocks`.
///
/// Fails without modifying anything if an event names a block past the end.
pub fn apply_noise(blocks: &mut [u64], events: &[NoiseEvent]) -> Result<()> {
    if let Some(bad) = events.iter().find(|e| e.block >= blocks.len()) {
        bail!(
            "noise targets block {} but only {} blocks are loaded",
            bad.block,
            blocks.len()
        );
    }
    for event in events {
        blocks[event.block] ^= event.mask();
    }
    Ok(())
}

/// Folds events into one flip mask per block.
pub fn noise_masks(num_blocks: usize, events: &[NoiseEvent]) -> Result<Vec<u64>> {
    let mut masks = vec![0u64; num_blocks];
    apply_noise(&mut masks, events)?;
    Ok(masks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_script_with_comments() {
        let text = "# header\n\nflip(7) B12\n  flip(9) B0 B1  \n";
        let events = parse_noise_script(text).unwrap();
        assert_eq!(
            events,
            vec![
                NoiseEvent {
                    block: 7,
                    positions: vec![12]
                },
                NoiseEvent {
                    block: 9,
                    positions: vec![0, 1]
                },
            ]
        );
        assert_eq!(events[1].mask(), 0b11);
    }

    #[test]
    fn rejects_bad_entries() {
        assert!(parse_noise_script("flip(1)").is_err());
        assert!(parse_noise_script("flip(1) B64").is_err());
        assert!(parse_noise_script("flip(1) B3 B3").is_err());
        assert!(parse_noise_script("flip(x) B3").is_err());
        assert!(parse_noise_script("flop(1) B3").is_err());
    }

    #[test]
    fn error_names_the_line() {
        let err = parse_noise_script("flip(0) B1\nflip(1) B99\n").unwrap_err();
        assert_eq!(err.to_string(), "line 2");
    }

    #[test]
    fn file_errors_name_path_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "# ok\nflip(0) B1\n\nflip(1) B64\n").unwrap();

        let err = load_noise_file(&path).unwrap_err();
        let chain: Vec<String> = err.chain().map(|c| c.to_string()).collect();
        assert_eq!(chain[0], path.display().to_string());
        assert_eq!(chain[1], "line 4");
        assert!(chain[2].contains("64"));

        let missing = load_noise_file(dir.path().join("missing.txt")).unwrap_err();
        assert!(missing.to_string().starts_with("Failed to open noise file"));
    }

    #[test]
    fn apply_accumulates_and_checks_bounds() {
        let events = parse_noise_script("flip(0) B1\nflip(0) B1 B2\nflip(2) B63").unwrap();
        let mut blocks = [0u64; 3];
        apply_noise(&mut blocks, &events).unwrap();
        assert_eq!(blocks, [0b100, 0, 1u64 << 63]);

        let mut short = [0u64; 2];
        assert!(apply_noise(&mut short, &events).is_err());
        assert_eq!(short, [0, 0]);
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.txt");
        let events = vec![
            NoiseEvent {
                block: 0,
                positions: vec![5],
            },
            NoiseEvent {
                block: 3,
                positions: vec![0, 40],
            },
        ];
        store_noise_file(&path, &events).unwrap();
        assert_eq!(load_noise_file(&path).unwrap(), events);
        assert_eq!(noise_masks(4, &events).unwrap(), vec![1u64 << 5, 0, 0, 1 | 1u64 << 40]);
    }
}
