use anyhow::{Context, Result, anyhow, ensure};
use nom::IResult;
use nom::combinator::all_consuming;
use nom::multi::many0;
use nom::number::complete::le_u64;
use secded_common::units::BLOCK_BYTES;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

fn words(input: &[u8]) -> IResult<&[u8], Vec<u64>> {
    all_consuming(many0(le_u64))(input)
}

/// Decodes a buffer of little-endian words.
///
/// # Arguments
///
/// * `buffer` - Raw file contents, a whole number of 8-byte words.
///
/// # Returns
///
/// One `u64` per 8 bytes in buffer order, or an error when the length is not
/// a multiple of 8.
pub fn parse_words(buffer: &[u8]) -> Result<Vec<u64>> {
    ensure!(
        buffer.len() % BLOCK_BYTES == 0,
        "block data is {} bytes, not a multiple of {}",
        buffer.len(),
        BLOCK_BYTES
    );
    let (_, blocks) = words(buffer)
        .map_err(|e| anyhow!("malformed block data: {:?}", e.map_input(|rest| rest.len())))?;
    Ok(blocks)
}

/// Loads a block file into memory.
///
/// # Arguments
///
/// * `path` - Headerless file of little-endian `u64` words.
///
/// # Returns
///
/// The words in file order. Errors name the file that failed to open or
/// parse.
pub fn load_words<P: AsRef<Path>>(path: P) -> Result<Vec<u64>> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open block file {}", path.display()))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;

    let blocks =
        parse_words(&buffer).with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), blocks = blocks.len(), "loaded block file");
    Ok(blocks)
}

/// Writes blocks as little-endian words, replacing any existing file.
///
/// # Arguments
///
/// * `path` - Destination file.
/// * `blocks` - Words to write, in order.
///
/// # Returns
///
/// `Ok(())` once every word is flushed to disk.
pub fn store_words<P: AsRef<Path>>(path: P, blocks: &[u64]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create block file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for block in blocks {
        writer.write_all(&block.to_le_bytes())?;
    }
    writer.flush()?;
    debug!(path = %path.display(), blocks = blocks.len(), "stored block file");
    Ok(())
}
