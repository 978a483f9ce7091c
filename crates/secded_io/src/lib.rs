//! I/O utilities for SEC-DED block data.
//!
//! Provides reading and writing of raw block files, parsing of noise scripts
//! that describe which codeword bits to flip, and text rendering of codewords
//! for diagnostics. These utilities sit between the host tools and the
//! `no_std` codec core.

/// Loading and storing of raw block files.
///
/// A block file is a flat sequence of little-endian 64-bit words with no
/// header. The same format holds payloads before encoding, codewords after
/// encoding, and decoded payloads.
pub mod loader;

/// Parser for noise scripts.
///
/// A noise script lists, per block, the codeword bit positions to flip. The
/// host tools generate scripts alongside payload files and replay them to
/// inject reproducible errors.
pub mod parser;

/// Text rendering of codewords as 8x8 bit grids and binary strings.
pub mod render;
