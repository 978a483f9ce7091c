//! Common definitions and constants shared across the SEC-DED block codec.
//!
//! This crate fixes the bit-exact layout of a (64,57) extended Hamming block:
//! which positions carry parity, which carry payload, and the parity-group
//! masks both the encoder and the syndrome decoder evaluate. It also holds the
//! unit constants the host tools use to report throughput. Everything here is
//! an immutable constant and safe to share between threads.

#![no_std]

// Bit layout of a single 64-bit codeword.
//
// Positions are numbered from the least significant bit. Position 0 holds the
// extended (whole-word) parity bit, positions 1, 2, 4, 8, 16 and 32 hold the
// six positional parity bits, and the remaining 57 positions hold the payload
// in ascending order.
pub mod layout {
    /// Width of a codeword in bits.
    pub const BLOCK_BITS: u32 = 64;

    /// Number of payload bits carried by one codeword.
    ///
    /// A payload is valid when every bit at or above this index is zero.
    pub const PAYLOAD_BITS: u32 = 57;

    /// Number of positional parity bits (positions 2^k for k = 0..5).
    pub const POSITIONAL_PARITY_BITS: usize = 6;

    /// Index of the extended parity bit covering the whole word.
    pub const EXTENDED_PARITY_POSITION: u32 = 0;

    /// Mask selecting the low 57 bits of a payload.
    pub const PAYLOAD_MASK: u64 = (1u64 << PAYLOAD_BITS) - 1;

    /// Indices of the positional parity bits, in the order they are written.
    pub const PARITY_POSITIONS: [u32; POSITIONAL_PARITY_BITS] = [1, 2, 4, 8, 16, 32];

    /// Mask of every reserved position: the extended parity bit plus the six
    /// positional parity bits.
    pub const PARITY_POSITION_MASK: u64 = 0x0000_0001_0001_0117;

    /// Mask of the 57 positions that carry payload bits.
    pub const PAYLOAD_POSITION_MASK: u64 = !PARITY_POSITION_MASK;

    /// Parity-group membership for each positional parity bit.
    ///
    /// Entry `k` selects every position whose binary index has bit `k` set,
    /// which includes the parity bit at `1 << k` itself.
    pub const GROUP_MASKS: [u64; POSITIONAL_PARITY_BITS] = [
        0xAAAA_AAAA_AAAA_AAAA,
        0xCCCC_CCCC_CCCC_CCCC,
        0xF0F0_F0F0_F0F0_F0F0,
        0xFF00_FF00_FF00_FF00,
        0xFFFF_0000_FFFF_0000,
        0xFFFF_FFFF_0000_0000,
    ];
}

/// Units used when reporting codec throughput.
///
/// Throughput is measured in payload bytes: each 64-bit block transports 57
/// useful bits, so a block counts as 57/8 bytes.
pub mod units {
    use super::layout::PAYLOAD_BITS;

    /// Payload bytes carried by one block.
    pub const PAYLOAD_BYTES_PER_BLOCK: f64 = PAYLOAD_BITS as f64 / 8.0;

    /// Bytes in a mebibyte.
    pub const MIB: f64 = 1024.0 * 1024.0;

    /// Size of one stored block on disk or in memory.
    pub const BLOCK_BYTES: usize = 8;

    /// Converts a block count to mebibytes of payload.
    pub fn payload_mib(blocks: usize) -> f64 {
        blocks as f64 * PAYLOAD_BYTES_PER_BLOCK / MIB
    }
}
