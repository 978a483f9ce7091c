//! Core (64,57) SEC-DED Hamming block codec.
//!
//! This crate packs a 57-bit payload into a 64-bit codeword with six
//! interleaved positional parity bits and one extended parity bit, and later
//! recovers the payload, correcting any single flipped bit and detecting any
//! two flipped bits. Every operation works on a single machine word, allocates
//! nothing and touches no global mutable state, so the crate is usable from
//! firmware (no_std) as well as from parallel host-side pipelines.
//!
//! Three or more simultaneous flips exceed what a distance-4 code can
//! classify: such words may be reported clean, "corrected" to the wrong
//! payload, or reported uncorrectable depending on the pattern. Callers that
//! need stronger guarantees must layer them on top.

#![no_std]

/// Population count with a hardware instruction or a portable fallback.
///
/// Selects the `popcnt` instruction at build time when the target supports
/// it and otherwise falls back to the SWAR bit-trick. Both paths return the
/// same count for every input; the `soft_popcount` feature forces the
/// fallback.
pub mod popcount;

/// Single-word bit manipulation helpers.
///
/// Used to flip individual codeword bits during correction and to inject
/// noise in tests and benchmarks.
pub mod bit_utils;

/// Mapping between dense 57-bit payloads and sparse 64-bit codewords.
///
/// Scatters payload bits into the non-parity positions in ascending order
/// and gathers them back, ignoring whatever the parity positions contain.
pub mod layout;

/// Parity bit computation and block encoding.
pub mod parity;

/// Syndrome computation, error classification and block decoding.
///
/// Implements the SEC-DED decision table: odd total parity means one flip
/// (corrected in place), even parity with a zero syndrome means a clean word,
/// and even parity with a nonzero syndrome means two flips (left untouched).
pub mod syndrome;

/// In-place encoding and decoding of block arrays.
pub mod batch;

pub use batch::{BatchReport, decode_slice, encode_slice};
pub use layout::{reposition, unreposition};
pub use parity::{encode, set_parity, try_encode};
pub use popcount::popcount;
pub use syndrome::{
    Correction, Decoded, classify, correct_block, decode, find_error_position, try_decode,
};

/// Error types returned by the fallible codec operations.
///
/// The plain `encode`/`decode` surface never fails loudly; these variants are
/// produced only by `try_encode` and `try_decode`, which surface the same
/// conditions as values the caller can propagate with `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SecdedError {
    /// The payload does not fit in 57 bits.
    ///
    /// `encode` silently drops the high bits of such a payload; `try_encode`
    /// rejects it instead so the caller learns that data would be lost.
    #[error("payload {payload:#x} does not fit in 57 bits")]
    PayloadOutOfRange { payload: u64 },

    /// The codeword carries two (or an even number of) flipped bits.
    ///
    /// The syndrome is nonzero while total parity is even, so no single bit
    /// flip can restore the word. The codeword is returned to the caller
    /// unmodified, who may log it, discard it or request a resend.
    #[error("uncorrectable codeword (syndrome {syndrome})")]
    Uncorrectable { syndrome: u32 },
}
