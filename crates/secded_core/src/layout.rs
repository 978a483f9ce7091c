//! Payload placement inside a codeword.
//!
//! Payload bit `i` lands on the `i`-th position that is not reserved for
//! parity. The reserved positions 0, 1, 2, 4, 8, 16 and 32 split the word
//! into runs of 1, 3, 7, 15 and 31 payload bits, so the scatter and gather
//! are five mask-and-shift terms each.

use crate::popcount::popcount;
use secded_common::layout::{BLOCK_BITS, PAYLOAD_BITS};

/// Codeword index of each payload bit, in payload order.
pub const PAYLOAD_POSITIONS: [u8; PAYLOAD_BITS as usize] = payload_positions();

const fn payload_positions() -> [u8; PAYLOAD_BITS as usize] {
    let mut table = [0u8; PAYLOAD_BITS as usize];
    let mut next = 0;
    let mut index = 0u32;
    while index < BLOCK_BITS {
        if index.count_ones() > 1 {
            table[next] = index as u8;
            next += 1;
        }
        index += 1;
    }
    table
}

/// True when `index` is reserved for parity (zero or a power of two).
#[inline(always)]
pub fn is_parity_position(index: u32) -> bool {
    popcount(index as u64) <= 1
}

/// Scatters the low 57 bits of `payload` into the payload positions.
///
/// Parity positions are left at zero. Bits 57 and above are dropped.
#[inline(always)]
pub fn reposition(payload: u64) -> u64 {
    (payload & 0x0000_0001u64) << 3 // skip 0, 1, 2
        | (payload & (0x0000_0007u64 << 1)) << 4 // skip 4
        | (payload & (0x0000_007Fu64 << 4)) << 5 // skip 8
        | (payload & (0x0000_7FFFu64 << 11)) << 6 // skip 16
        | (payload & (0x7FFF_FFFFu64 << 26)) << 7 // skip 32
}

/// Gathers the payload positions of `word` back into a dense 57-bit value.
#[inline(always)]
pub fn unreposition(word: u64) -> u64 {
    (word & (0x0000_0001u64 << 3)) >> 3
        | (word & (0x0000_0007u64 << 5)) >> 4
        | (word & (0x0000_007Fu64 << 9)) >> 5
        | (word & (0x0000_7FFFu64 << 17)) >> 6
        | (word & (0x7FFF_FFFFu64 << 33)) >> 7
}
