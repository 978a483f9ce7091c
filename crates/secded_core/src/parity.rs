use crate::SecdedError;
use crate::layout::reposition;
use crate::popcount::parity;
use secded_common::layout::{GROUP_MASKS, PAYLOAD_MASK, PAYLOAD_POSITION_MASK};

/// Fills in all seven parity bits of a codeword.
///
/// Each positional bit `1 << k` receives the parity of its group, then bit 0
/// receives the parity of the whole word so the total population count is
/// even. The extended bit must be written last because it covers the six
/// positional bits. Reserved positions are cleared before computing, so a
/// word that still carries stale parity is re-encoded from its payload bits.
#[inline(always)]
pub fn set_parity(word: u64) -> u64 {
    let mut word = word & PAYLOAD_POSITION_MASK;
    for (k, &mask) in GROUP_MASKS.iter().enumerate() {
        word |= parity(word & mask) << (1u32 << k);
    }
    word | parity(word)
}

/// Encodes a 57-bit payload into a codeword.
///
/// Bits 57 and above are dropped without notice; use [`try_encode`] when the
/// payload is not known to be in range.
#[inline(always)]
pub fn encode(payload: u64) -> u64 {
    set_parity(reposition(payload))
}

/// Encodes a payload, rejecting values that do not fit in 57 bits.
pub fn try_encode(payload: u64) -> Result<u64, SecdedError> {
    if payload > PAYLOAD_MASK {
        return Err(SecdedError::PayloadOutOfRange { payload });
    }
    Ok(encode(payload))
}
