use crate::SecdedError;
use crate::bit_utils::BitPack;
use crate::layout::unreposition;
use crate::popcount::parity;
use secded_common::layout::GROUP_MASKS;

/// Outcome of checking a codeword against the SEC-DED decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Even total parity and a zero syndrome.
    Clean,

    /// Odd total parity: exactly one bit is assumed flipped.
    ///
    /// `position` is the syndrome, i.e. the index of the bit to flip back.
    /// Position 0 means the extended parity bit itself was hit.
    Corrected { position: u32 },

    /// Even total parity with a nonzero syndrome: two bits are flipped.
    Uncorrectable { syndrome: u32 },
}

/// A successfully decoded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub payload: u64,
    /// Index of the bit that was flipped back, if any.
    pub corrected: Option<u32>,
}

/// Computes the 6-bit syndrome of a codeword.
///
/// Bit `k` of the result is the parity of parity group `k`, stored parity bit
/// included. For a word with exactly one flipped bit the value is the index
/// of that bit.
#[inline(always)]
pub fn find_error_position(word: u64) -> u32 {
    GROUP_MASKS
        .iter()
        .enumerate()
        .fold(0, |syndrome, (k, &mask)| {
            syndrome | (parity(word & mask) as u32) << k
        })
}

/// Classifies a codeword without modifying it.
#[inline(always)]
pub fn classify(word: u64) -> Correction {
    let syndrome = find_error_position(word);
    if parity(word) == 1 {
        Correction::Corrected { position: syndrome }
    } else if syndrome == 0 {
        Correction::Clean
    } else {
        Correction::Uncorrectable { syndrome }
    }
}

/// Applies an already computed classification to `word`.
///
/// Flips the located bit back for a single error and, when the word is
/// usable, gathers its payload. Uncorrectable words are left untouched.
#[inline(always)]
pub(crate) fn apply(word: &mut u64, correction: Correction, gather: bool) -> bool {
    match correction {
        Correction::Clean => {}
        Correction::Corrected { position } => BitPack::toggle(word, position),
        Correction::Uncorrectable { .. } => return false,
    }
    if gather {
        *word = unreposition(*word);
    }
    true
}

/// Repairs a codeword in place.
///
/// Returns `true` when the word was clean or had one bit flipped back, and
/// `false` when two flips were detected, in which case `word` is untouched.
#[inline(always)]
pub fn correct_block(word: &mut u64) -> bool {
    apply(word, classify(*word), false)
}

/// Decodes a codeword in place.
///
/// On success `word` is replaced by the recovered 57-bit payload. On failure
/// it still holds the corrupted codeword and must not be read as payload.
#[inline(always)]
pub fn decode(word: &mut u64) -> bool {
    apply(word, classify(*word), true)
}

/// Decodes a codeword by value, reporting uncorrectable words as an error.
pub fn try_decode(codeword: u64) -> Result<Decoded, SecdedError> {
    match classify(codeword) {
        Correction::Clean => Ok(Decoded {
            payload: unreposition(codeword),
            corrected: None,
        }),
        Correction::Corrected { position } => Ok(Decoded {
            payload: unreposition(BitPack::flipped(codeword, &[position])),
            corrected: Some(position),
        }),
        Correction::Uncorrectable { syndrome } => Err(SecdedError::Uncorrectable { syndrome }),
    }
}
