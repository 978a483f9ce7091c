//! In-place processing of block arrays.
//!
//! Blocks are independent, so callers are free to split an array into
//! disjoint chunks and process each chunk on its own thread. Reports from
//! separate chunks combine with [`BatchReport::merge`].

use crate::parity::encode;
use crate::syndrome::{Correction, apply, classify};

/// Per-outcome block counts produced by [`decode_slice`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub clean: usize,
    pub corrected: usize,
    pub uncorrectable: usize,
}

impl BatchReport {
    pub fn merge(self, other: Self) -> Self {
        Self {
            clean: self.clean + other.clean,
            corrected: self.corrected + other.corrected,
            uncorrectable: self.uncorrectable + other.uncorrectable,
        }
    }

    pub fn total(&self) -> usize {
        self.clean + self.corrected + self.uncorrectable
    }

    pub fn decoded(&self) -> usize {
        self.clean + self.corrected
    }
}

/// Replaces every payload in `blocks` with its codeword.
pub fn encode_slice(blocks: &mut [u64]) {
    for block in blocks.iter_mut() {
        *block = encode(*block);
    }
}

/// Replaces every codeword in `blocks` with its payload.
///
/// Uncorrectable blocks are left as codewords and their index within `blocks`
/// is passed to `on_failure` together with the syndrome.
pub fn decode_slice<F>(blocks: &mut [u64], mut on_failure: F) -> BatchReport
where
    F: FnMut(usize, u32),
{
    let mut report = BatchReport::default();
    for (i, block) in blocks.iter_mut().enumerate() {
        let correction = classify(*block);
        match correction {
            Correction::Clean => report.clean += 1,
            Correction::Corrected { .. } => report.corrected += 1,
            Correction::Uncorrectable { syndrome } => {
                report.uncorrectable += 1;
                on_failure(i, syndrome);
            }
        }
        apply(block, correction, true);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_round_trip_with_mixed_noise() {
        let payloads = [0u64, 1, 42, 0x01FF_FFFF_FFFF_FFFF, 0x0000_DEAD_BEEF_0000];
        let mut blocks = payloads;
        encode_slice(&mut blocks);

        blocks[1] ^= 1 << 9;
        blocks[3] ^= 1;
        blocks[4] ^= (1 << 12) | (1 << 50);
        let corrupted = blocks[4];

        let mut failures = [usize::MAX; 2];
        let mut seen = 0;
        let report = decode_slice(&mut blocks, |i, _| {
            failures[seen] = i;
            seen += 1;
        });

        assert_eq!(
            report,
            BatchReport {
                clean: 2,
                corrected: 2,
                uncorrectable: 1
            }
        );
        assert_eq!(seen, 1);
        assert_eq!(failures[0], 4);
        assert_eq!(&blocks[..4], &payloads[..4]);
        assert_eq!(blocks[4], corrupted);
    }

    #[test]
    fn slice_matches_per_block_decode() {
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        let mut blocks = [0u64; 512];
        for (i, block) in blocks.iter_mut().enumerate() {
            let word = encode(next() & secded_common::layout::PAYLOAD_MASK);
            let a = (next() % 64) as u32;
            let b = (next() % 64) as u32;
            *block = match i % 3 {
                0 => word,
                1 => word ^ (1 << a),
                _ => word ^ (1 << a) ^ (1 << b),
            };
        }

        let mut expected = blocks;
        let mut ok = [false; 512];
        for (word, ok) in expected.iter_mut().zip(ok.iter_mut()) {
            *ok = crate::syndrome::decode(word);
        }

        let mut failed = [false; 512];
        let report = decode_slice(&mut blocks, |i, _| failed[i] = true);

        assert_eq!(blocks, expected);
        for i in 0..512 {
            assert_eq!(failed[i], !ok[i], "block {i}");
        }
        assert_eq!(report.total(), 512);
        assert_eq!(report.uncorrectable, ok.iter().filter(|&&o| !o).count());
    }

    #[test]
    fn reports_merge() {
        let a = BatchReport {
            clean: 3,
            corrected: 1,
            uncorrectable: 0,
        };
        let b = BatchReport {
            clean: 0,
            corrected: 2,
            uncorrectable: 5,
        };
        let m = a.merge(b);
        assert_eq!(m.total(), 11);
        assert_eq!(m.decoded(), 6);
    }
}
