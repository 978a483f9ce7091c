pub struct BitPack;

impl BitPack {
    #[inline(always)]
    pub fn get(word: u64, index: u32) -> bool {
        (word >> index) & 1 == 1
    }

    #[inline(always)]
    pub fn toggle(word: &mut u64, index: u32) {
        *word ^= 1 << index;
    }

    #[inline(always)]
    pub fn set(word: &mut u64, index: u32, val: bool) {
        if val {
            *word |= 1 << index;
        } else {
            *word &= !(1 << index);
        }
    }

    /// Returns `word` with every listed position flipped once.
    #[inline(always)]
    pub fn flipped(word: u64, positions: &[u32]) -> u64 {
        positions.iter().fold(word, |acc, &p| acc ^ (1 << p))
    }
}

#[cfg(test)]
mod tests {
    use super::BitPack;

    #[test]
    fn toggle_twice_restores() {
        let mut w = 0x1234_5678_9ABC_DEF0u64;
        BitPack::toggle(&mut w, 17);
        assert!(BitPack::get(w, 17) != BitPack::get(0x1234_5678_9ABC_DEF0, 17));
        BitPack::toggle(&mut w, 17);
        assert_eq!(w, 0x1234_5678_9ABC_DEF0);
    }

    #[test]
    fn set_and_clear() {
        let mut w = 0u64;
        BitPack::set(&mut w, 63, true);
        assert_eq!(w, 1 << 63);
        BitPack::set(&mut w, 63, false);
        assert_eq!(w, 0);
    }

    #[test]
    fn flipped_applies_each_position() {
        assert_eq!(BitPack::flipped(0, &[0, 1, 63]), 0x8000_0000_0000_0003);
        assert_eq!(BitPack::flipped(0b11, &[0, 1]), 0);
    }
}
