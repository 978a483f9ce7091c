const M1: u64 = 0x5555_5555_5555_5555;
const M2: u64 = 0x3333_3333_3333_3333;
const M4: u64 = 0x0F0F_0F0F_0F0F_0F0F;
const H01: u64 = 0x0101_0101_0101_0101;

/// True when `popcount` compiles to a dedicated instruction on this build.
pub const HARDWARE_POPCOUNT: bool = cfg!(all(
    not(feature = "soft_popcount"),
    any(
        all(target_arch = "x86_64", target_feature = "popcnt"),
        target_arch = "aarch64"
    )
));

/// Counts the set bits of `x`.
#[inline(always)]
pub fn popcount(x: u64) -> u32 {
    #[cfg(all(
        not(feature = "soft_popcount"),
        target_arch = "x86_64",
        target_feature = "popcnt"
    ))]
    {
        // SAFETY: the popcnt target feature is statically enabled for this build.
        unsafe { core::arch::x86_64::_popcnt64(x as i64) as u32 }
    }

    #[cfg(all(not(feature = "soft_popcount"), target_arch = "aarch64"))]
    {
        x.count_ones()
    }

    #[cfg(not(all(
        not(feature = "soft_popcount"),
        any(
            all(target_arch = "x86_64", target_feature = "popcnt"),
            target_arch = "aarch64"
        )
    )))]
    {
        popcount_swar(x)
    }
}

/// Portable SWAR population count.
///
/// Sums bit counts pairwise into 2-, 4- and 8-bit lanes, then folds the eight
/// byte counts into the top byte with a single multiply.
#[inline(always)]
pub const fn popcount_swar(mut x: u64) -> u32 {
    x -= (x >> 1) & M1;
    x = (x & M2) + ((x >> 2) & M2);
    x = (x + (x >> 4)) & M4;
    (x.wrapping_mul(H01) >> 56) as u32
}

/// Even-parity bit of `x`: 1 when the population count is odd.
#[inline(always)]
pub fn parity(x: u64) -> u64 {
    (popcount(x) & 1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swar_matches_count_ones_on_edges() {
        let samples = [
            0u64,
            1,
            u64::MAX,
            u64::MAX >> 1,
            1 << 63,
            0x8000_0000_0000_0001,
            0xAAAA_AAAA_AAAA_AAAA,
            0x5555_5555_5555_5555,
            0x0123_4567_89AB_CDEF,
            0x01FF_FFFF_FFFF_FFFF,
        ];
        for x in samples {
            assert_eq!(popcount_swar(x), x.count_ones(), "x = {x:#x}");
            assert_eq!(popcount(x), x.count_ones(), "x = {x:#x}");
        }
    }

    #[test]
    fn every_single_bit_counts_once() {
        for i in 0..64 {
            assert_eq!(popcount(1 << i), 1);
            assert_eq!(popcount_swar(!(1u64 << i)), 63);
        }
    }

    #[test]
    fn hardware_and_software_agree_on_walk() {
        let mut x: u64 = 0x9E37_79B9_7F4A_7C15;
        for _ in 0..10_000 {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            assert_eq!(popcount(x), popcount_swar(x));
        }
    }

    #[cfg(all(target_arch = "x86_64", not(feature = "soft_popcount")))]
    #[test]
    fn x86_64_builds_use_the_popcnt_instruction() {
        assert!(HARDWARE_POPCOUNT, "popcnt target feature not enabled");
        let mut x: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..10_000 {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            // SAFETY: HARDWARE_POPCOUNT implies the popcnt feature is enabled.
            let hw = unsafe { core::arch::x86_64::_popcnt64(x as i64) as u32 };
            assert_eq!(hw, popcount_swar(x));
            assert_eq!(popcount(x), hw);
        }
    }

    #[cfg(feature = "soft_popcount")]
    #[test]
    fn soft_feature_disables_hardware_path() {
        assert!(!HARDWARE_POPCOUNT);
    }

    #[test]
    fn parity_is_low_bit_of_count() {
        assert_eq!(parity(0), 0);
        assert_eq!(parity(0b1011), 1);
        assert_eq!(parity(u64::MAX), 0);
    }
}
