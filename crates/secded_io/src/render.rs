use bitvec::prelude::*;
use secded_core::layout::is_parity_position;

/// Renders a codeword as eight rows of eight bits, position 0 first.
///
/// With `mask_parity` set, the seven reserved positions are shown as `#` so
/// only the payload bits are visible.
pub fn render_block(word: u64, mask_parity: bool) -> String {
    let bits = word.view_bits::<Lsb0>();
    let mut out = String::with_capacity(64 * 2 + 8);

    for (row, chunk) in bits.chunks(8).enumerate() {
        for (col, bit) in chunk.iter().enumerate() {
            let index = (row * 8 + col) as u32;
            if mask_parity && is_parity_position(index) {
                out.push('#');
            } else {
                out.push(if *bit { '1' } else { '0' });
            }
            out.push(' ');
        }
        out.pop();
        out.push('\n');
    }
    out
}

/// Renders the low `width` bits of `value`, least significant first.
pub fn render_bits(value: u64, width: usize) -> String {
    value.view_bits::<Lsb0>()[..width.min(64)]
        .iter()
        .map(|bit| if *bit { '1' } else { '0' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_eight_rows() {
        let grid = render_block(0b1001, false);
        let rows: Vec<&str> = grid.lines().collect();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0], "1 0 0 1 0 0 0 0");
        assert!(rows[1..].iter().all(|r| *r == "0 0 0 0 0 0 0 0"));
    }

    #[test]
    fn parity_positions_are_masked() {
        let grid = render_block(u64::MAX, true);
        let rows: Vec<&str> = grid.lines().collect();
        assert_eq!(rows[0], "# # # 1 # 1 1 1");
        assert_eq!(rows[1], "# 1 1 1 1 1 1 1");
        assert_eq!(rows[2], "# 1 1 1 1 1 1 1");
        assert_eq!(rows[4], "# 1 1 1 1 1 1 1");
        assert_eq!(grid.matches('#').count(), 7);
    }

    #[test]
    fn binary_is_lsb_first() {
        assert_eq!(render_bits(0b110, 4), "0110");
        assert_eq!(render_bits(u64::MAX, 64).len(), 64);
    }
}
