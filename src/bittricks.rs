/*!
Node mask arithmetic.

A node mask selects nodes of a linked adapter, one bit per node.
*/

/// True when exactly one bit is set.
pub const fn has_single_bit(mask: u32) -> bool {
    mask != 0 && mask & (mask - 1) == 0
}

/// Index of the lowest set bit.  Masks of zero map to node 0.
pub const fn node_index(mask: u32) -> usize {
    if mask == 0 {
        0
    } else {
        mask.trailing_zeros() as usize
    }
}

/// `0` means "the default node", which is node 0.
pub const fn normalize(mask: u32) -> u32 {
    if mask == 0 { 1 } else { mask }
}

/// True when every bit of `mask` names one of `node_count` nodes.
pub const fn fits_nodes(mask: u32, node_count: u8) -> bool {
    if node_count >= 32 {
        return true;
    }
    (mask as u64) < (1u64 << node_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bit() {
        assert!(has_single_bit(1));
        assert!(has_single_bit(0b100));
        assert!(!has_single_bit(0));
        assert!(!has_single_bit(0b11));
    }

    #[test]
    fn nodes() {
        assert_eq!(node_index(0), 0);
        assert_eq!(node_index(0b100), 2);
        assert_eq!(normalize(0), 1);
        assert!(fits_nodes(0b1, 1));
        assert!(!fits_nodes(0b10, 1));
        assert!(fits_nodes(0b11, 2));
    }
}
