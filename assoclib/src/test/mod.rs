mod tests;
mod policies;
mod simulator;

use crate::config::Geometry;

/// 16 bit addresses, 32 bit data, 4 ways of 64 lines: 6 index bits and 10 tag bits
pub(crate) fn four_way() -> Geometry {
    Geometry::new(16, 32, 4, 256).unwrap()
}

/// Address with the given tag and index in `four_way`
pub(crate) fn address(tag: u64, index: u64) -> u64 {
    (tag << 6) | index
}
