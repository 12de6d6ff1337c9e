//! Relay detection between anchors.
//!
//! Two consecutive anchors form a relay when at most `max_gap` cards separate them
//! (`next - anchor - 1 <= max_gap`). Chained payoffs feel rewarding, so relays earn a
//! bonus that grows with their number.

use crate::config::RelayBonus;

/// Number of adjacent anchor pairs separated by at most `max_gap` cards.
#[must_use]
pub fn relay_count(anchors: &[usize], max_gap: usize) -> usize {
    anchors
        .windows(2)
        .filter(|pair| pair[1] - pair[0] - 1 <= max_gap)
        .count()
}

/// Score bonus for `relay_count` relays.
#[must_use]
pub fn relay_bonus(relay_count: usize, bonus: &RelayBonus) -> i32 {
    match relay_count {
        0 => 0,
        1 => bonus.single,
        2 => bonus.double,
        _ => bonus.chain,
    }
}
