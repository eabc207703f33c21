/// ConsumableLedger: remaining item counts and their point values.
///
/// Counters only move down inside a round. `reset()` is reserved for the
/// round controller. Large items do not gate the win: the round is cleared
/// when the small counter hits zero.

use super::maze::TileGrid;
use super::tile::CellKind;

pub const SMALL_VALUE: u32 = 5;
pub const LARGE_VALUE: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumableLedger {
    small_remaining: u32,
    large_remaining: u32,
    small_value: u32,
    large_value: u32,
    initial_small: u32,
}

impl ConsumableLedger {
    pub fn new(small: u32, large: u32) -> Self {
        ConsumableLedger {
            small_remaining: small,
            large_remaining: large,
            small_value: SMALL_VALUE,
            large_value: LARGE_VALUE,
            initial_small: small,
        }
    }

    /// Counts taken from the grid's base layout.
    pub fn from_layout(grid: &TileGrid) -> Self {
        ConsumableLedger::new(
            grid.base_count(CellKind::SmallItem) as u32,
            grid.base_count(CellKind::LargeItem) as u32,
        )
    }

    pub fn reset(&mut self, small: u32, large: u32) {
        self.small_remaining = small;
        self.large_remaining = large;
        self.initial_small = small;
    }

    /// Returns the new small count.
    pub fn decrease_small(&mut self) -> u32 {
        self.small_remaining = self.small_remaining.saturating_sub(1);
        self.small_remaining
    }

    /// Returns the new large count.
    pub fn decrease_large(&mut self) -> u32 {
        self.large_remaining = self.large_remaining.saturating_sub(1);
        self.large_remaining
    }

    pub fn small_remaining(&self) -> u32 { self.small_remaining }
    pub fn large_remaining(&self) -> u32 { self.large_remaining }
    pub fn small_value(&self) -> u32 { self.small_value }
    pub fn large_value(&self) -> u32 { self.large_value }
    /// Small count at the last reset; the HUD shows progress against it.
    pub fn initial_small(&self) -> u32 { self.initial_small }

    /// Items that still gate the win. Large items are not counted.
    pub fn total_remaining(&self) -> u32 {
        self.small_remaining
    }

    pub fn is_cleared(&self) -> bool {
        self.total_remaining() == 0
    }

    /// Does every counter match the grid's current cell counts?
    pub fn matches_grid(&self, grid: &TileGrid) -> bool {
        grid.count(CellKind::SmallItem) as u32 == self.small_remaining
            && grid.count(CellKind::LargeItem) as u32 == self.large_remaining
    }
}
