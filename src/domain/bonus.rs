/// BonusItem: the transient fruit.
///
/// At most one fruit is on the board. It appears when the small-item count
/// drops onto a milestone, sits on a random open corridor cell until the
/// player walks over it, and is cleared by a round reset.

use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;

use super::entity::Pos;
use super::maze::TileGrid;
use super::tile::CellKind;

/// Small-item counts that spawn a fruit, each once per round.
pub const MILESTONES: [u32; 2] = [176, 76];

pub const SPAWN_ROWS: RangeInclusive<usize> = 4..=33;
pub const SPAWN_COLS: RangeInclusive<usize> = 4..=26;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FruitKind {
    Cherry,
    Apple,
    Pear,
    Orange,
    Watermelon,
}

impl FruitKind {
    pub const ALL: [FruitKind; 5] = [
        FruitKind::Cherry,
        FruitKind::Apple,
        FruitKind::Pear,
        FruitKind::Orange,
        FruitKind::Watermelon,
    ];

    pub fn value(self) -> u32 {
        match self {
            FruitKind::Cherry => 20,
            FruitKind::Apple => 30,
            FruitKind::Pear => 40,
            FruitKind::Orange => 50,
            FruitKind::Watermelon => 60,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FruitKind::Cherry => "Cherry",
            FruitKind::Apple => "Apple",
            FruitKind::Pear => "Pear",
            FruitKind::Orange => "Orange",
            FruitKind::Watermelon => "Watermelon",
        }
    }

    /// Single-letter sprite handle for text front-ends.
    pub fn glyph(self) -> char {
        match self {
            FruitKind::Cherry => 'c',
            FruitKind::Apple => 'a',
            FruitKind::Pear => 'p',
            FruitKind::Orange => 'r',
            FruitKind::Watermelon => 'w',
        }
    }
}

#[derive(Clone, Debug)]
pub struct BonusItem {
    position: Pos,
    variant: FruitKind,
    active: bool,
    fired: [bool; MILESTONES.len()],
}

impl Default for BonusItem {
    fn default() -> Self {
        BonusItem::new()
    }
}

impl BonusItem {
    pub fn new() -> Self {
        BonusItem {
            position: Pos::default(),
            variant: FruitKind::Cherry,
            active: false,
            fired: [false; MILESTONES.len()],
        }
    }

    pub fn is_active(&self) -> bool { self.active }
    pub fn variant(&self) -> FruitKind { self.variant }

    /// Where the fruit sits, if it is on the board.
    pub fn position(&self) -> Option<Pos> {
        self.active.then_some(self.position)
    }

    /// Called after each small item is eaten with the new remaining count.
    /// Spawns a fruit when the count lands on an unfired milestone.
    /// A milestone reached while a fruit is already out is spent anyway.
    pub fn on_small_consumed<R: Rng + ?Sized>(
        &mut self,
        remaining: u32,
        grid: &mut TileGrid,
        rng: &mut R,
        avoid: Pos,
    ) -> Option<(Pos, FruitKind)> {
        let idx = MILESTONES.iter().position(|&m| m == remaining)?;
        if self.fired[idx] { return None; }
        self.fired[idx] = true;
        if self.active { return None; }
        self.spawn(grid, rng, avoid)
    }

    /// Place a random fruit on a random open cell of the spawn window,
    /// never on `avoid` (the player's start cell).
    /// None if the window has no candidate.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        grid: &mut TileGrid,
        rng: &mut R,
        avoid: Pos,
    ) -> Option<(Pos, FruitKind)> {
        let mut candidates = grid.open_cells_in(SPAWN_ROWS, SPAWN_COLS);
        candidates.retain(|&p| p != avoid);
        let &pos = candidates.choose(rng)?;
        let &kind = FruitKind::ALL.choose(rng)?;
        grid.set_kind(pos, CellKind::BonusMarker);
        self.position = pos;
        self.variant = kind;
        self.active = true;
        Some((pos, kind))
    }

    /// Take the fruit if it is active and at `pos`.
    pub fn collect(&mut self, pos: Pos) -> Option<FruitKind> {
        if self.active && self.position == pos {
            self.active = false;
            Some(self.variant)
        } else {
            None
        }
    }

    /// Clear the fruit and re-arm every milestone.
    pub fn reset(&mut self) {
        self.active = false;
        self.fired = [false; MILESTONES.len()];
    }
}
