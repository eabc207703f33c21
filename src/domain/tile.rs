/// Cell kinds and their properties.
/// Passability is derived from the kind, never set independently,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellKind {
    Wall,
    #[default]
    Open,
    SmallItem,    // 'o' pellet
    LargeItem,    // 'O' energizer
    PlayerMarker, // player's committed cell
    BonusMarker,  // active fruit
    GhostZone,    // open but never used for spawning
}

impl CellKind {
    /// Template character → kind. Unknown characters read as open corridor.
    pub fn from_char(ch: char) -> Self {
        match ch {
            'X' => CellKind::Wall,
            'o' => CellKind::SmallItem,
            'O' => CellKind::LargeItem,
            'n' => CellKind::GhostZone,
            'P' => CellKind::PlayerMarker,
            'F' => CellKind::BonusMarker,
            _ => CellKind::Open,
        }
    }

    #[cfg(test)]
    pub fn to_char(self) -> char {
        match self {
            CellKind::Wall => 'X',
            CellKind::Open => ' ',
            CellKind::SmallItem => 'o',
            CellKind::LargeItem => 'O',
            CellKind::PlayerMarker => 'P',
            CellKind::BonusMarker => 'F',
            CellKind::GhostZone => 'n',
        }
    }

    pub fn is_wall(self) -> bool {
        matches!(self, CellKind::Wall)
    }
}

/// One grid cell. `passable` is always `!kind.is_wall()`; build cells
/// through `Cell::new` to keep that true.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub kind: CellKind,
    pub passable: bool,
}

impl Cell {
    pub fn new(kind: CellKind) -> Self {
        Cell { kind, passable: !kind.is_wall() }
    }

    pub fn open() -> Self {
        Cell::new(CellKind::Open)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::open()
    }
}

impl From<CellKind> for Cell {
    fn from(kind: CellKind) -> Self {
        Cell::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_is_never_passable() {
        assert!(!Cell::new(CellKind::Wall).passable);
    }

    #[test]
    fn every_other_kind_is_passable() {
        for kind in [
            CellKind::Open,
            CellKind::SmallItem,
            CellKind::LargeItem,
            CellKind::PlayerMarker,
            CellKind::BonusMarker,
            CellKind::GhostZone,
        ] {
            assert!(Cell::new(kind).passable, "{kind:?} should be passable");
        }
    }

    #[test]
    fn template_chars_map_both_ways() {
        for ch in ['X', ' ', 'o', 'O', 'n', 'P', 'F'] {
            assert_eq!(CellKind::from_char(ch).to_char(), ch);
        }
        assert_eq!(CellKind::from_char('?'), CellKind::Open);
        assert_eq!(CellKind::default(), CellKind::Open);
        assert!(Cell::default().passable);
    }
}
