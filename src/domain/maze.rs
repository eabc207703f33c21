/// TileGrid: the maze topology plus runtime markers.
///
/// ## Two layers
///
///   - `base`  — cell kinds as parsed from the layout. **Never mutated.**
///   - `cells` — the effective grid (base + eaten items, player/bonus markers).
///
/// `rebuild()` resets `cells` from `base`, recomputing passability strictly
/// from wall / non-wall. All runtime mutation goes through `set_tile()` /
/// `set_kind()`.
///
/// ## Wrap corridor
///
/// One row (17 in the reference maze) carries the side tunnel. Its two inner
/// cells, columns 1 and W-2, teleport into each other. No other row wraps.

use std::ops::RangeInclusive;

use super::entity::{Direction, Pos};
use super::tile::{Cell, CellKind};

pub const HEIGHT: usize = 35;
pub const WIDTH: usize = 30;
pub const WRAP_ROW: usize = 17;

/// Reference maze. `X` wall, ` ` corridor, `o` small item, `O` large item,
/// `n` ghost-home zone (open, never a spawn target).
const LAYOUT: [&str; HEIGHT] = [
    "                              ",
    "                              ",
    "                              ",
    " XXXXXXXXXXXXXXXXXXXXXXXXXXXX ",
    " XooooooooooooXXooooooooooooX ",
    " XoXXXXoXXXXXoXXoXXXXXoXXXXoX ",
    " XOXXXXoXXXXXoXXoXXXXXoXXXXOX ",
    " XoXXXXoXXXXXoXXoXXXXXoXXXXoX ",
    " XooooooooooooooooooooooooooX ",
    " XoXXXXoXXoXXXXXXXXoXXoXXXXoX ",
    " XoXXXXoXXoXXXXXXXXoXXoXXXXoX ",
    " XooooooXXooooXXooooXXooooooX ",
    " XXXXXXoXXXXX XX XXXXXoXXXXXX ",
    " nnnnnXoXXXXX XX XXXXXoXnnnnn ",
    " nnnnnXoXX          XXoXnnnnn ",
    " nnnnnXoXX XXXXXXXX XXoXnnnnn ",
    " XXXXXXoXX XnnnnnnX XXoXXXXXX ",
    "       o   XnnnnnnX   o       ",
    " XXXXXXoXX XnnnnnnX XXoXXXXXX ",
    " nnnnnXoXX XXXXXXXX XXoXnnnnn ",
    " nnnnnXoXX          XXoXnnnnn ",
    " nnnnnXoXX XXXXXXXX XXoXnnnnn ",
    " XXXXXXoXX XXXXXXXX XXoXXXXXX ",
    " XooooooooooooXXooooooooooooX ",
    " XoXXXXoXXXXXoXXoXXXXXoXXXXoX ",
    " XoXXXXoXXXXXoXXoXXXXXoXXXXoX ",
    " XOooXXooooooooooooooooXXooOX ",
    " XXXoXXoXXoXXXXXXXXoXXoXXoXXX ",
    " XXXoXXoXXoXXXXXXXXoXXoXXoXXX ",
    " XooooooXXooooXXooooXXooooooX ",
    " XoXXXXXXXXXXoXXoXXXXXXXXXXoX ",
    " XoXXXXXXXXXXoXXoXXXXXXXXXXoX ",
    " XooooooooooooooooooooooooooX ",
    " XXXXXXXXXXXXXXXXXXXXXXXXXXXX ",
    "                              ",
];

#[derive(Clone, Debug)]
pub struct TileGrid {
    base: Vec<Vec<CellKind>>,
    cells: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
    wrap_row: Option<usize>,
}

// ── Construction ──

impl TileGrid {
    /// The reference 35×30 maze.
    pub fn new() -> Self {
        let grid = TileGrid::from_rows(&LAYOUT).with_wrap_row(WRAP_ROW);
        debug_assert_eq!((grid.height, grid.width), (HEIGHT, WIDTH));
        grid
    }

    /// Parse a layout from character rows. Short rows are padded with corridor.
    /// No wrap row is set; see `with_wrap_row`.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut base = vec![vec![CellKind::Open; width]; height];
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().enumerate() {
                base[r][c] = CellKind::from_char(ch);
            }
        }
        let mut grid = TileGrid { base, cells: vec![], width, height, wrap_row: None };
        grid.rebuild();
        grid
    }

    pub fn with_wrap_row(mut self, row: usize) -> Self {
        debug_assert!(row < self.height, "wrap row {row} outside grid");
        self.wrap_row = Some(row);
        self
    }

    /// Reset every cell from the base layout. Drops all runtime markers.
    pub fn rebuild(&mut self) {
        self.cells = self.base.iter()
            .map(|row| row.iter().map(|&k| Cell::new(k)).collect())
            .collect();
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        TileGrid::new()
    }
}

// ── Queries ──

impl TileGrid {
    #[inline]
    pub fn width(&self) -> usize { self.width }

    #[inline]
    pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    /// Cell at (row, col). Out of range is a programming error.
    #[inline]
    pub fn tile_at(&self, row: usize, col: usize) -> Cell {
        debug_assert!(self.in_bounds(row, col), "tile_at({row}, {col}) out of bounds");
        self.cells[row][col]
    }

    #[inline]
    pub fn kind_at(&self, pos: Pos) -> CellKind {
        self.tile_at(pos.row, pos.col).kind
    }

    #[inline]
    pub fn is_passable(&self, row: usize, col: usize) -> bool {
        self.tile_at(row, col).passable
    }

    /// Number of cells currently holding `kind`.
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().flatten().filter(|c| c.kind == kind).count()
    }

    /// Number of cells holding `kind` in the base layout.
    pub fn base_count(&self, kind: CellKind) -> usize {
        self.base.iter().flatten().filter(|&&k| k == kind).count()
    }

    /// All cells of `kind` inside the given window (clamped to the grid).
    pub fn cells_in(
        &self,
        kind: CellKind,
        rows: RangeInclusive<usize>,
        cols: RangeInclusive<usize>,
    ) -> Vec<Pos> {
        let mut out = Vec::new();
        if self.height == 0 || self.width == 0 { return out; }
        let r_end = (*rows.end()).min(self.height - 1);
        let c_end = (*cols.end()).min(self.width - 1);
        for row in *rows.start()..=r_end {
            for col in *cols.start()..=c_end {
                if self.cells[row][col].kind == kind {
                    out.push(Pos::new(row, col));
                }
            }
        }
        out
    }

    /// Open corridor cells inside the window; bonus placement candidates.
    pub fn open_cells_in(&self, rows: RangeInclusive<usize>, cols: RangeInclusive<usize>) -> Vec<Pos> {
        self.cells_in(CellKind::Open, rows, cols)
    }

    pub fn wrap_row(&self) -> Option<usize> {
        self.wrap_row
    }

    /// Inner wrap cells `(left, right)`, if this grid has a wrap row.
    pub fn wrap_cells(&self) -> Option<(Pos, Pos)> {
        let row = self.wrap_row?;
        if self.width < 3 { return None; }
        Some((Pos::new(row, 1), Pos::new(row, self.width - 2)))
    }

    /// Tunnel exit when leaving `pos` along `dir`, if `pos` is a wrap cell
    /// facing outward.
    pub fn wrap_target(&self, pos: Pos, dir: Direction) -> Option<Pos> {
        let (left, right) = self.wrap_cells()?;
        match dir {
            Direction::Left if pos == left => Some(right),
            Direction::Right if pos == right => Some(left),
            _ => None,
        }
    }
}

// ── Mutation ──

impl TileGrid {
    pub fn set_tile(&mut self, row: usize, col: usize, cell: Cell) {
        debug_assert!(self.in_bounds(row, col), "set_tile({row}, {col}) out of bounds");
        debug_assert_eq!(cell.passable, !cell.kind.is_wall(), "passability must follow kind");
        self.cells[row][col] = cell;
    }

    /// Set a cell's kind; passability is recomputed from it.
    #[inline]
    pub fn set_kind(&mut self, pos: Pos, kind: CellKind) {
        self.set_tile(pos.row, pos.col, Cell::new(kind));
    }

    /// Render the effective grid back to template characters.
    #[cfg(test)]
    pub fn to_rows(&self) -> Vec<String> {
        self.cells.iter()
            .map(|row| row.iter().map(|c| c.kind.to_char()).collect())
            .collect()
    }
}
