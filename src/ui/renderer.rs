/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into the `front` buffer
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// One maze cell spans `cell_w` terminal columns, scaled from the
/// configured pixel cell size.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::ThemeConfig;
use crate::domain::entity::{Pos, PursuerKind};
use crate::domain::tile::CellKind;
use crate::sim::world::WorldState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every cell, so gaps between rows match.
    const BASE_BG: Color = Color::Rgb { r: 10, g: 10, b: 20 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel that differs from any real cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Glyphs ──

/// Terminal columns per maze cell for a nominal pixel cell size.
pub fn cell_columns(cell_size: u32) -> usize {
    (cell_size / 12).clamp(1, 3) as usize
}

/// Glyph drawn in the first column of a maze cell plus the fill character
/// for the remaining columns.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Glyph {
    ch: char,
    fill: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    fn solo(ch: char, fg: Color) -> Self {
        Glyph { ch, fill: ' ', fg, bg: Color::Reset }
    }
}

fn pursuer_color(kind: PursuerKind, theme: &ThemeConfig) -> Color {
    match kind {
        PursuerKind::Direct => theme.blinky,
        PursuerKind::Ambush => theme.pinky,
        PursuerKind::Flank => theme.inky,
        PursuerKind::Patrol => theme.clyde,
    }
}

/// Maze layer only; markers draw as empty corridor.
fn tile_glyph(w: &WorldState, pos: Pos, theme: &ThemeConfig) -> Glyph {
    match w.grid.kind_at(pos) {
        CellKind::Wall => Glyph { ch: '█', fill: '█', fg: theme.wall, bg: Color::Reset },
        CellKind::SmallItem => Glyph::solo('·', theme.small_item),
        CellKind::LargeItem => Glyph::solo('●', theme.large_item),
        CellKind::Open
        | CellKind::GhostZone
        | CellKind::PlayerMarker
        | CellKind::BonusMarker => Glyph::solo(' ', Color::Reset),
    }
}

/// Actor layer in paint order: fruit, then player, then pursuers, so a
/// pursuer on the player's cell is the one that shows.
fn actor_glyphs(w: &WorldState, theme: &ThemeConfig) -> Vec<(Pos, Glyph)> {
    let mut out = Vec::with_capacity(6);
    if let Some(pos) = w.bonus.position() {
        out.push((pos, Glyph::solo(w.bonus.variant().glyph(), Color::Rgb { r: 255, g: 60, b: 60 })));
    }
    out.push((w.player.position, Glyph::solo('●', theme.player)));
    for p in &w.pursuers {
        out.push((p.position, Glyph::solo('Ω', pursuer_color(p.kind, theme))));
    }
    out
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    cell_w: usize,
    theme: ThemeConfig,
    /// Keyboard enhancement pushed at init; popped again at cleanup.
    key_release: bool,
}

impl Renderer {
    pub fn new(theme: ThemeConfig, cell_size: u32) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            cell_w: cell_columns(cell_size),
            theme,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        // Release events let held arrows stop the moment they are let go.
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.key_release = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.invalidate();
        Ok(())
    }

    /// Does the terminal report key releases?
    pub fn reports_key_release(&self) -> bool {
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &mut WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // HUD + gap above the maze; gap + message + gap + help below.
        let reserved_rows = MAP_ROW + 4;
        let (gh, gw) = (world.grid.height(), world.grid.width());
        world.camera.view_w = (self.term_w / self.cell_w).min(gw);
        world.camera.view_h = self.term_h.saturating_sub(reserved_rows).max(1).min(gh);
        let target = world.player.position;
        world.camera.follow(target, gh, gw);

        self.front.clear();
        self.compose_game(world);
        if world.outcome.is_terminal() {
            self.compose_outcome_overlay(world);
        } else if world.paused {
            self.compose_pause_overlay(world);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colours; ResetColor would fall back to the terminal default.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        let cam = w.camera.clone();

        // ── HUD row ──
        let hearts: String = "♥".repeat(w.player.lives() as usize);
        let fruit = if w.bonus.is_active() {
            format!("  {} out!", w.bonus.variant().name())
        } else {
            String::new()
        };
        let hud = format!(
            " Score:{:<6} Record:{:<6} Lives:{:<3} Left:{}/{}{}",
            w.player.score(), w.high_score(), hearts,
            w.ledger.small_remaining(), w.ledger.initial_small(), fruit,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Maze (camera viewport) ──
        for vr in 0..cam.view_h {
            let row = MAP_ROW + vr;
            if row >= self.front.height { break; }
            let wr = cam.row + vr as i32;
            for vc in 0..cam.view_w {
                let col = vc * self.cell_w;
                if col + self.cell_w > self.front.width { break; }
                let wc = cam.col + vc as i32;
                let glyph = if wr < 0 || wc < 0 || !w.grid.in_bounds(wr as usize, wc as usize) {
                    Glyph::solo(' ', Color::Reset)
                } else {
                    tile_glyph(w, Pos::new(wr as usize, wc as usize), &self.theme)
                };
                self.put_glyph(vr, vc, glyph);
            }
        }

        for (pos, glyph) in actor_glyphs(w, &self.theme) {
            if let Some((vr, vc)) = cam.world_to_view(pos) {
                self.put_glyph(vr, vc, glyph);
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + cam.view_h + 1;
        if msg_row < self.front.height && !w.message.is_empty() {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" {} ", w.message), Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + cam.view_h + 3;
        if help_row < self.front.height {
            let help = " Arrows/WASD:Move  Enter:Restart  F1:Pause  Esc:Quit  │  Pad: Start/Select";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Paint one maze cell at viewport `(vr, vc)`.
    fn put_glyph(&mut self, vr: usize, vc: usize, glyph: Glyph) {
        let (row, col) = (MAP_ROW + vr, vc * self.cell_w);
        if row >= self.front.height || col + self.cell_w > self.front.width { return; }
        self.front.set(col, row, Cell::new(glyph.ch, glyph.fg, glyph.bg));
        for k in 1..self.cell_w {
            self.front.set(col + k, row, Cell::new(glyph.fill, glyph.fg, glyph.bg));
        }
    }

    /// A centred box over the maze.
    fn compose_box(&mut self, w: &WorldState, lines: &[(&str, Color)], bg: Color) {
        let view_cols = w.camera.view_w * self.cell_w;
        let inner = lines.iter().map(|(s, _)| s.chars().count()).max().unwrap_or(0) + 4;
        let top = MAP_ROW + (w.camera.view_h / 2).saturating_sub(lines.len() / 2 + 1);
        let left = view_cols.saturating_sub(inner) / 2;

        for r in 0..lines.len() + 2 {
            for c in 0..inner {
                self.front.set(left + c, top + r, Cell::new(' ', Color::White, bg));
            }
        }
        for (i, (text, fg)) in lines.iter().enumerate() {
            let x = left + (inner - text.chars().count()) / 2;
            self.front.put_str(x, top + 1 + i, text, *fg, bg);
        }
    }

    fn compose_outcome_overlay(&mut self, w: &WorldState) {
        let score = format!("Score {}   Record {}", w.player.score(), w.high_score());
        let lines = [
            (w.outcome_text(), Color::Rgb { r: 255, g: 220, b: 50 }),
            (score.as_str(), Color::White),
            ("[Enter] Play again   [Esc] Quit", Color::Grey),
        ];
        self.compose_box(w, &lines, Color::Rgb { r: 30, g: 30, b: 80 });
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let lines = [("PAUSED   [F1] Resume", Color::White)];
        self.compose_box(w, &lines, Color::Rgb { r: 40, g: 40, b: 40 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::maze::TileGrid;

    fn world() -> WorldState {
        WorldState::with_grid(TileGrid::new(), Pos::new(26, 14), 15, 5)
    }

    fn theme() -> ThemeConfig {
        GameConfig::default().theme
    }

    #[test]
    fn cell_size_scales_to_columns() {
        assert_eq!(cell_columns(25), 2);
        assert_eq!(cell_columns(1), 1);
        assert_eq!(cell_columns(100), 3);
    }

    /// The glyph that ends up on top at `pos`.
    fn top_actor(w: &WorldState, pos: Pos) -> Option<Glyph> {
        actor_glyphs(w, &theme()).into_iter().rev().find(|(p, _)| *p == pos).map(|(_, g)| g)
    }

    #[test]
    fn pursuer_drawn_over_player() {
        let mut w = world();
        w.pursuers[2].position = w.player.position;
        let g = top_actor(&w, w.player.position).unwrap();
        assert_eq!(g.ch, 'Ω');
        assert_eq!(g.fg, theme().inky);
    }

    #[test]
    fn maze_cells_use_theme() {
        let w = world();
        let t = theme();
        assert_eq!(tile_glyph(&w, Pos::new(3, 1), &t).fill, '█');
        assert_eq!(tile_glyph(&w, Pos::new(4, 2), &t), Glyph::solo('·', t.small_item));
        assert_eq!(tile_glyph(&w, Pos::new(6, 2), &t), Glyph::solo('●', t.large_item));
        assert_eq!(tile_glyph(&w, Pos::new(26, 14), &t).ch, ' ');
        assert_eq!(top_actor(&w, Pos::new(26, 14)), Some(Glyph::solo('●', t.player)));
    }

    #[test]
    fn fruit_drawn_by_variant() {
        let mut w = world();
        w.pursuers.clear();
        let (at, fruit) = w.bonus.spawn(&mut w.grid, &mut w.rng, w.player_start).unwrap();
        assert_eq!(top_actor(&w, at).unwrap().ch, fruit.glyph());
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(3, 1);
        fb.put_str(1, 0, "abc", Color::White, Color::Reset);
        assert_eq!(fb.get(1, 0).ch, 'a');
        assert_eq!(fb.get(2, 0).ch, 'b');
        assert_eq!(fb.get(0, 0), Cell::BLANK);
    }
}
