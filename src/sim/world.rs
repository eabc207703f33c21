/// WorldState: everything the round controller owns.
///
/// ## Ownership
///
///   - `grid`    — the maze. Player and bonus mutate cells through the
///                 grid's API; only `step::reset_round` rebuilds it wholesale.
///   - `ledger`  — remaining items. Only decremented inside a round.
///   - `player`, `pursuers`, `bonus` — the actors.
///
/// The high score survives round resets and is only written on a terminal
/// outcome.
///
/// ## Camera / Viewport
///
/// World coordinates and screen coordinates are separate:
///   - `camera` — viewport into the maze (top-left cell + size)
///   - Renderer maps: `screen(sr, sc) = world(camera.row + sr, camera.col + sc)`
///   - Mazes smaller than the viewport are centered

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::domain::bonus::BonusItem;
use crate::domain::entity::{Player, Pos, Pursuer};
use crate::domain::ledger::ConsumableLedger;
use crate::domain::maze::TileGrid;
use crate::domain::rules::Outcome;

/// Camera: a viewport into the maze.
///
/// `(row, col)` is the world cell shown at the top-left of the viewport.
/// `(view_h, view_w)` is how many cells fit; set by the renderer.
#[derive(Clone, Debug, Default)]
pub struct Camera {
    /// Can be negative when centering a small maze.
    pub row: i32,
    pub col: i32,
    pub view_h: usize,
    pub view_w: usize,
}

impl Camera {
    pub fn new() -> Self {
        Camera::default()
    }

    /// Keep `target` inside the viewport, scrolling only when it nears
    /// an edge (20% margin on each side).
    pub fn follow(&mut self, target: Pos, world_h: usize, world_w: usize) {
        if self.view_w == 0 || self.view_h == 0 { return; }
        self.row = follow_axis(self.row, target.row as i32, self.view_h, world_h);
        self.col = follow_axis(self.col, target.col as i32, self.view_w, world_w);
    }

    /// Convert a world cell to viewport coordinates, if visible.
    pub fn world_to_view(&self, pos: Pos) -> Option<(usize, usize)> {
        let vr = pos.row as i32 - self.row;
        let vc = pos.col as i32 - self.col;
        if vr >= 0 && vr < self.view_h as i32 && vc >= 0 && vc < self.view_w as i32 {
            Some((vr as usize, vc as usize))
        } else {
            None
        }
    }
}

fn follow_axis(origin: i32, target: i32, view: usize, world: usize) -> i32 {
    let view = view as i32;
    let world = world as i32;
    if world <= view {
        return -((view - world) / 2);
    }
    let margin = view / 5;
    let mut origin = origin;
    if target < origin + margin {
        origin = target - margin;
    } else if target > origin + view - margin - 1 {
        origin = target - view + margin + 1;
    }
    origin.max(0).min(world - view)
}

pub struct WorldState {
    // ── Board ──
    pub grid: TileGrid,
    pub ledger: ConsumableLedger,
    pub bonus: BonusItem,

    // ── Actors ──
    pub player: Player,
    /// Update order: Direct, Ambush, Flank, Patrol.
    pub pursuers: Vec<Pursuer>,

    // ── Round ──
    pub outcome: Outcome,
    pub tick: u64,
    pub move_threshold: u32,
    pub player_start: Pos,
    high_score: u32,
    pub(crate) rng: StdRng,

    // ── UI ──
    pub paused: bool,
    pub message: String,
    pub message_timer: u32,
    pub camera: Camera,
}

// ── Construction ──

impl WorldState {
    /// The reference maze, set up from config and ready to play.
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.game.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        WorldState::build(TileGrid::new(), config.game.player_start, config.speed.move_threshold, rng)
    }

    /// Any maze, with a fixed seed. Pursuers keep their reference homes
    /// unless moved afterwards.
    #[cfg(test)]
    pub fn with_grid(grid: TileGrid, start: Pos, move_threshold: u32, seed: u64) -> Self {
        WorldState::build(grid, start, move_threshold, StdRng::seed_from_u64(seed))
    }

    fn build(grid: TileGrid, start: Pos, move_threshold: u32, rng: StdRng) -> Self {
        debug_assert!(grid.in_bounds(start.row, start.col), "start {start:?} outside grid");
        let ledger = ConsumableLedger::from_layout(&grid);
        let mut world = WorldState {
            grid,
            ledger,
            bonus: BonusItem::new(),
            player: Player::new(start),
            pursuers: Pursuer::roster(),
            outcome: Outcome::InProgress,
            tick: 0,
            move_threshold,
            player_start: start,
            high_score: 0,
            rng,
            paused: false,
            message: String::new(),
            message_timer: 0,
            camera: Camera::new(),
        };
        super::step::reset_round(&mut world);
        world
    }
}

// ── Read-only views ──

impl WorldState {
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Fold the current score into the high score.
    pub(crate) fn record_high_score(&mut self) {
        self.high_score = self.high_score.max(self.player.score());
    }

    pub fn outcome_text(&self) -> &'static str {
        self.outcome.text()
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the transient message; clears it on expiry.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
    }
}
