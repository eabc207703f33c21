/// Entities: Player and Pursuer, plus the coordinate and direction types
/// they share. Movement methods live here; the legality checks they call
/// are the pure functions in `rules`.

use super::ai;
use super::bonus::{BonusItem, FruitKind};
use super::ledger::ConsumableLedger;
use super::maze::TileGrid;
use super::rules;
use super::tile::CellKind;

pub const START_LIVES: u32 = 3;

// ── Coordinates ──

/// A cell on the grid, `(row, col)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Pos { row, col }
    }

    pub fn to_goal(self) -> Goal {
        Goal { row: self.row as i32, col: self.col as i32 }
    }
}

/// A steering target. Unclamped: may lie off the grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Goal {
    pub row: i32,
    pub col: i32,
}

impl Goal {
    pub const fn new(row: i32, col: i32) -> Self {
        Goal { row, col }
    }

    /// `self + n * dir`
    pub fn offset(self, dir: Direction, n: i32) -> Goal {
        let (dr, dc) = dir.delta();
        Goal { row: self.row + dr * n, col: self.col + dc * n }
    }

    pub fn distance(self, other: Goal) -> f32 {
        let dr = (self.row - other.row) as f32;
        let dc = (self.col - other.col) as f32;
        (dr * dr + dc * dc).sqrt()
    }
}

// ── Direction ──

/// Ordinals match the reference encoding: Up=0, Down=1, Left=2, Right=3.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// `(d_row, d_col)`
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

// ── Player ──

/// What the player picked up on a committed move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pickup {
    Small,
    Large,
    Bonus(FruitKind),
}

/// Result of one `Player::advance` call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PlayerStep {
    pub from: Pos,
    pub to: Pos,
    pub pickup: Option<Pickup>,
}

impl PlayerStep {
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub position: Pos,
    /// Provisional cell chosen by the latest accepted input; becomes
    /// `position` once validated.
    pub pending_position: Pos,
    pub tick_counter: u32,
    pub pending_direction: Direction,
    start: Pos,
    score: u32,
    lives: u32,
}

impl Player {
    pub fn new(start: Pos) -> Self {
        Player {
            position: start,
            pending_position: start,
            tick_counter: 0,
            pending_direction: Direction::Right,
            start,
            score: 0,
            lives: START_LIVES,
        }
    }

    pub fn start(&self) -> Pos { self.start }
    pub fn score(&self) -> u32 { self.score }
    pub fn lives(&self) -> u32 { self.lives }

    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Returns lives left.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    #[cfg(test)]
    pub fn set_lives(&mut self, lives: u32) {
        self.lives = lives;
    }

    /// Back to the start cell, facing right. Score and lives are kept.
    pub fn reset_to_start(&mut self) {
        self.position = self.start;
        self.pending_position = self.start;
        self.pending_direction = Direction::Right;
        self.tick_counter = 0;
    }

    pub fn reset_stats(&mut self) {
        self.score = 0;
        self.lives = START_LIVES;
    }

    /// Full round reset: new start cell, zero score, full lives.
    pub fn reset(&mut self, start: Pos) {
        self.start = start;
        self.reset_to_start();
        self.reset_stats();
    }

    /// The cell the player is about to enter along its pending direction
    /// (plain step, no wrap).
    pub fn next_cell(&self) -> Goal {
        self.position.to_goal().offset(self.pending_direction, 1)
    }

    /// One tick of player movement.
    ///
    ///   1. Accept `input` if the pending cell's neighbour is open.
    ///   2. Count the tick; displace only on the threshold tick.
    ///   3. Commit the displaced cell: eat, collect, re-mark the grid.
    pub fn advance(
        &mut self,
        input: Option<Direction>,
        grid: &mut TileGrid,
        ledger: &mut ConsumableLedger,
        bonus: &mut BonusItem,
        move_threshold: u32,
    ) -> PlayerStep {
        let from = self.position;

        if let Some(dir) = input {
            if rules::accepts_turn(grid, self.pending_position, dir) {
                self.pending_direction = dir;
                self.pending_position = self.position;
            }
        }

        self.tick_counter += 1;
        if self.tick_counter >= move_threshold.max(1) {
            self.pending_position = rules::displace(grid, self.pending_position, self.pending_direction);
            self.tick_counter = 0;
        }

        let dest = self.pending_position;
        if dest == self.position {
            return PlayerStep { from, to: from, pickup: None };
        }
        if !rules::can_commit(grid, dest) {
            self.pending_position = self.position;
            return PlayerStep { from, to: from, pickup: None };
        }

        let mut pickup = match grid.kind_at(dest) {
            CellKind::SmallItem => {
                ledger.decrease_small();
                self.add_points(ledger.small_value());
                Some(Pickup::Small)
            }
            CellKind::LargeItem => {
                ledger.decrease_large();
                self.add_points(ledger.large_value());
                Some(Pickup::Large)
            }
            _ => None,
        };
        if let Some(fruit) = bonus.collect(dest) {
            self.add_points(fruit.value());
            pickup = Some(Pickup::Bonus(fruit));
        }

        grid.set_kind(self.position, CellKind::Open);
        grid.set_kind(dest, CellKind::PlayerMarker);
        self.position = dest;

        PlayerStep { from, to: dest, pickup }
    }
}

// ── Pursuer ──

/// The four targeting strategies. Order is also the per-tick update order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PursuerKind {
    Direct, // Blinky
    Ambush, // Pinky
    Flank,  // Inky
    Patrol, // Clyde
}

impl PursuerKind {
    pub const ALL: [PursuerKind; 4] = [
        PursuerKind::Direct,
        PursuerKind::Ambush,
        PursuerKind::Flank,
        PursuerKind::Patrol,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PursuerKind::Direct => "Blinky",
            PursuerKind::Ambush => "Pinky",
            PursuerKind::Flank => "Inky",
            PursuerKind::Patrol => "Clyde",
        }
    }

    /// Home cell in the reference maze (row 14, above the ghost box).
    pub fn home(self) -> Pos {
        match self {
            PursuerKind::Direct => Pos::new(14, 11),
            PursuerKind::Ambush => Pos::new(14, 13),
            PursuerKind::Flank => Pos::new(14, 15),
            PursuerKind::Patrol => Pos::new(14, 17),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Pursuer {
    pub kind: PursuerKind,
    pub position: Pos,
    pub tick_counter: u32,
    pub facing: Direction,
    /// Facing of the last actual displacement; its reverse is deprioritized.
    pub last_facing: Direction,
    pub home: Pos,
}

impl Pursuer {
    pub fn new(kind: PursuerKind, home: Pos) -> Self {
        Pursuer {
            kind,
            position: home,
            tick_counter: 0,
            facing: Direction::Right,
            last_facing: Direction::Right,
            home,
        }
    }

    /// The four pursuers at their reference homes, in update order.
    pub fn roster() -> Vec<Pursuer> {
        PursuerKind::ALL.iter().map(|&k| Pursuer::new(k, k.home())).collect()
    }

    pub fn reset(&mut self) {
        self.position = self.home;
        self.tick_counter = 0;
        self.facing = Direction::Right;
        self.last_facing = Direction::Right;
    }

    /// Steer toward `goal` and, on the threshold tick, take one step.
    /// Returns true if the pursuer moved.
    pub fn advance(&mut self, goal: Goal, grid: &TileGrid, move_threshold: u32) -> bool {
        let choice = ai::steer(grid, self.position, self.last_facing, goal);
        if let Some(dir) = choice {
            self.facing = dir;
        }

        self.tick_counter += 1;
        if self.tick_counter < move_threshold.max(1) {
            return false;
        }
        self.tick_counter = 0;

        let dir = match choice { Some(d) => d, None => return false };
        match rules::destination(grid, self.position, dir) {
            Some(next) => {
                self.position = next;
                self.last_facing = dir;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_row_grid() -> TileGrid {
        TileGrid::from_rows(&[
            "XXXXXXX",
            "X ooO X",
            "XXXXXXX",
        ])
    }

    fn setup(grid: &mut TileGrid, start: Pos) -> (Player, ConsumableLedger, BonusItem) {
        grid.set_kind(start, CellKind::PlayerMarker);
        let ledger = ConsumableLedger::new(
            grid.count(CellKind::SmallItem) as u32,
            grid.count(CellKind::LargeItem) as u32,
        );
        (Player::new(start), ledger, BonusItem::new())
    }

    #[test]
    fn direction_reverse_pairs() {
        for d in Direction::ALL {
            assert_eq!(d.reverse().reverse(), d);
            assert_ne!(d.reverse(), d);
        }
        assert_eq!(Direction::Up as usize, 0);
        assert_eq!(Direction::Right as usize, 3);
    }

    #[test]
    fn goal_offset_and_distance() {
        let g = Goal::new(10, 10).offset(Direction::Left, 4);
        assert_eq!(g, Goal::new(10, 6));
        assert!((Goal::new(0, 0).distance(Goal::new(3, 4)) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn player_eats_small_item_once() {
        let mut grid = open_row_grid();
        let (mut p, mut ledger, mut bonus) = setup(&mut grid, Pos::new(1, 1));

        let step = p.advance(Some(Direction::Right), &mut grid, &mut ledger, &mut bonus, 1);
        assert_eq!(step.to, Pos::new(1, 2));
        assert_eq!(step.pickup, Some(Pickup::Small));
        assert_eq!(p.score(), 5);
        assert_eq!(ledger.small_remaining(), 1);
        assert_eq!(grid.kind_at(Pos::new(1, 1)), CellKind::Open);
        assert_eq!(grid.kind_at(Pos::new(1, 2)), CellKind::PlayerMarker);
        assert!(ledger.matches_grid(&grid));
    }

    #[test]
    fn player_waits_for_threshold() {
        let mut grid = open_row_grid();
        let (mut p, mut ledger, mut bonus) = setup(&mut grid, Pos::new(1, 1));

        for _ in 0..2 {
            let step = p.advance(Some(Direction::Right), &mut grid, &mut ledger, &mut bonus, 3);
            assert!(!step.moved());
        }
        let step = p.advance(None, &mut grid, &mut ledger, &mut bonus, 3);
        assert!(step.moved());
        assert_eq!(p.tick_counter, 0);
    }

    #[test]
    fn wall_input_is_ignored() {
        let mut grid = open_row_grid();
        let (mut p, mut ledger, mut bonus) = setup(&mut grid, Pos::new(1, 1));
        p.pending_direction = Direction::Left;

        let step = p.advance(Some(Direction::Up), &mut grid, &mut ledger, &mut bonus, 1);
        assert!(!step.moved());
        assert_eq!(p.pending_direction, Direction::Left);
        assert_eq!(p.position, Pos::new(1, 1));
    }

    #[test]
    fn player_stops_at_wall_but_keeps_direction() {
        let mut grid = open_row_grid();
        let (mut p, mut ledger, mut bonus) = setup(&mut grid, Pos::new(1, 4));
        for _ in 0..5 {
            p.advance(None, &mut grid, &mut ledger, &mut bonus, 1);
        }
        assert_eq!(p.position, Pos::new(1, 5));
        assert_eq!(p.pending_direction, Direction::Right);
    }

    #[test]
    fn large_item_scores_large_value() {
        let mut grid = open_row_grid();
        let (mut p, mut ledger, mut bonus) = setup(&mut grid, Pos::new(1, 3));
        let step = p.advance(Some(Direction::Right), &mut grid, &mut ledger, &mut bonus, 1);
        assert_eq!(step.pickup, Some(Pickup::Large));
        assert_eq!(p.score(), 10);
        assert_eq!(ledger.large_remaining(), 0);
    }

    #[test]
    fn lives_and_reset() {
        let mut p = Player::new(Pos::new(2, 2));
        p.add_points(40);
        assert_eq!(p.lose_life(), 2);
        p.position = Pos::new(5, 5);
        p.reset_to_start();
        assert_eq!(p.position, Pos::new(2, 2));
        assert_eq!(p.score(), 40);
        assert_eq!(p.lives(), 2);
        p.reset(Pos::new(3, 3));
        assert_eq!(p.position, Pos::new(3, 3));
        assert_eq!((p.score(), p.lives()), (0, START_LIVES));
    }

    #[test]
    fn roster_homes_and_facing() {
        let roster = Pursuer::roster();
        let homes: Vec<Pos> = roster.iter().map(|p| p.position).collect();
        assert_eq!(homes, vec![Pos::new(14, 11), Pos::new(14, 13), Pos::new(14, 15), Pos::new(14, 17)]);
        assert!(roster.iter().all(|p| p.facing == Direction::Right && p.last_facing == Direction::Right));
    }

    #[test]
    fn pursuer_moves_only_on_threshold() {
        let grid = TileGrid::from_rows(&[
            "XXXXX",
            "X   X",
            "XXXXX",
        ]);
        let mut g = Pursuer::new(PursuerKind::Direct, Pos::new(1, 1));
        let goal = Goal::new(1, 3);
        assert!(!g.advance(goal, &grid, 2));
        assert_eq!(g.facing, Direction::Right);
        assert!(g.advance(goal, &grid, 2));
        assert_eq!(g.position, Pos::new(1, 2));
        assert_eq!(g.last_facing, Direction::Right);
    }

    #[test]
    fn boxed_in_pursuer_stays() {
        let grid = TileGrid::from_rows(&[
            "XXX",
            "X X",
            "XXX",
        ]);
        let mut g = Pursuer::new(PursuerKind::Patrol, Pos::new(1, 1));
        assert!(!g.advance(Goal::new(0, 0), &grid, 1));
        assert_eq!(g.position, Pos::new(1, 1));
    }
}
