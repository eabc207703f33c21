/// Movement, collision and outcome rules.
///
/// Pure functions over the grid and entities: they answer "what is legal"
/// and "what happened" without performing anything.
///
/// ### Turn acceptance (player input)
/// ┌──────────────────────────────────────────┬────────┐
/// │ Condition                                 │ Accept │
/// ├──────────────────────────────────────────┼────────┤
/// │ neighbour of pending cell off-grid        │ NO     │
/// │ neighbour of pending cell is a wall       │ NO     │
/// │ Up/Down while on an outer corridor cell   │ NO     │
/// │ otherwise                                 │ YES    │
/// └──────────────────────────────────────────┴────────┘
///
/// ### Displacement
/// ┌──────────────────────────────────────────┬──────────────────┐
/// │ Condition                                 │ Result           │
/// ├──────────────────────────────────────────┼──────────────────┤
/// │ Left on the left wrap cell                │ right wrap cell  │
/// │ Right on the right wrap cell              │ left wrap cell   │
/// │ neighbour in bounds and passable          │ neighbour        │
/// │ otherwise                                 │ unchanged        │
/// └──────────────────────────────────────────┴──────────────────┘
///
/// ### Outcome (priority order)
/// ┌──────────────────────────────┬────────────┐
/// │ small_remaining == 0          │ Won        │
/// │ lives == 0                    │ Lost       │
/// │ otherwise                     │ InProgress │
/// └──────────────────────────────┴────────────┘

use super::entity::{Direction, Goal, Player, Pos, Pursuer};
use super::ledger::ConsumableLedger;
use super::maze::TileGrid;

// ── Neighbours ──

/// Plain one-step neighbour, no wrap. None if it leaves the grid.
pub fn neighbor(grid: &TileGrid, pos: Pos, dir: Direction) -> Option<Pos> {
    let (dr, dc) = dir.delta();
    let r = pos.row as i32 + dr;
    let c = pos.col as i32 + dc;
    if r < 0 || c < 0 { return None; }
    let (r, c) = (r as usize, c as usize);
    if !grid.in_bounds(r, c) { return None; }
    Some(Pos::new(r, c))
}

/// Is `pos` one of the outermost cells of the wrap row? Vertical moves are
/// barred there so nothing slips out of the maze along the border.
pub fn is_corridor_edge(grid: &TileGrid, pos: Pos) -> bool {
    match grid.wrap_row() {
        Some(row) => pos.row == row && (pos.col == 0 || pos.col + 1 == grid.width()),
        None => false,
    }
}

/// Where a step from `pos` along `dir` lands, wrap-aware. None if the
/// destination is off-grid or impassable.
pub fn destination(grid: &TileGrid, pos: Pos, dir: Direction) -> Option<Pos> {
    let next = grid.wrap_target(pos, dir).or_else(|| neighbor(grid, pos, dir))?;
    if grid.is_passable(next.row, next.col) { Some(next) } else { None }
}

// ── Player rules ──

/// May the player switch its pending direction to `dir`?
pub fn accepts_turn(grid: &TileGrid, pending: Pos, dir: Direction) -> bool {
    if dir.is_vertical() && is_corridor_edge(grid, pending) { return false; }
    match neighbor(grid, pending, dir) {
        Some(n) => grid.is_passable(n.row, n.col),
        None => false,
    }
}

/// Move the pending cell one step along `dir`, or leave it.
pub fn displace(grid: &TileGrid, pending: Pos, dir: Direction) -> Pos {
    destination(grid, pending, dir).unwrap_or(pending)
}

/// Can the player commit onto `pos`? The top row and left column are
/// border, never entered.
pub fn can_commit(grid: &TileGrid, pos: Pos) -> bool {
    grid.is_passable(pos.row, pos.col) && pos.row != 0 && pos.col != 0
}

// ── Collision ──

/// Player caught this tick?
///
/// Two checks: same cell as any pursuer, or the player's next cell along
/// its pending direction holds a pursuer (the two would pass through each
/// other between ticks). Only the player's direction is considered.
pub fn collides(player: &Player, pursuers: &[Pursuer]) -> bool {
    let here = player.position;
    let ahead = player.next_cell();
    pursuers.iter().any(|g| g.position == here || g.position.to_goal() == ahead)
}

// ── Outcome ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }

    pub fn text(self) -> &'static str {
        match self {
            Outcome::InProgress => "",
            Outcome::Won => "You won!",
            Outcome::Lost => "You lost!",
        }
    }
}

pub fn evaluate_outcome(ledger: &ConsumableLedger, lives: u32) -> Outcome {
    if ledger.is_cleared() {
        Outcome::Won
    } else if lives == 0 {
        Outcome::Lost
    } else {
        Outcome::InProgress
    }
}

/// Euclidean distance between a cell and a goal.
pub fn distance_to(pos: Pos, goal: Goal) -> f32 {
    pos.to_goal().distance(goal)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PursuerKind;

    /// A 5-row corridor map with a wrap tunnel on row 2.
    /// Inner wrap cells: (2,1) and (2,5).
    fn tunnel_map() -> TileGrid {
        TileGrid::from_rows(&[
            "XXXXXXX",
            "XXX XXX",
            "       ",
            "XXX XXX",
            "XXXXXXX",
        ]).with_wrap_row(2)
    }

    // ── Neighbours / wrap ──

    #[test]
    fn neighbor_off_grid_is_none() {
        let g = tunnel_map();
        assert_eq!(neighbor(&g, Pos::new(0, 0), Direction::Up), None);
        assert_eq!(neighbor(&g, Pos::new(0, 0), Direction::Left), None);
        assert_eq!(neighbor(&g, Pos::new(4, 6), Direction::Down), None);
        assert_eq!(neighbor(&g, Pos::new(4, 6), Direction::Right), None);
    }

    #[test]
    fn wrap_left_enters_right() {
        let g = tunnel_map();
        assert_eq!(destination(&g, Pos::new(2, 1), Direction::Left), Some(Pos::new(2, 5)));
    }

    #[test]
    fn wrap_right_enters_left() {
        let g = tunnel_map();
        assert_eq!(destination(&g, Pos::new(2, 5), Direction::Right), Some(Pos::new(2, 1)));
    }

    #[test]
    fn no_wrap_off_the_wrap_row() {
        let g = TileGrid::from_rows(&[
            "       ",
            "       ",
        ]).with_wrap_row(0);
        assert_eq!(destination(&g, Pos::new(1, 1), Direction::Left), Some(Pos::new(1, 0)));
        assert_eq!(destination(&g, Pos::new(0, 1), Direction::Left), Some(Pos::new(0, 5)));
    }

    #[test]
    fn reference_maze_wraps_on_row_17_only() {
        let g = TileGrid::new();
        assert_eq!(destination(&g, Pos::new(17, 1), Direction::Left), Some(Pos::new(17, 28)));
        assert_eq!(destination(&g, Pos::new(17, 28), Direction::Right), Some(Pos::new(17, 1)));
        assert_eq!(destination(&g, Pos::new(8, 2), Direction::Left), None);
    }

    #[test]
    fn corridor_edge_blocks_vertical_turns() {
        let g = TileGrid::from_rows(&[
            "   ",
            "   ",
            "   ",
        ]).with_wrap_row(1);
        assert!(is_corridor_edge(&g, Pos::new(1, 0)));
        assert!(is_corridor_edge(&g, Pos::new(1, 2)));
        assert!(!is_corridor_edge(&g, Pos::new(1, 1)));
        assert!(!accepts_turn(&g, Pos::new(1, 0), Direction::Up));
        assert!(!accepts_turn(&g, Pos::new(1, 2), Direction::Down));
        assert!(accepts_turn(&g, Pos::new(1, 1), Direction::Up));
    }

    // ── Turn acceptance ──

    #[test]
    fn turn_into_wall_rejected() {
        let g = tunnel_map();
        assert!(!accepts_turn(&g, Pos::new(2, 2), Direction::Up));
        assert!(accepts_turn(&g, Pos::new(2, 3), Direction::Up));
        assert!(accepts_turn(&g, Pos::new(2, 2), Direction::Left));
    }

    #[test]
    fn displace_blocked_stays() {
        let g = tunnel_map();
        assert_eq!(displace(&g, Pos::new(1, 3), Direction::Up), Pos::new(1, 3));
        assert_eq!(displace(&g, Pos::new(1, 3), Direction::Down), Pos::new(2, 3));
    }

    #[test]
    fn commit_never_onto_border() {
        let g = TileGrid::from_rows(&["   ", "   "]);
        assert!(!can_commit(&g, Pos::new(0, 1)));
        assert!(!can_commit(&g, Pos::new(1, 0)));
        assert!(can_commit(&g, Pos::new(1, 1)));
    }

    // ── Collision ──

    fn player_at(pos: Pos, dir: Direction) -> Player {
        let mut p = Player::new(pos);
        p.pending_direction = dir;
        p
    }

    fn pursuer_at(pos: Pos) -> Pursuer {
        Pursuer::new(PursuerKind::Direct, pos)
    }

    #[test]
    fn same_cell_collides() {
        let p = player_at(Pos::new(5, 5), Direction::Left);
        assert!(collides(&p, &[pursuer_at(Pos::new(5, 5))]));
    }

    #[test]
    fn crossing_ahead_collides() {
        let p = player_at(Pos::new(5, 5), Direction::Right);
        assert!(collides(&p, &[pursuer_at(Pos::new(5, 6))]));
    }

    #[test]
    fn pursuer_behind_does_not_collide() {
        let p = player_at(Pos::new(5, 5), Direction::Right);
        assert!(!collides(&p, &[pursuer_at(Pos::new(5, 4))]));
        assert!(!collides(&p, &[pursuer_at(Pos::new(4, 5))]));
    }

    // ── Outcome ──

    #[test]
    fn win_takes_priority_over_loss() {
        let cleared = ConsumableLedger::new(0, 4);
        assert_eq!(evaluate_outcome(&cleared, 0), Outcome::Won);
        assert_eq!(evaluate_outcome(&cleared, 2), Outcome::Won);
    }

    #[test]
    fn loss_only_without_lives() {
        let l = ConsumableLedger::new(10, 0);
        assert_eq!(evaluate_outcome(&l, 0), Outcome::Lost);
        assert_eq!(evaluate_outcome(&l, 1), Outcome::InProgress);
    }

    #[test]
    fn outcome_text() {
        assert_eq!(Outcome::Won.text(), "You won!");
        assert_eq!(Outcome::Lost.text(), "You lost!");
        assert!(!Outcome::InProgress.is_terminal());
    }
}
