/// Pursuer AI: goal selection plus one-step greedy steering.
///
/// Each tick a pursuer:
///   1. Computes a **goal** from its strategy (may lie off-grid).
///   2. Scans its four neighbours in `SCAN_ORDER` and picks the one whose
///      landing cell is closest to the goal (Euclidean).
///
/// Reversing `last_facing` is only considered when nothing else is open.
/// Equal distances go to the later direction in the scan.

use super::entity::{Direction, Goal, Player, Pos, PursuerKind};
use super::maze::TileGrid;
use super::rules;

/// Cells ahead of the player the ambusher aims for.
pub const AMBUSH_LEAD: i32 = 4;
/// Lead used for the flanker's pivot point.
pub const FLANK_LEAD: i32 = 2;
/// Within this distance the patroller breaks off and heads for its corner.
pub const PATROL_RADIUS: f32 = 8.0;

pub const SCAN_ORDER: [Direction; 4] = [Direction::Right, Direction::Up, Direction::Left, Direction::Down];

// ── Goals ──

/// Goal cell for a pursuer of `kind` standing on `own`.
/// `direct` is the current position of the direct chaser; the flanker
/// pivots around it.
pub fn goal_for(kind: PursuerKind, player: &Player, direct: Pos, own: Pos, grid: &TileGrid) -> Goal {
    let target = player.position.to_goal();
    let dir = player.pending_direction;
    match kind {
        PursuerKind::Direct => target,
        PursuerKind::Ambush => target.offset(dir, AMBUSH_LEAD),
        PursuerKind::Flank => {
            let pivot = target.offset(dir, FLANK_LEAD);
            let d = direct.to_goal();
            Goal::new(d.row + 2 * (pivot.row - d.row), d.col + 2 * (pivot.col - d.col))
        }
        PursuerKind::Patrol => {
            if rules::distance_to(own, target) > PATROL_RADIUS {
                target
            } else {
                patrol_corner(grid)
            }
        }
    }
}

/// Bottom-left corner, one row past the grid.
pub fn patrol_corner(grid: &TileGrid) -> Goal {
    Goal::new(grid.height() as i32, 0)
}

// ── Steering ──

/// Direction that brings `pos` closest to `goal`, or None when boxed in.
pub fn steer(grid: &TileGrid, pos: Pos, last_facing: Direction, goal: Goal) -> Option<Direction> {
    let back = last_facing.reverse();
    pick(grid, pos, goal, |d| d != back).or_else(|| pick(grid, pos, goal, |d| d == back))
}

fn pick(grid: &TileGrid, pos: Pos, goal: Goal, allow: impl Fn(Direction) -> bool) -> Option<Direction> {
    let on_edge = rules::is_corridor_edge(grid, pos);
    let mut best: Option<(Direction, f32)> = None;
    for dir in SCAN_ORDER {
        if !allow(dir) || (on_edge && dir.is_vertical()) { continue; }
        let Some(next) = rules::destination(grid, pos, dir) else { continue };
        let dist = rules::distance_to(next, goal);
        match best {
            Some((_, d)) if dist > d => {}
            _ => best = Some((dir, dist)),
        }
    }
    best.map(|(d, _)| d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_box() -> TileGrid {
        TileGrid::from_rows(&[
            "XXXXXXX",
            "X     X",
            "X     X",
            "X     X",
            "XXXXXXX",
        ])
    }

    fn player(pos: Pos, dir: Direction) -> Player {
        let mut p = Player::new(pos);
        p.pending_direction = dir;
        p
    }

    // ── Goals ──

    #[test]
    fn direct_targets_player() {
        let g = TileGrid::new();
        let p = player(Pos::new(26, 14), Direction::Left);
        let goal = goal_for(PursuerKind::Direct, &p, Pos::new(14, 11), Pos::new(14, 11), &g);
        assert_eq!(goal, Goal::new(26, 14));
    }

    #[test]
    fn ambush_leads_by_four() {
        let g = TileGrid::new();
        let p = player(Pos::new(26, 14), Direction::Up);
        let goal = goal_for(PursuerKind::Ambush, &p, Pos::new(14, 11), Pos::new(14, 13), &g);
        assert_eq!(goal, Goal::new(22, 14));
    }

    #[test]
    fn ambush_goal_may_leave_grid() {
        let g = TileGrid::new();
        let p = player(Pos::new(1, 1), Direction::Up);
        let goal = goal_for(PursuerKind::Ambush, &p, Pos::new(14, 11), Pos::new(14, 13), &g);
        assert_eq!(goal, Goal::new(-3, 1));
    }

    #[test]
    fn flank_reflects_through_direct() {
        let g = TileGrid::new();
        let p = player(Pos::new(20, 10), Direction::Right);
        // pivot (20,12); direct (14,11) → 14 + 2*6, 11 + 2*1
        let goal = goal_for(PursuerKind::Flank, &p, Pos::new(14, 11), Pos::new(14, 15), &g);
        assert_eq!(goal, Goal::new(26, 13));
    }

    #[test]
    fn patrol_chases_when_far_retreats_when_near() {
        let g = TileGrid::new();
        let p = player(Pos::new(26, 14), Direction::Left);
        let far = goal_for(PursuerKind::Patrol, &p, Pos::new(14, 11), Pos::new(14, 17), &g);
        assert_eq!(far, Goal::new(26, 14));
        let near = goal_for(PursuerKind::Patrol, &p, Pos::new(14, 11), Pos::new(23, 14), &g);
        assert_eq!(near, Goal::new(35, 0));
    }

    #[test]
    fn patrol_radius_is_exclusive() {
        let g = TileGrid::new();
        let p = player(Pos::new(20, 10), Direction::Left);
        // exactly 8 away: still retreats
        let goal = goal_for(PursuerKind::Patrol, &p, Pos::new(14, 11), Pos::new(12, 10), &g);
        assert_eq!(goal, patrol_corner(&g));
    }

    // ── Steering ──

    #[test]
    fn steers_toward_goal() {
        let g = open_box();
        assert_eq!(steer(&g, Pos::new(2, 3), Direction::Right, Goal::new(2, 5)), Some(Direction::Right));
        assert_eq!(steer(&g, Pos::new(2, 3), Direction::Up, Goal::new(1, 3)), Some(Direction::Up));
    }

    #[test]
    fn reverse_is_deprioritized() {
        let g = open_box();
        // Goal straight behind: reversal would be best but Up/Down are taken instead.
        let d = steer(&g, Pos::new(2, 3), Direction::Right, Goal::new(2, 1));
        assert!(matches!(d, Some(Direction::Up) | Some(Direction::Down)));
    }

    #[test]
    fn reverse_taken_in_dead_end() {
        let g = TileGrid::from_rows(&[
            "XXXXX",
            "X   X",
            "XXXXX",
        ]);
        assert_eq!(steer(&g, Pos::new(1, 3), Direction::Right, Goal::new(1, 3)), Some(Direction::Left));
    }

    #[test]
    fn ties_go_to_later_scan_direction() {
        let g = open_box();
        // Up and Down land equally far from a goal level with the pursuer.
        let d = steer(&g, Pos::new(2, 3), Direction::Right, Goal::new(2, 1));
        assert_eq!(d, Some(Direction::Down));
    }

    #[test]
    fn boxed_in_returns_none() {
        let g = TileGrid::from_rows(&["XXX", "X X", "XXX"]);
        assert_eq!(steer(&g, Pos::new(1, 1), Direction::Up, Goal::new(0, 0)), None);
    }

    #[test]
    fn steering_uses_wrap_destination() {
        let g = TileGrid::new();
        // From the left wrap cell, Left lands at (17,28), right beside a goal there.
        let d = steer(&g, Pos::new(17, 1), Direction::Left, Goal::new(17, 29));
        assert_eq!(d, Some(Direction::Left));
    }
}
