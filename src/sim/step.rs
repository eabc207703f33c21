/// The step function: advances the round by one tick.
///
/// Processing order:
///   1. Outcome check (a terminal outcome suspends everything below)
///   2. Player movement, item consumption, bonus spawn / collection
///   3. Pursuer movement (Direct → Ambush → Flank → Patrol)
///   4. Collision and lives bookkeeping
///
/// The flanker reads the direct chaser's position *after* the direct
/// chaser moved this tick.

use tracing::{debug, info};

use crate::domain::ai;
use crate::domain::entity::{Direction, Pickup, Pos, PursuerKind};
use crate::domain::rules::{self, Outcome};
use crate::domain::tile::CellKind;
use super::event::GameEvent;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: Option<Direction>) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    if world.paused { return events; }

    if resolve_outcome(world, &mut events) { return events; }

    world.tick += 1;
    resolve_player(world, input, &mut events);
    resolve_pursuers(world);
    resolve_collisions(world, &mut events);

    debug_assert!(world.ledger.matches_grid(&world.grid), "ledger out of step with grid");
    events
}

// ══════════════════════════════════════════════════════════════
// Round control
// ══════════════════════════════════════════════════════════════

/// Back to the initial state of a round. The high score is kept.
pub fn reset_round(world: &mut WorldState) {
    world.grid.rebuild();
    world.bonus.reset();
    world.player.reset(world.player_start);
    for p in &mut world.pursuers {
        p.reset();
    }
    // An item under the start cell goes with the marker, unscored, and is
    // left out of the round's counts.
    world.grid.set_kind(world.player_start, CellKind::PlayerMarker);
    world.ledger.reset(
        world.grid.count(CellKind::SmallItem) as u32,
        world.grid.count(CellKind::LargeItem) as u32,
    );
    world.outcome = Outcome::InProgress;
    world.tick = 0;

    info!(
        small = world.ledger.small_remaining(),
        large = world.ledger.large_remaining(),
        high_score = world.high_score(),
        "round reset"
    );
}

/// After a catch with lives left: everyone back to their start cells.
/// Score, items and the bonus stay as they are.
pub fn restart_after_catch(world: &mut WorldState) {
    let here = world.player.position;
    if world.grid.kind_at(here) == CellKind::PlayerMarker {
        world.grid.set_kind(here, CellKind::Open);
    }
    world.player.reset_to_start();
    for p in &mut world.pursuers {
        p.reset();
    }
    mark_player_start(world);
}

/// Put the player marker on the start cell. An item lying there is taken
/// off the ledger without scoring so grid and ledger stay in step.
fn mark_player_start(world: &mut WorldState) {
    let start = world.player.position;
    match world.grid.kind_at(start) {
        CellKind::SmallItem => { world.ledger.decrease_small(); }
        CellKind::LargeItem => { world.ledger.decrease_large(); }
        _ => {}
    }
    world.grid.set_kind(start, CellKind::PlayerMarker);
}

// ══════════════════════════════════════════════════════════════
// Outcome
// ══════════════════════════════════════════════════════════════

/// Returns true when the round is over and the tick must not advance.
fn resolve_outcome(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if world.outcome.is_terminal() { return true; }

    let outcome = rules::evaluate_outcome(&world.ledger, world.player.lives());
    if !outcome.is_terminal() { return false; }

    world.outcome = outcome;
    world.record_high_score();
    let score = world.player.score();
    events.push(match outcome {
        Outcome::Won => GameEvent::RoundWon { score },
        _ => GameEvent::RoundLost { score },
    });
    info!(?outcome, score, high_score = world.high_score(), tick = world.tick, "round over");
    true
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut WorldState, input: Option<Direction>, events: &mut Vec<GameEvent>) {
    let stepped = world.player.advance(
        input,
        &mut world.grid,
        &mut world.ledger,
        &mut world.bonus,
        world.move_threshold,
    );

    if !stepped.moved() { return; }
    let at = stepped.to;
    match stepped.pickup {
        Some(Pickup::Small) => {
            let remaining = world.ledger.small_remaining();
            debug!(row = at.row, col = at.col, remaining, "small item eaten");
            events.push(GameEvent::SmallEaten { at, remaining });
            let spawned = world.bonus.on_small_consumed(
                remaining,
                &mut world.grid,
                &mut world.rng,
                world.player.start(),
            );
            if let Some((pos, fruit)) = spawned {
                info!(row = pos.row, col = pos.col, fruit = fruit.name(), "bonus spawned");
                events.push(GameEvent::BonusSpawned { at: pos, fruit });
            }
        }
        Some(Pickup::Large) => {
            let remaining = world.ledger.large_remaining();
            debug!(row = at.row, col = at.col, remaining, "large item eaten");
            events.push(GameEvent::LargeEaten { at, remaining });
        }
        Some(Pickup::Bonus(fruit)) => {
            info!(fruit = fruit.name(), value = fruit.value(), "bonus collected");
            events.push(GameEvent::BonusCollected { at, fruit });
        }
        None => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Pursuers
// ══════════════════════════════════════════════════════════════

fn resolve_pursuers(world: &mut WorldState) {
    for i in 0..world.pursuers.len() {
        let own = world.pursuers[i].position;
        let direct = direct_position(world).unwrap_or(own);
        let kind = world.pursuers[i].kind;
        let goal = ai::goal_for(kind, &world.player, direct, own, &world.grid);
        if world.pursuers[i].advance(goal, &world.grid, world.move_threshold) {
            let p = &world.pursuers[i];
            debug!(pursuer = kind.name(), row = p.position.row, col = p.position.col, facing = ?p.facing, "pursuer moved");
        }
    }
}

fn direct_position(world: &WorldState) -> Option<Pos> {
    world.pursuers.iter()
        .find(|p| p.kind == PursuerKind::Direct)
        .map(|p| p.position)
}

// ══════════════════════════════════════════════════════════════
// Collisions
// ══════════════════════════════════════════════════════════════

/// At most one life per tick, however many pursuers overlap.
fn resolve_collisions(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !rules::collides(&world.player, &world.pursuers) { return; }

    let remaining = world.player.lose_life();
    info!(remaining, tick = world.tick, "player caught");
    events.push(GameEvent::LifeLost { remaining });

    if remaining > 0 {
        restart_after_catch(world);
        events.push(GameEvent::PositionsReset);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
