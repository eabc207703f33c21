/// Keyboard state tracker.
///
/// Tracks which keys are currently held down so that:
///   - holding an arrow keeps requesting that direction every tick
///   - the most recently pressed arrow wins when several are held
///   - meta keys (restart, pause, quit) fire once per press
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key map ──

pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_RESTART: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char('r'), KeyCode::Char('R')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
pub const KEYS_PAUSE: &[KeyCode] = &[KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')];

fn direction_of(code: KeyCode) -> Option<Direction> {
    if KEYS_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::Down)
    } else if KEYS_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else {
        None
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// `drain_events()` call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl+C detection.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);
                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        self.last_active.remove(&key.code);
                    }
                    // Without enhancement, releases are unreliable; rely on timeout.
                    KeyEventKind::Release => {}
                    _ => self.record_press(key.code, Instant::now()),
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn record_press(&mut self, code: KeyCode, at: Instant) {
        if !self.is_held_at(code, at) {
            self.fresh_presses.push(code);
        }
        self.last_active.insert(code, at);
    }

    #[cfg(test)]
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.is_held_at(code, Instant::now())
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// The direction to request this tick: a fresh press wins, otherwise
    /// the held direction key that was touched most recently.
    pub fn direction(&self) -> Option<Direction> {
        if let Some(d) = self.fresh_presses.iter().rev().find_map(|&c| direction_of(c)) {
            return Some(d);
        }
        let now = Instant::now();
        self.last_active.iter()
            .filter(|(_, t)| now.duration_since(**t) < HOLD_TIMEOUT)
            .filter_map(|(&c, &t)| direction_of(c).map(|d| (d, t)))
            .max_by_key(|&(_, t)| t)
            .map(|(d, _)| d)
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active.get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_map_covers_arrows_and_wasd() {
        assert_eq!(direction_of(KeyCode::Up), Some(Direction::Up));
        assert_eq!(direction_of(KeyCode::Char('a')), Some(Direction::Left));
        assert_eq!(direction_of(KeyCode::Char('D')), Some(Direction::Right));
        assert_eq!(direction_of(KeyCode::Enter), None);
    }

    #[test]
    fn latest_press_wins() {
        let mut kb = InputState::new();
        let t = Instant::now();
        kb.record_press(KeyCode::Left, t);
        kb.record_press(KeyCode::Up, t);
        assert_eq!(kb.direction(), Some(Direction::Up));
    }

    #[test]
    fn held_key_keeps_direction() {
        let mut kb = InputState::new();
        kb.record_press(KeyCode::Char('s'), Instant::now());
        kb.fresh_presses.clear();
        assert!(kb.is_held(KeyCode::Char('s')));
        assert_eq!(kb.direction(), Some(Direction::Down));
    }

    #[test]
    fn repeat_is_not_a_fresh_press() {
        let mut kb = InputState::new();
        let t = Instant::now();
        kb.record_press(KeyCode::Enter, t);
        kb.record_press(KeyCode::Enter, t);
        assert_eq!(kb.fresh_presses.len(), 1);
        assert!(kb.any_pressed(KEYS_RESTART));
    }

    #[test]
    fn nothing_held_no_direction() {
        assert_eq!(InputState::new().direction(), None);
    }
}
