/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from `[gamepad]` in config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Steer
///   Start                 →  Restart round
///   Select                →  Quit
///   Y                     →  Pause

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::Direction;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-input state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held { self.just_pressed = true; }
        self.held = held;
    }
}

struct ActionMap {
    restart: Vec<Btn>,
    quit: Vec<Btn>,
    pause: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            restart: vec![Btn::Start],
            quit: vec![Btn::Select],
            pause: vec![Btn::Y],
        }
    }
}

fn parse_buttons(names: &[String]) -> Vec<Btn> {
    names.iter().filter_map(|s| Btn::from_name(s)).collect()
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    /// D-pad, indexed by `Direction` ordinal.
    dpad: [BtnState; 4],
    /// Left stick digitised, indexed by `Direction` ordinal.
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(_) => (None, false),
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Apply the configured mapping. Empty or unknown lists keep the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let map = &mut self.action_map;
        let rs = parse_buttons(&cfg.restart);
        if !rs.is_empty() { map.restart = rs; }
        let qt = parse_buttons(&cfg.quit);
        if !qt.is_empty() { map.quit = qt; }
        let ps = parse_buttons(&cfg.pause);
        if !ps.is_empty() { map.pause = ps; }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.digitise_stick();
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dir = match gilrs_btn {
            Button::DPadUp => Some(Direction::Up),
            Button::DPadDown => Some(Direction::Down),
            Button::DPadLeft => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.dpad[d as usize].set(held);
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn as usize].set(held);
        }
    }

    /// Stick Y is positive upward.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn digitise_stick(&mut self) {
        let (x, y) = (self.stick_x, self.stick_y);
        self.stick[Direction::Up as usize].set(y > STICK_DEADZONE);
        self.stick[Direction::Down as usize].set(y < -STICK_DEADZONE);
        self.stick[Direction::Left as usize].set(x < -STICK_DEADZONE);
        self.stick[Direction::Right as usize].set(x > STICK_DEADZONE);
    }

    // ── Action queries ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    pub fn restart_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.restart)
    }
    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.quit)
    }
    pub fn pause_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.pause)
    }

    /// Requested direction: a fresh press wins over a held one.
    pub fn direction(&self) -> Option<Direction> {
        let fresh = Direction::ALL.into_iter().find(|&d| {
            let i = d as usize;
            self.dpad[i].just_pressed || self.stick[i].just_pressed
        });
        fresh.or_else(|| {
            Direction::ALL.into_iter().find(|&d| {
                let i = d as usize;
                self.dpad[i].held || self.stick[i].held
            })
        })
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = [BtnState::default(); 4];
        self.stick = [BtnState::default(); 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(restart: &[&str], quit: &[&str]) -> GamepadConfig {
        GamepadConfig {
            restart: restart.iter().map(|s| s.to_string()).collect(),
            quit: quit.iter().map(|s| s.to_string()).collect(),
            pause: vec![],
        }
    }

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("LB"), Some(Btn::L1));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn config_overrides_and_falls_back() {
        let mut gp = GamepadState::new();
        gp.load_button_config(&cfg(&["A"], &["nonsense"]));
        assert_eq!(gp.action_map.restart, vec![Btn::A]);
        assert_eq!(gp.action_map.quit, vec![Btn::Select]);
        assert_eq!(gp.action_map.pause, vec![Btn::Y]);
    }

    #[test]
    fn stick_maps_to_directions() {
        let mut gp = GamepadState::new();
        gp.stick_x = -0.9;
        gp.digitise_stick();
        assert_eq!(gp.direction(), Some(Direction::Left));
        gp.clear_just_pressed();
        assert_eq!(gp.direction(), Some(Direction::Left));
        gp.stick_x = 0.1;
        gp.digitise_stick();
        assert_eq!(gp.direction(), None);
    }

    #[test]
    fn fresh_press_beats_held() {
        let mut gp = GamepadState::new();
        gp.dpad[Direction::Up as usize].set(true);
        gp.clear_just_pressed();
        gp.dpad[Direction::Right as usize].set(true);
        assert_eq!(gp.direction(), Some(Direction::Right));
    }

    #[test]
    fn restart_is_edge_triggered() {
        let mut gp = GamepadState::new();
        gp.buttons[Btn::Start as usize].set(true);
        assert!(gp.restart_pressed());
        gp.clear_just_pressed();
        gp.buttons[Btn::Start as usize].set(true);
        assert!(!gp.restart_pressed());
    }
}
