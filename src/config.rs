/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Missing files or keys fall back to defaults. Values that are present but
/// unusable also fall back; each such fallback is returned as a
/// `ConfigError` next to the config so it can be logged once the
/// subscriber is up.

use std::path::{Path, PathBuf};

use crossterm::style::Color;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::entity::Pos;
use crate::domain::maze::TileGrid;

pub const DEFAULT_CELL_SIZE: u32 = 25;
pub const DEFAULT_START: Pos = Pos::new(26, 14);

// ── Errors ──

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cell_size must be positive (got {0}); using the default")]
    InvalidCellSize(i64),
    #[error("player start ({x}, {y}) has a negative coordinate; using the default start")]
    NegativeStart { x: i64, y: i64 },
    #[error("player start ({x}, {y}) lies outside the {width}x{height} maze; using the default start")]
    StartOutOfBounds { x: usize, y: usize, width: usize, height: usize },
    #[error("player start ({x}, {y}) is a wall; using the default start")]
    StartOnWall { x: usize, y: usize },
    #[error("theme.{key} = {value:?} is not a #rrggbb colour; using the default")]
    BadColor { key: &'static str, value: String },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
}

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub game: GameSettings,
    pub speed: SpeedConfig,
    pub theme: ThemeConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct GameSettings {
    /// Nominal cell size in pixels; the renderer scales it to terminal columns.
    pub cell_size: u32,
    pub player_start: Pos,
    /// None = seed from entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    /// Ticks per displacement, shared by player and pursuers.
    pub move_threshold: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeConfig {
    pub wall: Color,
    pub player: Color,
    pub small_item: Color,
    pub large_item: Color,
    pub blinky: Color,
    pub pinky: Color,
    pub inky: Color,
    pub clyde: Color,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub restart: Vec<String>,
    pub quit: Vec<String>,
    pub pause: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: PathBuf,
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    theme: TomlTheme,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_cell_size")]
    cell_size: i64,
    #[serde(default = "default_start_x")]
    player_start_x: i64,
    #[serde(default = "default_start_y")]
    player_start_y: i64,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_move_threshold")]
    move_threshold: u32,
}

#[derive(Deserialize, Debug)]
struct TomlTheme {
    #[serde(default = "default_wall")]
    wall: String,
    #[serde(default = "default_player")]
    player: String,
    #[serde(default = "default_item")]
    small_item: String,
    #[serde(default = "default_item")]
    large_item: String,
    #[serde(default = "default_blinky")]
    blinky: String,
    #[serde(default = "default_pinky")]
    pinky: String,
    #[serde(default = "default_inky")]
    inky: String,
    #[serde(default = "default_clyde")]
    clyde: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_cell_size() -> i64 { DEFAULT_CELL_SIZE as i64 }
fn default_start_x() -> i64 { DEFAULT_START.col as i64 }
fn default_start_y() -> i64 { DEFAULT_START.row as i64 }
fn default_tick_rate() -> u64 { 10 }
fn default_move_threshold() -> u32 { 15 }  // 150 ms per cell at 10 ms ticks

fn default_wall() -> String { "#2121de".into() }
fn default_player() -> String { "#ffff00".into() }
fn default_item() -> String { "#ffffff".into() }
fn default_blinky() -> String { "#ff0000".into() }
fn default_pinky() -> String { "#ffb9c1".into() }
fn default_inky() -> String { "#00ffff".into() }
fn default_clyde() -> String { "#ffa500".into() }

fn default_restart() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_pause() -> Vec<String> { vec!["Y".into()] }
fn default_log_file() -> String { "mazechase.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            cell_size: default_cell_size(),
            player_start_x: default_start_x(),
            player_start_y: default_start_y(),
            seed: None,
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            move_threshold: default_move_threshold(),
        }
    }
}

impl Default for TomlTheme {
    fn default() -> Self {
        TomlTheme {
            wall: default_wall(),
            player: default_player(),
            small_item: default_item(),
            large_item: default_item(),
            blinky: default_blinky(),
            pinky: default_pinky(),
            inky: default_inky(),
            clyde: default_clyde(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            restart: default_restart(),
            quit: default_quit(),
            pause: default_pause(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> (Self, Vec<ConfigError>) {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        let config = GameConfig::resolve(toml_cfg, &search_dirs, &mut warnings);
        (config, warnings)
    }

    /// Parse config text directly. Parse errors yield the defaults.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> (Self, Vec<ConfigError>) {
        let mut warnings = Vec::new();
        let toml_cfg = match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => cfg,
            Err(e) => {
                warnings.push(ConfigError::from(e));
                TomlConfig::default()
            }
        };
        let config = GameConfig::resolve(toml_cfg, &[], &mut warnings);
        (config, warnings)
    }

    fn resolve(t: TomlConfig, search_dirs: &[PathBuf], warnings: &mut Vec<ConfigError>) -> Self {
        let cell_size = if t.game.cell_size > 0 {
            t.game.cell_size as u32
        } else {
            warnings.push(ConfigError::InvalidCellSize(t.game.cell_size));
            DEFAULT_CELL_SIZE
        };

        let player_start = match validate_start(t.game.player_start_x, t.game.player_start_y, &TileGrid::new()) {
            Ok(pos) => pos,
            Err(e) => {
                warnings.push(e);
                DEFAULT_START
            }
        };

        let mut color = |key: &'static str, value: &str, fallback: fn() -> String| {
            parse_hex_color(value).unwrap_or_else(|| {
                warnings.push(ConfigError::BadColor { key, value: value.to_string() });
                parse_hex_color(&fallback()).unwrap_or(Color::White)
            })
        };
        let theme = ThemeConfig {
            wall: color("wall", &t.theme.wall, default_wall),
            player: color("player", &t.theme.player, default_player),
            small_item: color("small_item", &t.theme.small_item, default_item),
            large_item: color("large_item", &t.theme.large_item, default_item),
            blinky: color("blinky", &t.theme.blinky, default_blinky),
            pinky: color("pinky", &t.theme.pinky, default_pinky),
            inky: color("inky", &t.theme.inky, default_inky),
            clyde: color("clyde", &t.theme.clyde, default_clyde),
        };

        GameConfig {
            game: GameSettings {
                cell_size,
                player_start,
                seed: t.game.seed,
            },
            speed: SpeedConfig {
                tick_rate_ms: t.speed.tick_rate_ms.max(1),
                move_threshold: t.speed.move_threshold.max(1),
            },
            theme,
            gamepad: GamepadConfig {
                restart: t.gamepad.restart,
                quit: t.gamepad.quit,
                pause: t.gamepad.pause,
            },
            log: LogConfig {
                file: resolve_log_path(&t.log.file, search_dirs),
                level: t.log.level,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::resolve(TomlConfig::default(), &[], &mut Vec::new())
    }
}

/// `x` is the column, `y` the row.
fn validate_start(x: i64, y: i64, grid: &TileGrid) -> Result<Pos, ConfigError> {
    if x < 0 || y < 0 {
        return Err(ConfigError::NegativeStart { x, y });
    }
    let (col, row) = (x as usize, y as usize);
    if !grid.in_bounds(row, col) {
        return Err(ConfigError::StartOutOfBounds {
            x: col,
            y: row,
            width: grid.width(),
            height: grid.height(),
        });
    }
    if !grid.is_passable(row, col) {
        return Err(ConfigError::StartOnWall { x: col, y: row });
    }
    Ok(Pos::new(row, col))
}

/// `#rrggbb` → `Color::Rgb`.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() { return None; }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
}

/// Relative log paths land next to the config file that was found, else CWD.
fn resolve_log_path(file: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(file);
    if path.is_absolute() {
        return path;
    }
    search_dirs.iter()
        .find(|d| d.join("config.toml").exists())
        .map(|d| d.join(&path))
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its config.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<ConfigError>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match read_toml(&path) {
            Ok(cfg) => return cfg,
            Err(e @ ConfigError::Parse(_)) => {
                warnings.push(e);
                return TomlConfig::default();
            }
            Err(e) => warnings.push(e),
        }
    }
    TomlConfig::default()
}

fn read_toml(path: &Path) -> Result<TomlConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    Ok(toml::from_str::<TomlConfig>(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let (cfg, warnings) = GameConfig::from_toml_str("");
        assert!(warnings.is_empty());
        assert_eq!(cfg.game.cell_size, 25);
        assert_eq!(cfg.game.player_start, Pos::new(26, 14));
        assert_eq!(cfg.game.seed, None);
        assert_eq!(cfg.speed.tick_rate_ms, 10);
        assert_eq!(cfg.speed.move_threshold, 15);
        assert_eq!(cfg.theme.wall, Color::Rgb { r: 0x21, g: 0x21, b: 0xde });
        assert_eq!(cfg.gamepad.restart, vec!["Start".to_string()]);
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let (cfg, warnings) = GameConfig::from_toml_str(
            "[game]\nseed = 9\nplayer_start_x = 13\n[speed]\nmove_threshold = 4\n",
        );
        assert!(warnings.is_empty());
        assert_eq!(cfg.game.seed, Some(9));
        assert_eq!(cfg.game.player_start, Pos::new(26, 13));
        assert_eq!(cfg.speed.move_threshold, 4);
        assert_eq!(cfg.speed.tick_rate_ms, 10);
    }

    #[test]
    fn non_positive_cell_size_falls_back() {
        let (cfg, warnings) = GameConfig::from_toml_str("[game]\ncell_size = 0\n");
        assert_eq!(cfg.game.cell_size, DEFAULT_CELL_SIZE);
        assert!(matches!(warnings.as_slice(), [ConfigError::InvalidCellSize(0)]));
    }

    #[test]
    fn negative_start_falls_back() {
        let (cfg, warnings) = GameConfig::from_toml_str("[game]\nplayer_start_x = -3\n");
        assert_eq!(cfg.game.player_start, DEFAULT_START);
        assert!(matches!(warnings.as_slice(), [ConfigError::NegativeStart { x: -3, y: 26 }]));
    }

    #[test]
    fn start_outside_or_on_wall_falls_back() {
        let (cfg, warnings) = GameConfig::from_toml_str("[game]\nplayer_start_x = 40\n");
        assert_eq!(cfg.game.player_start, DEFAULT_START);
        assert!(matches!(warnings.as_slice(), [ConfigError::StartOutOfBounds { .. }]));

        let (cfg, warnings) = GameConfig::from_toml_str("[game]\nplayer_start_x = 1\nplayer_start_y = 3\n");
        assert_eq!(cfg.game.player_start, DEFAULT_START);
        assert!(matches!(warnings.as_slice(), [ConfigError::StartOnWall { x: 1, y: 3 }]));
    }

    #[test]
    fn bad_colour_falls_back_per_entry() {
        let (cfg, warnings) = GameConfig::from_toml_str("[theme]\nwall = \"blue\"\nplayer = \"#00ff00\"\n");
        assert_eq!(cfg.theme.wall, Color::Rgb { r: 0x21, g: 0x21, b: 0xde });
        assert_eq!(cfg.theme.player, Color::Rgb { r: 0, g: 255, b: 0 });
        assert_eq!(warnings.len(), 1);
        assert!(matches!(&warnings[0], ConfigError::BadColor { key: "wall", .. }));
    }

    #[test]
    fn parse_error_uses_defaults() {
        let (cfg, warnings) = GameConfig::from_toml_str("[game\ncell_size = ");
        assert_eq!(cfg.game.cell_size, DEFAULT_CELL_SIZE);
        assert!(matches!(warnings.as_slice(), [ConfigError::Parse(_)]));
    }

    #[test]
    fn hex_colours() {
        assert_eq!(parse_hex_color("#ffb9c1"), Some(Color::Rgb { r: 255, g: 185, b: 193 }));
        assert_eq!(parse_hex_color("ffb9c1"), None);
        assert_eq!(parse_hex_color("#ffb9c"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn thresholds_are_at_least_one() {
        let (cfg, _) = GameConfig::from_toml_str("[speed]\nmove_threshold = 0\ntick_rate_ms = 0\n");
        assert_eq!(cfg.speed.move_threshold, 1);
        assert_eq!(cfg.speed.tick_rate_ms, 1);
    }
}
