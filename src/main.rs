/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{GameConfig, LogConfig};
use sim::event::GameEvent;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_PAUSE, KEYS_QUIT, KEYS_RESTART};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
/// Message lifetime, in ticks.
const MESSAGE_TICKS: u32 = 150;

fn main() {
    let (config, warnings) = GameConfig::load();
    init_logging(&config.log);
    for w in &warnings {
        warn!("config: {w}");
    }

    let mut world = WorldState::new(&config);
    let mut renderer = Renderer::new(config.theme, config.game.cell_size);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Maze Chase!");
    println!("Final Score: {}   Record: {}", world.player.score(), world.high_score());
}

/// The terminal is in raw mode while playing, so logs go to a file.
/// If the file cannot be opened the game runs without logging.
fn init_logging(cfg: &LogConfig) {
    let file = match File::create(&cfg.file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled ({}: {e})", cfg.file.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.reports_key_release();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    info!(
        tick_rate_ms = config.speed.tick_rate_ms,
        move_threshold = config.speed.move_threshold,
        gamepad = gp.connected,
        key_release = kb.honor_release,
        "game loop started"
    );

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }
        handle_meta(world, &kb, &gp);

        if last_tick.elapsed() >= tick_rate {
            if !world.paused {
                let input = kb.direction().or_else(|| gp.direction());
                let events = step::step(world, input);
                report_events(world, &events);
            }
            world.tick_message();
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    info!(score = world.player.score(), record = world.high_score(), "quit");
    Ok(())
}

/// Restart and pause keys. Restart works in any state, including a
/// finished round; pause only while the round is in progress.
fn handle_meta(world: &mut WorldState, kb: &InputState, gp: &GamepadState) {
    if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
        world.paused = false;
        step::reset_round(world);
        world.set_message("New round", MESSAGE_TICKS / 3);
        return;
    }

    if (kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed()) && !world.outcome.is_terminal() {
        world.paused = !world.paused;
        if world.paused {
            world.set_message("PAUSED  [F1] Resume", 0);
        } else {
            world.message.clear();
            world.message_timer = 0;
        }
    }
}

/// Mirror notable events into the message bar and the log.
fn report_events(world: &mut WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::BonusSpawned { fruit, .. } => {
                world.set_message(&format!("A {} appeared!", fruit.name()), MESSAGE_TICKS);
            }
            GameEvent::BonusCollected { fruit, .. } => {
                world.set_message(&format!("{} +{}", fruit.name(), fruit.value()), MESSAGE_TICKS);
            }
            GameEvent::LifeLost { remaining } => {
                world.set_message(&format!("Caught! Lives left: {remaining}"), MESSAGE_TICKS);
            }
            GameEvent::RoundWon { score } | GameEvent::RoundLost { score } => {
                info!(score, record = world.high_score(), "{}", world.outcome_text());
            }
            GameEvent::SmallEaten { .. }
            | GameEvent::LargeEaten { .. }
            | GameEvent::PositionsReset => {}
        }
    }
}
