mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use raiden_shooter::audio::LogAudio;
use raiden_shooter::compute::Game;
use raiden_shooter::config::GameConfig;
use raiden_shooter::entities::{GameState, Input};
use raiden_shooter::error::GameError;
use raiden_shooter::persistence::JsonFileStore;

/// Vertical-scrolling arcade shooter in the terminal.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// INI file overriding the default configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for the simulation RNG (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,

    /// Run this many frames without a terminal, firing and weaving on
    /// autopilot, then print the final score.
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,
}

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events:
/// OS key-repeat refreshes the entry well before it expires.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

fn read_input(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> Input {
    use KeyCode::{Char, Down, Left, Right, Up};
    Input {
        up: any_held(key_frame, &[Up, Char('w'), Char('W')], frame),
        down: any_held(key_frame, &[Down, Char('s'), Char('S')], frame),
        left: any_held(key_frame, &[Left, Char('a'), Char('A')], frame),
        right: any_held(key_frame, &[Right, Char('d'), Char('D')], frame),
        firing: is_held(key_frame, &Char(' '), frame),
    }
}

/// Lifecycle commands are rejected when they don't apply to the current
/// state; that is routine for a keypress, so only note it.
fn apply(result: Result<(), GameError>) {
    if let Err(e) = result {
        log::debug!("ignored command: {e}");
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key. Each frame the keys that are still
/// fresh become the normalized [`Input`], so movement and fire combine
/// freely.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game<StdRng>,
    rx: &mpsc::Receiver<Event>,
    frame_len: Duration,
) -> std::io::Result<()> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        KeyCode::Enter if game.state() == GameState::Menu => apply(game.start()),
                        KeyCode::Char('p') | KeyCode::Char('P') => apply(game.toggle_pause()),
                        KeyCode::Char('r') | KeyCode::Char('R') => apply(game.restart()),
                        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Enter => {
                            apply(game.next_stage())
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let input = read_input(&key_frame, frame);
        game.advance_frame(&input);
        display::render(out, &game.snapshot())?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_len {
            thread::sleep(frame_len - elapsed);
        }
    }
}

// ── Headless autopilot ────────────────────────────────────────────────────────

fn run_headless(game: &mut Game<StdRng>, frames: u64) -> anyhow::Result<()> {
    game.start()?;
    for frame in 0..frames {
        match game.state() {
            GameState::GameOver => break,
            GameState::StageClear => game.next_stage()?,
            _ => {}
        }
        let weave_left = (frame / 60) % 2 == 0;
        let input = Input {
            left: weave_left,
            right: !weave_left,
            firing: true,
            ..Input::default()
        };
        game.advance_frame(&input);
    }

    let snap = game.snapshot();
    log::info!(
        "headless run finished after {} frames in state {:?}",
        game.session.frame,
        snap.state
    );
    println!(
        "state={:?} stage={} score={} lives={} high_score={}",
        snap.state, snap.stage, snap.score, snap.lives, snap.high_score
    );
    Ok(())
}

/// stderr shares the tty with the alternate screen during a terminal
/// session, so only warnings get through unless `RUST_LOG` says otherwise.
fn default_log_filter(headless: bool) -> &'static str {
    if headless {
        "info"
    } else {
        "warn"
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(cli.headless.is_some())),
    )
    .init();

    let mut config = GameConfig::new();
    if let Some(path) = &cli.config {
        config
            .load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let store = JsonFileStore::new(config.save_file.clone());
    let mut game = Game::new(&config, rng, Box::new(LogAudio), Box::new(store));

    if let Some(frames) = cli.headless {
        return run_headless(&mut game, frames);
    }

    let frame_len = Duration::from_micros(config.frame_micros());
    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread to blocking event reads so the game loop never
    // waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = game_loop(&mut out, &mut game, &rx, frame_len);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result.context("terminal session failed")
}
