mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use log::{error, info, LevelFilter};
use rand::thread_rng;

use ufo_shooter::config::GameConfig;
use ufo_shooter::entities::{Control, GameEvent, GameStatus, InputSnapshot, Outcome};
use ufo_shooter::session::Session;

use display::Viewport;

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS, all speeds are per frame

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// OS key-repeat runs at ≥ 15 Hz, so 8 frames (≈130 ms) is always refreshed
/// before expiry.
const HOLD_WINDOW: u64 = 8;

#[derive(Parser, Debug)]
#[command(name = "ufo_shooter", about = "Shoot down the UFOs before the clock runs out")]
struct Args {
    /// TOML file overriding the default tuning and level table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start straight at this level (1-based) instead of showing the menu
    #[arg(long)]
    level: Option<usize>,

    #[arg(long, default_value = "ufo_shooter.log")]
    log_file: PathBuf,

    /// Log per-frame spawns and kills
    #[arg(short, long)]
    verbose: bool,
}

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

fn held_controls(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> Vec<Control> {
    let bindings: [(Control, [KeyCode; 3]); 4] = [
        (Control::Left, [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
        (Control::Right, [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
        (Control::Up, [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')]),
        (Control::Down, [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')]),
    ];
    bindings
        .iter()
        .filter(|(_, keys)| any_held(key_frame, keys, frame))
        .map(|(control, _)| *control)
        .collect()
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(usize),
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &Session,
) -> Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  UFO  SHOOTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select starting level:"))?;

    let levels = &session.config().levels;
    for (i, level) in levels.iter().enumerate().take(9) {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", i + 1)))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(format!(
            "{} UFOs in {}s",
            level.target, level.duration_secs
        )))?;
    }

    out.queue(cursor::MoveTo(
        cx.saturating_sub(12),
        cy + levels.len().min(9) as u16 + 1,
    ))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Arrows / WASD : Move   SPACE : Shoot   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        let code = match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) => code,
            Ok(_) => continue,
            Err(_) => return Ok(MenuResult::Quit), // input thread gone
        };
        match code {
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < levels.len() {
                    return Ok(MenuResult::Start(index));
                }
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Ok(MenuResult::Quit);
            }
            _ => {}
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Movement keys go through a `key_frame` map holding the frame of the last
/// press/repeat event per key, so several directions can be held together.
/// Terminals with keyboard enhancement send releases and keys drop out at
/// once; classic terminals only repeat presses and keys expire after
/// `HOLD_WINDOW` frames of silence.  Space fires once per press.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> Result<bool> {
    let mut rng = thread_rng();

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut fire = false;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('m') | KeyCode::Char('M')
                            if session.status() != GameStatus::Running =>
                        {
                            return Ok(false);
                        }
                        KeyCode::Char(' ') => fire = true,
                        _ => {}
                    }
                    if let GameStatus::Ended(outcome) = session.status() {
                        if handle_level_end(session, outcome, code) {
                            key_frame.clear();
                        }
                    }
                }
                // Repeat: refresh timestamp so key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                // Release: remove key immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let mut input = InputSnapshot::from_held(held_controls(&key_frame, frame));
        input.fire = fire;

        let state = session.tick(&input, Instant::now(), &mut rng);
        for event in &state.events {
            match event {
                GameEvent::PlayerDestroyed { .. } => {
                    // Terminal bell stands in for the explosion sound
                    out.queue(Print("\x07"))?;
                }
                GameEvent::Shot
                | GameEvent::EnemyDestroyed { .. }
                | GameEvent::LevelEnded(_) => {}
            }
        }

        let (cols, rows) = terminal::size()?;
        let view = Viewport::new(cols, rows, session.config());
        display::render(out, session, &view)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

/// Apply a level-end command key.  Returns true if a new attempt started.
fn handle_level_end(session: &mut Session, outcome: Outcome, code: KeyCode) -> bool {
    let now = Instant::now();
    match (code, outcome) {
        (KeyCode::Char('r') | KeyCode::Char('R'), _) => session.restart(now),
        (KeyCode::Char('n') | KeyCode::Char('N'), Outcome::Won) if !session.is_final_level() => {
            session.next(now)
        }
        (KeyCode::Char('t') | KeyCode::Char('T'), Outcome::Lost) => session.retry(now),
        _ => return false,
    }
    true
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    simple_logging::log_to_file(&args.log_file, filter)
        .with_context(|| format!("cannot open log file {}", args.log_file.display()))?;
    info!("Starting ufo_shooter.");

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GameConfig::default(),
    };
    let mut session = Session::new(config).context("invalid game config")?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

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

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &mut session, args.level);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(err) = &result {
        error!("aborted: {err:#}");
    }
    info!("Exiting ufo_shooter.");
    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &mut Session,
    first_level: Option<usize>,
) -> Result<()> {
    let mut pending = first_level.map(|level| level.saturating_sub(1));

    loop {
        let level = match pending.take() {
            Some(level) => level,
            None => match show_menu(out, rx, session)? {
                MenuResult::Quit => break,
                MenuResult::Start(level) => level,
            },
        };
        session.start(level, Instant::now());
        if game_loop(out, session, rx)? {
            break;
        }
    }
    Ok(())
}
