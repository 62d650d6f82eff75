/// Rendering layer: all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// session.  No game logic is performed; this module only translates
/// simulation state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use ufo_shooter::config::GameConfig;
use ufo_shooter::entities::{EffectKind, EnemyKind, GameState, GameStatus, Outcome};
use ufo_shooter::session::Session;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::White;
const C_HUD_LEVEL: Color = Color::Yellow;
const C_HUD_TIME: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_ENEMY_SAUCER: Color = Color::Green;
const C_ENEMY_DISC: Color = Color::Magenta;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Red;
const C_EXPLOSION: Color = Color::Red;
const C_HIT: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

// ── Coordinate mapping ────────────────────────────────────────────────────────

/// Maps logical pixels onto the terminal grid inside the border.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    field_width: f32,
    field_height: f32,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, cfg: &GameConfig) -> Self {
        Viewport {
            cols,
            rows,
            field_width: cfg.screen.width,
            field_height: cfg.screen.height,
        }
    }

    /// Terminal cell for a logical point, or `None` if it is off the field.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        // Play area: columns 1..cols-1, rows 2..rows-2
        let inner_w = self.cols.saturating_sub(2) as f32;
        let inner_h = self.rows.saturating_sub(4) as f32;
        if x < 0.0 || y < 0.0 || x >= self.field_width || y >= self.field_height {
            return None;
        }
        let col = 1 + (x / self.field_width * inner_w) as u16;
        let row = 2 + (y / self.field_height * inner_h) as u16;
        Some((col, row))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, session: &Session, view: &Viewport) -> std::io::Result<()> {
    let state = session.state();
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, state, view)?;

    for effect in &state.effects {
        let color = match effect.kind {
            EffectKind::Explosion => C_EXPLOSION,
            EffectKind::Hit => C_HIT,
        };
        // Fade from a solid burst to a sparse one as alpha drops
        let glyph = if effect.alpha > 0.8 { "✹" } else { "·" };
        draw_glyph(out, view, effect.x, effect.y, glyph, color)?;
    }
    for enemy in &state.enemies {
        let (glyph, color) = match enemy.kind {
            EnemyKind::Saucer => ("«▼»", C_ENEMY_SAUCER),
            EnemyKind::Disc => ("(◎)", C_ENEMY_DISC),
        };
        draw_centered(out, view, enemy.x, enemy.y, glyph, color)?;
    }
    for bullet in &state.player_bullets {
        draw_glyph(out, view, bullet.x, bullet.y, "║", C_BULLET_PLAYER)?;
    }
    for bullet in &state.enemy_bullets {
        draw_glyph(out, view, bullet.x, bullet.y, "↓", C_BULLET_ENEMY)?;
    }
    if let Some(player) = &state.player {
        draw_centered(out, view, player.x, player.y, "/▲\\", C_PLAYER)?;
    }

    draw_controls_hint(out, view)?;

    match state.status {
        GameStatus::Ended(outcome) => draw_level_end(out, session, outcome, view)?,
        GameStatus::NotStarted | GameStatus::Running => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score: {:>3}", state.score)))?;

    let level_str = format!(
        "Level: {} (Target {})",
        state.level_index + 1,
        state.level.target
    );
    let lx = (view.cols / 2).saturating_sub(level_str.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(&level_str))?;

    let time_str = format!("Time: {}s", state.remaining_secs);
    let rx = view
        .cols
        .saturating_sub(time_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TIME))?;
    out.queue(Print(&time_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_glyph<W: Write>(
    out: &mut W,
    view: &Viewport,
    x: f32,
    y: f32,
    glyph: &str,
    color: Color,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.cell(x, y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

/// Multi-cell sprite centred on its cell, kept inside the side walls.
fn draw_centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    x: f32,
    y: f32,
    sprite: &str,
    color: Color,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.cell(x, y) {
        let half = sprite.chars().count() as u16 / 2;
        let max_col = view.cols.saturating_sub(1 + sprite.chars().count() as u16);
        let col = col.saturating_sub(half).clamp(1, max_col.max(1));
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(sprite))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← ↑ ↓ → / W A S D : Move   SPACE : Shoot   Q : Quit"))?;
    Ok(())
}

// ── Level-end overlay ─────────────────────────────────────────────────────────

fn draw_level_end<W: Write>(
    out: &mut W,
    session: &Session,
    outcome: Outcome,
    view: &Viewport,
) -> std::io::Result<()> {
    let level = session.level_index() + 1;
    let (headline, color) = match outcome {
        Outcome::Won if session.campaign_complete() => {
            ("You completed all levels! Congratulations".to_string(), Color::Green)
        }
        Outcome::Won => (format!("Success! Level {level} complete"), Color::Green),
        Outcome::Lost => (
            format!("You lost! Didn't reach level {level} target"),
            Color::Red,
        ),
    };
    let score_line = format!("Kills: {} / {}", session.state().score, session.state().level.target);
    let hint = match outcome {
        Outcome::Won if session.is_final_level() => "R - Restart (Level 1)   M - Menu   Q - Quit",
        Outcome::Won => "R - Restart (Level 1)   N - Next   M - Menu   Q - Quit",
        Outcome::Lost => "R - Restart (Level 1)   T - Retry   M - Menu   Q - Quit",
    };

    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(2);
    let lines: [(&str, Color); 3] = [
        (headline.as_str(), color),
        (score_line.as_str(), Color::Yellow),
        (hint, Color::White),
    ];
    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}
