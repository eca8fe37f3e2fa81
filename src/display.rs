//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and a read-only [`Snapshot`].
//! The simulation works in field pixels; this module scales them onto the
//! terminal grid inside the border.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use raiden_shooter::compute::Snapshot;
use raiden_shooter::entities::{
    Bullet, BulletOwner, EnemyKind, Explosion, GameState, Hostile, Particle, PlayerCraft, PowerUp,
    WeaponType,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_STAGE: Color = Color::Green;
const C_PLAYER: Color = Color::Blue;
const C_ENEMY_BASIC: Color = Color::Red;
const C_ENEMY_ADVANCED: Color = Color::DarkYellow;
const C_BOSS: Color = Color::Magenta;
const C_BULLET_ENEMY: Color = Color::Red;
const C_PARTICLE: Color = Color::DarkYellow;
const C_EXPLOSION: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

fn weapon_color(weapon: WeaponType) -> Color {
    match weapon {
        WeaponType::Vulcan => Color::Yellow,
        WeaponType::Laser => Color::Magenta,
        WeaponType::Plasma => Color::Cyan,
        WeaponType::Missile => Color::DarkYellow,
    }
}

// ── Field → terminal mapping ──────────────────────────────────────────────────

/// Play area inside the border: columns 1..cols-1, rows 2..rows-2.
struct Viewport {
    cols: u16,
    rows: u16,
    field_w: f32,
    field_h: f32,
}

impl Viewport {
    fn new(snap: &Snapshot<'_>) -> std::io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Viewport {
            cols,
            rows,
            field_w: snap.width,
            field_h: snap.height,
        })
    }

    fn inner_cols(&self) -> f32 {
        self.cols.saturating_sub(2) as f32
    }

    fn inner_rows(&self) -> f32 {
        self.rows.saturating_sub(4) as f32
    }

    /// Terminal cell for a field point, or `None` when it falls outside.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 || x >= self.field_w || y >= self.field_h {
            return None;
        }
        let col = 1.0 + x / self.field_w * self.inner_cols();
        let row = 2.0 + y / self.field_h * self.inner_rows();
        Some((col as u16, row as u16))
    }

    /// Width in cells of a span of field pixels, at least one.
    fn span(&self, w: f32) -> usize {
        ((w / self.field_w * self.inner_cols()).round() as usize).max(1)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, snap: &Snapshot<'_>) -> std::io::Result<()> {
    let view = Viewport::new(snap)?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &view)?;
    draw_hud(out, &view, snap)?;

    for power_up in snap.power_ups {
        draw_power_up(out, &view, power_up)?;
    }
    for bullet in snap.bullets {
        draw_bullet(out, &view, bullet)?;
    }
    for hostile in snap.enemies {
        draw_hostile(out, &view, hostile)?;
    }
    if let Some(player) = snap.player {
        draw_player(out, &view, player)?;
    }
    for particle in snap.particles {
        draw_particle(out, &view, particle)?;
    }
    for explosion in snap.explosions {
        draw_explosion(out, &view, explosion)?;
    }

    draw_controls_hint(out, &view)?;
    draw_overlay(out, &view, snap)?;

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

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, view: &Viewport, snap: &Snapshot<'_>) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score:{:>7}  Hi:{:>7}",
        snap.score, snap.high_score
    )))?;

    let stage_str = match snap.boss_health {
        Some(ratio) => format!("[ STAGE {} · BOSS {:>3}% ]", snap.stage, (ratio * 100.0).round()),
        None => format!(
            "[ STAGE {} · {}/{} ]",
            snap.stage, snap.stage_enemies_destroyed, snap.stage_enemy_target
        ),
    };
    let sx = (view.cols / 2).saturating_sub(stage_str.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(sx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_STAGE))?;
    out.queue(Print(&stage_str))?;

    let weapon_tag = match (snap.weapon, snap.power_level) {
        (Some(weapon), Some(level)) => format!("{} Lv{} ", weapon.name().to_uppercase(), level),
        _ => String::new(),
    };
    let lives_str = format!("Lives:{}", "♥".repeat(snap.lives as usize));
    let right_len = weapon_tag.chars().count() + lives_str.chars().count();
    let rx = view.cols.saturating_sub(right_len as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    if let Some(weapon) = snap.weapon {
        out.queue(style::SetForegroundColor(weapon_color(weapon)))?;
        out.queue(Print(&weapon_tag))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn put<W: Write>(out: &mut W, view: &Viewport, x: f32, y: f32, glyph: &str) -> std::io::Result<()> {
    if let Some((col, row)) = view.cell(x, y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, view: &Viewport, p: &PlayerCraft) -> std::io::Result<()> {
    //   ▲       ← nose
    //  /█\      ← fuselage + wings
    let (cx, _) = p.centre();
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    put(out, view, cx, p.y, "▲")?;
    put(out, view, p.x, p.y + p.height * 0.6, "/█\\")?;
    Ok(())
}

fn draw_hostile<W: Write>(out: &mut W, view: &Viewport, hostile: &Hostile) -> std::io::Result<()> {
    match hostile {
        Hostile::Enemy(e) => {
            let (color, sprite) = match e.kind {
                EnemyKind::Basic => (C_ENEMY_BASIC, "«▼»"),
                EnemyKind::Advanced => (C_ENEMY_ADVANCED, "(◎)"),
            };
            out.queue(style::SetForegroundColor(color))?;
            put(out, view, e.x, e.y, sprite)?;
        }
        Hostile::Boss(b) => {
            let inner = view.span(b.width).saturating_sub(2);
            out.queue(style::SetForegroundColor(C_BOSS))?;
            // Health bar above the hull
            let filled = (inner as f32 * b.health_ratio()).round() as usize;
            put(
                out,
                view,
                b.x,
                b.y - 10.0,
                &format!("[{}{}]", "█".repeat(filled), "░".repeat(inner - filled.min(inner))),
            )?;
            put(out, view, b.x, b.y, &format!("╔{}╗", "═".repeat(inner)))?;
            put(out, view, b.x, b.y + b.height / 2.0, &format!("║{}║", "▓".repeat(inner)))?;
            put(out, view, b.x, b.y + b.height - 1.0, &format!("╚{}╝", "╦".repeat(inner)))?;
        }
    }
    Ok(())
}

fn draw_bullet<W: Write>(out: &mut W, view: &Viewport, bullet: &Bullet) -> std::io::Result<()> {
    match (bullet.owner, bullet.weapon) {
        (BulletOwner::Player, Some(weapon)) => {
            let glyph = match weapon {
                WeaponType::Vulcan => "│",
                WeaponType::Laser => "║",
                WeaponType::Plasma => "o",
                WeaponType::Missile => "^",
            };
            out.queue(style::SetForegroundColor(weapon_color(weapon)))?;
            put(out, view, bullet.x, bullet.y, glyph)
        }
        _ => {
            out.queue(style::SetForegroundColor(C_BULLET_ENEMY))?;
            put(out, view, bullet.x, bullet.y, "↓")
        }
    }
}

fn draw_power_up<W: Write>(out: &mut W, view: &Viewport, p: &PowerUp) -> std::io::Result<()> {
    let letter = p.weapon.name()[..1].to_uppercase();
    out.queue(style::SetForegroundColor(weapon_color(p.weapon)))?;
    put(out, view, p.x, p.y, &format!("[{letter}]"))
}

fn draw_particle<W: Write>(out: &mut W, view: &Viewport, p: &Particle) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_PARTICLE))?;
    put(out, view, p.x, p.y, "·")
}

fn draw_explosion<W: Write>(out: &mut W, view: &Viewport, e: &Explosion) -> std::io::Result<()> {
    let glyph = if e.life * 2 > e.max_life { "✶" } else { "*" };
    out.queue(style::SetForegroundColor(C_EXPLOSION))?;
    put(out, view, e.x, e.y, glyph)
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("←↑↓→/WASD: Move  SPACE: Fire  P: Pause  R: Restart  Q: Quit"))?;
    Ok(())
}

// ── State overlays ────────────────────────────────────────────────────────────

fn draw_overlay<W: Write>(out: &mut W, view: &Viewport, snap: &Snapshot<'_>) -> std::io::Result<()> {
    let lines: Vec<(String, Color)> = match snap.state {
        GameState::Playing => return Ok(()),
        GameState::Menu => {
            let mut lines = vec![("★  RAIDEN  SHOOTER  ★".to_string(), Color::Cyan)];
            if snap.high_score > 0 {
                lines.push((format!("Best Stage Score: {}", snap.high_score), Color::Yellow));
            }
            lines.push(("Press ENTER to start".to_string(), Color::White));
            lines
        }
        GameState::Paused => vec![
            ("PAUSED".to_string(), Color::Green),
            ("Press P to resume".to_string(), C_HINT),
        ],
        GameState::GameOver => vec![
            ("╔══════════════════╗".to_string(), Color::Red),
            ("║    GAME  OVER    ║".to_string(), Color::Red),
            ("╚══════════════════╝".to_string(), Color::Red),
            (format!("Final Score: {}", snap.score), Color::Yellow),
            (format!("High Score: {}", snap.high_score), Color::Yellow),
            ("R: Play again   Q: Quit".to_string(), C_HINT),
        ],
        GameState::StageClear => vec![
            (format!("STAGE {} CLEAR", snap.stage), Color::Green),
            (format!("Stage Score: {}", snap.stage_score), Color::Yellow),
            ("Press N for the next stage".to_string(), C_HINT),
        ],
    };

    let cx = view.cols / 2;
    let top = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (text, color)) in lines.iter().enumerate() {
        let x = cx.saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(x, top + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(text))?;
    }
    Ok(())
}
