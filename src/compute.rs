/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (plus the config and, where needed, an RNG handle) and returns a
/// brand-new `GameState`.  Side effects are limited to the injected RNG.

use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::config::{FrameRange, GameConfig};
use crate::entities::{
    Bullet, Effect, EffectKind, Enemy, EnemyKind, GameEvent, GameState, GameStatus,
    InputSnapshot, Outcome, Player, Rect,
};
use crate::levels::LevelConfig;

// ── Culling bounds ───────────────────────────────────────────────────────────

/// Player bullets above this line are gone.
const PLAYER_BULLET_TOP: f32 = -10.0;
/// How far past the bottom edge enemy bullets travel before removal.
const ENEMY_BULLET_OVERSHOOT: f32 = 10.0;
/// How far past the bottom edge enemy craft travel before removal.
const ENEMY_OVERSHOOT: f32 = 40.0;

// ── Effect tables ────────────────────────────────────────────────────────────

const EFFECT_GROWTH: f32 = 0.08;
const EFFECT_FADE: f32 = 0.03;

fn effect_shape(kind: EffectKind) -> (f32, u32) {
    match kind {
        EffectKind::Explosion => (12.0, 20),
        EffectKind::Hit => (8.0, 10),
    }
}

pub fn spawn_effect(kind: EffectKind, x: f32, y: f32) -> Effect {
    let (radius, life) = effect_shape(kind);
    Effect {
        x,
        y,
        kind,
        radius,
        scale: 1.0,
        alpha: 1.0,
        life,
    }
}

// ── Hit boxes ────────────────────────────────────────────────────────────────

pub fn player_rect(player: &Player, cfg: &GameConfig) -> Rect {
    Rect::centered(player.x, player.y, cfg.player.width, cfg.player.height)
}

pub fn enemy_rect(enemy: &Enemy, cfg: &GameConfig) -> Rect {
    Rect::centered(enemy.x, enemy.y, cfg.enemy.width, cfg.enemy.height)
}

pub fn player_bullet_rect(bullet: &Bullet, cfg: &GameConfig) -> Rect {
    Rect::centered(
        bullet.x,
        bullet.y,
        cfg.player.bullet_width,
        cfg.player.bullet_height,
    )
}

pub fn enemy_bullet_rect(bullet: &Bullet, cfg: &GameConfig) -> Rect {
    Rect::centered(
        bullet.x,
        bullet.y,
        cfg.enemy.bullet_width,
        cfg.enemy.bullet_height,
    )
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the opening state of a level attempt.
pub fn init_state(cfg: &GameConfig, level_index: usize, level: LevelConfig) -> GameState {
    GameState {
        player: Some(Player {
            x: cfg.screen.width / 2.0,
            y: cfg.screen.height - cfg.player.start_offset,
        }),
        player_bullets: Vec::new(),
        enemies: Vec::new(),
        enemy_bullets: Vec::new(),
        effects: Vec::new(),
        score: 0,
        level_index,
        level,
        status: GameStatus::Running,
        spawn_timer: 0,
        frame: 0,
        remaining_secs: level.duration_secs,
        events: Vec::new(),
    }
}

fn roll_cooldown(range: FrameRange, rng: &mut impl Rng) -> i32 {
    rng.gen_range(range.min..=range.max)
}

/// A new enemy craft just above the top edge, at a random column.
pub fn spawn_enemy(cfg: &GameConfig, rng: &mut impl Rng) -> Enemy {
    let margin = cfg.enemy.spawn_margin;
    let x = rng.gen_range(margin..=cfg.screen.width - margin);
    let kind = if rng.gen_bool(0.5) {
        EnemyKind::Saucer
    } else {
        EnemyKind::Disc
    };
    Enemy {
        x,
        y: cfg.enemy.spawn_y,
        cooldown: roll_cooldown(cfg.enemy.first_shot, rng),
        kind,
    }
}

/// Bullet leaving the underside of `enemy`.
pub fn muzzle_bullet(enemy: &Enemy, cfg: &GameConfig) -> Bullet {
    Bullet {
        x: enemy.x,
        y: enemy.y + cfg.enemy.height / 2.0 + cfg.enemy.muzzle_offset,
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Fire a bullet from the nose of the player craft.  Ignored unless the
/// level is running with a live player.
pub fn player_shoot(state: &GameState, cfg: &GameConfig) -> GameState {
    let player = match (&state.player, state.is_running()) {
        (Some(player), true) => player,
        _ => return state.clone(),
    };
    let mut next = state.clone();
    next.player_bullets.push(Bullet {
        x: player.x,
        y: player.y - cfg.player.height / 2.0,
    });
    next.events.push(GameEvent::Shot);
    next
}

/// Apply held directions.  A direction only moves the craft while it is
/// still inside that side's margin, so the craft can overshoot by at most
/// one step.
pub fn move_player(state: &GameState, cfg: &GameConfig, input: &InputSnapshot) -> GameState {
    let Some(player) = &state.player else {
        return state.clone();
    };
    let p = &cfg.player;
    let (width, height) = (cfg.screen.width, cfg.screen.height);

    let mut x = player.x;
    let mut y = player.y;
    if input.left && x > p.margin_x {
        x -= p.speed;
    }
    if input.right && x < width - p.margin_x {
        x += p.speed;
    }
    if input.up && y > p.margin_y {
        y -= p.speed;
    }
    if input.down && y < height - p.margin_y {
        y += p.speed;
    }

    GameState {
        player: Some(Player { x, y }),
        ..state.clone()
    }
}

// ── Per-frame helpers ────────────────────────────────────────────────────────

/// Grow, fade and age every effect, dropping the expired ones.
pub fn advance_effects(effects: &[Effect]) -> Vec<Effect> {
    effects
        .iter()
        .filter_map(|e| {
            let life = e.life.saturating_sub(1);
            (life > 0).then(|| Effect {
                scale: e.scale + EFFECT_GROWTH,
                alpha: (e.alpha - EFFECT_FADE).max(0.0),
                life,
                ..e.clone()
            })
        })
        .collect()
}

/// Whole seconds left on the level clock, floored at zero.
pub fn remaining_secs(level: &LevelConfig, elapsed: Duration) -> u64 {
    level.duration_secs.saturating_sub(elapsed.as_secs())
}

/// The result of the level so far: won as soon as the kill target is met,
/// lost once the clock runs out short of it.
pub fn level_verdict(score: u32, level: &LevelConfig, elapsed: Duration) -> Option<Outcome> {
    if score >= level.target {
        Some(Outcome::Won)
    } else if remaining_secs(level, elapsed) == 0 {
        Some(Outcome::Lost)
    } else {
        None
    }
}

fn end_level(mut state: GameState, outcome: Outcome) -> GameState {
    info!(
        "level {} ended: {:?} with {} kills at frame {}",
        state.level_index + 1,
        outcome,
        state.score,
        state.frame
    );
    state.status = GameStatus::Ended(outcome);
    state.events.push(GameEvent::LevelEnded(outcome));
    state
}

fn destroy_player(mut state: GameState, player: Player) -> GameState {
    state.player = None;
    state
        .effects
        .push(spawn_effect(EffectKind::Explosion, player.x, player.y));
    state.events.push(GameEvent::PlayerDestroyed {
        x: player.x,
        y: player.y,
    });
    end_level(state, Outcome::Lost)
}

// ── Per-frame tick (nearly pure, RNG is injected) ──────────────────────────

/// Advance the simulation by one frame.  `elapsed` is the wall-clock time
/// since the level started.  All randomness comes through `rng` so callers
/// control determinism (useful for tests with a seeded RNG).
///
/// A frame on a state that is not running returns it unchanged.
pub fn tick(
    state: &GameState,
    cfg: &GameConfig,
    input: &InputSnapshot,
    elapsed: Duration,
    rng: &mut impl Rng,
) -> GameState {
    if !state.is_running() {
        return state.clone();
    }

    let mut next = GameState {
        frame: state.frame + 1,
        remaining_secs: remaining_secs(&state.level, elapsed),
        events: Vec::new(),
        ..state.clone()
    };
    let bottom = cfg.screen.height;

    // ── 1. Player input ──────────────────────────────────────────────────────
    if input.fire {
        next = player_shoot(&next, cfg);
    }
    next = move_player(&next, cfg, input);

    // ── 2. Move player bullets ───────────────────────────────────────────────
    let mut player_bullets: Vec<Bullet> = next
        .player_bullets
        .iter()
        .map(|b| Bullet {
            y: b.y - cfg.player.bullet_speed,
            ..b.clone()
        })
        .filter(|b| b.y >= PLAYER_BULLET_TOP)
        .collect();

    // ── 3. Enemy bullets: move, then hit test against the player ────────────
    let enemy_bullets: Vec<Bullet> = next
        .enemy_bullets
        .iter()
        .map(|b| Bullet {
            y: b.y + cfg.enemy.bullet_speed,
            ..b.clone()
        })
        .filter(|b| b.y <= bottom + ENEMY_BULLET_OVERSHOOT)
        .collect();

    if let Some(player) = next.player.clone() {
        let body = player_rect(&player, cfg);
        let (hits, misses): (Vec<Bullet>, Vec<Bullet>) = enemy_bullets
            .into_iter()
            .partition(|b| enemy_bullet_rect(b, cfg).overlaps(&body));
        next.enemy_bullets = misses;
        if !hits.is_empty() {
            next.player_bullets = player_bullets;
            return destroy_player(next, player);
        }
    } else {
        next.enemy_bullets = enemy_bullets;
    }

    // ── 4. Enemy craft: move, fire, cull, then combat ───────────────────────
    let enemies = std::mem::take(&mut next.enemies);
    let mut survivors: Vec<Enemy> = Vec::with_capacity(enemies.len());

    for (i, enemy) in enemies.iter().enumerate() {
        let mut enemy = Enemy {
            y: enemy.y + cfg.enemy.speed,
            cooldown: enemy.cooldown - 1,
            ..enemy.clone()
        };
        if enemy.cooldown <= 0 {
            next.enemy_bullets.push(muzzle_bullet(&enemy, cfg));
            enemy.cooldown = roll_cooldown(cfg.enemy.refire, rng);
        }
        if enemy.y > bottom + ENEMY_OVERSHOOT {
            continue;
        }

        let body = enemy_rect(&enemy, cfg);

        // At most one bullet per craft per frame.
        let shot_down = match player_bullets
            .iter()
            .position(|b| player_bullet_rect(b, cfg).overlaps(&body))
        {
            Some(hit) => {
                player_bullets.remove(hit);
                next.score += 1;
                next.effects
                    .push(spawn_effect(EffectKind::Hit, enemy.x, enemy.y));
                next.events.push(GameEvent::EnemyDestroyed {
                    x: enemy.x,
                    y: enemy.y,
                });
                debug!("enemy down at ({:.0}, {:.0}), score {}", enemy.x, enemy.y, next.score);
                true
            }
            None => false,
        };

        // A craft shot down this frame still collides with the player.
        if let Some(player) = next.player.clone() {
            if body.overlaps(&player_rect(&player, cfg)) {
                // The rest of the fleet is left as it was for this frame.
                survivors.extend(enemies[i + 1..].iter().cloned());
                next.enemies = survivors;
                next.player_bullets = player_bullets;
                return destroy_player(next, player);
            }
        }

        if !shot_down {
            survivors.push(enemy);
        }
    }
    next.enemies = survivors;
    next.player_bullets = player_bullets;

    // ── 5. Effects ───────────────────────────────────────────────────────────
    next.effects = advance_effects(&next.effects);

    // ── 6. Spawn a new enemy ─────────────────────────────────────────────────
    next.spawn_timer += 1;
    if next.spawn_timer > cfg.enemy.spawn_interval {
        let enemy = spawn_enemy(cfg, rng);
        debug!("enemy spawned at x={:.0}, cooldown {}", enemy.x, enemy.cooldown);
        next.enemies.push(enemy);
        next.spawn_timer = 0;
    }

    // ── 7. Level verdict ─────────────────────────────────────────────────────
    match level_verdict(next.score, &next.level, elapsed) {
        Some(outcome) => end_level(next, outcome),
        None => next,
    }
}
