use std::time::Duration;

use ufo_shooter::compute::*;
use ufo_shooter::config::GameConfig;
use ufo_shooter::entities::*;
use ufo_shooter::levels::LevelConfig;

use rand::rngs::StdRng;
use rand::SeedableRng;

// Default field is 800x600; the player starts at (400, 500) with a 32x48 box.

fn cfg() -> GameConfig {
    GameConfig::default()
}

fn make_state() -> GameState {
    init_state(&cfg(), 0, LevelConfig::new(30, 60))
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn idle() -> InputSnapshot {
    InputSnapshot::default()
}

fn step(state: &GameState) -> GameState {
    tick(state, &cfg(), &idle(), Duration::ZERO, &mut seeded_rng())
}

fn enemy(x: f32, y: f32) -> Enemy {
    Enemy {
        x,
        y,
        cooldown: 500,
        kind: EnemyKind::Saucer,
    }
}

fn player_pos(state: &GameState) -> (f32, f32) {
    let p = state.player.as_ref().expect("player alive");
    (p.x, p.y)
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_player_position() {
    let s = make_state();
    assert_eq!(player_pos(&s), (400.0, 500.0)); // width / 2, height - 100
}

#[test]
fn init_state_empty_collections() {
    let s = make_state();
    assert!(s.player_bullets.is_empty());
    assert!(s.enemies.is_empty());
    assert!(s.enemy_bullets.is_empty());
    assert!(s.effects.is_empty());
    assert_eq!(s.score, 0);
    assert_eq!(s.frame, 0);
    assert_eq!(s.spawn_timer, 0);
    assert_eq!(s.remaining_secs, 60);
    assert_eq!(s.status, GameStatus::Running);
}

// ── move_player ───────────────────────────────────────────────────────────────

#[test]
fn move_each_direction_by_five() {
    let s = make_state();
    let c = cfg();
    let left = move_player(&s, &c, &idle().with(Control::Left));
    let right = move_player(&s, &c, &idle().with(Control::Right));
    let up = move_player(&s, &c, &idle().with(Control::Up));
    let down = move_player(&s, &c, &idle().with(Control::Down));
    assert_eq!(player_pos(&left), (395.0, 500.0));
    assert_eq!(player_pos(&right), (405.0, 500.0));
    assert_eq!(player_pos(&up), (400.0, 495.0));
    assert_eq!(player_pos(&down), (400.0, 505.0));
}

#[test]
fn move_diagonal_applies_both_axes() {
    let s = make_state();
    let input = InputSnapshot::from_held([Control::Left, Control::Up]);
    let s2 = move_player(&s, &cfg(), &input);
    assert_eq!(player_pos(&s2), (395.0, 495.0));
}

#[test]
fn move_stops_at_margins() {
    let c = cfg();
    let mut s = make_state();
    s.player = Some(Player { x: 20.0, y: 30.0 });
    let s2 = move_player(&s, &c, &InputSnapshot::from_held([Control::Left, Control::Up]));
    assert_eq!(player_pos(&s2), (20.0, 30.0));

    s.player = Some(Player { x: 780.0, y: 570.0 });
    let s2 = move_player(&s, &c, &InputSnapshot::from_held([Control::Right, Control::Down]));
    assert_eq!(player_pos(&s2), (780.0, 570.0));
}

#[test]
fn move_inside_margin_may_overshoot_one_step() {
    let mut s = make_state();
    s.player = Some(Player { x: 21.0, y: 300.0 });
    let s2 = move_player(&s, &cfg(), &idle().with(Control::Left));
    assert_eq!(player_pos(&s2), (16.0, 300.0));
}

#[test]
fn move_does_not_mutate_original() {
    let s = make_state();
    let _ = move_player(&s, &cfg(), &idle().with(Control::Left));
    assert_eq!(player_pos(&s), (400.0, 500.0));
}

// ── player_shoot ──────────────────────────────────────────────────────────────

#[test]
fn shoot_adds_bullet_at_nose() {
    let s = make_state();
    let s2 = player_shoot(&s, &cfg());
    assert_eq!(s2.player_bullets, vec![Bullet { x: 400.0, y: 476.0 }]);
    assert_eq!(s2.events, vec![GameEvent::Shot]);
    assert!(s.player_bullets.is_empty());
}

#[test]
fn shoot_ignored_when_not_running() {
    let mut s = make_state();
    s.status = GameStatus::Ended(Outcome::Won);
    let s2 = player_shoot(&s, &cfg());
    assert!(s2.player_bullets.is_empty());
    assert!(s2.events.is_empty());
}

#[test]
fn tick_fires_before_moving() {
    let s = make_state();
    let input = InputSnapshot::from_held([Control::Fire, Control::Left]);
    let s2 = tick(&s, &cfg(), &input, Duration::ZERO, &mut seeded_rng());
    // Spawned at the pre-move nose and already advanced one step.
    assert_eq!(s2.player_bullets, vec![Bullet { x: 400.0, y: 467.0 }]);
    assert_eq!(player_pos(&s2), (395.0, 500.0));
    assert!(s2.events.contains(&GameEvent::Shot));
}

// ── tick: movement & culling ─────────────────────────────────────────────────

#[test]
fn tick_increments_frame_and_clears_events() {
    let mut s = make_state();
    s.frame = 5;
    s.events.push(GameEvent::Shot);
    let s2 = step(&s);
    assert_eq!(s2.frame, 6);
    assert!(s2.events.is_empty());
}

#[test]
fn tick_player_bullet_moves_up_nine() {
    let mut s = make_state();
    s.player_bullets.push(Bullet { x: 100.0, y: 300.0 });
    let s2 = step(&s);
    assert_eq!(s2.player_bullets, vec![Bullet { x: 100.0, y: 291.0 }]);
}

#[test]
fn tick_player_bullet_culled_above_top() {
    let mut s = make_state();
    s.player_bullets.push(Bullet { x: 100.0, y: 0.0 }); // → -9, kept
    s.player_bullets.push(Bullet { x: 200.0, y: -2.0 }); // → -11, gone
    let s2 = step(&s);
    assert_eq!(s2.player_bullets, vec![Bullet { x: 100.0, y: -9.0 }]);
}

#[test]
fn tick_enemy_bullet_moves_down_five() {
    let mut s = make_state();
    s.enemy_bullets.push(Bullet { x: 50.0, y: 100.0 });
    let s2 = step(&s);
    assert_eq!(s2.enemy_bullets, vec![Bullet { x: 50.0, y: 105.0 }]);
}

#[test]
fn tick_enemy_bullet_culled_below_bottom() {
    let mut s = make_state();
    s.enemy_bullets.push(Bullet { x: 50.0, y: 605.0 }); // → 610, kept
    s.enemy_bullets.push(Bullet { x: 60.0, y: 606.0 }); // → 611, gone
    let s2 = step(&s);
    assert_eq!(s2.enemy_bullets, vec![Bullet { x: 50.0, y: 610.0 }]);
    assert!(s2.is_running());
}

#[test]
fn tick_enemy_moves_down_two_and_counts_down() {
    let mut s = make_state();
    s.enemies.push(enemy(100.0, 50.0));
    let s2 = step(&s);
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.enemies[0].y, 52.0);
    assert_eq!(s2.enemies[0].cooldown, 499);
}

#[test]
fn tick_enemy_culled_past_bottom() {
    let mut s = make_state();
    s.enemies.push(enemy(100.0, 638.0)); // → 640, kept
    s.enemies.push(enemy(200.0, 639.0)); // → 641, gone
    let s2 = step(&s);
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.enemies[0].x, 100.0);
    assert_eq!(s2.score, 0);
}

// ── tick: enemy fire ─────────────────────────────────────────────────────────

#[test]
fn enemy_fires_after_exactly_its_cooldown() {
    let c = cfg();
    let mut rng = seeded_rng();
    let mut s = make_state();
    s.enemies.push(Enemy {
        x: 100.0,
        y: -40.0,
        cooldown: 60,
        kind: EnemyKind::Disc,
    });

    for _ in 0..59 {
        s = tick(&s, &c, &idle(), Duration::ZERO, &mut rng);
        assert!(s.enemy_bullets.is_empty());
    }
    s = tick(&s, &c, &idle(), Duration::ZERO, &mut rng);

    let craft = &s.enemies[0];
    assert_eq!(craft.y, 80.0); // -40 + 60 * 2
    // Leaves from the underside: y + height / 2 + muzzle offset
    assert_eq!(s.enemy_bullets, vec![Bullet { x: 100.0, y: 102.0 }]);
    assert!((80..=140).contains(&craft.cooldown));
}

// ── tick: collision: player bullet ↔ enemy ──────────────────────────────────

#[test]
fn player_bullet_kills_enemy() {
    // Bullet 120 → 111, enemy 100 → 102; boxes overlap after both moves.
    let mut s = make_state();
    s.enemies.push(enemy(100.0, 100.0));
    s.player_bullets.push(Bullet { x: 100.0, y: 120.0 });
    let s2 = step(&s);
    assert!(s2.enemies.is_empty());
    assert!(s2.player_bullets.is_empty());
    assert_eq!(s2.score, 1);
    assert!(s2
        .events
        .contains(&GameEvent::EnemyDestroyed { x: 100.0, y: 102.0 }));

    // Hit flash spawned and already aged once this frame
    assert_eq!(s2.effects.len(), 1);
    let fx = &s2.effects[0];
    assert_eq!(fx.kind, EffectKind::Hit);
    assert_eq!(fx.life, 9);
    assert_eq!((fx.x, fx.y), (100.0, 102.0));
}

#[test]
fn player_bullet_misses_outside_box() {
    let mut s = make_state();
    s.enemies.push(enemy(100.0, 100.0));
    s.player_bullets.push(Bullet { x: 130.0, y: 120.0 }); // enemy spans x 76..124
    let s2 = step(&s);
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.player_bullets.len(), 1);
    assert_eq!(s2.score, 0);
}

#[test]
fn at_most_one_bullet_consumed_per_enemy() {
    let mut s = make_state();
    s.enemies.push(enemy(100.0, 100.0));
    s.player_bullets.push(Bullet { x: 100.0, y: 120.0 });
    s.player_bullets.push(Bullet { x: 102.0, y: 118.0 });
    let s2 = step(&s);
    assert!(s2.enemies.is_empty());
    assert_eq!(s2.player_bullets.len(), 1);
    assert_eq!(s2.score, 1);
}

#[test]
fn one_bullet_kills_only_one_enemy() {
    let mut s = make_state();
    s.enemies.push(enemy(100.0, 100.0));
    s.enemies.push(enemy(110.0, 100.0));
    s.player_bullets.push(Bullet { x: 105.0, y: 120.0 });
    let s2 = step(&s);
    // First in existence order takes the hit
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.enemies[0].x, 110.0);
    assert_eq!(s2.score, 1);
}

#[test]
fn kill_ends_level_when_target_reached() {
    let mut s = make_state();
    s.score = 29;
    s.enemies.push(enemy(100.0, 100.0));
    s.player_bullets.push(Bullet { x: 100.0, y: 120.0 });
    let s2 = step(&s);
    assert_eq!(s2.score, 30);
    assert_eq!(s2.status, GameStatus::Ended(Outcome::Won));
    assert!(s2.events.contains(&GameEvent::LevelEnded(Outcome::Won)));
}

#[test]
fn thirty_kills_win_level_one() {
    let c = cfg();
    let mut rng = seeded_rng();
    let mut s = make_state();
    for kill in 1..=30 {
        assert!(s.is_running());
        s.enemies.push(enemy(100.0, 100.0));
        s.player_bullets.push(Bullet { x: 100.0, y: 120.0 });
        s = tick(&s, &c, &idle(), Duration::from_secs(kill), &mut rng);
        assert_eq!(s.score, kill as u32);
    }
    assert_eq!(s.outcome(), Some(Outcome::Won));
}

// ── tick: collision: enemy ↔ player ──────────────────────────────────────────

#[test]
fn enemy_bullet_destroys_player() {
    let mut s = make_state();
    s.enemy_bullets.push(Bullet { x: 400.0, y: 470.0 }); // → 475, box reaches 480
    s.enemies.push(enemy(600.0, 100.0));
    let s2 = step(&s);

    assert!(s2.player.is_none());
    assert_eq!(s2.status, GameStatus::Ended(Outcome::Lost));
    assert!(s2.enemy_bullets.is_empty());
    assert!(s2
        .events
        .contains(&GameEvent::PlayerDestroyed { x: 400.0, y: 500.0 }));
    assert!(s2.events.contains(&GameEvent::LevelEnded(Outcome::Lost)));

    // Frame ended early: the enemy pass never ran
    assert_eq!(s2.enemies[0].y, 100.0);
    let fx = &s2.effects[0];
    assert_eq!(fx.kind, EffectKind::Explosion);
    assert_eq!(fx.life, 20);
}

#[test]
fn enemy_bullet_loss_ignores_score() {
    let mut s = make_state();
    s.score = 29;
    s.enemy_bullets.push(Bullet { x: 400.0, y: 470.0 });
    let s2 = step(&s);
    assert_eq!(s2.outcome(), Some(Outcome::Lost));
    assert_eq!(s2.score, 29);
}

#[test]
fn enemy_body_destroys_player() {
    let mut s = make_state();
    s.enemies.push(enemy(400.0, 460.0)); // → 462, box 446..478 meets player 476..524
    s.enemies.push(enemy(600.0, 100.0));
    let s2 = step(&s);
    assert!(s2.player.is_none());
    assert_eq!(s2.outcome(), Some(Outcome::Lost));
    // Rammer is gone, the craft after it was not processed
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.enemies[0].y, 100.0);
}

#[test]
fn enemy_shot_down_while_ramming_still_kills_player() {
    let mut s = make_state();
    s.enemies.push(enemy(400.0, 460.0));
    s.player_bullets.push(Bullet { x: 400.0, y: 480.0 }); // → 471, inside 446..478
    let s2 = step(&s);
    assert_eq!(s2.score, 1);
    assert!(s2.player_bullets.is_empty());
    assert!(s2.enemies.is_empty());
    assert!(s2.player.is_none());
    assert_eq!(s2.status, GameStatus::Ended(Outcome::Lost));
    assert!(s2
        .events
        .contains(&GameEvent::EnemyDestroyed { x: 400.0, y: 462.0 }));
}

#[test]
fn early_loss_frame_updates_clock() {
    let mut s = make_state();
    s.enemy_bullets.push(Bullet { x: 400.0, y: 470.0 });
    let s2 = tick(&s, &cfg(), &idle(), Duration::from_millis(10_500), &mut seeded_rng());
    assert_eq!(s2.outcome(), Some(Outcome::Lost));
    assert_eq!(s2.remaining_secs, 50);

    let mut s = make_state();
    s.enemies.push(enemy(400.0, 460.0));
    let s2 = tick(&s, &cfg(), &idle(), Duration::from_secs(20), &mut seeded_rng());
    assert_eq!(s2.outcome(), Some(Outcome::Lost));
    assert_eq!(s2.remaining_secs, 40);
}

#[test]
fn level_end_reported_once() {
    let mut s = make_state();
    s.score = 30;
    let s2 = step(&s);
    let ends: Vec<_> = s2
        .events
        .iter()
        .filter(|e| matches!(e, GameEvent::LevelEnded(_)))
        .collect();
    assert_eq!(ends, vec![&GameEvent::LevelEnded(Outcome::Won)]);
}

// ── tick: spawning ───────────────────────────────────────────────────────────

#[test]
fn enemy_spawns_once_timer_exceeds_interval() {
    let mut s = make_state();
    s.spawn_timer = 60;
    let s2 = step(&s);
    assert_eq!(s2.spawn_timer, 0);
    assert_eq!(s2.enemies.len(), 1);
    let e = &s2.enemies[0];
    assert_eq!(e.y, -40.0);
    assert!((50.0..=750.0).contains(&e.x));
    assert!((60..=140).contains(&e.cooldown));
}

#[test]
fn no_spawn_before_interval() {
    let mut s = make_state();
    s.spawn_timer = 59;
    let s2 = step(&s);
    assert_eq!(s2.spawn_timer, 60);
    assert!(s2.enemies.is_empty());
}

#[test]
fn seeded_runs_are_identical() {
    let c = cfg();
    let run = || {
        let mut rng = StdRng::seed_from_u64(7);
        let mut s = make_state();
        for _ in 0..400 {
            s = tick(&s, &c, &idle(), Duration::ZERO, &mut rng);
        }
        (s.enemies, s.enemy_bullets)
    };
    let (a, b) = (run(), run());
    assert!(!a.0.is_empty());
    assert_eq!(a, b);
}

// ── Effects ───────────────────────────────────────────────────────────────────

#[test]
fn effects_grow_fade_and_expire() {
    let fresh = spawn_effect(EffectKind::Hit, 10.0, 10.0);
    let last = Effect {
        life: 1,
        ..spawn_effect(EffectKind::Explosion, 20.0, 20.0)
    };
    let next = advance_effects(&[fresh, last]);
    assert_eq!(next.len(), 1);
    let fx = &next[0];
    assert_eq!(fx.life, 9);
    assert!((fx.scale - 1.08).abs() < 1e-6);
    assert!((fx.alpha - 0.97).abs() < 1e-6);
}

#[test]
fn effect_alpha_never_negative() {
    let fading = Effect {
        alpha: 0.01,
        ..spawn_effect(EffectKind::Explosion, 0.0, 0.0)
    };
    let next = advance_effects(&[fading]);
    assert_eq!(next[0].alpha, 0.0);
}

// ── Level clock ───────────────────────────────────────────────────────────────

#[test]
fn verdict_by_score_and_time() {
    let level = LevelConfig::new(30, 60);
    let secs = Duration::from_secs;
    assert_eq!(level_verdict(30, &level, secs(10)), Some(Outcome::Won));
    assert_eq!(level_verdict(29, &level, secs(10)), None);
    assert_eq!(level_verdict(0, &level, secs(60)), Some(Outcome::Lost));
    assert_eq!(level_verdict(30, &level, secs(60)), Some(Outcome::Won));
    assert_eq!(level_verdict(29, &level, secs(75)), Some(Outcome::Lost));
    assert_eq!(level_verdict(0, &level, Duration::from_millis(59_999)), None);
}

#[test]
fn tick_updates_remaining_time() {
    let s = make_state();
    let s2 = tick(&s, &cfg(), &idle(), Duration::from_millis(12_500), &mut seeded_rng());
    assert_eq!(s2.remaining_secs, 48);
    assert!(s2.is_running());
}

#[test]
fn time_up_without_target_loses() {
    let s = make_state();
    let s2 = tick(&s, &cfg(), &idle(), Duration::from_secs(60), &mut seeded_rng());
    assert_eq!(s2.outcome(), Some(Outcome::Lost));
    assert_eq!(s2.remaining_secs, 0);
    assert!(s2.player.is_some());
}

#[test]
fn ended_state_is_frozen() {
    let mut s = make_state();
    s.status = GameStatus::Ended(Outcome::Lost);
    s.enemies.push(enemy(100.0, 100.0));
    let s2 = step(&s);
    assert_eq!(s2.frame, s.frame);
    assert_eq!(s2.enemies, s.enemies);
}

#[test]
fn score_never_decreases_under_fire() {
    let c = cfg();
    let mut rng = StdRng::seed_from_u64(3);
    let mut s = make_state();
    let mut last = 0;
    for frame in 0..3_000u64 {
        let mut input = idle();
        input.fire = frame % 6 == 0;
        // Sweep left and right so shots spread over the field
        if (frame / 120) % 2 == 0 {
            input.left = true;
        } else {
            input.right = true;
        }
        s = tick(&s, &c, &input, Duration::from_millis(frame * 16), &mut rng);
        assert!(s.score >= last);
        last = s.score;
        if !s.is_running() {
            break;
        }
    }
}
