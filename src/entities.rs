/// All game entity types. Pure data, no frame logic.
///
/// Positions are logical pixels measured from the top-left corner of the
/// play field, and every entity is anchored at its centre.

use crate::levels::LevelConfig;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Box of the given size centred on (`cx`, `cy`).
    pub fn centered(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Rect {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Strict overlap: boxes that only touch along an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

// ── Player & enemy ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
}

/// Sprite variant of an enemy craft.  Purely cosmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Saucer,
    Disc,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    /// Frames until this craft fires again.  Fires once it reaches zero or below.
    pub cooldown: i32,
    pub kind: EnemyKind,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// A bullet.  Direction is implied by the collection it lives in.
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
}

// ── Effects ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    /// Large red burst where the player craft was destroyed.
    Explosion,
    /// Small yellow flash where an enemy craft was shot down.
    Hit,
}

/// A short-lived visual.  Grows and fades each frame; never affects gameplay.
#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    pub x: f32,
    pub y: f32,
    pub kind: EffectKind,
    pub radius: f32,
    pub scale: f32,
    pub alpha: f32,
    /// Remaining frames to display.
    pub life: u32,
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
    Fire,
}

/// Controls held during one frame.  Anything not set counts as released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// A shot was requested for this frame.
    pub fire: bool,
}

impl InputSnapshot {
    pub fn from_held<I: IntoIterator<Item = Control>>(held: I) -> Self {
        held.into_iter().fold(Self::default(), |snapshot, c| snapshot.with(c))
    }

    pub fn with(mut self, control: Control) -> Self {
        match control {
            Control::Left => self.left = true,
            Control::Right => self.right = true,
            Control::Up => self.up = true,
            Control::Down => self.down = true,
            Control::Fire => self.fire = true,
        }
        self
    }
}

// ── Status & events ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    NotStarted,
    Running,
    Ended(Outcome),
}

/// Things that happened during the last frame, for sound and messaging.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Shot,
    EnemyDestroyed { x: f32, y: f32 },
    PlayerDestroyed { x: f32, y: f32 },
    LevelEnded(Outcome),
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire simulation state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    /// `None` once the craft has been destroyed.
    pub player: Option<Player>,
    pub player_bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub enemy_bullets: Vec<Bullet>,
    pub effects: Vec<Effect>,
    /// Enemy kills this attempt.
    pub score: u32,
    pub level_index: usize,
    pub level: LevelConfig,
    pub status: GameStatus,
    /// Frames since the last enemy spawn.
    pub spawn_timer: u32,
    pub frame: u64,
    /// Whole seconds left on the level clock, never negative.
    pub remaining_secs: u64,
    /// Cues raised by the most recent frame.
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            GameStatus::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }
}
