/// Tunable game parameters, loadable from a TOML file.
///
/// Every field has a default, so a config file only needs the values it
/// changes.  `validate` runs on every load; a `Session` refuses to start on an
/// invalid config.

use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::levels::{default_levels, LevelConfig};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct FrameRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Pixels per frame in each held direction.
    pub speed: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Start height, measured up from the bottom edge.
    pub start_offset: f32,
    pub width: f32,
    pub height: f32,
    pub bullet_speed: f32,
    pub bullet_width: f32,
    pub bullet_height: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            margin_x: 20.0,
            margin_y: 30.0,
            start_offset: 100.0,
            width: 32.0,
            height: 48.0,
            bullet_speed: 9.0,
            bullet_width: 6.0,
            bullet_height: 16.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: f32,
    /// A craft spawns once the spawn timer exceeds this many frames.
    pub spawn_interval: u32,
    /// Horizontal inset of the spawn band.
    pub spawn_margin: f32,
    pub spawn_y: f32,
    pub width: f32,
    pub height: f32,
    /// Cooldown drawn for a freshly spawned craft.
    pub first_shot: FrameRange,
    /// Cooldown drawn after each shot.
    pub refire: FrameRange,
    pub bullet_speed: f32,
    pub bullet_width: f32,
    pub bullet_height: f32,
    /// Gap between the craft's lower edge and a new bullet.
    pub muzzle_offset: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            spawn_interval: 60,
            spawn_margin: 50.0,
            spawn_y: -40.0,
            width: 48.0,
            height: 32.0,
            first_shot: FrameRange { min: 60, max: 140 },
            refire: FrameRange { min: 80, max: 140 },
            bullet_speed: 5.0,
            bullet_width: 4.0,
            bullet_height: 10.0,
            muzzle_offset: 6.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub levels: Vec<LevelConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            levels: default_levels(),
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        if let Some(level) = self.levels.iter().position(|l| l.duration_secs == 0) {
            return Err(ConfigError::ZeroDuration { level });
        }

        for (name, range) in [
            ("enemy.first_shot", self.enemy.first_shot),
            ("enemy.refire", self.enemy.refire),
        ] {
            if range.min > range.max {
                return Err(ConfigError::InvertedRange {
                    name,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        let placements = [
            ("player.margin_x", self.player.margin_x),
            ("player.margin_y", self.player.margin_y),
            ("player.start_offset", self.player.start_offset),
            ("enemy.spawn_margin", self.enemy.spawn_margin),
            ("enemy.spawn_y", self.enemy.spawn_y),
            ("enemy.muzzle_offset", self.enemy.muzzle_offset),
        ];
        let positives = [
            ("screen.width", self.screen.width),
            ("screen.height", self.screen.height),
            ("player.speed", self.player.speed),
            ("player.width", self.player.width),
            ("player.height", self.player.height),
            ("player.bullet_speed", self.player.bullet_speed),
            ("player.bullet_width", self.player.bullet_width),
            ("player.bullet_height", self.player.bullet_height),
            ("enemy.speed", self.enemy.speed),
            ("enemy.width", self.enemy.width),
            ("enemy.height", self.enemy.height),
            ("enemy.bullet_speed", self.enemy.bullet_speed),
            ("enemy.bullet_width", self.enemy.bullet_width),
            ("enemy.bullet_height", self.enemy.bullet_height),
        ];
        if let Some(&(name, value)) = placements
            .iter()
            .chain(positives.iter())
            .find(|(_, v)| !v.is_finite())
        {
            return Err(ConfigError::NonFinite { name, value });
        }
        if let Some(&(name, value)) = positives.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ConfigError::NonPositive { name, value });
        }

        let (w, h) = (self.screen.width, self.screen.height);
        if w <= 2.0 * self.player.margin_x
            || w <= 2.0 * self.enemy.spawn_margin
            || h <= 2.0 * self.player.margin_y
            || h <= self.player.start_offset
        {
            return Err(ConfigError::ScreenTooSmall {
                width: w,
                height: h,
            });
        }
        Ok(())
    }
}
