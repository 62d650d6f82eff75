/// Level definitions: how many kills are needed and how long the player has.

use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct LevelConfig {
    /// Enemy kills needed to clear the level.
    pub target: u32,
    /// Time limit in whole seconds.
    pub duration_secs: u64,
}

impl LevelConfig {
    pub const fn new(target: u32, duration_secs: u64) -> Self {
        LevelConfig {
            target,
            duration_secs,
        }
    }
}

pub const DEFAULT_LEVELS: [LevelConfig; 3] = [
    LevelConfig::new(30, 60),
    LevelConfig::new(60, 90),
    LevelConfig::new(90, 120),
];

pub fn default_levels() -> Vec<LevelConfig> {
    DEFAULT_LEVELS.to_vec()
}

/// Clamp a requested level index into `0..count`.  `count` must be non-zero.
pub fn clamp_index(requested: usize, count: usize) -> usize {
    requested.min(count.saturating_sub(1))
}
