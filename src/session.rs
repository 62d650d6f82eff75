/// Level state machine wrapped around the frame engine.
///
/// A `Session` owns the validated config, the state of the current attempt
/// and the instant the attempt started.  The presentation layer drives it with
/// the level commands (`start`, `restart`, `retry`, `next`) and one `tick` per
/// display refresh.

use std::time::Instant;

use log::info;
use rand::Rng;

use crate::compute::{init_state, tick};
use crate::config::GameConfig;
use crate::entities::{GameState, GameStatus, InputSnapshot, Outcome};
use crate::error::ConfigError;
use crate::levels::clamp_index;

#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    state: GameState,
    started_at: Option<Instant>,
}

impl Session {
    /// Rejects configs that fail validation, including an empty level list.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut state = init_state(&config, 0, config.levels[0]);
        state.status = GameStatus::NotStarted;
        Ok(Session {
            config,
            state,
            started_at: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn level_index(&self) -> usize {
        self.state.level_index
    }

    pub fn level_count(&self) -> usize {
        self.config.levels.len()
    }

    pub fn is_final_level(&self) -> bool {
        self.state.level_index + 1 == self.level_count()
    }

    /// The last level has been won; `next` has nowhere further to go.
    pub fn campaign_complete(&self) -> bool {
        self.is_final_level() && self.state.outcome() == Some(Outcome::Won)
    }

    /// Begin a fresh attempt at `level_index`, clamped to the level table.
    pub fn start(&mut self, level_index: usize, now: Instant) {
        let index = clamp_index(level_index, self.level_count());
        let level = self.config.levels[index];
        info!(
            "starting level {} (target {}, {}s)",
            index + 1,
            level.target,
            level.duration_secs
        );
        self.state = init_state(&self.config, index, level);
        self.started_at = Some(now);
    }

    /// Back to the first level.
    pub fn restart(&mut self, now: Instant) {
        self.start(0, now);
    }

    /// Same level again.
    pub fn retry(&mut self, now: Instant) {
        self.start(self.state.level_index, now);
    }

    /// Following level, or the last one again if there is none.
    pub fn next(&mut self, now: Instant) {
        self.start(self.state.level_index + 1, now);
    }

    /// Run one frame.  Does nothing unless a level is running.
    pub fn tick(&mut self, input: &InputSnapshot, now: Instant, rng: &mut impl Rng) -> &GameState {
        if let (GameStatus::Running, Some(started_at)) = (self.state.status, self.started_at) {
            let elapsed = now.saturating_duration_since(started_at);
            self.state = tick(&self.state, &self.config, input, elapsed, rng);
        }
        &self.state
    }
}
