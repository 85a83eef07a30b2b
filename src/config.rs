use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::learning::LearningConfig;
use crate::policy::Exploration;
use crate::session::PolicyConfig;
use crate::utils::*;

/// Process configuration, read once at startup. Missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Username of the game bot whose messages drive the rounds
    pub game_bot: String,
    /// Chat the rounds are played in
    pub group_id: i64,
    /// Who may issue commands; empty allows everyone
    pub authorized_users: Vec<i64>,
    pub grid_size: usize,
    pub bet: u64,
    pub bombs: u8,
    pub training_cashout: u32,
    pub max_wait_secs: u64,
    pub turn_delay_ms: u64,
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub exploration_rate: f64,
    pub exploration_decay: f64,
    pub min_exploration_rate: f64,
    pub learned_cashout: bool,
    pub data_dir: PathBuf,
    pub log_level: String,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            game_bot: "@mines_game_bot".into(),
            group_id: 0,
            authorized_users: vec![],
            grid_size: GRID_SIZE,
            bet: DEFAULT_BET,
            bombs: DEFAULT_BOMBS,
            training_cashout: TRAINING_CASHOUT,
            max_wait_secs: MAX_WAIT_SECS,
            turn_delay_ms: TURN_DELAY_MS,
            learning_rate: LEARNING_RATE,
            discount_factor: DISCOUNT_FACTOR,
            exploration_rate: EXPLORATION_RATE,
            exploration_decay: EXPLORATION_DECAY,
            min_exploration_rate: MIN_EXPLORATION_RATE,
            learned_cashout: false,
            data_dir: PathBuf::from("data"),
            log_level: "info".into(),
            seed: None,
        }
    }
}

impl Config {
    /// Read a JSON config. A missing file is not an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Config::default());
        }
        let config: Config = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.validated()
    }

    /// Reject settings the game bot would refuse; lift the exploration rate to its floor
    pub fn validated(mut self) -> Result<Self> {
        if self.bet == 0 {
            return Err(Error::InvalidBet);
        }
        let max = max_bombs(self.grid_size);
        if self.bombs < MIN_BOMBS || self.bombs > max {
            return Err(Error::InvalidBombCount { min: MIN_BOMBS, max });
        }
        if self.exploration_rate < self.min_exploration_rate {
            log::warn!("exploration_rate {} is below min_exploration_rate {}, using the minimum",
                self.exploration_rate, self.min_exploration_rate);
            self.exploration_rate = self.min_exploration_rate;
        }
        Ok(self)
    }

    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig {
            grid_size: self.grid_size,
            bet: self.bet,
            bombs: self.bombs,
            training_cashout: self.training_cashout,
            exploration: Exploration {
                rate: self.exploration_rate,
                decay: self.exploration_decay,
                min_rate: self.min_exploration_rate,
            },
            learning: LearningConfig {
                learning_rate: self.learning_rate,
                discount_factor: self.discount_factor,
            },
            learned_cashout: self.learned_cashout,
        }
    }

    pub fn max_wait(&self) -> Duration { Duration::from_secs(self.max_wait_secs) }
    pub fn turn_delay(&self) -> Duration { Duration::from_millis(self.turn_delay_ms) }

    pub fn is_authorized(&self, sender: i64) -> bool {
        self.authorized_users.is_empty() || self.authorized_users.contains(&sender)
    }
}
