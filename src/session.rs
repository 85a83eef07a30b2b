//! # Session
//!
//! Process-wide play context: tunable policy configuration, the active mode, the
//! running / paused flags and the aggregate statistics. Passed explicitly to whoever
//! needs it instead of living in globals.

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::learning::LearningConfig;
use crate::policy::{Exploration, PolicyEngine, RandomStrategy, ValueGuidedStrategy};
use crate::utils::*;

/// Terminal record of one round
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub won: bool,
    pub good_reveals: u32,
    pub bombs_hit: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
    /// Sum of good reveals over every recorded round
    pub total_diamonds: u64,
}

impl Stats {
    pub fn record(&mut self, outcome: &RoundOutcome) {
        self.games_played += 1;
        self.total_diamonds += outcome.good_reveals as u64;
        if outcome.won {
            self.wins += 1;
            log::info!("Game won! Total wins: {}, Total games played: {}", self.wins, self.games_played);
        } else {
            self.losses += 1;
            log::info!("Game lost. Total losses: {}, Total games played: {}", self.losses, self.games_played);
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 { return 0.0; }
        self.wins as f64 / self.games_played as f64
    }

    /// Running average of good reveals per round
    pub fn average_diamonds(&self) -> f64 {
        if self.games_played == 0 { return 0.0; }
        self.total_diamonds as f64 / self.games_played as f64
    }
}

/// Everything the operator can tune
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    pub grid_size: usize,
    pub bet: u64,
    pub bombs: u8,
    pub training_cashout: u32,
    pub exploration: Exploration,
    pub learning: LearningConfig,
    pub learned_cashout: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            bet: DEFAULT_BET,
            bombs: DEFAULT_BOMBS,
            training_cashout: TRAINING_CASHOUT,
            exploration: Exploration::default(),
            learning: LearningConfig::default(),
            learned_cashout: false,
        }
    }
}

impl PolicyConfig {
    pub fn set_bet(&mut self, bet: u64) -> Result<()> {
        if bet == 0 {
            return Err(Error::InvalidBet);
        }
        self.bet = bet;
        Ok(())
    }

    pub fn set_bombs(&mut self, bombs: u8) -> Result<()> {
        let max = max_bombs(self.grid_size);
        if bombs < MIN_BOMBS || bombs > max {
            return Err(Error::InvalidBombCount { min: MIN_BOMBS, max });
        }
        self.bombs = bombs;
        Ok(())
    }

    /// Fresh strategy for `mode` (learning starts from the configured exploration rate)
    pub fn engine(&self, mode: Mode) -> PolicyEngine {
        match mode {
            Mode::Training => PolicyEngine::Random(RandomStrategy::new(self.training_cashout)),
            Mode::Learning => PolicyEngine::ValueGuided(ValueGuidedStrategy {
                exploration: self.exploration,
                learned_cashout: self.learned_cashout,
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub config: PolicyConfig,
    pub mode: Mode,
    /// Automation requested by the operator
    pub running: bool,
    /// Waiting for the operator to /resume
    pub paused: bool,
    pub stats: Stats,
}

impl Session {
    pub fn new(config: PolicyConfig) -> Self {
        Session { config, ..Default::default() }
    }

    /// Turns happen only while running and not waiting on the operator
    pub fn should_play(&self) -> bool { self.running && !self.paused }

    pub fn summary(&self) -> StatusSummary<'_> { StatusSummary(self) }
}

/// Operator-facing status text
pub struct StatusSummary<'a>(&'a Session);

impl Display for StatusSummary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = self.0;
        writeln!(f, "📊 **Current Status**")?;
        writeln!(f, "Running: {}", if s.running { "Yes" } else { "No" })?;
        if s.paused {
            writeln!(f, "Paused: waiting for /resume")?;
        }
        writeln!(f, "Mode: {}", s.mode)?;
        writeln!(f, "Bet Amount: {}", s.config.bet)?;
        writeln!(f, "Bombs: {}", s.config.bombs)?;
        writeln!(f, "Games Played: {}", s.stats.games_played)?;
        writeln!(f, "Wins: {}", s.stats.wins)?;
        writeln!(f, "Losses: {}", s.stats.losses)?;
        write!(f, "Average Diamonds: {:.2}", s.stats.average_diamonds())
    }
}
