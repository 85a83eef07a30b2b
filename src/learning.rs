//! # Learning Update Rule
//!
//! One-step tabular Q-learning applied after every reveal, plus a coarse post-hoc
//! path that stamps known bomb / diamond positions onto the initial state.

use crate::board::StateKey;
use crate::q_table::QTable;
use crate::utils::*;

pub const BOMB_PENALTY: Reward = -10.0;
pub const DIAMOND_REWARD: Reward = 1.0;
pub const IDLE_PENALTY: Reward = -0.1;  // A reveal that changed nothing
pub const POST_HOC_BOMB_VALUE: Reward = -5.0;
pub const POST_HOC_DIAMOND_VALUE: Reward = 2.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LearningConfig {
    pub learning_rate: f64,
    pub discount_factor: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self { learning_rate: LEARNING_RATE, discount_factor: DISCOUNT_FACTOR }
    }
}

/// What happened when `action` was taken from `from`
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: StateKey,
    pub action: Coord,
    pub reward: Reward,
    pub to: StateKey,
    /// Moves available from `to` (empty when the round ended)
    pub next_moves: Vec<Coord>,
}

pub fn reward(old_good: u32, new_good: u32, hit_bomb: bool) -> Reward {
    if hit_bomb {
        return BOMB_PENALTY;
    }
    if new_good > old_good {
        return DIAMOND_REWARD * (new_good - old_good) as Reward;
    }
    IDLE_PENALTY
}

#[derive(Debug, Clone, Default)]
pub struct QLearner {
    pub config: LearningConfig,
}

impl QLearner {
    pub fn new(config: LearningConfig) -> Self { Self { config } }

    /// Apply the TD update for one transition and return the new estimate
    pub fn update(&self, table: &mut QTable, t: &Transition) -> Reward {
        let current = table.value(&t.from, t.action);
        // Future value never counts below zero
        let best_next = table.best_value(&t.to, &t.next_moves).unwrap_or(0.0).max(0.0);
        let LearningConfig { learning_rate, discount_factor } = self.config;
        let updated = current + learning_rate * (t.reward + discount_factor * best_next - current);
        table.set(&t.from, t.action, updated);
        log::debug!("Q{:?} {:.3} -> {:.3} (reward {:.2}, next {:.3})", t.action, current, updated, t.reward, best_next);
        updated
    }

    /// Crude fallback once a round's full layout is known: overwrite the initial-state
    /// estimates of every bomb and diamond position
    pub fn learn_from_positions(&self, table: &mut QTable, bombs: u8, bomb_positions: &[Coord], diamond_positions: &[Coord]) {
        let initial = StateKey::initial(bombs);
        for &pos in bomb_positions {
            table.set(&initial, pos, POST_HOC_BOMB_VALUE);
        }
        for &pos in diamond_positions {
            table.set(&initial, pos, POST_HOC_DIAMOND_VALUE);
        }
        log::debug!("Stamped {} bombs and {} diamonds onto the initial state", bomb_positions.len(), diamond_positions.len());
    }
}
