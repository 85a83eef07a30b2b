//! # Offline Training
//!
//! Plays rounds against the local [`MinesGame`] without a chat in between. Each
//! reveal is learned from immediately, and since the simulator knows the full
//! layout every round also feeds the coarse post-hoc update.

use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::board::Board;
use crate::error::Result;
use crate::games::mines::MinesGame;
use crate::learning::{self, QLearner, Transition};
use crate::persistence::Store;
use crate::policy::{Decision, PolicyEngine, Strategy};
use crate::q_table::QTable;
use crate::session::{PolicyConfig, RoundOutcome, Stats};
use crate::utils::*;

/// Configuration for training sessions
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub rounds: usize,
    pub mode: Mode,
    pub seed: Option<u64>,
    /// Progress is logged every this many rounds
    pub checkpoint_frequency: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            rounds: 1000,
            mode: Mode::Training,
            seed: None,
            checkpoint_frequency: 100,
        }
    }
}

pub struct Trainer {
    config: TrainingConfig,
    policy: PolicyConfig,
    engine: PolicyEngine,
    learner: QLearner,
    table: QTable,
    stats: Stats,
    rng: StdRng,
}

impl Trainer {
    pub fn new(config: TrainingConfig, policy: PolicyConfig, table: QTable) -> Self {
        let rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            engine: policy.engine(config.mode),
            learner: QLearner::new(policy.learning),
            config,
            policy,
            table,
            stats: Stats::default(),
            rng,
        }
    }

    pub fn train(&mut self) -> &Stats {
        for round in 0..self.config.rounds {
            let outcome = self.play_round();
            self.stats.record(&outcome);
            if (round + 1) % self.config.checkpoint_frequency.max(1) == 0 {
                log::info!("Round {}/{}: win rate {:.3}, average diamonds {:.2}, {} values learned",
                    round + 1, self.config.rounds, self.stats.win_rate(), self.stats.average_diamonds(), self.table.len());
            }
        }
        log::info!("Training complete!");
        &self.stats
    }

    /// Play one round to the end, learning from every reveal
    pub fn play_round(&mut self) -> RoundOutcome {
        let PolicyConfig { grid_size, bet, bombs, .. } = self.policy;
        let mut game = MinesGame::new(grid_size, bombs, bet, &mut self.rng);
        let mut board = Board::new(grid_size, bombs);

        let won = loop {
            let coord = match self.engine.choose(&board, &self.table, &mut self.rng) {
                Decision::Reveal(coord) => coord,
                Decision::CashOut(reason) => {
                    log::debug!("Cash out with {} diamonds ({:?})", board.good_reveals(), reason);
                    game.cash_out();
                    break true;
                }
            };
            let from = board.state_key();
            let good_before = board.good_reveals();
            let outcome = match game.reveal(coord) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::warn!("Simulator rejected {coord}: {e}");
                    break !board.hit_bomb();
                }
            };
            // Legal moves are exactly the hidden tiles, so the board accepts what the game did
            if let Err(e) = board.mark_revealed(coord, outcome) {
                log::warn!("Board rejected {coord}: {e}");
            }
            let hit = outcome == Outcome::Bomb;
            self.learner.update(&mut self.table, &Transition {
                from,
                action: coord,
                reward: learning::reward(good_before, board.good_reveals(), hit),
                to: board.state_key(),
                next_moves: if hit { vec![] } else { board.valid_moves() },
            });
            if hit {
                break false;
            }
            if game.is_over() {
                break true;
            }
        };

        let layout = game.layout();
        self.learner.learn_from_positions(&mut self.table, bombs, &layout.bombs, &layout.diamonds);
        RoundOutcome { won, good_reveals: board.good_reveals(), bombs_hit: if won { 0 } else { 1 } }
    }

    /// Save the learned table. Skipped (`Ok(false)`) unless the store has permission.
    pub fn save_to<S: Store>(&self, store: &S) -> Result<bool> {
        store.save_table(&self.table)
    }

    pub fn table(&self) -> &QTable { &self.table }
    pub fn stats(&self) -> &Stats { &self.stats }
    pub fn into_table(self) -> QTable { self.table }
}
