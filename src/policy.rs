use rand::seq::IndexedRandom;
use rand::Rng;
use crate::board::Board;
use crate::q_table::QTable;
use crate::utils::*;

// ---------- Decisions ----------
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CashOutReason {
    /// Enough diamonds for this mode
    Threshold,
    /// Nothing left to click (treated exactly like a cash-out)
    NoMoves,
    /// The learned values say the round is not worth continuing
    LowValue,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Decision {
    Reveal(Coord),
    CashOut(CashOutReason),
}

/// Chooses the next tile or signals a cash-out
pub trait Strategy {
    fn choose<R: Rng + ?Sized>(&mut self, board: &Board, table: &QTable, rng: &mut R) -> Decision;
}

/// Uniform choice among the valid moves
pub fn uniform<R: Rng + ?Sized>(moves: &[Coord], rng: &mut R) -> Option<Coord> {
    moves.choose(rng).copied()
}

// ---------- Random (training) ----------
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    pub cashout_threshold: u32,
}

impl RandomStrategy {
    pub fn new(cashout_threshold: u32) -> Self { Self { cashout_threshold } }
}

impl Strategy for RandomStrategy {
    fn choose<R: Rng + ?Sized>(&mut self, board: &Board, _table: &QTable, rng: &mut R) -> Decision {
        if board.good_reveals() >= self.cashout_threshold {
            log::info!("Training mode cash out condition met: {} diamonds revealed, threshold is {}",
                board.good_reveals(), self.cashout_threshold);
            return Decision::CashOut(CashOutReason::Threshold);
        }
        match uniform(&board.valid_moves(), rng) {
            Some(c) => {
                log::debug!("Training mode: Chose random position {c}");
                Decision::Reveal(c)
            }
            None => {
                log::warn!("No valid moves left for training");
                Decision::CashOut(CashOutReason::NoMoves)
            }
        }
    }
}

// ---------- Value guided (learning) ----------
/// Epsilon with multiplicative decay and a floor
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Exploration {
    pub rate: Probability,
    pub decay: f64,
    pub min_rate: Probability,
}

impl Default for Exploration {
    fn default() -> Self {
        Self { rate: EXPLORATION_RATE, decay: EXPLORATION_DECAY, min_rate: MIN_EXPLORATION_RATE }
    }
}

impl Exploration {
    /// Next rate; never below the floor and never increasing
    pub fn decayed(&self, rate: Probability) -> Probability {
        (rate * self.decay).max(self.min_rate).min(rate.max(self.min_rate))
    }
    pub fn decay(&mut self) {
        self.rate = self.decayed(self.rate);
    }
}

#[derive(Debug, Clone)]
pub struct ValueGuidedStrategy {
    pub exploration: Exploration,
    /// Also consult the learned cash-out rule before each pick
    pub learned_cashout: bool,
}

impl ValueGuidedStrategy {
    pub fn new(exploration: Exploration) -> Self {
        Self { exploration, learned_cashout: false }
    }

    /// Best recorded action among `moves`, ties broken uniformly.
    /// None when nothing is recorded or the best estimate is not positive.
    pub fn exploit<R: Rng + ?Sized>(board: &Board, table: &QTable, moves: &[Coord], rng: &mut R) -> Option<Coord> {
        let state = board.state_key();
        let best = table.best_value(&state, moves)?;
        if best <= 0.0 {
            return None;
        }
        let maximisers: Vec<Coord> = moves.iter()
            .copied()
            .filter(|&a| table.get(&state, a) == Some(best))
            .collect();
        uniform(&maximisers, rng)
    }
}

impl Strategy for ValueGuidedStrategy {
    fn choose<R: Rng + ?Sized>(&mut self, board: &Board, table: &QTable, rng: &mut R) -> Decision {
        let moves = board.valid_moves();
        if moves.is_empty() {
            log::warn!("No valid moves left for RL");
            return Decision::CashOut(CashOutReason::NoMoves);
        }
        if self.learned_cashout && should_cash_out_learned(board, table, rng) {
            return Decision::CashOut(CashOutReason::LowValue);
        }
        let choice = if rng.random::<Probability>() < self.exploration.rate {
            log::debug!("RL mode: Exploring - choosing random position");
            uniform(&moves, rng)
        } else {
            Self::exploit(board, table, &moves, rng).or_else(|| {
                log::debug!("RL mode: No positive Q-values, choosing random position");
                uniform(&moves, rng)
            })
        };
        self.exploration.decay();
        match choice {
            Some(c) => Decision::Reveal(c),
            None => Decision::CashOut(CashOutReason::NoMoves),
        }
    }
}

pub const LEARNED_MIN_VALUE: Reward = 0.2;
pub const LEARNED_MAX_DIAMONDS: u32 = 5;
pub const LEARNED_CASHOUT_PER_DIAMOND: Probability = 0.15;

/// Cash out when the table expects little, after enough diamonds, or with a chance
/// that grows with each diamond
pub fn should_cash_out_learned<R: Rng + ?Sized>(board: &Board, table: &QTable, rng: &mut R) -> bool {
    let max_q = table.max_value(&board.state_key()).unwrap_or(Reward::NEG_INFINITY);
    if max_q < LEARNED_MIN_VALUE {
        return true;
    }
    if board.good_reveals() >= LEARNED_MAX_DIAMONDS {
        return true;
    }
    rng.random::<Probability>() < board.good_reveals() as Probability * LEARNED_CASHOUT_PER_DIAMOND
}

// ---------- Mode switch ----------
/// The active strategy, selected by [`Mode`]
#[derive(Debug, Clone)]
pub enum PolicyEngine {
    Random(RandomStrategy),
    ValueGuided(ValueGuidedStrategy),
}

impl PolicyEngine {
    pub fn mode(&self) -> Mode {
        match self {
            PolicyEngine::Random(_) => Mode::Training,
            PolicyEngine::ValueGuided(_) => Mode::Learning,
        }
    }
    pub fn exploration_rate(&self) -> Option<Probability> {
        match self {
            PolicyEngine::Random(_) => None,
            PolicyEngine::ValueGuided(s) => Some(s.exploration.rate),
        }
    }
}

impl Strategy for PolicyEngine {
    fn choose<R: Rng + ?Sized>(&mut self, board: &Board, table: &QTable, rng: &mut R) -> Decision {
        match self {
            PolicyEngine::Random(s) => s.choose(board, table, rng),
            PolicyEngine::ValueGuided(s) => s.choose(board, table, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn full_board(size: usize) -> Board {
        let mut board = Board::new(size, 3);
        for c in all_coords(size) {
            board.mark_revealed(c, Outcome::Empty).unwrap();
        }
        board
    }

    #[test]
    fn test_training_cashes_out_after_threshold() {
        let mut rng = StdRng::seed_from_u64(1);
        let table = QTable::new();
        let mut board = Board::new(5, 3);
        let mut strategy = RandomStrategy::new(3);
        for _ in 0..3 {
            match strategy.choose(&board, &table, &mut rng) {
                Decision::Reveal(c) => board.mark_revealed(c, Outcome::Diamond).unwrap(),
                other => panic!("expected a reveal, got {:?}", other),
            }
        }
        let revealed = board.revealed().clone();
        assert_eq!(strategy.choose(&board, &table, &mut rng), Decision::CashOut(CashOutReason::Threshold));
        assert_eq!(board.revealed(), &revealed);
    }

    #[test]
    fn test_empty_moves_signal_cash_out() {
        let mut rng = StdRng::seed_from_u64(2);
        let table = QTable::new();
        let board = full_board(3);
        let mut random = RandomStrategy::new(100);
        assert_eq!(random.choose(&board, &table, &mut rng), Decision::CashOut(CashOutReason::NoMoves));
        let mut guided = ValueGuidedStrategy::new(Exploration { rate: 1.0, ..Default::default() });
        assert_eq!(guided.choose(&board, &table, &mut rng), Decision::CashOut(CashOutReason::NoMoves));
        guided.exploration.rate = 0.0;
        assert_eq!(guided.choose(&board, &table, &mut rng), Decision::CashOut(CashOutReason::NoMoves));
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let table = QTable::new();
        let play = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new(5, 3);
            let mut strategy = RandomStrategy::new(100);
            let mut picks = vec![];
            while let Decision::Reveal(c) = strategy.choose(&board, &table, &mut rng) {
                board.mark_revealed(c, Outcome::Empty).unwrap();
                picks.push(c);
            }
            picks
        };
        assert_eq!(play(42), play(42));
        assert_eq!(play(42).len(), 25);
    }

    #[test]
    fn test_decay_floor() {
        let mut e = Exploration { rate: 0.2, decay: 0.5, min_rate: 0.01 };
        assert_eq!(e.decayed(e.min_rate), e.min_rate);
        let mut last = e.rate;
        for _ in 0..20 {
            e.decay();
            assert!(e.rate <= last);
            assert!(e.rate >= e.min_rate);
            last = e.rate;
        }
        assert_eq!(e.rate, 0.01);
    }

    #[test]
    fn test_exploit_prefers_best_positive_value() {
        let mut rng = StdRng::seed_from_u64(3);
        let board = Board::new(5, 3);
        let mut table = QTable::new();
        let state = board.state_key();
        table.set(&state, Coord::new(2, 2), 0.5);
        table.set(&state, Coord::new(3, 1), 0.9);
        table.set(&state, Coord::new(4, 0), -1.0);
        let mut strategy = ValueGuidedStrategy::new(Exploration { rate: 0.0, decay: 0.9, min_rate: 0.0 });
        for _ in 0..10 {
            assert_eq!(strategy.choose(&board, &table, &mut rng), Decision::Reveal(Coord::new(3, 1)));
        }
    }

    #[test]
    fn test_exploit_breaks_ties_among_maximisers() {
        let mut rng = StdRng::seed_from_u64(4);
        let board = Board::new(5, 3);
        let mut table = QTable::new();
        let state = board.state_key();
        table.set(&state, Coord::new(0, 0), 1.0);
        table.set(&state, Coord::new(4, 4), 1.0);
        table.set(&state, Coord::new(2, 2), 0.3);
        let moves = board.valid_moves();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            let pick = ValueGuidedStrategy::exploit(&board, &table, &moves, &mut rng).unwrap();
            assert!(pick == Coord::new(0, 0) || pick == Coord::new(4, 4));
            seen.insert(pick);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_non_positive_values_fall_back_to_random() {
        let mut rng = StdRng::seed_from_u64(5);
        let board = Board::new(5, 3);
        let mut table = QTable::new();
        let state = board.state_key();
        table.set(&state, Coord::new(0, 0), 0.0);
        table.set(&state, Coord::new(0, 1), -3.0);
        let moves = board.valid_moves();
        assert_eq!(ValueGuidedStrategy::exploit(&board, &table, &moves, &mut rng), None);
        let mut strategy = ValueGuidedStrategy::new(Exploration { rate: 0.0, decay: 1.0, min_rate: 0.0 });
        let picks: std::collections::HashSet<Decision> = (0..50)
            .map(|_| strategy.choose(&board, &table, &mut rng))
            .collect();
        assert!(picks.len() > 2, "fallback should spread over the board");
    }

    #[test]
    fn test_full_exploration_ignores_known_best() {
        let mut rng = StdRng::seed_from_u64(8);
        let board = Board::new(5, 3);
        let mut table = QTable::new();
        table.set(&board.state_key(), Coord::new(2, 2), 5.0);
        let mut strategy = ValueGuidedStrategy::new(Exploration { rate: 1.0, decay: 1.0, min_rate: 0.0 });
        let picks: std::collections::HashSet<Decision> = (0..50)
            .map(|_| strategy.choose(&board, &table, &mut rng))
            .collect();
        assert!(picks.len() > 2, "exploring picks across the board, not just the best tile");
    }

    #[test]
    fn test_guided_selection_decays_exploration() {
        let mut rng = StdRng::seed_from_u64(6);
        let board = Board::new(5, 3);
        let table = QTable::new();
        let mut strategy = ValueGuidedStrategy::new(Exploration { rate: 0.2, decay: 0.5, min_rate: 0.01 });
        strategy.choose(&board, &table, &mut rng);
        assert!((strategy.exploration.rate - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_learned_cashout_rule() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut board = Board::new(5, 3);
        let mut table = QTable::new();
        // Unknown state -> nothing worth playing for
        assert!(should_cash_out_learned(&board, &table, &mut rng));
        table.set(&board.state_key(), Coord::new(0, 0), 1.0);
        assert!(!should_cash_out_learned(&board, &table, &mut rng), "no diamonds yet means no random cash out");
        for c in 0..5 {
            board.mark_revealed(Coord::new(1, c), Outcome::Diamond).unwrap();
        }
        table.set(&board.state_key(), Coord::new(0, 0), 1.0);
        assert!(should_cash_out_learned(&board, &table, &mut rng));
    }
}
