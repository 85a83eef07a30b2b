//! # Round Lifecycle Controller
//!
//! Drives one round after another: start, reveal until the policy cashes out or a
//! bomb goes off, record the outcome, repeat. Performs no I/O itself; every request
//! for the outside world comes back as an [`Effect`] for the runner to carry out,
//! and everything the outside world reports is fed back in through `on_*` calls.
//!
//! ```text
//! Idle --start--> Starting --grid--> Active --cash out--> Terminal(Won) --ack--> Idle
//!                                     |  ^                                 ^
//!                                     +--+ reveal       bomb -> Terminal(Lost)
//! (any waiting phase) --silence > max_wait--> PausedForIntervention --resume--> ...
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::board::{Board, StateKey};
use crate::commands::Command;
use crate::learning::{self, QLearner, Transition};
use crate::messages::{GameMessage, Keyboard, RoundUpdate};
use crate::policy::{self, Decision, PolicyEngine, Strategy};
use crate::q_table::QTable;
use crate::session::{RoundOutcome, Session};
use crate::utils::*;

pub const SLOW_BOT_NOTICE: &str = "⚠️ Game bot is slow, manual intervention needed. Use /resume when ready.";
pub const NO_CASH_OUT_NOTICE: &str = "⚠️ Unable to find Cash Out button. Manual help needed. Use /resume when ready.";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Verdict { Won, Lost }

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    Idle,
    /// Start command sent, waiting for the first board
    Starting,
    Active,
    Terminal(Verdict),
}

/// Externally visible state: the phase, unless the operator has to step in
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum State {
    Phase(Phase),
    PausedForIntervention,
}

/// Requests for the transport / store
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartRound { bet: u64, bombs: u8 },
    Click(Coord),
    CashOut,
    /// Message for the operator chat
    Notify(String),
    /// Save the table and statistics
    Persist,
    /// Operator changed the data storage permission
    Storage(bool),
}

/// A click whose outcome has not arrived yet
#[derive(Debug, Clone)]
struct PendingReveal {
    coord: Coord,
    from: StateKey,
    good_before: u32,
    /// Already replaced a failed click once this turn
    substituted: bool,
}

/// Known layout of a finished round, for the coarse post-hoc update
#[derive(Debug, Clone, Default)]
pub struct RoundPositions {
    pub bombs: Vec<Coord>,
    pub diamonds: Vec<Coord>,
}

pub struct Controller {
    pub session: Session,
    board: Board,
    table: QTable,
    engine: PolicyEngine,
    learner: QLearner,
    rng: StdRng,
    phase: Phase,
    round_id: RoundId,
    pending: Option<PendingReveal>,
    keyboard: Option<Keyboard>,
    positions: HashMap<RoundId, RoundPositions>,
    last_event: Instant,
    max_wait: Duration,
}

impl Controller {
    pub fn new(session: Session, table: QTable, max_wait: Duration, seed: Option<u64>, now: Instant) -> Self {
        let config = &session.config;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Controller {
            board: Board::new(config.grid_size, config.bombs),
            engine: config.engine(session.mode),
            learner: QLearner::new(config.learning),
            session,
            table,
            rng,
            phase: Phase::Idle,
            round_id: 0,
            pending: None,
            keyboard: None,
            positions: HashMap::new(),
            last_event: now,
            max_wait,
        }
    }

    pub fn state(&self) -> State {
        if self.session.paused { State::PausedForIntervention } else { State::Phase(self.phase) }
    }
    pub fn phase(&self) -> Phase { self.phase }
    pub fn board(&self) -> &Board { &self.board }
    pub fn table(&self) -> &QTable { &self.table }
    pub fn round_id(&self) -> RoundId { self.round_id }
    pub fn engine(&self) -> &PolicyEngine { &self.engine }
    /// Latest board keyboard from the game bot
    pub fn keyboard(&self) -> Option<&Keyboard> { self.keyboard.as_ref() }
    pub fn awaiting_outcome(&self) -> bool { self.pending.is_some() }

    /// Feed full bomb / diamond positions of a round (used when it is acknowledged)
    pub fn record_positions(&mut self, round: RoundId, positions: RoundPositions) {
        log::debug!("Recorded positions for game {round}: {} bombs, {} diamonds", positions.bombs.len(), positions.diamonds.len());
        self.positions.insert(round, positions);
    }

    // ---------- Turn loop ---------- //
    /// One turn of automatic play. Does nothing unless running and not paused.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        if !self.session.should_play() {
            return vec![];
        }
        match self.phase {
            Phase::Idle => self.start_round(now),
            Phase::Active if self.pending.is_none() => self.play_turn(now),
            Phase::Terminal(Verdict::Lost) => self.acknowledge(Verdict::Lost, now),
            Phase::Starting | Phase::Active | Phase::Terminal(Verdict::Won) => self.watchdog(now),
        }
    }

    fn start_round(&mut self, now: Instant) -> Vec<Effect> {
        self.begin_round();
        self.phase = Phase::Starting;
        self.last_event = now;
        let (bet, bombs) = (self.session.config.bet, self.session.config.bombs);
        log::info!("Starting new game with command: /mines {bet} {bombs}");
        vec![Effect::StartRound { bet, bombs }]
    }

    fn begin_round(&mut self) {
        self.board.set_bombs(self.session.config.bombs);
        self.board.reset();
        self.round_id += 1;
        self.pending = None;
        let current = self.round_id;
        self.positions.retain(|&round, _| round >= current);
    }

    fn play_turn(&mut self, now: Instant) -> Vec<Effect> {
        log::debug!("Current mode: {}, diamonds revealed: {}", self.engine.mode(), self.board.good_reveals());
        match self.engine.choose(&self.board, &self.table, &mut self.rng) {
            Decision::Reveal(coord) => {
                self.pending = Some(PendingReveal {
                    coord,
                    from: self.board.state_key(),
                    good_before: self.board.good_reveals(),
                    substituted: false,
                });
                self.last_event = now;
                vec![Effect::Click(coord)]
            }
            Decision::CashOut(reason) => {
                log::info!("Cashing out with {} diamonds ({:?})", self.board.good_reveals(), reason);
                self.cash_out(now)
            }
        }
    }

    fn cash_out(&mut self, now: Instant) -> Vec<Effect> {
        self.pending = None;
        self.phase = Phase::Terminal(Verdict::Won);
        self.last_event = now;
        vec![Effect::CashOut]
    }

    fn watchdog(&mut self, now: Instant) -> Vec<Effect> {
        if now.saturating_duration_since(self.last_event) > self.max_wait {
            log::warn!("Game bot is slow ({:?} in {:?}), manual intervention needed", self.max_wait, self.phase);
            return self.pause(SLOW_BOT_NOTICE);
        }
        vec![]
    }

    fn pause(&mut self, notice: &str) -> Vec<Effect> {
        self.session.paused = true;
        vec![Effect::Notify(notice.to_string())]
    }

    // ---------- Inbound events ---------- //
    pub fn on_game_message(&mut self, message: &GameMessage, now: Instant) -> Vec<Effect> {
        self.last_event = now;
        match message.classify() {
            RoundUpdate::Grid { keyboard, diamond } => {
                self.keyboard = Some(keyboard);
                match self.phase {
                    Phase::Idle | Phase::Starting => {
                        if self.phase == Phase::Idle {
                            self.begin_round();
                        }
                        self.phase = Phase::Active;
                        log::info!("New game started with ID: {}", self.round_id);
                    }
                    Phase::Active => {
                        if let Some(p) = self.pending.take() {
                            let outcome = if diamond { Outcome::Diamond } else { Outcome::Empty };
                            self.resolve(p, outcome);
                        }
                    }
                    Phase::Terminal(_) => {}
                }
                vec![]
            }
            RoundUpdate::Lost => {
                match self.pending.take() {
                    Some(p) => self.resolve(p, Outcome::Bomb),
                    None => log::warn!("Round {} lost without a click we know of", self.round_id),
                }
                log::info!("Game {} lost: Hit a bomb after revealing {} diamonds", self.round_id, self.board.good_reveals());
                self.phase = Phase::Terminal(Verdict::Lost);
                self.acknowledge(Verdict::Lost, now)
            }
            RoundUpdate::Won { amount, multiplier } => {
                // The bot banks the round by itself once the last diamond is found
                if let Some(p) = self.pending.take() {
                    self.resolve(p, Outcome::Diamond);
                }
                log::info!("Game {} won: Cashed out with {} diamonds. Multiplier: {multiplier}, Win: {amount}",
                    self.round_id, self.board.good_reveals());
                self.phase = Phase::Terminal(Verdict::Won);
                self.acknowledge(Verdict::Won, now)
            }
            RoundUpdate::Other => vec![],
        }
    }

    /// Apply a click's outcome and learn from the transition
    fn resolve(&mut self, p: PendingReveal, outcome: Outcome) {
        if let Err(e) = self.board.mark_revealed(p.coord, outcome) {
            log::warn!("Ignoring outcome {:?}: {e}", outcome);
            return;
        }
        let hit = outcome == Outcome::Bomb;
        let transition = Transition {
            from: p.from,
            action: p.coord,
            reward: learning::reward(p.good_before, self.board.good_reveals(), hit),
            to: self.board.state_key(),
            next_moves: if hit { vec![] } else { self.board.valid_moves() },
        };
        self.learner.update(&mut self.table, &transition);
    }

    fn acknowledge(&mut self, verdict: Verdict, now: Instant) -> Vec<Effect> {
        let won = verdict == Verdict::Won;
        let outcome = RoundOutcome {
            won,
            good_reveals: self.board.good_reveals(),
            bombs_hit: if won { 0 } else { 1 },
        };
        self.session.stats.record(&outcome);
        if let Some(positions) = self.positions.remove(&self.round_id) {
            self.learner.learn_from_positions(&mut self.table, self.board.bombs(), &positions.bombs, &positions.diamonds);
        }
        self.board.reset();
        self.pending = None;
        self.keyboard = None;
        self.phase = Phase::Idle;

        let mut effects = vec![Effect::Persist];
        if self.session.should_play() {
            log::info!("Auto-restarting game after {}", if won { "win" } else { "loss" });
            effects.extend(self.start_round(now));
        }
        effects
    }

    /// The transport could not click `coord`: try one other tile, otherwise bank the round
    pub fn on_click_failed(&mut self, coord: Coord, now: Instant) -> Vec<Effect> {
        let Some(p) = self.pending.take() else { return vec![] };
        if p.coord != coord {
            self.pending = Some(p);
            return vec![];
        }
        if !p.substituted {
            let alternatives: Vec<Coord> = self.board.valid_moves().into_iter().filter(|&c| c != coord).collect();
            if let Some(alt) = policy::uniform(&alternatives, &mut self.rng) {
                log::info!("Choosing new position {alt} instead of {coord}");
                self.pending = Some(PendingReveal { coord: alt, substituted: true, ..p });
                self.last_event = now;
                return vec![Effect::Click(alt)];
            }
        }
        log::info!("No usable moves left, cashing out");
        self.cash_out(now)
    }

    pub fn on_cash_out_failed(&mut self) -> Vec<Effect> {
        log::warn!("Cash out failed in game {}", self.round_id);
        self.pause(NO_CASH_OUT_NOTICE)
    }

    // ---------- Operator ---------- //
    pub fn on_command(&mut self, command: Command, now: Instant) -> Vec<Effect> {
        let notify = |s: String| vec![Effect::Notify(s)];
        match command {
            Command::Start => {
                if self.session.running {
                    return notify("🔄 AI is already running.".into());
                }
                self.session.running = true;
                notify("🔄 /startai received – The script is playing the game.".into())
            }
            Command::Stop => {
                if !self.session.running {
                    return notify("⚠️ AI is not currently running.".into());
                }
                self.session.running = false;
                notify("🛑 AI stopped. Send /startai to resume.".into())
            }
            Command::Train => {
                self.set_mode(Mode::Training);
                notify(format!("🧠 Switched to training mode. Will cash out after {} diamonds.", self.session.config.training_cashout))
            }
            Command::UseLearned => {
                self.set_mode(Mode::Learning);
                notify("🎮 Switched to live RL mode. Using trained model for gameplay.".into())
            }
            Command::SetBet(bet) => match self.session.config.set_bet(bet) {
                Ok(()) => notify(format!("💰 Bet amount set to {bet}.")),
                Err(e) => notify(format!("⚠️ {e}")),
            },
            Command::SetBombs(bombs) => match self.session.config.set_bombs(bombs) {
                Ok(()) => notify(format!("💣 Number of bombs set to {bombs}.")),
                Err(e) => notify(format!("⚠️ {e}")),
            },
            Command::Status => notify(self.session.summary().to_string()),
            Command::Resume => {
                if !self.session.paused {
                    return notify("⚠️ AI is not waiting to be resumed.".into());
                }
                self.resume(now);
                notify("▶️ Resuming gameplay.".into())
            }
            Command::Storage(granted) => vec![
                Effect::Storage(granted),
                Effect::Notify(format!("💾 Data storage {}.", if granted { "enabled" } else { "disabled" })),
            ],
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.session.mode != mode {
            // Keep the decayed rate so switching back resumes where it left off
            if let PolicyEngine::ValueGuided(s) = &self.engine {
                self.session.config.exploration = s.exploration;
            }
            self.session.mode = mode;
            self.engine = self.session.config.engine(mode);
        }
    }

    /// Leave the paused state. Outstanding clicks are forgotten; a round that never
    /// started is retried and an unconfirmed cash out is decided again.
    fn resume(&mut self, now: Instant) {
        self.session.paused = false;
        self.pending = None;
        self.last_event = now;
        self.phase = match self.phase {
            Phase::Starting => Phase::Idle,
            Phase::Terminal(Verdict::Won) => Phase::Active,
            other => other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PolicyConfig;

    const WAIT: Duration = Duration::from_secs(30);

    fn controller_with(config: PolicyConfig, now: Instant) -> Controller {
        let mut session = Session::new(config);
        session.running = true;
        Controller::new(session, QTable::new(), WAIT, Some(11), now)
    }

    fn controller(now: Instant) -> Controller {
        controller_with(PolicyConfig::default(), now)
    }

    fn grid(text: &str) -> GameMessage {
        let labels: Vec<Vec<&str>> = (0..GRID_SIZE).map(|_| vec!["❓"; GRID_SIZE]).collect();
        let mut keyboard = Keyboard::from_labels(&labels);
        keyboard.rows.push(vec![crate::messages::Button { text: "💰 Cash Out".into() }]);
        GameMessage { text: text.into(), keyboard: Some(keyboard) }
    }

    fn text(text: &str) -> GameMessage {
        GameMessage { text: text.into(), keyboard: None }
    }

    fn expect_click(effects: Vec<Effect>) -> Coord {
        match effects.as_slice() {
            [Effect::Click(c)] => *c,
            other => panic!("expected a click, got {:?}", other),
        }
    }

    /// Start a round and confirm it with a board
    fn started(now: Instant) -> Controller {
        let mut c = controller(now);
        assert_eq!(c.tick(now), vec![Effect::StartRound { bet: DEFAULT_BET, bombs: DEFAULT_BOMBS }]);
        assert_eq!(c.phase(), Phase::Starting);
        assert!(c.on_game_message(&grid("Mines started"), now).is_empty());
        assert_eq!(c.phase(), Phase::Active);
        c
    }

    #[test]
    fn test_training_round_cashes_out_and_restarts() {
        let now = Instant::now();
        let mut c = started(now);
        for i in 1..=3 {
            let coord = expect_click(c.tick(now));
            assert!(c.tick(now).is_empty(), "no second click while waiting on the first");
            c.on_game_message(&grid("You found a 💎!"), now);
            assert_eq!(c.board().good_reveals(), i);
            assert!(c.board().is_revealed(coord));
        }
        assert_eq!(c.tick(now), vec![Effect::CashOut]);
        assert_eq!(c.phase(), Phase::Terminal(Verdict::Won));

        let effects = c.on_game_message(&text("You won 40 with multiplier 2.0"), now);
        assert_eq!(effects, vec![Effect::Persist, Effect::StartRound { bet: DEFAULT_BET, bombs: DEFAULT_BOMBS }]);
        assert_eq!(c.session.stats.wins, 1);
        assert_eq!(c.session.stats.total_diamonds, 3);
        assert_eq!(c.round_id(), 2);
        assert!(c.board().revealed().is_empty());
        // Each diamond was a +1 transition from the state before it
        assert_eq!(c.table().len(), 3);
        assert!(c.table().entries().iter().all(|e| e.value > 0.0));
    }

    #[test]
    fn test_bomb_ends_round_with_penalty() {
        let now = Instant::now();
        let mut c = started(now);
        let coord = expect_click(c.tick(now));
        let effects = c.on_game_message(&text("💥 Game over, you lost"), now);
        assert_eq!(effects[0], Effect::Persist);
        assert_eq!(c.session.stats.losses, 1);
        assert_eq!(c.table().get(&StateKey::initial(DEFAULT_BOMBS), coord), Some(-1.0));
        assert_eq!(c.phase(), Phase::Starting);
    }

    #[test]
    fn test_stopped_controller_does_not_restart() {
        let now = Instant::now();
        let mut c = started(now);
        expect_click(c.tick(now));
        c.on_command(Command::Stop, now);
        assert!(c.tick(now).is_empty());
        let effects = c.on_game_message(&text("💥 Game over"), now);
        assert_eq!(effects, vec![Effect::Persist]);
        assert_eq!(c.phase(), Phase::Idle);
        assert!(c.tick(now).is_empty());
    }

    #[test]
    fn test_watchdog_pauses_until_resume() {
        let now = Instant::now();
        let mut c = controller(now);
        c.tick(now);
        assert!(c.tick(now + Duration::from_secs(10)).is_empty());
        let late = now + WAIT + Duration::from_secs(1);
        assert_eq!(c.tick(late), vec![Effect::Notify(SLOW_BOT_NOTICE.into())]);
        assert_eq!(c.state(), State::PausedForIntervention);
        assert!(c.tick(late + WAIT * 10).is_empty(), "no retries while paused");

        assert_eq!(c.on_command(Command::Resume, late), vec![Effect::Notify("▶️ Resuming gameplay.".into())]);
        assert_eq!(c.state(), State::Phase(Phase::Idle));
        assert!(matches!(c.tick(late).as_slice(), [Effect::StartRound { .. }]));
    }

    #[test]
    fn test_watchdog_while_waiting_for_outcome() {
        let now = Instant::now();
        let mut c = started(now);
        expect_click(c.tick(now));
        let late = now + WAIT * 2;
        assert_eq!(c.tick(late), vec![Effect::Notify(SLOW_BOT_NOTICE.into())]);
        c.on_command(Command::Resume, late);
        assert_eq!(c.phase(), Phase::Active);
        assert!(!c.awaiting_outcome());
        expect_click(c.tick(late));
    }

    #[test]
    fn test_failed_click_substitutes_once_then_cashes_out() {
        let now = Instant::now();
        let mut c = started(now);
        let first = expect_click(c.tick(now));
        let second = expect_click(c.on_click_failed(first, now));
        assert_ne!(first, second);
        assert_eq!(c.on_click_failed(second, now), vec![Effect::CashOut]);
        assert_eq!(c.phase(), Phase::Terminal(Verdict::Won));
    }

    #[test]
    fn test_failed_cash_out_pauses() {
        let now = Instant::now();
        let mut c = controller_with(PolicyConfig { training_cashout: 0, ..Default::default() }, now);
        c.tick(now);
        c.on_game_message(&grid("Mines started"), now);
        assert_eq!(c.tick(now), vec![Effect::CashOut]);
        assert_eq!(c.on_cash_out_failed(), vec![Effect::Notify(NO_CASH_OUT_NOTICE.into())]);
        assert_eq!(c.state(), State::PausedForIntervention);
        c.on_command(Command::Resume, now);
        assert_eq!(c.phase(), Phase::Active);
    }

    #[test]
    fn test_post_hoc_positions_applied_on_acknowledge() {
        let now = Instant::now();
        let mut c = started(now);
        let round = c.round_id();
        c.record_positions(round, RoundPositions { bombs: vec![Coord::new(0, 0)], diamonds: vec![Coord::new(1, 1)] });
        expect_click(c.tick(now));
        c.on_game_message(&text("💥 Game over"), now);
        let initial = StateKey::initial(DEFAULT_BOMBS);
        assert_eq!(c.table().get(&initial, Coord::new(0, 0)), Some(learning::POST_HOC_BOMB_VALUE));
        assert_eq!(c.table().get(&initial, Coord::new(1, 1)), Some(learning::POST_HOC_DIAMOND_VALUE));
    }

    #[test]
    fn test_operator_commands() {
        let now = Instant::now();
        let mut c = controller(now);
        assert_eq!(c.on_command(Command::Start, now), vec![Effect::Notify("🔄 AI is already running.".into())]);
        assert_eq!(c.on_command(Command::SetBet(0), now), vec![Effect::Notify("⚠️ Bet amount must be positive.".into())]);
        c.on_command(Command::SetBet(75), now);
        c.on_command(Command::SetBombs(30), now);
        c.on_command(Command::SetBombs(5), now);
        assert_eq!(c.tick(now), vec![Effect::StartRound { bet: 75, bombs: 5 }]);
        assert_eq!(c.board().bombs(), 5);

        c.on_command(Command::UseLearned, now);
        assert_eq!(c.engine().mode(), Mode::Learning);
        c.on_command(Command::Train, now);
        assert_eq!(c.engine().mode(), Mode::Training);

        assert_eq!(c.on_command(Command::Resume, now), vec![Effect::Notify("⚠️ AI is not waiting to be resumed.".into())]);
        assert!(matches!(c.on_command(Command::Storage(true), now).as_slice(), [Effect::Storage(true), _]));
        match c.on_command(Command::Status, now).as_slice() {
            [Effect::Notify(s)] => assert!(s.contains("Bet Amount: 75")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mode_switch_keeps_decayed_exploration() {
        let now = Instant::now();
        let mut c = started(now);
        c.on_command(Command::UseLearned, now);
        for _ in 0..10 {
            expect_click(c.tick(now));
            c.on_game_message(&grid("tile opened"), now);
        }
        let decayed = c.engine().exploration_rate().unwrap();
        assert!(decayed < EXPLORATION_RATE);
        c.on_command(Command::Train, now);
        c.on_command(Command::UseLearned, now);
        assert_eq!(c.engine().exploration_rate(), Some(decayed));
    }

    #[test]
    fn test_watchdog_while_waiting_for_cash_out() {
        let now = Instant::now();
        let mut c = controller_with(PolicyConfig { training_cashout: 0, ..Default::default() }, now);
        c.tick(now);
        c.on_game_message(&grid("Mines started"), now);
        assert_eq!(c.tick(now), vec![Effect::CashOut]);
        assert!(c.tick(now + Duration::from_secs(5)).is_empty());
        let late = now + WAIT * 2;
        assert_eq!(c.tick(late), vec![Effect::Notify(SLOW_BOT_NOTICE.into())]);
        assert_eq!(c.state(), State::PausedForIntervention);
        c.on_command(Command::Resume, late);
        assert_eq!(c.state(), State::Phase(Phase::Active));
        assert_eq!(c.tick(late), vec![Effect::CashOut]);
    }

    #[test]
    fn test_grid_after_cash_out_is_ignored() {
        let now = Instant::now();
        let mut c = controller_with(PolicyConfig { training_cashout: 0, ..Default::default() }, now);
        c.tick(now);
        c.on_game_message(&grid("Mines started"), now);
        c.tick(now);
        assert!(c.on_game_message(&grid("You found a 💎!"), now).is_empty());
        assert_eq!(c.phase(), Phase::Terminal(Verdict::Won));
        assert_eq!(c.board().good_reveals(), 0);
        assert!(c.board().revealed().is_empty());
    }

    #[test]
    fn test_positions_of_abandoned_rounds_are_dropped() {
        let now = Instant::now();
        let mut c = controller(now);
        c.tick(now);
        let abandoned = c.round_id();
        c.record_positions(abandoned, RoundPositions { bombs: vec![Coord::new(0, 0)], diamonds: vec![] });
        let late = now + WAIT * 2;
        c.tick(late);
        c.on_command(Command::Resume, late);
        c.tick(late);
        assert_eq!(c.round_id(), abandoned + 1);
        assert!(c.positions.is_empty());
    }

    #[test]
    fn test_learning_mode_plays_until_board_exhausted() {
        let now = Instant::now();
        let mut c = started(now);
        c.on_command(Command::UseLearned, now);
        for _ in 0..(GRID_SIZE * GRID_SIZE) {
            expect_click(c.tick(now));
            c.on_game_message(&grid("tile opened"), now);
        }
        assert_eq!(c.tick(now), vec![Effect::CashOut]);
        assert_eq!(c.board().revealed().len(), GRID_SIZE * GRID_SIZE);
    }
}
