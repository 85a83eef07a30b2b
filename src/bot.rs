//! # Runner
//!
//! Owns the controller, the transport and the store. Inbound events and the turn
//! tick are serviced by one task, one at a time, so the controller never sees two
//! things at once.

use std::collections::VecDeque;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use crate::commands::Command;
use crate::config::Config;
use crate::controller::{Controller, Effect, RoundPositions};
use crate::messages::GameMessage;
use crate::persistence::Store;
use crate::q_table::QTable;
use crate::session::{Session, Stats};
use crate::transport::Transport;

/// Everything that can wake the runner
#[derive(Debug, Clone)]
pub enum Event {
    /// Message from the game bot
    Game(GameMessage),
    /// Chat line from an operator
    Command { sender: i64, text: String },
    /// Full layout of the round in progress, when the source knows it
    Layout(RoundPositions),
    Shutdown,
}

pub struct Bot<T: Transport, S: Store> {
    config: Config,
    controller: Controller,
    transport: T,
    store: S,
}

impl<T: Transport, S: Store> Bot<T, S> {
    pub fn new(config: Config, transport: T, store: S) -> Self {
        let mut session = Session::new(config.policy());
        session.stats = store.load_stats().unwrap_or_else(|e| {
            log::error!("Could not load game history: {e}");
            Stats::default()
        });
        let table = store.load_table().unwrap_or_else(|e| {
            log::error!("Could not load Q-table: {e}");
            QTable::new()
        });
        let controller = Controller::new(session, table, config.max_wait(), config.seed, Instant::now());
        Bot { config, controller, transport, store }
    }

    pub fn controller(&self) -> &Controller { &self.controller }
    pub fn transport(&self) -> &T { &self.transport }
    pub fn store(&self) -> &S { &self.store }

    /// Process one event. Returns `false` once asked to shut down.
    pub async fn handle(&mut self, event: Event) -> bool {
        let now = Instant::now();
        let effects = match event {
            Event::Game(message) => self.controller.on_game_message(&message, now),
            Event::Command { sender, text } => {
                if !self.config.is_authorized(sender) {
                    log::debug!("Ignoring command from unauthorized user {sender}");
                    return true;
                }
                match Command::parse(&text) {
                    Ok(Some(command)) => {
                        log::info!("Command from {sender}: {command:?}");
                        self.controller.on_command(command, now)
                    }
                    Ok(None) => vec![],
                    Err(e) => vec![Effect::Notify(format!("⚠️ {e}"))],
                }
            }
            Event::Layout(positions) => {
                let round = self.controller.round_id();
                self.controller.record_positions(round, positions);
                vec![]
            }
            Event::Shutdown => return false,
        };
        self.execute(effects).await;
        true
    }

    /// One turn of automatic play
    pub async fn turn(&mut self) {
        let effects = self.controller.tick(Instant::now());
        self.execute(effects).await;
    }

    /// Carry out effects in order. Failures are reported back to the controller,
    /// whose answers run before anything queued after them.
    async fn execute(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let follow_up = match effect {
                Effect::StartRound { bet, bombs } => {
                    if let Err(e) = self.transport.start_round(bet, bombs).await {
                        log::error!("Failed to start a round: {e}");
                    }
                    vec![]
                }
                Effect::Click(coord) => {
                    let on_board = self.controller.keyboard().map_or(true, |k| k.has(coord));
                    let result = if on_board {
                        self.transport.click_cell(coord).await
                    } else {
                        Err(crate::Error::OutOfBounds(coord))
                    };
                    match result {
                        Ok(()) => vec![],
                        Err(e) => {
                            log::warn!("Error clicking position {coord}: {e}");
                            self.controller.on_click_failed(coord, Instant::now())
                        }
                    }
                }
                Effect::CashOut => match self.transport.click_cash_out().await {
                    Ok(()) => vec![],
                    Err(e) => {
                        let labels = self.controller.keyboard().map(|k| k.labels()).unwrap_or_default();
                        log::warn!("Error cashing out: {e}. Available buttons: {labels:?}");
                        self.controller.on_cash_out_failed()
                    }
                },
                Effect::Notify(text) => {
                    if let Err(e) = self.transport.notify(&text).await {
                        log::error!("Failed to notify operators: {e}");
                    }
                    vec![]
                }
                Effect::Persist => {
                    self.persist();
                    vec![]
                }
                Effect::Storage(granted) => {
                    match self.store.set_permission(granted) {
                        Ok(()) if granted => self.persist(),
                        Ok(()) => {}
                        Err(e) => log::error!("Failed to store permission: {e}"),
                    }
                    vec![]
                }
            };
            for (i, effect) in follow_up.into_iter().enumerate() {
                queue.insert(i, effect);
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save_table(self.controller.table()) {
            log::error!("Failed to save Q-table: {e}");
        }
        if let Err(e) = self.store.save_stats(&self.controller.session.stats) {
            log::error!("Failed to save game history: {e}");
        }
    }

    /// Serve events and turns until shutdown or until every sender is gone
    pub async fn run(mut self, mut events: UnboundedReceiver<Event>) -> Self {
        let mut ticker = tokio::time::interval(self.config.turn_delay());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("Bot running, mode {}", self.controller.session.mode);
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => if !self.handle(event).await { break },
                    None => break,
                },
                _ = ticker.tick() => self.turn().await,
            }
        }
        log::info!("Shutting down after {} games", self.controller.session.stats.games_played);
        self.persist();
        self
    }
}
