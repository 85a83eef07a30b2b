//! Mines: the chat bot's gambling mini-game, played locally
//!
//! Rules:
//! - An N×N board hides `bombs` bombs; every other tile is a diamond.
//! - The player reveals tiles one at a time. A bomb loses the bet.
//! - After any number of diamonds the player may cash out for `bet * multiplier`.
//! - The multiplier is the fair odds of surviving every reveal so far, minus a 1% house edge per diamond.
//!
//! Used to stand in for the real game bot (same message texts) and for offline training.

use std::collections::BTreeSet;
use rand::seq::IteratorRandom;
use rand::Rng;
use crate::controller::RoundPositions;
use crate::error::{Error, Result};
use crate::messages::{Button, GameMessage, Keyboard};
use crate::utils::*;

pub const HOUSE_EDGE: f64 = 0.01;
pub const HIDDEN: &str = "❓";
pub const CASH_OUT_BUTTON: &str = "💰 Cash Out";

#[derive(Clone, Debug)]
pub struct MinesGame {
    size: usize,
    bet: u64,
    bombs: BTreeSet<Coord>,
    revealed: BTreeSet<Coord>,
    over: bool,
}

impl MinesGame {
    pub fn new<R: Rng + ?Sized>(size: usize, bombs: u8, bet: u64, rng: &mut R) -> Self {
        let bombs = all_coords(size).choose_multiple(rng, bombs as usize).into_iter().collect();
        Self::with_bombs(size, bet, bombs)
    }

    /// Fixed layout (for tests and replays)
    pub fn with_bombs(size: usize, bet: u64, bombs: BTreeSet<Coord>) -> Self {
        MinesGame { size, bet, bombs, revealed: BTreeSet::new(), over: false }
    }

    #[inline] pub fn is_over(&self) -> bool { self.over }

    pub fn diamonds_found(&self) -> u32 {
        self.revealed.iter().filter(|c| !self.bombs.contains(c)).count() as u32
    }

    pub fn reveal(&mut self, coord: Coord) -> Result<Outcome> {
        if !coord.in_bounds(self.size) {
            return Err(Error::OutOfBounds(coord));
        }
        if self.over {
            return Err(Error::Transport("the round is already over".into()));
        }
        if !self.revealed.insert(coord) {
            return Err(Error::AlreadyRevealed(coord));
        }
        if self.bombs.contains(&coord) {
            self.over = true;
            return Ok(Outcome::Bomb);
        }
        if self.revealed.len() + self.bombs.len() == self.size * self.size {
            // Every diamond found, the bot banks the round itself
            self.over = true;
        }
        Ok(Outcome::Diamond)
    }

    pub fn multiplier(&self) -> f64 {
        let cells = (self.size * self.size) as f64;
        let bombs = self.bombs.len() as f64;
        (0..self.diamonds_found()).map(|k| {
            let k = k as f64;
            (cells - k) / (cells - bombs - k) * (1.0 - HOUSE_EDGE)
        }).product()
    }

    /// End the round and return the payout
    pub fn cash_out(&mut self) -> f64 {
        self.over = true;
        self.bet as f64 * self.multiplier()
    }

    /// Where everything was
    pub fn layout(&self) -> RoundPositions {
        RoundPositions {
            bombs: self.bombs.iter().copied().collect(),
            diamonds: all_coords(self.size).filter(|c| !self.bombs.contains(c)).collect(),
        }
    }

    pub fn keyboard(&self) -> Keyboard {
        let mut rows: Vec<Vec<Button>> = (0..self.size).map(|row| {
            (0..self.size).map(|col| {
                let c = Coord::new(row, col);
                let text = match (self.revealed.contains(&c), self.bombs.contains(&c)) {
                    (false, _) => HIDDEN,
                    (true, true) => "💥",
                    (true, false) => "💎",
                };
                Button { text: text.to_string() }
            }).collect()
        }).collect();
        rows.push(vec![Button { text: CASH_OUT_BUTTON.to_string() }]);
        Keyboard { rows }
    }

    // ---------- Bot-style messages ---------- //
    pub fn board_message(&self, text: &str) -> GameMessage {
        GameMessage { text: text.to_string(), keyboard: Some(self.keyboard()) }
    }

    pub fn started_message(&self) -> GameMessage {
        self.board_message(&format!("💣 Mines started: bet {}, {} bombs. Pick a tile!", self.bet, self.bombs.len()))
    }

    pub fn found_message(&self) -> GameMessage {
        self.board_message(&format!("You found a 💎! Current multiplier x{:.2}", self.multiplier()))
    }

    pub fn lost_message(&self) -> GameMessage {
        GameMessage { text: format!("💥 Game over! You lost {}.", self.bet), keyboard: None }
    }

    pub fn won_message(&self, payout: f64) -> GameMessage {
        GameMessage { text: format!("You won {:.2} with multiplier {:.2}", payout, self.multiplier()), keyboard: None }
    }
}
