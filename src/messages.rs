//! # Game bot messages
//!
//! Classifies what the game bot sends back: board snapshots (a message carrying a
//! keyboard of tile buttons) and round-ended notices.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::utils::Coord;

pub const DIAMOND: &str = "💎";
pub const EXPLOSION: &str = "💥";
/// Labels that identify the cash-out button (matched case-insensitively)
pub const CASH_OUT_LABELS: [&str; 5] = ["Cash Out", "💰", "cashout", "cash", "Cashout"];

static WIN_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"You won (\d+(?:\.\d+)?)").expect("valid regex"));
static MULTIPLIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"multiplier (\d+(?:\.\d+)?)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
}

/// Inline keyboard rows as sent by the bot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn from_labels<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        Keyboard {
            rows: rows.iter()
                .map(|r| r.iter().map(|t| Button { text: t.as_ref().to_string() }).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool { self.rows.iter().all(|r| r.is_empty()) }

    /// Whether a button exists at this position
    pub fn has(&self, coord: Coord) -> bool {
        self.rows.get(coord.row).is_some_and(|r| coord.col < r.len())
    }

    /// Position of the first button whose label looks like a cash-out
    pub fn find_cash_out(&self) -> Option<Coord> {
        self.rows.iter().enumerate().find_map(|(row, buttons)| {
            buttons.iter().position(|b| is_cash_out_label(&b.text)).map(|col| Coord::new(row, col))
        })
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().flatten().map(|b| b.text.as_str()).filter(|t| !t.is_empty()).collect()
    }
}

pub fn is_cash_out_label(text: &str) -> bool {
    let lower = text.to_lowercase();
    CASH_OUT_LABELS.iter().any(|l| lower.contains(&l.to_lowercase()))
}

/// A message from the game bot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMessage {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundUpdate {
    /// A fresh board snapshot; `diamond` when the text credits a newly found diamond
    Grid { keyboard: Keyboard, diamond: bool },
    Lost,
    Won { amount: f64, multiplier: f64 },
    /// Nothing we understand
    Other,
}

impl GameMessage {
    pub fn classify(&self) -> RoundUpdate {
        let text = self.text.as_str();
        if text.contains(EXPLOSION) && (text.contains("Game over") || text.contains("lost")) {
            return RoundUpdate::Lost;
        }
        if text.contains("You won") && text.contains("multiplier") {
            return RoundUpdate::Won { amount: win_amount(text), multiplier: multiplier(text) };
        }
        match &self.keyboard {
            Some(k) if !k.is_empty() => RoundUpdate::Grid { keyboard: k.clone(), diamond: reports_diamond(text) },
            _ => RoundUpdate::Other,
        }
    }
}

pub fn reports_diamond(text: &str) -> bool {
    text.contains(DIAMOND) && (text.contains("You found a 💎") || text.to_lowercase().contains("diamond"))
}

/// Amount in "You won <n>", 0.0 if missing
pub fn win_amount(text: &str) -> f64 {
    capture_number(&WIN_AMOUNT, text).unwrap_or(0.0)
}

/// Value in "multiplier <n>", 1.0 if missing
pub fn multiplier(text: &str) -> f64 {
    capture_number(&MULTIPLIER, text).unwrap_or(1.0)
}

fn capture_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}
