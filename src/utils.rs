use std::fmt::{Debug, Display, Formatter};
use serde::{Deserialize, Serialize};

// ---------- Tune-ables ---------- //
pub const GRID_SIZE: usize = 5;  // Board is GRID_SIZE x GRID_SIZE
pub const DEFAULT_BET: u64 = 20;
pub const DEFAULT_BOMBS: u8 = 3;
pub const MIN_BOMBS: u8 = 3;  // The game bot refuses anything lower
pub const TRAINING_CASHOUT: u32 = 3;  // Diamonds revealed before training mode banks the round
pub const MAX_WAIT_SECS: u64 = 30;  // Silence from the game bot before asking for help
pub const TURN_DELAY_MS: u64 = 1000;  // Pause between turns (respects bot rate limits)

pub const LEARNING_RATE: f64 = 0.1;
pub const DISCOUNT_FACTOR: f64 = 0.95;
pub const EXPLORATION_RATE: f64 = 0.2;
pub const EXPLORATION_DECAY: f64 = 0.995;
pub const MIN_EXPLORATION_RATE: f64 = 0.01;

// ---------- Basic types (renamed for pretty) ---------- //
pub type Reward = f64;
pub type Probability = f64;
pub type RoundId = u64;

/// A tile on the board, ordered row-major
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    #[inline] pub fn new(row: usize, col: usize) -> Self { Coord { row, col } }
    #[inline] pub fn in_bounds(self, size: usize) -> bool { self.row < size && self.col < size }
}

impl Debug for Coord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl Display for Coord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self { Coord::new(row, col) }
}

/// What clicking a tile turned out to be
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// A good reveal
    Diamond,
    /// Safe, but the bot did not credit a diamond for it
    Empty,
    Bomb,
}

impl Outcome {
    #[inline] pub fn is_good(self) -> bool { self == Outcome::Diamond }
}

/// Which strategy picks the tiles
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Uniform random exploration with a fixed cash-out threshold
    #[default]
    Training,
    /// Value-guided selection from the learned table
    Learning,
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Training => write!(f, "Training"),
            Mode::Learning => write!(f, "Live RL"),
        }
    }
}

/// Largest bomb count the bot accepts on a board of this size
pub fn max_bombs(grid_size: usize) -> u8 {
    (grid_size * grid_size).saturating_sub(2).min(u8::MAX as usize) as u8
}

/// Every coordinate on the board in row-major order
pub fn all_coords(size: usize) -> impl Iterator<Item = Coord> {
    (0..size).flat_map(move |row| (0..size).map(move |col| Coord::new(row, col)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bomb_bounds_for_default_grid() {
        assert_eq!(max_bombs(GRID_SIZE), 23);
        assert_eq!(max_bombs(1), 0);
    }

    #[test]
    fn test_all_coords_row_major() {
        let coords: Vec<Coord> = all_coords(2).collect();
        assert_eq!(coords, vec![(0, 0).into(), (0, 1).into(), (1, 0).into(), (1, 1).into()]);
        let mut sorted = coords.clone();
        sorted.sort();
        assert_eq!(coords, sorted, "Ord on Coord should be row-major");
    }
}
