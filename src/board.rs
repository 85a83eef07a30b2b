//! # Grid State
//!
//! Tracks which tiles of the N×N board have been revealed this round and how many of
//! those reveals were good. The [`StateKey`] derived from it indexes the value table.

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::utils::*;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CellState {
    #[default]
    Unknown,
    Safe,
    Bomb,
}

/// Identifies how far a round has progressed.
/// Two rounds with the same reveal history and bomb count share a key.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct StateKey {
    pub revealed: Vec<Coord>,  // sorted
    pub bombs: u8,
    pub good_reveals: u32,
}

impl StateKey {
    /// Key of a board nothing has been revealed on yet
    pub fn initial(bombs: u8) -> Self {
        StateKey { revealed: vec![], bombs, good_reveals: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    bombs: u8,
    cells: Vec<CellState>,
    revealed: BTreeSet<Coord>,
    good_reveals: u32,
}

impl Board {
    pub fn new(size: usize, bombs: u8) -> Self {
        Board {
            size,
            bombs,
            cells: vec![CellState::Unknown; size * size],
            revealed: BTreeSet::new(),
            good_reveals: 0,
        }
    }

    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = CellState::Unknown);
        self.revealed.clear();
        self.good_reveals = 0;
    }

    /// Bomb count used for new state keys (only changes between rounds)
    pub fn set_bombs(&mut self, bombs: u8) { self.bombs = bombs; }

    #[inline] pub fn size(&self) -> usize { self.size }
    #[inline] pub fn bombs(&self) -> u8 { self.bombs }
    #[inline] pub fn good_reveals(&self) -> u32 { self.good_reveals }
    #[inline] pub fn revealed(&self) -> &BTreeSet<Coord> { &self.revealed }

    pub fn cell(&self, coord: Coord) -> Option<CellState> {
        coord.in_bounds(self.size).then(|| self.cells[self.index(coord)])
    }

    pub fn is_revealed(&self, coord: Coord) -> bool {
        self.revealed.contains(&coord)
    }

    pub fn hit_bomb(&self) -> bool {
        self.cells.contains(&CellState::Bomb)
    }

    /// Record what a click uncovered. Each tile can only be revealed once per round.
    pub fn mark_revealed(&mut self, coord: Coord, outcome: Outcome) -> Result<()> {
        if !coord.in_bounds(self.size) {
            return Err(Error::OutOfBounds(coord));
        }
        if self.revealed.contains(&coord) {
            return Err(Error::AlreadyRevealed(coord));
        }
        let idx = self.index(coord);
        self.cells[idx] = match outcome {
            Outcome::Bomb => CellState::Bomb,
            Outcome::Diamond | Outcome::Empty => CellState::Safe,
        };
        self.revealed.insert(coord);
        if outcome.is_good() {
            self.good_reveals += 1;
        }
        Ok(())
    }

    /// Unrevealed tiles in row-major order
    pub fn valid_moves(&self) -> Vec<Coord> {
        all_coords(self.size).filter(|c| !self.revealed.contains(c)).collect()
    }

    pub fn state_key(&self) -> StateKey {
        StateKey {
            revealed: self.revealed.iter().copied().collect(),
            bombs: self.bombs,
            good_reveals: self.good_reveals,
        }
    }

    #[inline]
    fn index(&self, coord: Coord) -> usize { coord.row * self.size + coord.col }
}
