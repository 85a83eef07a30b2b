use thiserror::Error;

use crate::utils::Coord;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while playing
#[derive(Debug, Error)]
pub enum Error {
    // Board errors
    #[error("position {0} is outside the board")]
    OutOfBounds(Coord),

    #[error("position {0} has already been revealed")]
    AlreadyRevealed(Coord),

    // Operator input
    #[error("Bet amount must be positive.")]
    InvalidBet,

    #[error("Number of bombs must be between {min} and {max}.")]
    InvalidBombCount { min: u8, max: u8 },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid format. Use: {usage}")]
    InvalidCommand { usage: &'static str },

    // Collaborators
    #[error("transport error: {0}")]
    Transport(String),

    #[error("no cash out button found")]
    NoCashOutButton,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
