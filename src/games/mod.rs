//! # Game Implementations
//!
//! Local stand-ins for games the agent plays through a chat bot.
//! - **Mines**: reveal tiles on a hidden board, cash out before hitting a bomb

pub mod mines;
