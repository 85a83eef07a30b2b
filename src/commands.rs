use crate::error::{Error, Result};

/// Operator requests, typed in the control chat
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    Start,
    Stop,
    /// Random exploration with the fixed cash-out threshold
    Train,
    /// Play from the learned table
    UseLearned,
    SetBet(u64),
    SetBombs(u8),
    Status,
    Resume,
    /// Grant or revoke permission to keep data on disk
    Storage(bool),
}

impl Command {
    /// Parse a chat line. Lines that are not commands give `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else { return Ok(None) };
        if !head.starts_with('/') {
            return Ok(None);
        }
        let arg = words.next();
        let cmd = match head {
            "/startai" => Command::Start,
            "/stopai" => Command::Stop,
            "/trainrl" => Command::Train,
            "/userl" => Command::UseLearned,
            "/status" => Command::Status,
            "/resume" => Command::Resume,
            "/setbet" => Command::SetBet(
                arg.and_then(|a| a.parse().ok()).ok_or(Error::InvalidCommand { usage: "/setbet <amount>" })?,
            ),
            "/setbombs" => Command::SetBombs(
                arg.and_then(|a| a.parse().ok()).ok_or(Error::InvalidCommand { usage: "/setbombs <number>" })?,
            ),
            "/storage" => match arg {
                Some("on") => Command::Storage(true),
                Some("off") => Command::Storage(false),
                _ => return Err(Error::InvalidCommand { usage: "/storage on|off" }),
            },
            other => return Err(Error::UnknownCommand(other.to_string())),
        };
        Ok(Some(cmd))
    }
}
