use std::fmt;

use crate::entities::GameState;

/// Lifecycle command names, used when a transition is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    TogglePause,
    Restart,
    NextStage,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::TogglePause => write!(f, "pause"),
            Self::Restart => write!(f, "restart"),
            Self::NextStage => write!(f, "next-stage"),
        }
    }
}

#[derive(Debug)]
pub enum GameError {
    Io(std::io::Error),
    Config(String),
    SaveFormat(serde_json::Error),
    InvalidTransition { from: GameState, command: Command },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Self::SaveFormat(e) => write!(f, "malformed save file: {e}"),
            Self::InvalidTransition { from, command } => {
                write!(f, "cannot {command} while in state {from:?}")
            }
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::SaveFormat(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GameError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for GameError {
    fn from(e: serde_json::Error) -> Self {
        Self::SaveFormat(e)
    }
}
