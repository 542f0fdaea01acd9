use crate::models::game::Game;

/// Expected, per-request failures. None of them are fatal; conflicts that
/// come with the current state of the game carry a snapshot of it.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Game not found")]
    NotFound,
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("You have already joined this game")]
    AlreadyJoined(Box<Game>),
    #[error("Game is full")]
    Full(Box<Game>),
    #[error("You already have an active game")]
    AlreadyHosting(Box<Game>),
    #[error("You are not a player in this game")]
    NotAMember,
    #[error("Target player not found or not alive")]
    InvalidTarget,
    #[error("Cannot act on a game that has ended")]
    GameEnded,
}

impl GameError {
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::NotFound => "NotFound",
            GameError::InvalidState(_) => "InvalidState",
            GameError::Forbidden(_) => "Forbidden",
            GameError::InvalidArgument(_) => "InvalidArgument",
            GameError::AlreadyJoined(_) => "AlreadyJoined",
            GameError::Full(_) => "Full",
            GameError::AlreadyHosting(_) => "AlreadyHosting",
            GameError::NotAMember => "NotAMember",
            GameError::InvalidTarget => "InvalidTarget",
            GameError::GameEnded => "GameEnded",
        }
    }

    pub fn game(&self) -> Option<&Game> {
        match self {
            GameError::AlreadyJoined(game)
            | GameError::Full(game)
            | GameError::AlreadyHosting(game) => Some(game),
            _ => None,
        }
    }
}
