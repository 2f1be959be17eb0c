//! Error types shared by the simulation core and the ranking store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("speed must be a finite positive number, got {0}")]
    InvalidSpeed(f32),

    #[error("speed {0} covers half a tile or more in one frame")]
    SpeedTooHigh(f32),

    #[error("player name must not be empty")]
    EmptyPlayerName,

    #[error("invalid level template: {0}")]
    InvalidLevel(String),

    #[error("unknown level index {0}")]
    UnknownLevel(usize),
}

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("ranking storage is not configured")]
    NotConfigured,

    #[error("ranking service unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported ranking file version {0}")]
    UnsupportedVersion(u8),
}

impl RankingError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
