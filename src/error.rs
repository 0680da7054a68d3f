use thiserror::Error;

use crate::action::Street;

/// Expected data-quality failures reported by the tracking layer.
///
/// None of these are fatal: automation may miss a hand boundary or send a
/// garbled action, and statistics tracking carries on regardless.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackError {
    #[error("no hand in progress")]
    NoOpenHand,
    #[error("street went backwards from {last} to {attempted}")]
    StreetRegression { last: Street, attempted: Street },
    #[error("invalid amount {0}")]
    InvalidAmount(f64),
    #[error("malformed action: {0}")]
    MalformedAction(String),
    #[error("invalid cards: {0}")]
    InvalidCards(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
