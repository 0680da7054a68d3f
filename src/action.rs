use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay, skip_serializing_none};

use crate::error::TrackError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    pub fn as_str(self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        }
    }
}

impl Display for Street {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Street {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preflop" => Ok(Street::Preflop),
            "flop" => Ok(Street::Flop),
            "turn" => Ok(Street::Turn),
            "river" => Ok(Street::River),
            _ => Err(format!("Invalid street '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Bet => "bet",
            ActionKind::Raise => "raise",
        }
    }

    /// Money went in by choice: calls, bets and raises.
    pub fn is_voluntary(self) -> bool {
        matches!(self, ActionKind::Call | ActionKind::Bet | ActionKind::Raise)
    }

    pub fn is_aggressive(self) -> bool {
        matches!(self, ActionKind::Bet | ActionKind::Raise)
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(ActionKind::Fold),
            "check" => Ok(ActionKind::Check),
            "call" => Ok(ActionKind::Call),
            "bet" => Ok(ActionKind::Bet),
            "raise" => Ok(ActionKind::Raise),
            _ => Err(format!("Invalid action '{s}'")),
        }
    }
}

/// One player decision on one street.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    pub player: String,
    pub action_type: ActionKind,
    #[serde(default)]
    pub amount: Option<f64>,
    pub street: Street,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Action {
    pub fn new(player: impl Into<String>, action_type: ActionKind, street: Street) -> Self {
        Self {
            player: player.into(),
            action_type,
            amount: None,
            street,
            timestamp: None,
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn is_by(&self, player: &str) -> bool {
        self.player == player
    }
}

/// An action slot in a stored hand.
///
/// Imported records can carry actions with missing keys or unknown
/// tokens. Those are kept verbatim so a load/save cycle is lossless, and
/// the statistics scans simply never see them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ActionEntry {
    Valid(Action),
    Malformed(serde_json::Value),
}

impl ActionEntry {
    pub fn action(&self) -> Option<&Action> {
        match self {
            ActionEntry::Valid(action) => Some(action),
            ActionEntry::Malformed(_) => None,
        }
    }
}

impl From<Action> for ActionEntry {
    fn from(action: Action) -> Self {
        ActionEntry::Valid(action)
    }
}

/// Inbound action event as posted by the automation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionEvent {
    pub player: String,
    pub action_type: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default = "default_street_token")]
    pub street: String,
}

fn default_street_token() -> String {
    Street::Preflop.as_str().to_string()
}

impl TryFrom<ActionEvent> for Action {
    type Error = TrackError;

    fn try_from(event: ActionEvent) -> Result<Self, Self::Error> {
        if event.player.trim().is_empty() {
            return Err(TrackError::MalformedAction("missing player".to_string()));
        }
        let action_type = event
            .action_type
            .parse::<ActionKind>()
            .map_err(TrackError::MalformedAction)?;
        let street = event
            .street
            .parse::<Street>()
            .map_err(TrackError::MalformedAction)?;
        Ok(Action {
            player: event.player,
            action_type,
            amount: event.amount,
            street,
            timestamp: None,
        })
    }
}
