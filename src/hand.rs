use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay, skip_serializing_none};

use crate::action::{Action, ActionEntry, Street};
use crate::cards::{Card, join_cards, parse_cards};
use crate::error::TrackError;

/// Upper bound on the rendered action sequence inside a [`HandSummary`].
pub const SUMMARY_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub enum Position {
    Utg,
    Utg1,
    Utg2,
    Mp,
    Mp1,
    Hijack,
    Cutoff,
    Button,
    SmallBlind,
    BigBlind,
}

impl Position {
    pub fn label(self) -> &'static str {
        match self {
            Position::Utg => "UTG",
            Position::Utg1 => "UTG+1",
            Position::Utg2 => "UTG+2",
            Position::Mp => "MP",
            Position::Mp1 => "MP+1",
            Position::Hijack => "HJ",
            Position::Cutoff => "CO",
            Position::Button => "BTN",
            Position::SmallBlind => "SB",
            Position::BigBlind => "BB",
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UTG" => Ok(Position::Utg),
            "UTG+1" | "UTG1" => Ok(Position::Utg1),
            "UTG+2" | "UTG2" => Ok(Position::Utg2),
            "MP" => Ok(Position::Mp),
            "MP+1" | "MP1" => Ok(Position::Mp1),
            "HJ" => Ok(Position::Hijack),
            "CO" => Ok(Position::Cutoff),
            "BTN" | "BU" => Ok(Position::Button),
            "SB" => Ok(Position::SmallBlind),
            "BB" => Ok(Position::BigBlind),
            _ => Err(format!("Invalid position '{s}'")),
        }
    }
}

/// Record of one hand: metadata, the action log and, once closed, its result.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandRecord {
    pub hand_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub hero_cards: Vec<Card>,
    #[serde(default)]
    pub board: Vec<Card>,
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub player_positions: BTreeMap<String, Position>,
    #[serde(default)]
    pub hero_position: Option<Position>,
    #[serde(default)]
    pub small_blind: f64,
    #[serde(default)]
    pub big_blind: f64,
    #[serde(default)]
    pub actions: Vec<ActionEntry>,
    #[serde(default)]
    pub result_bb: f64,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub went_to_showdown: bool,
    #[serde(default)]
    pub ai_action: Option<String>,
    #[serde(default)]
    pub ai_reasoning: Option<String>,
    #[serde(default)]
    pub ai_confidence: Option<f64>,
}

/// Compact projection of a hand for model prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandSummary {
    pub hero_cards: String,
    pub board: String,
    pub position: Option<String>,
    pub result_bb: f64,
    pub action_summary: String,
}

/// Inbound hand finalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HandOutcome {
    pub result_bb: f64,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub went_to_showdown: bool,
}

impl HandRecord {
    pub fn new(hand_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            hand_id: hand_id.into(),
            session_id: None,
            timestamp,
            hero_cards: Vec::new(),
            board: Vec::new(),
            players: Vec::new(),
            player_positions: BTreeMap::new(),
            hero_position: None,
            small_blind: 0.0,
            big_blind: 0.0,
            actions: Vec::new(),
            result_bb: 0.0,
            winner: None,
            went_to_showdown: false,
            ai_action: None,
            ai_reasoning: None,
            ai_confidence: None,
        }
    }

    /// Registers a participant, keeping first-seen order.
    pub fn add_player(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.players.contains(&name) {
            self.players.push(name);
        }
    }

    pub fn seat_player(&mut self, name: impl Into<String>, position: Position) {
        let name = name.into();
        self.add_player(name.clone());
        self.player_positions.insert(name, position);
    }

    pub fn involves(&self, player: &str) -> bool {
        self.players.iter().any(|p| p == player)
    }

    pub fn position_of(&self, player: &str) -> Option<Position> {
        self.player_positions.get(player).copied()
    }

    pub fn set_hero_cards<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<(), TrackError> {
        let cards = parse_cards(tokens).map_err(TrackError::InvalidCards)?;
        if !(cards.is_empty() || cards.len() == 2) {
            return Err(TrackError::InvalidCards(format!(
                "expected 0 or 2 hole cards, got {}",
                cards.len()
            )));
        }
        if let Some(card) = cards.iter().find(|c| self.board.contains(c)) {
            return Err(TrackError::InvalidCards(format!("{card} is already on the board")));
        }
        self.hero_cards = cards;
        Ok(())
    }

    pub fn set_board<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<(), TrackError> {
        let cards = parse_cards(tokens).map_err(TrackError::InvalidCards)?;
        if cards.len() > 5 {
            return Err(TrackError::InvalidCards(format!(
                "a board holds at most 5 cards, got {}",
                cards.len()
            )));
        }
        if let Some(card) = cards.iter().find(|c| self.hero_cards.contains(c)) {
            return Err(TrackError::InvalidCards(format!("{card} is already in the hero's hand")));
        }
        self.board = cards;
        Ok(())
    }

    /// Appends an action in play order. The acting player is registered as a
    /// participant if they were not seen before.
    pub fn push_action(&mut self, action: Action) -> Result<(), TrackError> {
        if let Some(amount) = action.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(TrackError::InvalidAmount(amount));
            }
        }
        if let Some(last) = self.last_street() {
            if action.street < last {
                return Err(TrackError::StreetRegression {
                    last,
                    attempted: action.street,
                });
            }
        }
        self.add_player(action.player.clone());
        self.actions.push(ActionEntry::Valid(action));
        Ok(())
    }

    /// Well-formed actions in play order. Every statistic scans through this.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter_map(ActionEntry::action)
    }

    pub fn preflop_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions()
            .take_while(|action| action.street == Street::Preflop)
    }

    pub fn actions_on(&self, street: Street) -> impl Iterator<Item = &Action> {
        self.actions().filter(move |action| action.street == street)
    }

    pub fn last_street(&self) -> Option<Street> {
        self.actions().last().map(|action| action.street)
    }

    pub fn attach_ai_decision(
        &mut self,
        action: impl Into<String>,
        reasoning: impl Into<String>,
        confidence: f64,
    ) {
        self.ai_action = Some(action.into());
        self.ai_reasoning = Some(reasoning.into());
        self.ai_confidence = Some(if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        });
    }

    /// `player: kind [amount] -> ...` for every well-formed action.
    pub fn action_sequence(&self) -> String {
        self.actions()
            .map(|action| match action.amount.filter(|amount| *amount != 0.0) {
                Some(amount) => format!("{}: {} {}", action.player, action.action_type, amount),
                None => format!("{}: {}", action.player, action.action_type),
            })
            .join(" -> ")
    }

    pub fn summary(&self) -> HandSummary {
        HandSummary {
            hero_cards: join_cards(&self.hero_cards),
            board: if self.board.is_empty() {
                "No board".to_string()
            } else {
                join_cards(&self.board)
            },
            position: self.hero_position.map(|p| p.to_string()),
            result_bb: self.result_bb,
            action_summary: truncate_chars(&self.action_sequence(), SUMMARY_MAX_CHARS),
        }
    }
}

/// Cuts `text` to at most `max` characters, never inside a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
