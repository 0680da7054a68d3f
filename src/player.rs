use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::hand::Position;
use crate::stats::PlayerStatistics;

/// Fewer hands than this and every classification stays off.
pub const MIN_SAMPLE_HANDS: u32 = 20;

const TIGHT_VPIP: f64 = 20.0;
const LOOSE_VPIP: f64 = 35.0;
const AGGRESSIVE_AF: f64 = 2.5;
const PASSIVE_AF: f64 = 1.5;

// Coarser cut used for the four-way player type.
const TYPE_TIGHT_VPIP: f64 = 25.0;
const TYPE_AGGRESSIVE_AF: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerType {
    Tag,
    TightPassive,
    Lag,
    LoosePassive,
    Unknown,
}

impl PlayerType {
    pub fn label(self) -> &'static str {
        match self {
            PlayerType::Tag => "TAG (Tight Aggressive)",
            PlayerType::TightPassive => "TP (Tight Passive)",
            PlayerType::Lag => "LAG (Loose Aggressive)",
            PlayerType::LoosePassive => "LP (Loose Passive)",
            PlayerType::Unknown => "Unknown",
        }
    }
}

impl Display for PlayerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub seat: u8,
    #[serde(default)]
    pub stack: f64,
    #[serde(default)]
    pub is_hero: bool,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub stats: PlayerStatistics,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seat: 0,
            stack: 0.0,
            is_hero: false,
            position: None,
            stats: PlayerStatistics::default(),
            last_updated: None,
            notes: String::new(),
        }
    }

    /// Replaces the snapshot wholesale. Stats are always recomputed from the
    /// full history, never patched.
    pub fn update_stats(&mut self, stats: PlayerStatistics, at: DateTime<Utc>) {
        self.stats = stats;
        self.last_updated = Some(at);
    }

    fn has_sample(&self) -> bool {
        self.stats.hands >= MIN_SAMPLE_HANDS
    }

    pub fn is_tight(&self) -> bool {
        self.has_sample() && self.stats.vpip < TIGHT_VPIP
    }

    pub fn is_loose(&self) -> bool {
        self.has_sample() && self.stats.vpip > LOOSE_VPIP
    }

    pub fn is_aggressive(&self) -> bool {
        self.has_sample() && self.stats.af > AGGRESSIVE_AF
    }

    pub fn is_passive(&self) -> bool {
        self.has_sample() && self.stats.af < PASSIVE_AF
    }

    pub fn player_type(&self) -> PlayerType {
        if !self.has_sample() {
            return PlayerType::Unknown;
        }
        let tight = self.stats.vpip < TYPE_TIGHT_VPIP;
        let aggressive = self.stats.af > TYPE_AGGRESSIVE_AF;
        match (tight, aggressive) {
            (true, true) => PlayerType::Tag,
            (true, false) => PlayerType::TightPassive,
            (false, true) => PlayerType::Lag,
            (false, false) => PlayerType::LoosePassive,
        }
    }
}
