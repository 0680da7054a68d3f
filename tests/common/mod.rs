#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use poker_scout::action::{Action, ActionKind, Street};
use poker_scout::hand::HandRecord;

pub use ActionKind::{Bet, Call, Check, Fold, Raise};
pub use Street::{Flop, Preflop, River, Turn};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}

/// Builds a closed hand with the given participants and action log.
pub fn hand(id: &str, players: &[&str], actions: &[(&str, ActionKind, Street)]) -> HandRecord {
    let mut record = HandRecord::new(id, t0());
    for player in players {
        record.add_player(*player);
    }
    for (player, kind, street) in actions {
        record
            .push_action(Action::new(*player, *kind, *street))
            .expect("actions are in street order");
    }
    record
}

pub fn showdown(mut record: HandRecord, winner: &str) -> HandRecord {
    record.went_to_showdown = true;
    record.winner = Some(winner.to_string());
    record
}
