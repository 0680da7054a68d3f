//! Opponent statistics computed from closed hand records.
//!
//! Each statistic is an independent per-hand scan that counts
//! opportunities and occurrences and stops at the first decision point
//! that settles the hand. A hand contributes at most one occurrence to
//! any percentage stat.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::action::{ActionKind, Street};
use crate::hand::{HandRecord, Position};
use crate::player::Player;

/// Snapshot of a player's tracked statistics.
///
/// Percentages are in `[0, 100]`; `af` is a plain ratio.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerStatistics {
    pub hands: u32,
    pub vpip: f64,
    pub pfr: f64,
    pub three_bet: f64,
    pub fold_to_3bet: f64,
    pub af: f64,
    pub wtsd: f64,
    pub wssd: f64,
    pub cbet: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_position: BTreeMap<Position, PositionStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PositionStats {
    pub hands: u32,
    pub vpip: f64,
    pub pfr: f64,
    pub af: f64,
}

impl PlayerStatistics {
    /// One-line rendering rounded to one decimal.
    pub fn display_line(&self) -> String {
        format!(
            "hands {} | VPIP {:.1} | PFR {:.1} | 3B {:.1} | F3B {:.1} | AF {:.1} | WTSD {:.1} | W$SD {:.1} | CB {:.1}",
            self.hands,
            self.vpip,
            self.pfr,
            self.three_bet,
            self.fold_to_3bet,
            self.af,
            self.wtsd,
            self.wssd,
            self.cbet
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    opportunities: u32,
    occurrences: u32,
}

impl Tally {
    fn record(&mut self, occurred: bool) {
        self.opportunities += 1;
        if occurred {
            self.occurrences += 1;
        }
    }

    fn percent(self) -> f64 {
        if self.opportunities == 0 {
            0.0
        } else {
            f64::from(self.occurrences) * 100.0 / f64::from(self.opportunities)
        }
    }
}

/// Computes statistics for `player` over `hands`.
///
/// Hands that do not list the player are ignored.
pub fn calculate_stats<'a, I>(player: &str, hands: I) -> PlayerStatistics
where
    I: IntoIterator<Item = &'a HandRecord>,
{
    let hands: Vec<&HandRecord> = hands
        .into_iter()
        .filter(|hand| hand.involves(player))
        .collect();
    if hands.is_empty() {
        return PlayerStatistics::default();
    }

    PlayerStatistics {
        hands: count_u32(hands.len()),
        vpip: vpip(player, &hands),
        pfr: pfr(player, &hands),
        three_bet: three_bet(player, &hands),
        fold_to_3bet: fold_to_three_bet(player, &hands),
        af: aggression_factor(player, &hands),
        wtsd: went_to_showdown(player, &hands),
        wssd: won_at_showdown(player, &hands),
        cbet: continuation_bet(player, &hands),
        by_position: positional_stats(player, &hands),
    }
}

/// Voluntarily put money in pot: the player's first preflop decision was a
/// call, bet or raise. Blinds are never recorded as actions.
pub fn vpip(player: &str, hands: &[&HandRecord]) -> f64 {
    let mut tally = Tally::default();
    for hand in hands {
        let first = hand.preflop_actions().find(|action| action.is_by(player));
        tally.record(first.is_some_and(|action| action.action_type.is_voluntary()));
    }
    tally.percent()
}

pub fn pfr(player: &str, hands: &[&HandRecord]) -> f64 {
    let mut tally = Tally::default();
    for hand in hands {
        tally.record(
            hand.preflop_actions()
                .any(|action| action.is_by(player) && action.action_type == ActionKind::Raise),
        );
    }
    tally.percent()
}

/// Re-raise rate when the player's first preflop decision faces a raise.
///
/// Only that first decision counts: a player who limps or opens and later
/// re-raises has not had a 3-bet opportunity in this hand. Any number of
/// earlier raisers makes it an opportunity.
pub fn three_bet(player: &str, hands: &[&HandRecord]) -> f64 {
    let mut tally = Tally::default();
    for hand in hands {
        let mut raise_seen = false;
        for action in hand.preflop_actions() {
            if action.is_by(player) {
                if raise_seen {
                    tally.record(action.action_type == ActionKind::Raise);
                }
                break;
            }
            if action.action_type == ActionKind::Raise {
                raise_seen = true;
            }
        }
    }
    tally.percent()
}

/// Fold rate of the opening raiser when re-raised before acting again.
pub fn fold_to_three_bet(player: &str, hands: &[&HandRecord]) -> f64 {
    let mut tally = Tally::default();
    for hand in hands {
        let mut opened = false;
        let mut facing_raise = false;
        for action in hand.preflop_actions() {
            if !opened {
                if action.action_type == ActionKind::Raise {
                    if !action.is_by(player) {
                        break;
                    }
                    opened = true;
                }
                continue;
            }
            if action.is_by(player) {
                if facing_raise {
                    tally.record(action.action_type == ActionKind::Fold);
                }
                break;
            }
            if action.action_type == ActionKind::Raise {
                facing_raise = true;
            }
        }
    }
    tally.percent()
}

/// (bets + raises) / calls across every street. With no calls the raw
/// aggressive count is returned.
pub fn aggression_factor(player: &str, hands: &[&HandRecord]) -> f64 {
    let mut aggressive = 0u32;
    let mut calls = 0u32;
    for hand in hands {
        for action in hand.actions().filter(|action| action.is_by(player)) {
            match action.action_type {
                ActionKind::Bet | ActionKind::Raise => aggressive += 1,
                ActionKind::Call => calls += 1,
                ActionKind::Fold | ActionKind::Check => {}
            }
        }
    }
    if calls == 0 {
        f64::from(aggressive)
    } else {
        f64::from(aggressive) / f64::from(calls)
    }
}

pub fn went_to_showdown(player: &str, hands: &[&HandRecord]) -> f64 {
    let mut tally = Tally::default();
    for hand in hands {
        let saw_flop = hand
            .actions_on(Street::Flop)
            .any(|action| action.is_by(player));
        if saw_flop {
            tally.record(hand.went_to_showdown && hand.involves(player));
        }
    }
    tally.percent()
}

pub fn won_at_showdown(player: &str, hands: &[&HandRecord]) -> f64 {
    let mut tally = Tally::default();
    for hand in hands {
        if hand.went_to_showdown && hand.involves(player) {
            tally.record(hand.winner.as_deref() == Some(player));
        }
    }
    tally.percent()
}

/// Flop bet or raise by the player who was the only preflop raiser.
pub fn continuation_bet(player: &str, hands: &[&HandRecord]) -> f64 {
    let mut tally = Tally::default();
    for hand in hands {
        let mut raised = false;
        let mut sole_raiser = true;
        for action in hand.preflop_actions() {
            if action.action_type == ActionKind::Raise {
                if action.is_by(player) {
                    raised = true;
                } else {
                    sole_raiser = false;
                    break;
                }
            }
        }
        if !(raised && sole_raiser) {
            continue;
        }
        if let Some(action) = hand
            .actions_on(Street::Flop)
            .find(|action| action.is_by(player))
        {
            tally.record(action.action_type.is_aggressive());
        }
    }
    tally.percent()
}

/// VPIP, PFR and AF split by the seat the player held in each hand.
/// Hands without a recorded position for the player are left out.
pub fn positional_stats(player: &str, hands: &[&HandRecord]) -> BTreeMap<Position, PositionStats> {
    let mut grouped: BTreeMap<Position, Vec<&HandRecord>> = BTreeMap::new();
    for hand in hands {
        if let Some(position) = hand.position_of(player) {
            grouped.entry(position).or_default().push(*hand);
        }
    }
    grouped
        .into_iter()
        .map(|(position, hands)| {
            let stats = PositionStats {
                hands: count_u32(hands.len()),
                vpip: vpip(player, &hands),
                pfr: pfr(player, &hands),
                af: aggression_factor(player, &hands),
            };
            (position, stats)
        })
        .collect()
}

/// Memoising front end over [`calculate_stats`].
///
/// Holds at most one snapshot per player, tagged with a fingerprint of the
/// hand set it was computed from. A changed history replaces the entry
/// rather than adding one. Names that appear in no hand are never cached.
/// [`StatsCalculator::recalculate`] always rescans.
#[derive(Debug, Default)]
pub struct StatsCalculator {
    cache: Mutex<HashMap<String, (u64, PlayerStatistics)>>,
}

impl StatsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calculate_stats(&self, player: &str, hands: &[HandRecord]) -> PlayerStatistics {
        let print = fingerprint(hands);
        if let Some((cached_print, stats)) = self.cache.lock().get(player) {
            if *cached_print == print {
                return stats.clone();
            }
        }
        self.store(player, print, calculate_stats(player, hands))
    }

    pub fn recalculate(&self, player: &str, hands: &[HandRecord]) -> PlayerStatistics {
        self.store(player, fingerprint(hands), calculate_stats(player, hands))
    }

    fn store(&self, player: &str, print: u64, stats: PlayerStatistics) -> PlayerStatistics {
        let mut cache = self.cache.lock();
        if stats.hands == 0 {
            cache.remove(player);
        } else {
            cache.insert(player.to_string(), (print, stats.clone()));
        }
        stats
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn update_player_stats(&self, player: &mut Player, hands: &[HandRecord]) {
        let stats = self.recalculate(&player.name, hands);
        player.update_stats(stats, chrono::Utc::now());
    }

    /// Statistics for each named player, keyed by name.
    pub fn snapshot<S: AsRef<str>>(
        &self,
        players: &[S],
        hands: &[HandRecord],
    ) -> BTreeMap<String, PlayerStatistics> {
        players
            .iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), self.calculate_stats(name, hands))
            })
            .collect()
    }
}

/// Saturates instead of wrapping on absurdly large hand sets.
pub(crate) fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn fingerprint(hands: &[HandRecord]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hands.len().hash(&mut hasher);
    for hand in hands {
        hand.hand_id.hash(&mut hasher);
        hand.actions.len().hash(&mut hasher);
        for action in hand.actions() {
            action.player.hash(&mut hasher);
            action.action_type.hash(&mut hasher);
            action.street.hash(&mut hasher);
        }
        hand.players.len().hash(&mut hasher);
        hand.result_bb.to_bits().hash(&mut hasher);
        hand.went_to_showdown.hash(&mut hasher);
        hand.winner.hash(&mut hasher);
    }
    hasher.finish()
}
