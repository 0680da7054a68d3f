use itertools::Itertools;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::hand::HandRecord;
use crate::player::Player;
use crate::stats::StatsCalculator;

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Players to include; empty means every participant seen.
    pub players: Vec<String>,
    pub hero_name: String,
}

/// Offline statistics over a batch of exported hands.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub hands: usize,
    pub total_profit_bb: f64,
    pub players: Vec<Player>,
}

impl Report {
    pub fn build(records: Vec<HandRecord>, options: &ReportOptions) -> Self {
        let names: Vec<String> = if options.players.is_empty() {
            records
                .iter()
                .flat_map(|hand| hand.players.iter().cloned())
                .unique()
                .collect()
        } else {
            options.players.clone()
        };

        let calculator = StatsCalculator::new();
        let players = names
            .into_iter()
            .map(|name| {
                let mut player = Player::new(name);
                player.is_hero = player.name == options.hero_name;
                calculator.update_player_stats(&mut player, &records);
                player
            })
            .sorted_by(|a, b| {
                b.stats
                    .hands
                    .cmp(&a.stats.hands)
                    .then_with(|| a.name.cmp(&b.name))
            })
            .collect();

        Self {
            hands: records.len(),
            total_profit_bb: records.iter().map(|hand| hand.result_bb).sum(),
            players,
        }
    }

    pub fn print(&self, no_color: bool) {
        for player in &self.players {
            let marker = if player.is_hero { "*" } else { " " };
            let kind = player.player_type();
            if no_color {
                println!(
                    "{marker}{:<16} {:<24} {}",
                    player.name,
                    kind.label(),
                    player.stats.display_line()
                );
            } else {
                println!(
                    "{marker}{:<16} {:<24} {}",
                    player.name.bold().cyan(),
                    kind.label().yellow(),
                    player.stats.display_line()
                );
            }
        }

        if no_color {
            println!(
                "Summary: hands={}, profit={:.2}bb",
                self.hands, self.total_profit_bb
            );
        } else {
            println!(
                "{} {} {} {:.2}bb",
                "Summary".bold().magenta(),
                self.hands,
                "Profit".bold().white(),
                self.total_profit_bb
            );
        }
    }
}
