pub mod action;
pub mod cards;
pub mod clock;
pub mod config;
pub mod error;
pub mod hand;
pub mod history;
pub mod ids;
pub mod player;
pub mod report;
pub mod session;
pub mod stats;
pub mod web;

pub use action::{Action, ActionEntry, ActionEvent, ActionKind, Street};
pub use error::TrackError;
pub use hand::{HandOutcome, HandRecord, HandSummary, Position};
pub use history::{HandHistory, SharedHistory};
pub use player::{Player, PlayerType};
pub use report::{Report, ReportOptions};
pub use session::{Session, SessionManager, SessionSummary, TotalStats};
pub use stats::{PlayerStatistics, StatsCalculator, calculate_stats};
