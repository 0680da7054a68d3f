use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::error::TrackError;
use crate::hand::HandRecord;
use crate::history::{HandHistory, SharedHistory};
use crate::ids::{IdSource, UuidIds};
use crate::stats::count_u32;

/// One sitting at the table. Totals are frozen when the session ends.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hands_played: u32,
    #[serde(default)]
    pub profit_bb: f64,
    #[serde(default)]
    pub notes: String,
}

impl Session {
    pub fn new(session_id: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            start_time,
            end_time: None,
            hands_played: 0,
            profit_bb: 0.0,
            notes: String::new(),
        }
    }

    /// Minutes from start to end, or to `now` while the session is open.
    pub fn duration_minutes_at(&self, now: DateTime<Utc>) -> f64 {
        let end = self.end_time.unwrap_or(now);
        let millis = (end - self.start_time).num_milliseconds().max(0);
        millis as f64 / 60_000.0
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_minutes_at(Utc::now())
    }

    /// Zero for sessions shorter than a minute.
    pub fn hands_per_hour_at(&self, now: DateTime<Utc>) -> f64 {
        hands_per_hour(self.hands_played, self.duration_minutes_at(now))
    }

    pub fn hands_per_hour(&self) -> f64 {
        self.hands_per_hour_at(Utc::now())
    }

    pub fn bb_per_100(&self) -> f64 {
        bb_per_100(self.profit_bb, self.hands_played)
    }
}

fn hands_per_hour(hands: u32, minutes: f64) -> f64 {
    if minutes < 1.0 {
        0.0
    } else {
        f64::from(hands) * 60.0 / minutes
    }
}

fn bb_per_100(profit_bb: f64, hands: u32) -> f64 {
    if hands == 0 {
        0.0
    } else {
        profit_bb * 100.0 / f64::from(hands)
    }
}

/// Outbound session summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub duration_minutes: f64,
    pub hands_played: u32,
    pub profit_bb: f64,
    pub bb_per_100: f64,
    pub hands_per_hour: f64,
}

impl SessionSummary {
    fn at(session: &Session, hands_played: u32, profit_bb: f64, now: DateTime<Utc>) -> Self {
        let duration_minutes = session.duration_minutes_at(now);
        Self {
            session_id: session.session_id.clone(),
            duration_minutes,
            hands_played,
            profit_bb,
            bb_per_100: bb_per_100(profit_bb, hands_played),
            hands_per_hour: hands_per_hour(hands_played, duration_minutes),
        }
    }
}

/// Aggregate over every recorded session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TotalStats {
    pub total_sessions: usize,
    pub total_hands: u64,
    pub total_profit_bb: f64,
    pub total_hours: f64,
    pub bb_per_100: f64,
    pub hands_per_hour: f64,
}

/// Owns the active session, its hand history and the list of past sessions.
pub struct SessionManager {
    config: TrackerConfig,
    ids: Arc<dyn IdSource>,
    clock: Arc<dyn Clock>,
    current: Option<Session>,
    history: Option<SharedHistory>,
    sessions: Vec<Session>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("current", &self.current)
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl SessionManager {
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_sources(config, Arc::new(UuidIds), Arc::new(SystemClock))
    }

    pub fn with_sources(
        config: TrackerConfig,
        ids: Arc<dyn IdSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            ids,
            clock,
            current: None,
            history: None,
            sessions: Vec::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Seeds the list of past sessions, e.g. from an importer.
    pub fn load_sessions(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
    }

    pub fn start_session(&mut self, notes: &str) -> &Session {
        if let Some(active) = &self.current {
            warn!(session_id = %active.session_id, "session still active, ending it first");
            self.end_session();
        }
        let mut session = Session::new(self.ids.next_id(), self.clock.now());
        session.notes = notes.to_string();
        info!(session_id = %session.session_id, "session started");

        let history = HandHistory::with_sources(
            self.config.max_hands,
            self.ids.clone(),
            self.clock.clone(),
        );
        self.history = Some(SharedHistory::new(history));
        self.current.insert(session)
    }

    /// Closes the active session, freezing its totals from the hand history.
    pub fn end_session(&mut self) -> Option<Session> {
        let mut session = self.current.take()?;
        session.end_time = Some(self.clock.now());
        if let Some(history) = self.history.take() {
            let history = history.lock();
            if let Some(open) = history.current_hand() {
                warn!(
                    hand_id = %open.hand_id,
                    actions = open.actions.len(),
                    "discarding unfinished hand at session end"
                );
            }
            session.hands_played = count_u32(history.hands_count());
            session.profit_bb = history.total_profit_bb();
        }
        info!(
            session_id = %session.session_id,
            hands = session.hands_played,
            profit_bb = session.profit_bb,
            "session ended"
        );
        self.sessions.push(session.clone());
        Some(session)
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_session_active(&self) -> bool {
        self.current.is_some()
    }

    /// Handle to the active session's hand history.
    pub fn hand_history(&self) -> Option<SharedHistory> {
        self.history.clone()
    }

    pub fn record_hand_result(
        &self,
        result_bb: f64,
        winner: Option<&str>,
    ) -> Result<HandRecord, TrackError> {
        let history = self.history.as_ref().ok_or(TrackError::NoOpenHand)?;
        history.with(|history| history.end_hand(result_bb, winner).cloned())
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn recent_sessions(&self, count: usize) -> &[Session] {
        let skip = self.sessions.len().saturating_sub(count);
        &self.sessions[skip..]
    }

    pub fn session_by_id(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.session_id == session_id)
    }

    /// Live summary of the active session from the current hand history.
    pub fn current_summary(&self) -> Option<SessionSummary> {
        let session = self.current.as_ref()?;
        let (hands, profit) = self
            .history
            .as_ref()
            .map(|history| {
                let history = history.lock();
                (count_u32(history.hands_count()), history.total_profit_bb())
            })
            .unwrap_or((0, 0.0));
        Some(SessionSummary::at(session, hands, profit, self.clock.now()))
    }

    pub fn summarize(&self, session: &Session) -> SessionSummary {
        SessionSummary::at(
            session,
            session.hands_played,
            session.profit_bb,
            self.clock.now(),
        )
    }

    pub fn total_stats(&self) -> TotalStats {
        if self.sessions.is_empty() {
            return TotalStats::default();
        }
        let now = self.clock.now();
        let total_hands: u64 = self.sessions.iter().map(|s| u64::from(s.hands_played)).sum();
        let total_profit_bb: f64 = self.sessions.iter().map(|s| s.profit_bb).sum();
        let total_minutes: f64 = self
            .sessions
            .iter()
            .map(|s| s.duration_minutes_at(now))
            .sum();
        let total_hours = total_minutes / 60.0;

        TotalStats {
            total_sessions: self.sessions.len(),
            total_hands,
            total_profit_bb,
            total_hours,
            bb_per_100: if total_hands > 0 {
                total_profit_bb * 100.0 / total_hands as f64
            } else {
                0.0
            },
            hands_per_hour: if total_hours > 0.0 {
                total_hands as f64 / total_hours
            } else {
                0.0
            },
        }
    }
}
