use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::action::{Action, ActionEvent, ActionKind, Street};
use crate::clock::{Clock, SystemClock};
use crate::error::TrackError;
use crate::hand::{HandOutcome, HandRecord, HandSummary};
use crate::ids::{IdSource, UuidIds};

pub const DEFAULT_MAX_HANDS: usize = 1000;

/// Closed hands of one session plus the hand currently being played.
///
/// Only closed hands take part in counts, profit and summaries. Once the
/// configured capacity is exceeded the oldest hands are evicted first.
pub struct HandHistory {
    hands: VecDeque<HandRecord>,
    max_hands: usize,
    current: Option<HandRecord>,
    ids: Arc<dyn IdSource>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for HandHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandHistory")
            .field("hands", &self.hands.len())
            .field("max_hands", &self.max_hands)
            .field("current", &self.current.as_ref().map(|h| &h.hand_id))
            .finish()
    }
}

impl Default for HandHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_HANDS)
    }
}

impl HandHistory {
    /// # Panics
    ///
    /// Panics if `max_hands` is zero.
    pub fn with_capacity(max_hands: usize) -> Self {
        Self::with_sources(max_hands, Arc::new(UuidIds), Arc::new(SystemClock))
    }

    pub fn with_sources(max_hands: usize, ids: Arc<dyn IdSource>, clock: Arc<dyn Clock>) -> Self {
        assert!(max_hands > 0, "hand history capacity must be positive");
        Self {
            hands: VecDeque::with_capacity(max_hands.min(DEFAULT_MAX_HANDS)),
            max_hands,
            current: None,
            ids,
            clock,
        }
    }

    pub fn max_hands(&self) -> usize {
        self.max_hands
    }

    /// Opens a fresh hand. An unfinished hand is dropped: automation can miss
    /// a hand boundary and the half-seen hand is not worth keeping.
    pub fn start_new_hand(&mut self, session_id: Option<&str>) -> &mut HandRecord {
        let hand = self.fresh_hand(session_id);
        self.install(hand)
    }

    /// Like [`HandHistory::start_new_hand`], but `prepare` fills in the new
    /// record first. If it fails, the hand already in progress is kept.
    pub fn open_hand<F>(
        &mut self,
        session_id: Option<&str>,
        prepare: F,
    ) -> Result<&mut HandRecord, TrackError>
    where
        F: FnOnce(&mut HandRecord) -> Result<(), TrackError>,
    {
        let mut hand = self.fresh_hand(session_id);
        prepare(&mut hand).inspect_err(|err| {
            warn!(%err, "rejected new hand, keeping the open one");
        })?;
        Ok(self.install(hand))
    }

    fn fresh_hand(&self, session_id: Option<&str>) -> HandRecord {
        let mut hand = HandRecord::new(self.ids.next_id(), self.clock.now());
        hand.session_id = session_id.map(str::to_string);
        hand
    }

    fn install(&mut self, hand: HandRecord) -> &mut HandRecord {
        if let Some(stale) = self.current.take() {
            warn!(
                hand_id = %stale.hand_id,
                actions = stale.actions.len(),
                "discarding unfinished hand"
            );
        }
        self.current.insert(hand)
    }

    pub fn current_hand(&self) -> Option<&HandRecord> {
        self.current.as_ref()
    }

    pub fn current_hand_mut(&mut self) -> Option<&mut HandRecord> {
        self.current.as_mut()
    }

    pub fn add_action(
        &mut self,
        player: &str,
        kind: ActionKind,
        amount: Option<f64>,
        street: Street,
    ) -> Result<(), TrackError> {
        let mut action = Action::new(player, kind, street).at(self.clock.now());
        action.amount = amount;
        self.append(action)
    }

    pub fn add_event(&mut self, event: ActionEvent) -> Result<(), TrackError> {
        let action = Action::try_from(event)?.at(self.clock.now());
        self.append(action)
    }

    fn append(&mut self, action: Action) -> Result<(), TrackError> {
        let hand = self.current.as_mut().ok_or(TrackError::NoOpenHand)?;
        hand.push_action(action).inspect_err(|err| {
            warn!(hand_id = %hand.hand_id, %err, "rejected action");
        })
    }

    /// Closes the open hand and archives it.
    pub fn end_hand(
        &mut self,
        result_bb: f64,
        winner: Option<&str>,
    ) -> Result<&HandRecord, TrackError> {
        let mut hand = self.current.take().ok_or(TrackError::NoOpenHand)?;
        hand.result_bb = result_bb;
        hand.winner = winner.map(str::to_string);
        debug!(
            hand_id = %hand.hand_id,
            result_bb,
            showdown = hand.went_to_showdown,
            "hand finished"
        );
        self.archive(hand);
        self.hands.back().ok_or(TrackError::NoOpenHand)
    }

    pub fn finish_hand(&mut self, outcome: HandOutcome) -> Result<&HandRecord, TrackError> {
        let hand = self.current.as_mut().ok_or(TrackError::NoOpenHand)?;
        hand.went_to_showdown = outcome.went_to_showdown;
        self.end_hand(outcome.result_bb, outcome.winner.as_deref())
    }

    fn archive(&mut self, hand: HandRecord) {
        self.hands.push_back(hand);
        while self.hands.len() > self.max_hands {
            self.hands.pop_front();
        }
    }

    pub fn hands(&self) -> impl ExactSizeIterator<Item = &HandRecord> + DoubleEndedIterator {
        self.hands.iter()
    }

    pub fn hands_count(&self) -> usize {
        self.hands.len()
    }

    pub fn total_profit_bb(&self) -> f64 {
        self.hands.iter().map(|hand| hand.result_bb).sum()
    }

    /// The last `count` closed hands, oldest first.
    pub fn recent_hands(&self, count: usize) -> Vec<&HandRecord> {
        let skip = self.hands.len().saturating_sub(count);
        self.hands.iter().skip(skip).collect()
    }

    pub fn hands_by_player(&self, player: &str) -> Vec<&HandRecord> {
        self.hands.iter().filter(|hand| hand.involves(player)).collect()
    }

    pub fn summaries(&self, count: usize) -> Vec<HandSummary> {
        self.recent_hands(count)
            .into_iter()
            .map(HandRecord::summary)
            .collect()
    }

    pub fn clear(&mut self) {
        self.hands.clear();
        self.current = None;
    }

    /// Owned copies of the closed hands for an export collaborator.
    pub fn to_records(&self) -> Vec<HandRecord> {
        self.hands.iter().cloned().collect()
    }

    /// Replaces the closed hands with `records`, keeping the newest ones
    /// when there are more than the capacity allows.
    pub fn load_records(&mut self, records: Vec<HandRecord>) {
        self.hands.clear();
        for record in records {
            self.archive(record);
        }
    }
}

/// Cloneable handle to a [`HandHistory`] guarded by a single lock.
///
/// The automation layer writes through one handle while readers compute
/// statistics through another.
#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<HandHistory>>,
}

impl SharedHistory {
    pub fn new(history: HandHistory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(history)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, HandHistory> {
        self.inner.lock()
    }

    /// Runs `f` with the lock held.
    pub fn with<T>(&self, f: impl FnOnce(&mut HandHistory) -> T) -> T {
        f(&mut self.inner.lock())
    }

    pub fn hands_count(&self) -> usize {
        self.lock().hands_count()
    }

    pub fn total_profit_bb(&self) -> f64 {
        self.lock().total_profit_bb()
    }

    pub fn snapshot(&self) -> Vec<HandRecord> {
        self.lock().to_records()
    }
}

impl Default for SharedHistory {
    fn default() -> Self {
        Self::new(HandHistory::default())
    }
}
