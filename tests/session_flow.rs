mod common;

use std::sync::Arc;

use chrono::Duration;
use common::t0;
use poker_scout::action::{ActionKind, Street};
use poker_scout::clock::ManualClock;
use poker_scout::config::TrackerConfig;
use poker_scout::error::TrackError;
use poker_scout::ids::SequentialIds;
use poker_scout::session::{Session, SessionManager, TotalStats};

fn manager() -> (SessionManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let manager = SessionManager::with_sources(
        TrackerConfig::default(),
        Arc::new(SequentialIds::new("id")),
        clock.clone(),
    );
    (manager, clock)
}

fn play_hand(manager: &SessionManager, result_bb: f64) {
    let history = manager.hand_history().expect("session active");
    let session_id = manager.current_session().map(|s| s.session_id.clone());
    let mut history = history.lock();
    history.start_new_hand(session_id.as_deref());
    history
        .add_action("Hero", ActionKind::Raise, Some(2.5), Street::Preflop)
        .unwrap();
    drop(history);
    manager.record_hand_result(result_bb, None).unwrap();
}

#[test]
fn ending_a_session_freezes_hand_totals() {
    let (mut manager, clock) = manager();
    let started = manager.start_session("evening grind").clone();
    assert_eq!(started.start_time, t0());
    assert_eq!(started.hands_played, 0);

    play_hand(&manager, 10.0);
    play_hand(&manager, -4.0);
    clock.advance(Duration::minutes(30));

    let session = manager.end_session().expect("session was active");
    assert_eq!(session.hands_played, 2);
    assert_eq!(session.profit_bb, 6.0);
    assert_eq!(session.bb_per_100(), 300.0);
    assert_eq!(session.end_time, Some(t0() + Duration::minutes(30)));
    assert_eq!(session.duration_minutes(), 30.0);
    assert_eq!(session.hands_per_hour(), 4.0);
    assert_eq!(session.notes, "evening grind");

    assert!(!manager.is_session_active());
    assert!(manager.hand_history().is_none());
    assert_eq!(manager.sessions(), [session]);
}

#[test]
fn hands_are_stamped_with_the_session_id() {
    let (mut manager, _clock) = manager();
    let session_id = manager.start_session("").session_id.clone();
    play_hand(&manager, 1.0);

    let history = manager.hand_history().unwrap();
    let records = history.snapshot();
    assert_eq!(records[0].session_id.as_deref(), Some(session_id.as_str()));
}

#[test]
fn live_summary_reads_the_open_history() {
    let (mut manager, clock) = manager();
    assert!(manager.current_summary().is_none());

    manager.start_session("");
    play_hand(&manager, 5.0);
    play_hand(&manager, 5.0);
    play_hand(&manager, -1.0);
    clock.advance(Duration::minutes(90));

    let summary = manager.current_summary().unwrap();
    assert_eq!(summary.hands_played, 3);
    assert_eq!(summary.profit_bb, 9.0);
    assert_eq!(summary.bb_per_100, 300.0);
    assert_eq!(summary.duration_minutes, 90.0);
    assert_eq!(summary.hands_per_hour, 2.0);
}

#[test]
fn short_sessions_report_no_hourly_rate() {
    let (mut manager, clock) = manager();
    manager.start_session("");
    play_hand(&manager, 1.0);
    clock.advance(Duration::seconds(30));
    let session = manager.end_session().unwrap();

    assert_eq!(session.hands_per_hour(), 0.0);
    assert_eq!(session.bb_per_100(), 100.0);
}

#[test]
fn totals_roll_up_every_session() {
    let (mut manager, clock) = manager();
    assert_eq!(manager.total_stats(), TotalStats::default());

    manager.start_session("first");
    play_hand(&manager, 10.0);
    play_hand(&manager, -4.0);
    clock.advance(Duration::minutes(30));
    manager.end_session();

    manager.start_session("second");
    play_hand(&manager, -1.0);
    play_hand(&manager, -1.0);
    play_hand(&manager, -1.0);
    clock.advance(Duration::minutes(30));
    manager.end_session();

    let totals = manager.total_stats();
    assert_eq!(totals.total_sessions, 2);
    assert_eq!(totals.total_hands, 5);
    assert_eq!(totals.total_profit_bb, 3.0);
    assert_eq!(totals.total_hours, 1.0);
    assert_eq!(totals.bb_per_100, 60.0);
    assert_eq!(totals.hands_per_hour, 5.0);
}

#[test]
fn totals_guard_against_empty_sessions() {
    let (mut manager, _clock) = manager();
    manager.start_session("");
    manager.end_session();

    let totals = manager.total_stats();
    assert_eq!(totals.total_sessions, 1);
    assert_eq!(totals.total_hands, 0);
    assert_eq!(totals.bb_per_100, 0.0);
    assert_eq!(totals.hands_per_hour, 0.0);
}

#[test]
fn starting_over_an_active_session_closes_it() {
    let (mut manager, _clock) = manager();
    let first = manager.start_session("one").session_id.clone();
    play_hand(&manager, 2.0);
    let second = manager.start_session("two").session_id.clone();

    assert_ne!(first, second);
    let closed = manager.session_by_id(&first).expect("first session archived");
    assert_eq!(closed.hands_played, 1);
    assert_eq!(manager.hand_history().unwrap().hands_count(), 0);
}

#[test]
fn recording_without_a_session_is_rejected() {
    let (manager, _clock) = manager();
    assert_eq!(
        manager.record_hand_result(1.0, None).unwrap_err(),
        TrackError::NoOpenHand
    );
}

#[test]
fn recent_sessions_and_loading_history() {
    let (mut manager, _clock) = manager();
    let archived: Vec<Session> = (0..4)
        .map(|idx| {
            let mut session = Session::new(format!("old-{idx}"), t0());
            session.end_time = Some(t0() + Duration::minutes(60));
            session.hands_played = 100;
            session.profit_bb = 10.0;
            session
        })
        .collect();
    manager.load_sessions(archived);

    let recent: Vec<&str> = manager
        .recent_sessions(2)
        .iter()
        .map(|s| s.session_id.as_str())
        .collect();
    assert_eq!(recent, ["old-2", "old-3"]);
    assert_eq!(manager.recent_sessions(10).len(), 4);

    let summary = manager.summarize(manager.session_by_id("old-1").unwrap());
    assert_eq!(summary.bb_per_100, 10.0);
    assert_eq!(summary.hands_per_hour, 100.0);

    let totals = manager.total_stats();
    assert_eq!(totals.total_hours, 4.0);
    assert_eq!(totals.hands_per_hour, 100.0);
}

#[test]
fn unfinished_hand_is_left_out_at_session_end() {
    let (mut manager, _clock) = manager();
    manager.start_session("");
    play_hand(&manager, 4.0);

    let history = manager.hand_history().unwrap();
    let mut guard = history.lock();
    guard.start_new_hand(None);
    guard
        .add_action("Hero", ActionKind::Call, Some(1.0), Street::Preflop)
        .unwrap();
    drop(guard);

    let session = manager.end_session().unwrap();
    assert_eq!(session.hands_played, 1);
    assert_eq!(session.profit_bb, 4.0);
}
