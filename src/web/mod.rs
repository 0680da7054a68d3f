use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::action::ActionEvent;
use crate::config::TrackerConfig;
use crate::error::TrackError;
use crate::hand::{HandOutcome, HandRecord, HandSummary, Position};
use crate::history::SharedHistory;
use crate::session::{Session, SessionManager, SessionSummary, TotalStats};
use crate::stats::{PlayerStatistics, StatsCalculator};

#[derive(Clone)]
struct AppState {
    manager: Arc<Mutex<SessionManager>>,
    calculator: Arc<StatsCalculator>,
}

impl AppState {
    fn new(manager: SessionManager) -> Self {
        Self {
            manager: Arc::new(Mutex::new(manager)),
            calculator: Arc::new(StatsCalculator::new()),
        }
    }

    fn history(&self) -> Result<SharedHistory, ApiError> {
        self.manager.lock().hand_history().ok_or(ApiError::NoSession)
    }

    /// The active session id and its history, read under one lock.
    fn session(&self) -> Result<(String, SharedHistory), ApiError> {
        let manager = self.manager.lock();
        let session_id = manager
            .current_session()
            .map(|s| s.session_id.clone())
            .ok_or(ApiError::NoSession)?;
        let history = manager.hand_history().ok_or(ApiError::NoSession)?;
        Ok((session_id, history))
    }
}

#[derive(Debug, Default, Deserialize)]
struct StartSessionRequest {
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Default, Deserialize)]
struct StartHandRequest {
    #[serde(default)]
    hero_cards: Vec<String>,
    #[serde(default)]
    board: Vec<String>,
    #[serde(default)]
    players: Vec<String>,
    #[serde(default)]
    positions: BTreeMap<String, Position>,
    #[serde(default)]
    hero_position: Option<Position>,
    #[serde(default)]
    small_blind: f64,
    #[serde(default)]
    big_blind: f64,
}

#[derive(Debug, Serialize)]
struct StartHandResponse {
    hand_id: String,
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    count: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("no active session")]
    NoSession,
    #[error(transparent)]
    Track(#[from] TrackError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NoSession | ApiError::Track(TrackError::NoOpenHand) => StatusCode::CONFLICT,
            ApiError::Track(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub async fn serve(addr: SocketAddr, config: TrackerConfig) -> Result<()> {
    let app = router_with(SessionManager::new(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "tracker listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/end", post(end_session))
        .route("/sessions/current", get(current_session))
        .route("/sessions/totals", get(total_stats))
        .route("/hands", post(start_hand))
        .route("/hands/actions", post(add_action))
        .route("/hands/end", post(end_hand))
        .route("/hands/summaries", get(hand_summaries))
        .route("/players/:name/stats", get(player_stats));

    Router::new()
        .route("/healthz", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn router() -> Router {
    router_with(SessionManager::default())
}

pub fn router_with(manager: SessionManager) -> Router {
    build_router(AppState::new(manager))
}

async fn health() -> &'static str {
    "ok"
}

async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Json<Session> {
    let mut manager = state.manager.lock();
    Json(manager.start_session(&req.notes).clone())
}

async fn end_session(State(state): State<AppState>) -> Result<Json<Session>, ApiError> {
    let session = state.manager.lock().end_session().ok_or(ApiError::NoSession)?;
    state.calculator.clear_cache();
    Ok(Json(session))
}

async fn current_session(State(state): State<AppState>) -> Result<Json<SessionSummary>, ApiError> {
    let summary = state.manager.lock().current_summary().ok_or(ApiError::NoSession)?;
    Ok(Json(summary))
}

async fn total_stats(State(state): State<AppState>) -> Json<TotalStats> {
    Json(state.manager.lock().total_stats())
}

async fn start_hand(
    State(state): State<AppState>,
    Json(req): Json<StartHandRequest>,
) -> Result<Json<StartHandResponse>, ApiError> {
    let (session_id, history) = state.session()?;
    let mut history = history.lock();
    let hand = history.open_hand(Some(&session_id), |hand| {
        hand.set_hero_cards(&req.hero_cards)?;
        hand.set_board(&req.board)?;
        for player in req.players {
            hand.add_player(player);
        }
        for (player, position) in req.positions {
            hand.seat_player(player, position);
        }
        hand.hero_position = req.hero_position;
        hand.small_blind = req.small_blind;
        hand.big_blind = req.big_blind;
        Ok(())
    })?;
    Ok(Json(StartHandResponse {
        hand_id: hand.hand_id.clone(),
    }))
}

async fn add_action(
    State(state): State<AppState>,
    Json(event): Json<ActionEvent>,
) -> Result<StatusCode, ApiError> {
    state.history()?.lock().add_event(event)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn end_hand(
    State(state): State<AppState>,
    Json(outcome): Json<HandOutcome>,
) -> Result<Json<HandRecord>, ApiError> {
    let history = state.history()?;
    let mut history = history.lock();
    let hand = history.finish_hand(outcome)?.clone();
    Ok(Json(hand))
}

async fn hand_summaries(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Vec<HandSummary>>, ApiError> {
    let count = query
        .count
        .unwrap_or_else(|| state.manager.lock().config().summary_hands);
    let summaries = state.history()?.lock().summaries(count);
    Ok(Json(summaries))
}

async fn player_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerStatistics>, ApiError> {
    let hands = state.history()?.snapshot();
    Ok(Json(state.calculator.calculate_stats(&name, &hands)))
}
