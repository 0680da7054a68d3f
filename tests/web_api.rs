use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use poker_scout::hand::{HandRecord, HandSummary};
use poker_scout::session::{Session, SessionSummary, TotalStats};
use poker_scout::stats::PlayerStatistics;
use poker_scout::web;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::time::{Duration, sleep};
use tower::ServiceExt;

#[tokio::test]
async fn web_api_tracks_a_session_end_to_end() -> anyhow::Result<()> {
    let app: Router = web::router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base_url = format!("http://{}", addr);
    let client = Client::builder().build()?;

    sleep(Duration::from_millis(25)).await;

    let session: Session = client
        .post(format!("{}/api/sessions", base_url))
        .json(&json!({ "notes": "api run" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(session.notes, "api run");
    assert!(session.end_time.is_none());

    let started: Value = client
        .post(format!("{}/api/hands", base_url))
        .json(&json!({
            "hero_cards": ["Ah", "Kh"],
            "board": [],
            "players": ["Hero", "Villain"],
            "positions": { "Hero": "BTN", "Villain": "BB" },
            "hero_position": "BTN",
            "small_blind": 0.5,
            "big_blind": 1.0
        }))
        .send()
        .await?
        .json()
        .await?;
    let hand_id = started["hand_id"].as_str().expect("hand id").to_string();

    for action in [
        json!({ "player": "Hero", "action_type": "raise", "amount": 2.5, "street": "preflop" }),
        json!({ "player": "Villain", "action_type": "call", "amount": 2.5 }),
        json!({ "player": "Villain", "action_type": "check", "street": "flop" }),
        json!({ "player": "Hero", "action_type": "bet", "amount": 3.0, "street": "flop" }),
        json!({ "player": "Villain", "action_type": "fold", "street": "flop" }),
    ] {
        let resp = client
            .post(format!("{}/api/hands/actions", base_url))
            .json(&action)
            .send()
            .await?;
        assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);
    }

    let rejected = client
        .post(format!("{}/api/hands/actions", base_url))
        .json(&json!({ "player": "Villain", "action_type": "shove", "street": "flop" }))
        .send()
        .await?;
    assert_eq!(rejected.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    let record: HandRecord = client
        .post(format!("{}/api/hands/end", base_url))
        .json(&json!({ "result_bb": 3.5, "winner": "Hero" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(record.hand_id, hand_id);
    assert_eq!(record.session_id.as_deref(), Some(session.session_id.as_str()));
    assert_eq!(record.actions().count(), 5);

    let stats: PlayerStatistics = client
        .get(format!("{}/api/players/Hero/stats", base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(stats.hands, 1);
    assert_eq!(stats.vpip, 100.0);
    assert_eq!(stats.pfr, 100.0);
    assert_eq!(stats.cbet, 100.0);

    let summaries: Vec<HandSummary> = client
        .get(format!("{}/api/hands/summaries?count=3", base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].hero_cards, "Ah Kh");
    assert_eq!(summaries[0].board, "No board");
    assert_eq!(summaries[0].position.as_deref(), Some("BTN"));

    let live: SessionSummary = client
        .get(format!("{}/api/sessions/current", base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(live.hands_played, 1);
    assert_eq!(live.profit_bb, 3.5);

    let ended: Session = client
        .post(format!("{}/api/sessions/end", base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ended.hands_played, 1);
    assert!(ended.end_time.is_some());

    let totals: TotalStats = client
        .get(format!("{}/api/sessions/totals", base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(totals.total_sessions, 1);
    assert_eq!(totals.total_hands, 1);
    assert_eq!(totals.total_profit_bb, 3.5);

    server.abort();
    let _ = server.await;
    Ok(())
}

#[tokio::test]
async fn health_check_answers_ok() -> anyhow::Result<()> {
    let response = web::router()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"ok");
    Ok(())
}

#[tokio::test]
async fn hand_routes_need_an_active_session() -> anyhow::Result<()> {
    let response = web::router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/hands/actions")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "player": "Hero", "action_type": "call" }).to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["error"], json!("no active session"));
    Ok(())
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    body: Value,
) -> anyhow::Result<(StatusCode, Value)> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))?,
        )
        .await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

#[tokio::test]
async fn rejected_hand_start_keeps_the_hand_in_progress() -> anyhow::Result<()> {
    let app = web::router();
    let (status, _) = call(&app, Method::POST, "/api/sessions", json!({})).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, started) = call(
        &app,
        Method::POST,
        "/api/hands",
        json!({ "players": ["Hero", "Villain"] }),
    )
    .await?;
    let hand_id = started["hand_id"].clone();

    let raise = json!({ "player": "Hero", "action_type": "raise", "amount": 2.5 });
    let (status, _) = call(&app, Method::POST, "/api/hands/actions", raise).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/hands",
        json!({ "hero_cards": ["Zz", "Kd"] }),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().starts_with("invalid cards"));

    let call_action = json!({ "player": "Villain", "action_type": "call", "amount": 2.5 });
    let (status, _) = call(&app, Method::POST, "/api/hands/actions", call_action).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let outcome = json!({ "result_bb": 1.5 });
    let (status, record) = call(&app, Method::POST, "/api/hands/end", outcome).await?;
    assert_eq!(status, StatusCode::OK);
    let record: HandRecord = serde_json::from_value(record)?;
    assert_eq!(json!(record.hand_id), hand_id);
    let sequence: Vec<(&str, String)> = record
        .actions()
        .map(|action| (action.player.as_str(), action.action_type.to_string()))
        .collect();
    assert_eq!(
        sequence,
        [("Hero", "raise".to_string()), ("Villain", "call".to_string())]
    );
    Ok(())
}
