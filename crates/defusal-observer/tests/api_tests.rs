//! Integration tests for the bridge HTTP routes.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Commands queued by a request are checked by
//! ticking the bridge against a recording host.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use defusal_core::{BombInfo, MissionCommands, SimulationBridge};
use defusal_observer::router::build_router;
use defusal_observer::state::AppState;
use defusal_types::Command;
use serde_json::Value;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingHost {
    executed: Vec<Command>,
    strikes: u32,
}

impl BombInfo for RecordingHost {
    fn formatted_time(&self) -> String {
        String::from("04:59")
    }

    fn strike_count(&self) -> u32 {
        self.strikes
    }

    fn module_ids(&self) -> Vec<String> {
        vec![String::from("Wires"), String::from("Keypad")]
    }

    fn solvable_module_ids(&self) -> Vec<String> {
        vec![String::from("Wires"), String::from("Keypad")]
    }

    fn solved_module_ids(&self) -> Vec<String> {
        vec![String::from("Wires")]
    }
}

impl MissionCommands for RecordingHost {
    fn start_mission(&mut self, mission_id: &str, seed: &str) {
        self.executed.push(Command::start_mission(mission_id, seed));
    }

    fn cause_strike(&mut self, reason: &str) {
        self.strikes = self.strikes.saturating_add(1);
        self.executed.push(Command::cause_strike(reason));
    }
}

fn make_app(bridge: &SimulationBridge) -> axum::Router {
    build_router(Arc::new(AppState::new(bridge.remote())))
}

async fn send(router: axum::Router, method: Method, uri: &str) -> Response {
    router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get(router: axum::Router, uri: &str) -> Response {
    send(router, Method::GET, uri).await
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn drain(bridge: &mut SimulationBridge) -> Vec<Command> {
    let mut host = RecordingHost::default();
    bridge.tick(&mut host);
    host.executed
}

#[tokio::test]
async fn test_bomb_info_before_any_tick() {
    let bridge = SimulationBridge::new();

    let response = get(make_app(&bridge), "/bombInfo").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["Time"], "");
    assert_eq!(json["Strikes"], 0);
    assert_eq!(json["Modules"], serde_json::json!([]));
    assert_eq!(json["SolvableModules"], serde_json::json!([]));
    assert_eq!(json["SolvedModules"], serde_json::json!([]));
    assert_eq!(json["BombState"], "NA");
}

#[tokio::test]
async fn test_bomb_info_reflects_latest_publish() {
    let bridge = SimulationBridge::new();
    let host = RecordingHost {
        strikes: 2,
        ..RecordingHost::default()
    };
    bridge.publish(&host);

    let json = body_json(get(make_app(&bridge), "/bombInfo").await).await;

    assert_eq!(json["Time"], "04:59");
    assert_eq!(json["Strikes"], 2);
    assert_eq!(json["Modules"], serde_json::json!(["Wires", "Keypad"]));
    assert_eq!(json["SolvedModules"], serde_json::json!(["Wires"]));
}

#[tokio::test]
async fn test_bomb_info_matches_loosely() {
    let bridge = SimulationBridge::new();

    for uri in ["/bombInfoXYZ", "/api/bombInfo", "/bombInfo?verbose=1"] {
        let response = get(make_app(&bridge), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let json = body_json(response).await;
        assert_eq!(json["BombState"], "NA", "{uri}");
    }
}

#[tokio::test]
async fn test_start_mission_echoes_and_queues() {
    let mut bridge = SimulationBridge::new();

    let response = get(make_app(&bridge), "/startMission?missionId=mission1&seed=42").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "mission1 42");
    assert_eq!(drain(&mut bridge), vec![Command::start_mission("mission1", "42")]);
}

#[tokio::test]
async fn test_start_mission_missing_seed() {
    let mut bridge = SimulationBridge::new();

    let response = get(make_app(&bridge), "/startMission?missionId=m1").await;

    assert_eq!(body_text(response).await, "m1 ");
    assert_eq!(drain(&mut bridge), vec![Command::start_mission("m1", "")]);
}

#[tokio::test]
async fn test_cause_strike_echoes_reason() {
    let mut bridge = SimulationBridge::new();

    let response = get(make_app(&bridge), "/causeStrike?reason=wrong%20wire").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "wrong wire");
    assert_eq!(drain(&mut bridge), vec![Command::cause_strike("wrong wire")]);
}

#[tokio::test]
async fn test_cause_strike_without_query() {
    let mut bridge = SimulationBridge::new();

    let response = get(make_app(&bridge), "/causeStrike").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "");
    assert_eq!(drain(&mut bridge), vec![Command::cause_strike("")]);
}

#[tokio::test]
async fn test_each_request_queues_exactly_one_command() {
    let mut bridge = SimulationBridge::new();

    for reason in ["a", "b", "c"] {
        let uri = format!("/causeStrike?reason={reason}");
        get(make_app(&bridge), &uri).await;
    }
    assert_eq!(bridge.remote().pending(), 3);

    assert_eq!(
        drain(&mut bridge),
        vec![
            Command::cause_strike("a"),
            Command::cause_strike("b"),
            Command::cause_strike("c"),
        ]
    );
    assert_eq!(bridge.remote().pending(), 0);
}

#[tokio::test]
async fn test_any_method_is_routed() {
    let mut bridge = SimulationBridge::new();

    let response = send(make_app(&bridge), Method::POST, "/causeStrike?reason=post").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "post");
    assert_eq!(drain(&mut bridge), vec![Command::cause_strike("post")]);
}

#[tokio::test]
async fn test_unknown_route_is_empty_ok() {
    let bridge = SimulationBridge::new();

    for uri in ["/", "/status", "/nothing?causeStrike=1&reason=x"] {
        let response = get(make_app(&bridge), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_text(response).await, "", "{uri}");
    }
    assert_eq!(bridge.remote().pending(), 0);
}

#[tokio::test]
async fn test_malformed_query_is_not_an_error() {
    let mut bridge = SimulationBridge::new();

    let response = get(make_app(&bridge), "/startMission?missionId&&=x&seed=%zz").await;

    assert_eq!(response.status(), StatusCode::OK);
    let queued = drain(&mut bridge);
    assert_eq!(queued.len(), 1);
    assert!(matches!(
        queued.as_slice(),
        [Command::StartMission { mission_id, .. }] if mission_id.is_empty()
    ));
}

#[tokio::test]
async fn test_every_response_allows_any_origin() {
    let bridge = SimulationBridge::new();

    for uri in [
        "/bombInfo",
        "/startMission?missionId=m&seed=1",
        "/causeStrike?reason=r",
        "/unknown",
    ] {
        let response = get(make_app(&bridge), uri).await;
        let header = response
            .headers()
            .get("access-control-allow-origin")
            .unwrap();
        assert_eq!(header, "*", "{uri}");
    }
}

#[tokio::test]
async fn test_full_queue_returns_503() {
    let mut bridge = SimulationBridge::with_queue_capacity(1);

    let first = get(make_app(&bridge), "/causeStrike?reason=first").await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = get(make_app(&bridge), "/causeStrike?reason=second").await;
    assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        second.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    let json = body_json(second).await;
    assert_eq!(json["status"], 503);
    assert!(json["error"].as_str().unwrap().contains("full"));

    assert_eq!(drain(&mut bridge), vec![Command::cause_strike("first")]);

    // Space frees up once the tick has drained the queue.
    let third = get(make_app(&bridge), "/causeStrike?reason=third").await;
    assert_eq!(third.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reads_still_served_when_queue_full() {
    let bridge = SimulationBridge::with_queue_capacity(1);
    get(make_app(&bridge), "/causeStrike?reason=fill").await;

    let response = get(make_app(&bridge), "/bombInfo").await;

    assert_eq!(response.status(), StatusCode::OK);
}
