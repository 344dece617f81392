//! Integration tests for the funnel REST + WebSocket surface.
//!
//! Each test spins up an Axum server on a random port, drives the funnel
//! over REST, and watches the session's WebSocket for the resulting events.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use review_relay::funnel::{
    FunnelConfig, FunnelHub, FunnelRouteState, funnel_routes, funnel_ws_routes,
    spawn_review_recorder,
};
use review_relay::store::{LibSqlReviews, ReviewStore};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Timings quick enough for tests but slow enough that a WS client
/// connected right after session start still sees every event.
fn test_config() -> FunnelConfig {
    FunnelConfig {
        step_transition: Duration::from_millis(50),
        redirect_notice: Duration::from_millis(200),
        redirect_fire: Duration::from_millis(200),
        session_ttl: Duration::from_secs(30 * 60),
    }
}

/// Start a funnel server on a random port, return (port, hub, store).
async fn start_server() -> (u16, Arc<FunnelHub>, Arc<dyn ReviewStore>) {
    let hub = FunnelHub::new(test_config());
    let store: Arc<dyn ReviewStore> = Arc::new(LibSqlReviews::new_memory().await.unwrap());
    let _recorder = spawn_review_recorder(Arc::clone(&hub), Arc::clone(&store), None);

    let app = funnel_routes(FunnelRouteState {
        hub: Arc::clone(&hub),
    })
    .merge(funnel_ws_routes(Arc::clone(&hub)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (port, hub, store)
}

fn campaign_context() -> Value {
    json!({
        "campaign_id": "cmp_1",
        "product_name": "Wireless Earbuds",
        "product_image": "https://cdn.example.com/earbuds.jpg",
        "vendor": "Acme Audio"
    })
}

fn contact_form(rating: u8, country: &str) -> Value {
    json!({
        "rating": rating,
        "name": "Alice",
        "email": "alice@example.com",
        "country": country
    })
}

/// Parse a WS text frame into a serde_json::Value.
fn parse_ws_json(msg: &Message) -> Value {
    match msg {
        Message::Text(txt) => serde_json::from_str(txt).expect("invalid JSON from server"),
        other => panic!("expected Text frame, got {:?}", other),
    }
}

/// Open a session over REST and return its snapshot.
async fn open_session(client: &reqwest::Client, port: u16) -> Value {
    let resp = client
        .post(format!("http://127.0.0.1:{port}/api/funnel"))
        .json(&campaign_context())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    resp.json().await.unwrap()
}

/// Read WS frames until one matches, collecting everything seen.
async fn collect_until(
    ws: &mut (impl Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin),
    stop: impl Fn(&Value) -> bool,
) -> Vec<Value> {
    let mut events = Vec::new();
    loop {
        let msg = timeout(TEST_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for WS event")
            .expect("WS closed early")
            .expect("WS error");
        if matches!(msg, Message::Ping(_) | Message::Pong(_)) {
            continue;
        }
        let event = parse_ws_json(&msg);
        let done = stop(&event);
        events.push(event);
        if done {
            return events;
        }
    }
}

#[tokio::test]
async fn session_starts_at_step_one() {
    timeout(TEST_TIMEOUT, async {
        let (port, _hub, _store) = start_server().await;
        let client = reqwest::Client::new();

        let snapshot = open_session(&client, port).await;
        assert_eq!(snapshot["step"], "rating");
        assert_eq!(snapshot["step_number"], 1);
        assert_eq!(snapshot["progress"], 33);
        assert_eq!(snapshot["transition"], "idle");
        assert_eq!(snapshot["redirecting"], false);
        assert!(snapshot["submission"].is_null());

        // The same snapshot is served on GET
        let id = snapshot["id"].as_str().unwrap();
        let fetched: Value = client
            .get(format!("http://127.0.0.1:{port}/api/funnel/{id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(fetched, snapshot);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_sends_sync_frame_on_connect() {
    timeout(TEST_TIMEOUT, async {
        let (port, _hub, _store) = start_server().await;
        let client = reqwest::Client::new();
        let snapshot = open_session(&client, port).await;
        let id = snapshot["id"].as_str().unwrap();

        let (mut ws, _resp) = connect_async(format!("ws://127.0.0.1:{port}/ws/funnel/{id}"))
            .await
            .expect("WS connect failed");

        let msg = ws.next().await.unwrap().unwrap();
        let sync = parse_ws_json(&msg);
        assert_eq!(sync["type"], "sync");
        assert_eq!(sync["session"]["id"], *id);
        assert_eq!(sync["session"]["step"], "rating");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn positive_rating_redirects_exactly_once() {
    timeout(TEST_TIMEOUT, async {
        let (port, _hub, store) = start_server().await;
        let client = reqwest::Client::new();
        let snapshot = open_session(&client, port).await;
        let id = snapshot["id"].as_str().unwrap().to_string();

        let (mut ws, _resp) = connect_async(format!("ws://127.0.0.1:{port}/ws/funnel/{id}"))
            .await
            .unwrap();
        // Swallow the sync frame
        let _ = ws.next().await.unwrap().unwrap();

        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/funnel/{id}/submit"))
            .json(&contact_form(5, "uk"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let events = collect_until(&mut ws, |e| e["type"] == "exited").await;

        let externals: Vec<&str> = events
            .iter()
            .filter(|e| e["type"] == "navigate" && e["navigation"]["kind"] == "open_external")
            .map(|e| e["navigation"]["url"].as_str().unwrap())
            .collect();
        assert_eq!(
            externals,
            vec!["https://www.amazon.co.uk/review/create-review"]
        );

        let homes = events
            .iter()
            .filter(|e| e["type"] == "navigate" && e["navigation"]["kind"] == "go_home")
            .count();
        assert_eq!(homes, 1);

        // Redirect notice precedes the navigations
        let notice = events
            .iter()
            .position(|e| e["type"] == "redirect_pending")
            .expect("no redirect_pending event");
        let nav = events.iter().position(|e| e["type"] == "navigate").unwrap();
        assert!(notice < nav);

        assert_eq!(events.last().unwrap()["exit"], "redirected");

        // The submission was also captured locally
        let mut captured = 0;
        for _ in 0..50 {
            captured = store.review_count().await.unwrap();
            if captured == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(captured, 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn low_rating_walks_all_three_steps() {
    timeout(TEST_TIMEOUT, async {
        let (port, _hub, _store) = start_server().await;
        let client = reqwest::Client::new();
        let snapshot = open_session(&client, port).await;
        let id = snapshot["id"].as_str().unwrap().to_string();

        let (mut ws, _resp) = connect_async(format!("ws://127.0.0.1:{port}/ws/funnel/{id}"))
            .await
            .unwrap();
        let _ = ws.next().await.unwrap().unwrap();

        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/funnel/{id}/submit"))
            .json(&contact_form(2, "de"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        // Settle at Outcome/Idle
        let events = collect_until(&mut ws, |e| {
            e["type"] == "transition_changed" && e["transition"] == "idle"
        })
        .await;
        assert!(
            events.iter().all(|e| e["type"] != "redirect_pending"),
            "low rating must never see a redirect notice"
        );

        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/funnel/{id}/continue"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let events = collect_until(&mut ws, |e| {
            e["type"] == "transition_changed" && e["transition"] == "idle"
        })
        .await;
        let step_change = events
            .iter()
            .find(|e| e["type"] == "step_changed")
            .expect("no step change after continue");
        assert_eq!(step_change["step"], "follow_up");
        assert_eq!(step_change["progress"], 100);

        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/funnel/{id}/home"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let events = collect_until(&mut ws, |e| e["type"] == "exited").await;
        assert!(
            events
                .iter()
                .any(|e| e["type"] == "navigate" && e["navigation"]["kind"] == "go_home")
        );
        assert!(
            events
                .iter()
                .all(|e| !(e["type"] == "navigate" && e["navigation"]["kind"] == "open_external"))
        );
        assert_eq!(events.last().unwrap()["exit"], "went_home");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn invalid_form_returns_every_field_error() {
    timeout(TEST_TIMEOUT, async {
        let (port, _hub, _store) = start_server().await;
        let client = reqwest::Client::new();
        let snapshot = open_session(&client, port).await;
        let id = snapshot["id"].as_str().unwrap();

        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/funnel/{id}/submit"))
            .json(&json!({
                "name": "",
                "email": "not-an-email",
                "phone_number": "abc",
                "country": "us"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 422);

        let body: Value = resp.json().await.unwrap();
        let fields = body["fields"].as_object().unwrap();
        assert!(fields.contains_key("rating"));
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone_number"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn continue_is_denied_outside_step_two() {
    timeout(TEST_TIMEOUT, async {
        let (port, _hub, _store) = start_server().await;
        let client = reqwest::Client::new();
        let snapshot = open_session(&client, port).await;
        let id = snapshot["id"].as_str().unwrap();

        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/funnel/{id}/continue"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 409);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unknown_session_is_404() {
    timeout(TEST_TIMEOUT, async {
        let (port, _hub, _store) = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .get(format!(
                "http://127.0.0.1:{port}/api/funnel/00000000-0000-0000-0000-000000000000"
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let resp = client
            .get(format!("http://127.0.0.1:{port}/api/funnel/not-a-uuid"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    })
    .await
    .expect("test timed out");
}
