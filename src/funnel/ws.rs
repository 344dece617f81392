//! Per-session WebSocket: a snapshot sync frame on connect, then live
//! funnel events for that session only.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::hub::{FunnelEvent, FunnelHub};

/// Shared state for the funnel WebSocket route.
#[derive(Clone)]
pub struct FunnelWsState {
    pub hub: Arc<FunnelHub>,
}

/// Build the funnel WebSocket route.
pub fn funnel_ws_routes(hub: Arc<FunnelHub>) -> Router {
    Router::new()
        .route("/ws/funnel/{id}", get(ws_handler))
        .with_state(FunnelWsState { hub })
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<FunnelWsState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let session_id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    info!(session_id = %session_id, "Funnel WS client connecting");
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub, session_id))
        .into_response()
}

async fn handle_socket(mut socket: WebSocket, hub: Arc<FunnelHub>, session_id: Uuid) {
    // Subscribe before the snapshot so nothing emitted in between is lost.
    let mut rx = hub.subscribe();

    // Send the current snapshot on connect so late joiners see where the
    // session stands.
    match hub.snapshot(session_id).await {
        Some(snapshot) => {
            let sync = FunnelEvent::Sync { session: snapshot };
            if let Ok(json) = serde_json::to_string(&sync)
                && socket.send(Message::Text(json.into())).await.is_err()
            {
                warn!(session_id = %session_id, "Failed to send initial sync");
                return;
            }
        }
        None => {
            let _ = socket
                .send(Message::Text(
                    serde_json::json!({"type": "error", "error": "Session not found"})
                        .to_string()
                        .into(),
                ))
                .await;
            return;
        }
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if event_session_id(&event) != Some(session_id) {
                            continue;
                        }
                        if let Ok(json) = serde_json::to_string(&event)
                            && socket.send(Message::Text(json.into())).await.is_err()
                        {
                            debug!(session_id = %session_id, "Client disconnected during send");
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(session_id = %session_id, missed = n, "WS client lagged behind broadcast");
                        // Re-sync with a fresh snapshot
                        if let Some(snapshot) = hub.snapshot(session_id).await {
                            let sync = FunnelEvent::Sync { session: snapshot };
                            if let Ok(json) = serde_json::to_string(&sync)
                                && socket.send(Message::Text(json.into())).await.is_err()
                            {
                                break;
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        // Input goes over REST; ignore chatter.
                        debug!(session_id = %session_id, text = %text, "Ignoring WS text from client");
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(session_id = %session_id, "Funnel WS client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Which session an event belongs to. `Sync` is only ever built locally.
fn event_session_id(event: &FunnelEvent) -> Option<Uuid> {
    match event {
        FunnelEvent::Sync { session } | FunnelEvent::Started { session } => Some(session.id),
        FunnelEvent::Submitted { id, .. }
        | FunnelEvent::TransitionChanged { id, .. }
        | FunnelEvent::StepChanged { id, .. }
        | FunnelEvent::RedirectPending { id }
        | FunnelEvent::Navigate { id, .. }
        | FunnelEvent::Exited { id, .. }
        | FunnelEvent::SessionExpired { id } => Some(*id),
    }
}
