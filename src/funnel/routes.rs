//! REST endpoints driving the funnel. Input comes in here; state changes
//! flow back out over the session WebSocket.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;
use uuid::Uuid;

use super::form::ReviewForm;
use super::hub::{CampaignContext, FunnelHub};
use crate::error::FunnelError;

/// Shared state for funnel routes.
#[derive(Clone)]
pub struct FunnelRouteState {
    pub hub: Arc<FunnelHub>,
}

/// Build the funnel REST routes.
pub fn funnel_routes(state: FunnelRouteState) -> Router {
    Router::new()
        .route("/api/funnel", post(start_session))
        .route("/api/funnel/{id}", get(get_session))
        .route("/api/funnel/{id}/submit", post(submit_review))
        .route("/api/funnel/{id}/continue", post(continue_session))
        .route("/api/funnel/{id}/home", post(go_home))
        .with_state(state)
}

/// POST /api/funnel
///
/// Open a new session for a campaign visit.
async fn start_session(
    State(state): State<FunnelRouteState>,
    Json(context): Json<CampaignContext>,
) -> impl IntoResponse {
    let snapshot = state.hub.start(context).await;
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/funnel/{id}
async fn get_session(
    State(state): State<FunnelRouteState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let session_id = match parse_session_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp.into_response(),
    };

    match state.hub.snapshot(session_id).await {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Session not found"})),
        )
            .into_response(),
    }
}

/// POST /api/funnel/{id}/submit
///
/// Validate the rating + contact form and, on success, advance the
/// session. Validation failures come back as 422 with one message per
/// field.
async fn submit_review(
    State(state): State<FunnelRouteState>,
    Path(id): Path<String>,
    Json(form): Json<ReviewForm>,
) -> impl IntoResponse {
    let session_id = match parse_session_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp.into_response(),
    };

    let submission = match form.validated() {
        Ok(submission) => submission,
        Err(fields) => {
            info!(session_id = %session_id, fields = fields.len(), "Submission rejected by validation");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "error": "Please fill in all required fields correctly.",
                    "fields": fields,
                })),
            )
                .into_response();
        }
    };

    match state.hub.submit(session_id, submission).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(err) => funnel_error_response(err).into_response(),
    }
}

/// POST /api/funnel/{id}/continue
async fn continue_session(
    State(state): State<FunnelRouteState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let session_id = match parse_session_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp.into_response(),
    };

    match state.hub.advance(session_id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(err) => funnel_error_response(err).into_response(),
    }
}

/// POST /api/funnel/{id}/home
async fn go_home(
    State(state): State<FunnelRouteState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let session_id = match parse_session_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp.into_response(),
    };

    match state.hub.go_home(session_id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(err) => funnel_error_response(err).into_response(),
    }
}

fn parse_session_id(
    raw: &str,
) -> Result<Uuid, (StatusCode, Json<serde_json::Value>)> {
    Uuid::parse_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid session ID"})),
        )
    })
}

/// Map funnel errors onto HTTP statuses: missing session is 404,
/// everything else is a 409 the client should treat as "not now".
fn funnel_error_response(err: FunnelError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        FunnelError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        FunnelError::WrongStep { .. }
        | FunnelError::TransitionPending { .. }
        | FunnelError::AlreadyExited { .. }
        | FunnelError::ContinueUnavailable { .. } => StatusCode::CONFLICT,
    };
    (status, Json(serde_json::json!({"error": err.to_string()})))
}
