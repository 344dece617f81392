//! Vendor dashboard REST surface. Everything here sits behind a bearer
//! session and the company gate.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::auth::routes::session_error_response;
use crate::auth::{AuthService, Session, bearer_token};
use crate::error::Error;
use crate::marketplace;

use super::manager::CampaignManager;
use super::model::CampaignDraft;

/// Shared state for vendor routes.
#[derive(Clone)]
pub struct CampaignRouteState {
    pub auth: Arc<AuthService>,
    pub manager: Arc<CampaignManager>,
}

/// Build the vendor dashboard routes.
pub fn campaign_routes(state: CampaignRouteState) -> Router {
    Router::new()
        .route("/api/vendor/products", get(list_products))
        .route("/api/vendor/promotions", get(list_promotions))
        .route("/api/vendor/marketplaces", get(list_marketplaces))
        .route("/api/vendor/campaigns", get(list_campaigns).post(create_campaign))
        .route("/api/vendor/campaigns/{id}", get(get_campaign).put(update_campaign))
        .with_state(state)
}

async fn authenticate(
    state: &CampaignRouteState,
    headers: &HeaderMap,
) -> Result<Session, axum::response::Response> {
    let token = bearer_token(headers)
        .map_err(|e| session_error_response(e).into_response())?;
    state
        .auth
        .session(token)
        .await
        .map_err(|e| session_error_response(e).into_response())
}

/// GET /api/vendor/products
async fn list_products(
    State(state): State<CampaignRouteState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.manager.products(&session).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// GET /api/vendor/promotions
async fn list_promotions(
    State(state): State<CampaignRouteState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.manager.promotions(&session).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// GET /api/vendor/marketplaces
///
/// The fixed catalog the campaign form offers. No session state involved,
/// but it lives under the vendor surface because only the dashboard uses it.
async fn list_marketplaces() -> impl IntoResponse {
    Json(marketplace::catalog())
}

/// GET /api/vendor/campaigns
async fn list_campaigns(
    State(state): State<CampaignRouteState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.manager.list(&session).await {
        Ok(views) => Json(views).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// GET /api/vendor/campaigns/{id}
async fn get_campaign(
    State(state): State<CampaignRouteState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.manager.get(&session, &id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// POST /api/vendor/campaigns
///
/// Validates the draft (all errors at once, 422) before anything goes
/// upstream.
async fn create_campaign(
    State(state): State<CampaignRouteState>,
    headers: HeaderMap,
    Json(draft): Json<CampaignDraft>,
) -> impl IntoResponse {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let fields = draft.validate();
    if !fields.is_empty() {
        info!(fields = fields.len(), "Campaign draft rejected by validation");
        return validation_response(fields).into_response();
    }

    let mut rng = StdRng::from_entropy();
    match state.manager.create(&session, draft, &mut rng).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// PUT /api/vendor/campaigns/{id}
async fn update_campaign(
    State(state): State<CampaignRouteState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<CampaignDraft>,
) -> impl IntoResponse {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let fields = draft.validate();
    if !fields.is_empty() {
        return validation_response(fields).into_response();
    }

    match state.manager.update(&session, &id, draft).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

fn validation_response(
    fields: crate::error::FieldErrors,
) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({
            "error": "Please fill in all required fields",
            "fields": fields,
        })),
    )
}

/// Session problems keep their auth statuses; upstream failures become a
/// 502 so the dashboard can show a retry notice.
fn error_response(err: Error) -> (StatusCode, Json<serde_json::Value>) {
    match err {
        Error::Session(e) => session_error_response(e),
        Error::Api(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": other.to_string()})),
        ),
    }
}
