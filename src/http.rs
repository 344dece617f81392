//! Router composition: marketing content, auth, vendor dashboard, funnel
//! REST + WS, health, and CORS for the SPA client.

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::auth::{AuthRouteState, AuthService, auth_routes};
use crate::campaigns::{CampaignManager, CampaignRouteState, campaign_routes};
use crate::funnel::{FunnelHub, FunnelRouteState, funnel_routes, funnel_ws_routes};
use crate::site::site_routes;

/// Build the full application router.
pub fn app(
    hub: Arc<FunnelHub>,
    auth: Arc<AuthService>,
    campaigns: Arc<CampaignManager>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(site_routes())
        .merge(auth_routes(AuthRouteState {
            auth: Arc::clone(&auth),
        }))
        .merge(campaign_routes(CampaignRouteState {
            auth,
            manager: campaigns,
        }))
        .merge(funnel_routes(FunnelRouteState {
            hub: Arc::clone(&hub),
        }))
        .merge(funnel_ws_routes(hub))
        .route("/health", get(health))
        .layer(cors)
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
