//! Auth REST surface: login, signup, logout, and the current account.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;

use super::AuthService;
use crate::error::{ApiError, SessionError};

/// Shared state for auth routes.
#[derive(Clone)]
pub struct AuthRouteState {
    pub auth: Arc<AuthService>,
}

/// Build the auth REST routes.
pub fn auth_routes(state: AuthRouteState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .with_state(state)
}

/// Pull the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, SessionError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(SessionError::MissingToken)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

/// POST /api/auth/login
async fn login(
    State(state): State<AuthRouteState>,
    Json(body): Json<LoginRequest>,
) -> impl IntoResponse {
    match state
        .auth
        .login(&body.email, SecretString::from(body.password))
        .await
    {
        Ok(view) => (StatusCode::OK, Json(serde_json::to_value(view).unwrap_or_default()))
            .into_response(),
        Err(err) => api_error_response(err).into_response(),
    }
}

/// POST /api/auth/signup
///
/// Registers the account and signs it straight in.
async fn signup(
    State(state): State<AuthRouteState>,
    Json(body): Json<SignupRequest>,
) -> impl IntoResponse {
    match state
        .auth
        .signup(&body.name, &body.email, SecretString::from(body.password))
        .await
    {
        Ok(view) => (
            StatusCode::CREATED,
            Json(serde_json::to_value(view).unwrap_or_default()),
        )
            .into_response(),
        Err(err) => api_error_response(err).into_response(),
    }
}

/// POST /api/auth/logout
async fn logout(State(state): State<AuthRouteState>, headers: HeaderMap) -> impl IntoResponse {
    let token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(err) => return session_error_response(err).into_response(),
    };

    match state.auth.logout(token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => session_error_response(err).into_response(),
    }
}

/// GET /api/auth/me
async fn me(State(state): State<AuthRouteState>, headers: HeaderMap) -> impl IntoResponse {
    let token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(err) => return session_error_response(err).into_response(),
    };

    match state.auth.session(token).await {
        Ok(session) => Json(session.user).into_response(),
        Err(err) => session_error_response(err).into_response(),
    }
}

/// Credential failures pass through the upstream's status when it is a
/// client error; everything else is a 502.
fn api_error_response(err: ApiError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        ApiError::Upstream { status, .. } if *status < 500 => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Json(serde_json::json!({"error": err.to_string()})))
}

pub(crate) fn session_error_response(err: SessionError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        SessionError::MissingToken | SessionError::Unknown => StatusCode::UNAUTHORIZED,
        SessionError::NoCompany | SessionError::Forbidden { .. } => StatusCode::FORBIDDEN,
    };
    (status, Json(serde_json::json!({"error": err.to_string()})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(SessionError::MissingToken)
        ));

        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");

        headers.insert(header::AUTHORIZATION, "Basic xyz".parse().unwrap());
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn upstream_client_errors_pass_through() {
        let (status, _) = api_error_response(ApiError::Upstream {
            status: 401,
            message: "Invalid email or password".into(),
        });
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = api_error_response(ApiError::Upstream {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
