//! Vendor authentication: explicit, injected sessions.
//!
//! The upstream owns accounts and token pairs; this module owns the local
//! session table that maps our bearer tokens to upstream credentials. The
//! table is an in-memory `RwLock<HashMap>` handed to whoever needs it —
//! nothing reads ambient global state, so the whole thing is testable with
//! a stub [`VendorApi`].

pub mod routes;

pub use routes::{AuthRouteState, auth_routes, bearer_token};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{UserRecord, VendorApi};
use crate::error::{ApiError, SessionError};

/// Default idle lifetime of a dashboard session.
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// A signed-in vendor session. Holds the upstream token pair so API calls
/// can be made on the user's behalf.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    /// The company this session may manage, or the error the routes turn
    /// into a 403.
    pub fn company_id(&self) -> Result<&str, SessionError> {
        self.user
            .company_id
            .as_deref()
            .ok_or(SessionError::NoCompany)
    }
}

/// What login/signup hand back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthView {
    pub token: String,
    pub user: UserRecord,
}

/// In-memory session table keyed by our bearer token.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        })
    }

    /// Store a session under its token.
    pub async fn insert(&self, session: Session) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session);
    }

    /// Look up a session and refresh its idle timer.
    pub async fn get(&self, token: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(token)?;
        session.last_seen = Utc::now();
        Some(session.clone())
    }

    /// Remove a session, returning it if it existed.
    pub async fn remove(&self, token: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token)
    }

    /// Drop sessions idle past the TTL. Returns how many were removed.
    pub async fn prune_idle(&self) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::hours(12));

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen >= cutoff);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(count = removed, "Pruned idle dashboard sessions");
        }
        removed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Spawn a background task that periodically prunes idle sessions.
pub fn spawn_session_prune_task(store: Arc<SessionStore>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(10 * 60));
        loop {
            interval.tick().await;
            store.prune_idle().await;
        }
    })
}

/// Login, signup, logout, and session lookup over the upstream API.
pub struct AuthService {
    api: Arc<dyn VendorApi>,
    store: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(api: Arc<dyn VendorApi>, store: Arc<SessionStore>) -> Arc<Self> {
        Arc::new(Self { api, store })
    }

    /// Exchange credentials for a local session token.
    pub async fn login(&self, email: &str, password: SecretString) -> Result<AuthView, ApiError> {
        let response = self.api.login(email, &password).await?;

        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let session = Session {
            token: token.clone(),
            user: response.user.clone(),
            access_token: SecretString::from(response.tokens.access.token),
            refresh_token: SecretString::from(response.tokens.refresh.token),
            created_at: now,
            last_seen: now,
        };
        self.store.insert(session).await;

        info!(user_id = %response.user.id, "Vendor signed in");
        Ok(AuthView {
            token,
            user: response.user,
        })
    }

    /// Register a new account, then immediately sign it in.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: SecretString,
    ) -> Result<AuthView, ApiError> {
        let user = self.api.register(name, email, &password).await?;
        debug!(user_id = %user.id, "Account registered, auto-signing in");
        self.login(email, password).await
    }

    /// End a session. The upstream logout is best-effort: the local session
    /// is removed even when the upstream call fails.
    pub async fn logout(&self, token: &str) -> Result<(), SessionError> {
        let session = self.store.remove(token).await.ok_or(SessionError::Unknown)?;

        if let Err(e) = self.api.logout(&session.refresh_token).await {
            warn!(user_id = %session.user.id, error = %e, "Upstream logout failed, session removed locally");
        } else {
            info!(user_id = %session.user.id, "Vendor signed out");
        }
        Ok(())
    }

    /// Resolve a bearer token to its live session.
    pub async fn session(&self, token: &str) -> Result<Session, SessionError> {
        self.store.get(token).await.ok_or(SessionError::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        Campaign, CampaignPayload, LoginResponse, Paged, Product, Promotion, Role, TokenPair,
        TokenRecord,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubApi {
        fail_logout: bool,
        logout_called: AtomicBool,
    }

    impl StubApi {
        fn new(fail_logout: bool) -> Self {
            Self {
                fail_logout,
                logout_called: AtomicBool::new(false),
            }
        }
    }

    fn user(company: Option<&str>) -> UserRecord {
        UserRecord {
            id: "u_1".into(),
            name: "Ada".into(),
            email: "ada@vendor.test".into(),
            role: Role::User,
            company_id: company.map(String::from),
        }
    }

    #[async_trait]
    impl VendorApi for StubApi {
        async fn login(
            &self,
            email: &str,
            password: &SecretString,
        ) -> Result<LoginResponse, ApiError> {
            use secrecy::ExposeSecret;
            if email != "ada@vendor.test" || password.expose_secret() != "hunter2" {
                return Err(ApiError::Upstream {
                    status: 401,
                    message: "Invalid email or password".into(),
                });
            }
            Ok(LoginResponse {
                user: user(Some("c_9")),
                tokens: TokenPair {
                    access: TokenRecord {
                        token: "up-access".into(),
                        expires: None,
                    },
                    refresh: TokenRecord {
                        token: "up-refresh".into(),
                        expires: None,
                    },
                },
            })
        }

        async fn register(
            &self,
            name: &str,
            email: &str,
            _password: &SecretString,
        ) -> Result<UserRecord, ApiError> {
            Ok(UserRecord {
                name: name.into(),
                email: email.into(),
                ..user(None)
            })
        }

        async fn logout(&self, _refresh_token: &SecretString) -> Result<(), ApiError> {
            self.logout_called.store(true, Ordering::SeqCst);
            if self.fail_logout {
                return Err(ApiError::Upstream {
                    status: 500,
                    message: "backend down".into(),
                });
            }
            Ok(())
        }

        async fn products(&self, _: &str, _: &str) -> Result<Paged<Product>, ApiError> {
            unimplemented!()
        }
        async fn promotions(&self, _: &str, _: &str) -> Result<Paged<Promotion>, ApiError> {
            unimplemented!()
        }
        async fn campaigns(&self, _: &str, _: &str) -> Result<Paged<Campaign>, ApiError> {
            unimplemented!()
        }
        async fn campaign(&self, _: &str, _: &str) -> Result<Campaign, ApiError> {
            unimplemented!()
        }
        async fn create_campaign(
            &self,
            _: &str,
            _: &CampaignPayload,
        ) -> Result<Campaign, ApiError> {
            unimplemented!()
        }
        async fn update_campaign(
            &self,
            _: &str,
            _: &str,
            _: &CampaignPayload,
        ) -> Result<Campaign, ApiError> {
            unimplemented!()
        }
    }

    fn service(fail_logout: bool) -> (Arc<AuthService>, Arc<SessionStore>) {
        let store = SessionStore::new();
        let api: Arc<dyn VendorApi> = Arc::new(StubApi::new(fail_logout));
        (AuthService::new(api, Arc::clone(&store)), store)
    }

    #[tokio::test]
    async fn login_creates_a_session() {
        let (auth, store) = service(false);
        let view = auth
            .login("ada@vendor.test", SecretString::from("hunter2"))
            .await
            .unwrap();

        assert_eq!(view.user.id, "u_1");
        let session = auth.session(&view.token).await.unwrap();
        assert_eq!(session.user.email, "ada@vendor.test");
        assert_eq!(session.company_id().unwrap(), "c_9");
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn bad_credentials_surface_upstream_error() {
        let (auth, store) = service(false);
        let err = auth
            .login("ada@vendor.test", SecretString::from("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Upstream { status: 401, .. }));
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn logout_clears_session_even_when_upstream_fails() {
        let (auth, store) = service(true);
        let view = auth
            .login("ada@vendor.test", SecretString::from("hunter2"))
            .await
            .unwrap();

        auth.logout(&view.token).await.unwrap();
        assert_eq!(store.session_count().await, 0);
        assert!(matches!(
            auth.session(&view.token).await,
            Err(SessionError::Unknown)
        ));
    }

    #[tokio::test]
    async fn logout_of_unknown_token_is_reported() {
        let (auth, _) = service(false);
        assert!(matches!(
            auth.logout("nope").await,
            Err(SessionError::Unknown)
        ));
    }

    #[tokio::test]
    async fn idle_sessions_are_pruned() {
        let store = SessionStore::with_ttl(Duration::from_millis(0));
        let now = Utc::now() - chrono::Duration::seconds(5);
        store
            .insert(Session {
                token: "t".into(),
                user: user(None),
                access_token: SecretString::from("a"),
                refresh_token: SecretString::from("r"),
                created_at: now,
                last_seen: now,
            })
            .await;

        assert_eq!(store.prune_idle().await, 1);
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn session_without_company_is_gated() {
        let session = Session {
            token: "t".into(),
            user: user(None),
            access_token: SecretString::from("a"),
            refresh_token: SecretString::from("r"),
            created_at: Utc::now(),
            last_seen: Utc::now(),
        };
        assert!(matches!(
            session.company_id(),
            Err(SessionError::NoCompany)
        ));
    }
}
