//! Funnel hub: in-memory session registry with broadcast events and the
//! timer tasks that drive step transitions and the marketplace redirect.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::form::ReviewSubmission;
use super::state::{FunnelExit, FunnelStep, TransitionState, is_positive};
use crate::error::FunnelError;
use crate::marketplace;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Timings for the funnel's deferred effects. Defaults match the
/// production funnel; tests shrink them.
#[derive(Debug, Clone)]
pub struct FunnelConfig {
    /// How long a step change animates (Leaving, then Entering).
    pub step_transition: Duration,
    /// Delay after an accepted positive submission before the visitor is
    /// told the redirect is coming (`redirecting` flips true).
    pub redirect_notice: Duration,
    /// Delay between the notice and the external navigation.
    pub redirect_fire: Duration,
    /// Idle time after which an abandoned session is dropped.
    pub session_ttl: Duration,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            step_transition: Duration::from_millis(300),
            redirect_notice: Duration::from_millis(1000),
            redirect_fire: Duration::from_millis(2000),
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl FunnelConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let ms = |key: &str, default: Duration| {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let session_ttl = std::env::var("REVIEW_RELAY_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_ttl);

        Self {
            step_transition: ms("REVIEW_RELAY_STEP_TRANSITION_MS", defaults.step_transition),
            redirect_notice: ms("REVIEW_RELAY_REDIRECT_NOTICE_MS", defaults.redirect_notice),
            redirect_fire: ms("REVIEW_RELAY_REDIRECT_FIRE_MS", defaults.redirect_fire),
            session_ttl,
        }
    }
}

/// Immutable display context a funnel link carries: which campaign the
/// visitor came from and what to show them. Never parsed or derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignContext {
    pub campaign_id: String,
    pub product_name: String,
    pub product_image: String,
    pub vendor: String,
}

/// One visitor's walk through the funnel.
#[derive(Debug, Clone)]
pub struct FunnelSession {
    pub id: Uuid,
    pub context: CampaignContext,
    pub step: FunnelStep,
    pub transition: TransitionState,
    /// Set once by an accepted submission, never cleared.
    pub submission: Option<ReviewSubmission>,
    /// True only between the redirect notice and the external navigation.
    pub redirecting: bool,
    pub exit: Option<FunnelExit>,
    /// Resolved marketplace URL, once known.
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FunnelSession {
    fn new(context: CampaignContext) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            context,
            step: FunnelStep::default(),
            transition: TransitionState::default(),
            submission: None,
            redirecting: false,
            exit: None,
            redirect_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// What clients see. Progress is derived from the step here and
    /// nowhere else.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            context: self.context.clone(),
            step: self.step,
            step_number: self.step.number(),
            progress: self.step.progress(),
            transition: self.transition,
            redirecting: self.redirecting,
            submission: self.submission.clone(),
            exit: self.exit,
            redirect_url: self.redirect_url.clone(),
        }
    }
}

/// Client-facing view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub context: CampaignContext,
    pub step: FunnelStep,
    pub step_number: u8,
    pub progress: u8,
    pub transition: TransitionState,
    pub redirecting: bool,
    pub submission: Option<ReviewSubmission>,
    pub exit: Option<FunnelExit>,
    pub redirect_url: Option<String>,
}

/// Where the thin client should take the visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Navigation {
    /// Open the external review page in a new tab.
    OpenExternal { url: String },
    /// Return to the marketing home page.
    GoHome,
}

/// Events broadcast to WebSocket clients and internal subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FunnelEvent {
    /// Full state sync (sent on WS connect).
    Sync { session: SessionSnapshot },
    /// A new session was opened.
    Started { session: SessionSnapshot },
    /// A submission was accepted on step 1.
    Submitted {
        id: Uuid,
        campaign_id: String,
        submission: ReviewSubmission,
    },
    /// The transition state changed (Leaving / Entering / Idle).
    TransitionChanged {
        id: Uuid,
        transition: TransitionState,
    },
    /// The step flipped after the transition delay.
    StepChanged {
        id: Uuid,
        step: FunnelStep,
        transition: TransitionState,
        progress: u8,
    },
    /// The visitor is about to be sent to the marketplace.
    RedirectPending { id: Uuid },
    /// Navigation the client should perform.
    Navigate { id: Uuid, navigation: Navigation },
    /// The session reached a terminal state.
    Exited { id: Uuid, exit: FunnelExit },
    /// An abandoned session was dropped.
    SessionExpired { id: Uuid },
}

/// In-memory funnel session hub backed by a broadcast channel for fan-out
/// to WS clients and the review recorder.
pub struct FunnelHub {
    sessions: RwLock<HashMap<Uuid, FunnelSession>>,
    tx: broadcast::Sender<FunnelEvent>,
    config: FunnelConfig,
}

impl FunnelHub {
    /// Create a hub with the given timings.
    pub fn new(config: FunnelConfig) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            tx,
            config,
        })
    }

    /// Subscribe to funnel events. Each WS client and the recorder call this.
    pub fn subscribe(&self) -> broadcast::Receiver<FunnelEvent> {
        self.tx.subscribe()
    }

    /// Open a fresh session at step 1.
    pub async fn start(&self, context: CampaignContext) -> SessionSnapshot {
        let session = FunnelSession::new(context);
        let snapshot = session.snapshot();

        info!(
            session_id = %session.id,
            campaign_id = %session.context.campaign_id,
            "Funnel session started"
        );

        {
            let mut sessions = self.sessions.write().await;
            sessions.insert(session.id, session);
        }

        let _ = self.tx.send(FunnelEvent::Started {
            session: snapshot.clone(),
        });
        snapshot
    }

    /// Current view of a session, if it exists.
    pub async fn snapshot(&self, id: Uuid) -> Option<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(|s| s.snapshot())
    }

    /// Accept a validated step-1 submission.
    ///
    /// Stores the submission, starts the step transition to Outcome, and
    /// for positive ratings schedules the redirect sequence.
    pub async fn submit(
        self: &Arc<Self>,
        id: Uuid,
        submission: ReviewSubmission,
    ) -> Result<SessionSnapshot, FunnelError> {
        let rating = submission.rating;
        let campaign_id;
        let snapshot;
        {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get_mut(&id)
                .ok_or(FunnelError::SessionNotFound(id))?;

            if let Some(exit) = session.exit {
                return Err(FunnelError::AlreadyExited {
                    id,
                    exit: exit.to_string(),
                });
            }
            if session.step != FunnelStep::Rating {
                return Err(FunnelError::WrongStep {
                    id,
                    step: session.step.to_string(),
                    action: "submit".into(),
                });
            }
            if session.transition != TransitionState::Idle {
                return Err(FunnelError::TransitionPending { id });
            }

            campaign_id = session.context.campaign_id.clone();
            session.submission = Some(submission.clone());
            session.transition = TransitionState::Leaving;
            session.updated_at = Utc::now();
            snapshot = session.snapshot();
        }

        info!(session_id = %id, rating, "Submission accepted");

        let _ = self.tx.send(FunnelEvent::Submitted {
            id,
            campaign_id,
            submission,
        });
        let _ = self.tx.send(FunnelEvent::TransitionChanged {
            id,
            transition: TransitionState::Leaving,
        });

        self.spawn_step_change(id, FunnelStep::Outcome);
        if is_positive(rating) {
            self.spawn_redirect_sequence(id);
        }

        Ok(snapshot)
    }

    /// The step-2 "continue" control. Only available to low-rating
    /// journeys; positive ones exit via redirect and never see it.
    pub async fn advance(self: &Arc<Self>, id: Uuid) -> Result<SessionSnapshot, FunnelError> {
        let snapshot;
        {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get_mut(&id)
                .ok_or(FunnelError::SessionNotFound(id))?;

            if let Some(exit) = session.exit {
                return Err(FunnelError::AlreadyExited {
                    id,
                    exit: exit.to_string(),
                });
            }
            if session.step != FunnelStep::Outcome {
                return Err(FunnelError::WrongStep {
                    id,
                    step: session.step.to_string(),
                    action: "continue".into(),
                });
            }
            if session.transition != TransitionState::Idle {
                return Err(FunnelError::TransitionPending { id });
            }

            let rating = session.submission.as_ref().map(|s| s.rating).unwrap_or(0);
            if is_positive(rating) {
                return Err(FunnelError::ContinueUnavailable { rating });
            }

            session.transition = TransitionState::Leaving;
            session.updated_at = Utc::now();
            snapshot = session.snapshot();
        }

        let _ = self.tx.send(FunnelEvent::TransitionChanged {
            id,
            transition: TransitionState::Leaving,
        });
        self.spawn_step_change(id, FunnelStep::FollowUp);

        Ok(snapshot)
    }

    /// Finish a low-rating journey from the follow-up step.
    pub async fn go_home(&self, id: Uuid) -> Result<SessionSnapshot, FunnelError> {
        let snapshot;
        {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get_mut(&id)
                .ok_or(FunnelError::SessionNotFound(id))?;

            if let Some(exit) = session.exit {
                return Err(FunnelError::AlreadyExited {
                    id,
                    exit: exit.to_string(),
                });
            }
            if session.step != FunnelStep::FollowUp {
                return Err(FunnelError::WrongStep {
                    id,
                    step: session.step.to_string(),
                    action: "go_home".into(),
                });
            }
            if session.transition != TransitionState::Idle {
                return Err(FunnelError::TransitionPending { id });
            }

            session.exit = Some(FunnelExit::WentHome);
            session.updated_at = Utc::now();
            snapshot = session.snapshot();
        }

        info!(session_id = %id, "Funnel finished via follow-up");

        let _ = self.tx.send(FunnelEvent::Navigate {
            id,
            navigation: Navigation::GoHome,
        });
        let _ = self.tx.send(FunnelEvent::Exited {
            id,
            exit: FunnelExit::WentHome,
        });

        Ok(snapshot)
    }

    /// Drop sessions idle for longer than the TTL. Returns how many were
    /// removed. Abandoned (never-exited) sessions get a SessionExpired
    /// event; finished ones are removed silently.
    pub async fn expire_idle(&self) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.config.session_ttl)
                .unwrap_or_else(|_| chrono::Duration::minutes(30));

        let expired: Vec<(Uuid, bool)> = {
            let mut sessions = self.sessions.write().await;
            let stale: Vec<(Uuid, bool)> = sessions
                .values()
                .filter(|s| s.updated_at < cutoff)
                .map(|s| (s.id, s.exit.is_none()))
                .collect();
            for (id, _) in &stale {
                sessions.remove(id);
            }
            stale
        };

        for (id, abandoned) in &expired {
            if *abandoned {
                debug!(session_id = %id, "Funnel session expired");
                let _ = self.tx.send(FunnelEvent::SessionExpired { id: *id });
            }
        }

        if !expired.is_empty() {
            info!(count = expired.len(), "Expired funnel sessions");
        }
        expired.len()
    }

    /// Number of live sessions (any state).
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    // ── Timer tasks ─────────────────────────────────────────────────────

    /// After the transition delay, flip the step and animate in; after the
    /// same delay again, settle to Idle.
    fn spawn_step_change(self: &Arc<Self>, id: Uuid, target: FunnelStep) {
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(hub.config.step_transition).await;
            hub.complete_step_change(id, target).await;
            tokio::time::sleep(hub.config.step_transition).await;
            hub.settle_transition(id).await;
        });
    }

    async fn complete_step_change(&self, id: Uuid, target: FunnelStep) {
        let progress;
        {
            let mut sessions = self.sessions.write().await;
            let Some(session) = sessions.get_mut(&id) else {
                return;
            };
            if session.exit.is_some() {
                return;
            }
            if !session.step.can_transition_to(target) {
                warn!(
                    session_id = %id,
                    from = %session.step,
                    to = %target,
                    "Step change no longer valid, dropping"
                );
                return;
            }
            session.step = target;
            session.transition = TransitionState::Entering;
            session.updated_at = Utc::now();
            progress = target.progress();
        }

        let _ = self.tx.send(FunnelEvent::StepChanged {
            id,
            step: target,
            transition: TransitionState::Entering,
            progress,
        });
    }

    async fn settle_transition(&self, id: Uuid) {
        {
            let mut sessions = self.sessions.write().await;
            let Some(session) = sessions.get_mut(&id) else {
                return;
            };
            if session.transition != TransitionState::Entering {
                return;
            }
            session.transition = TransitionState::Idle;
            session.updated_at = Utc::now();
        }

        let _ = self.tx.send(FunnelEvent::TransitionChanged {
            id,
            transition: TransitionState::Idle,
        });
    }

    /// Positive path: after the notice delay flag the redirect, after the
    /// fire delay resolve the URL and emit the navigations exactly once.
    fn spawn_redirect_sequence(self: &Arc<Self>, id: Uuid) {
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(hub.config.redirect_notice).await;
            if !hub.mark_redirecting(id).await {
                return;
            }
            tokio::time::sleep(hub.config.redirect_fire).await;
            hub.fire_redirect(id).await;
        });
    }

    async fn mark_redirecting(&self, id: Uuid) -> bool {
        {
            let mut sessions = self.sessions.write().await;
            let Some(session) = sessions.get_mut(&id) else {
                return false;
            };
            if session.exit.is_some() {
                return false;
            }
            session.redirecting = true;
            session.updated_at = Utc::now();
        }

        let _ = self.tx.send(FunnelEvent::RedirectPending { id });
        true
    }

    async fn fire_redirect(&self, id: Uuid) {
        let url = {
            let mut sessions = self.sessions.write().await;
            let Some(session) = sessions.get_mut(&id) else {
                return;
            };
            if session.exit.is_some() {
                return;
            }
            let country = session
                .submission
                .as_ref()
                .map(|s| s.country.as_str())
                .unwrap_or(marketplace::DEFAULT_COUNTRY);
            let url = marketplace::review_url(country);
            session.redirect_url = Some(url.clone());
            session.redirecting = false;
            session.exit = Some(FunnelExit::Redirected);
            session.updated_at = Utc::now();
            url
        };

        info!(session_id = %id, url = %url, "Redirecting visitor to marketplace");

        let _ = self.tx.send(FunnelEvent::Navigate {
            id,
            navigation: Navigation::OpenExternal { url },
        });
        let _ = self.tx.send(FunnelEvent::Navigate {
            id,
            navigation: Navigation::GoHome,
        });
        let _ = self.tx.send(FunnelEvent::Exited {
            id,
            exit: FunnelExit::Redirected,
        });
    }
}

/// Spawn a background task that periodically drops idle sessions.
pub fn spawn_expiry_task(hub: Arc<FunnelHub>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            hub.expire_idle().await;
        }
    })
}
