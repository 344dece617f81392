//! Review recorder — a long-lived task that subscribes to funnel events
//! and performs the slow side effects off the hot path.
//!
//! Persistence and email never block a step transition: a store failure is
//! a logged notice, the visitor's funnel carries on regardless. Capture is
//! idempotent on the session id, so a replayed Submitted event cannot
//! create a duplicate row.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::notify::FollowUpMailer;
use crate::store::{ReviewRecord, ReviewStore};

use super::hub::{FunnelEvent, FunnelHub};
use super::state::FunnelExit;

/// Spawn the recorder task. It runs until the hub's event channel closes.
pub fn spawn_review_recorder(
    hub: Arc<FunnelHub>,
    store: Arc<dyn ReviewStore>,
    mailer: Option<Arc<FollowUpMailer>>,
) -> tokio::task::JoinHandle<()> {
    let mut rx = hub.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => handle_event(&hub, &store, mailer.as_ref(), event).await,
                Err(RecvError::Lagged(missed)) => {
                    // Dropped events mean dropped captures; worth a loud note.
                    warn!(missed, "Review recorder lagged behind funnel events");
                }
                Err(RecvError::Closed) => {
                    debug!("Funnel event channel closed, recorder stopping");
                    break;
                }
            }
        }
    })
}

async fn handle_event(
    hub: &Arc<FunnelHub>,
    store: &Arc<dyn ReviewStore>,
    mailer: Option<&Arc<FollowUpMailer>>,
    event: FunnelEvent,
) {
    match event {
        FunnelEvent::Submitted {
            id,
            campaign_id,
            submission,
        } => {
            let record = ReviewRecord::from_submission(id, &campaign_id, &submission);
            match store.insert_review(&record).await {
                Ok(true) => {
                    info!(
                        session_id = %id,
                        campaign_id = %campaign_id,
                        rating = submission.rating,
                        "Review captured"
                    );
                }
                Ok(false) => {
                    debug!(session_id = %id, "Review already captured, skipping");
                }
                Err(e) => {
                    // Non-blocking by contract: the funnel already moved on.
                    warn!(session_id = %id, error = %e, "Failed to capture review");
                }
            }
        }

        FunnelEvent::Exited {
            id,
            exit: FunnelExit::WentHome,
        } => {
            let Some(mailer) = mailer else {
                return;
            };
            let Some(snapshot) = hub.snapshot(id).await else {
                return;
            };
            let Some(submission) = snapshot.submission else {
                return;
            };

            let mailer = Arc::clone(mailer);
            let vendor = snapshot.context.vendor.clone();
            let product = snapshot.context.product_name.clone();
            let result = tokio::task::spawn_blocking(move || {
                mailer.send_follow_up(&submission.email, &submission.name, &vendor, &product)
            })
            .await;

            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(session_id = %id, error = %e, "Follow-up email failed")
                }
                Err(e) => warn!(session_id = %id, error = %e, "Follow-up task panicked"),
            }
        }

        _ => {}
    }
}
