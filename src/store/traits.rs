//! Review store trait — the local inbox every funnel submission lands in.
//!
//! The upstream API owns campaigns, products, promotions, and users; the
//! captured reviews/leads are owned here. Positive ratings are also relayed
//! to the marketplace, but both ends of the scale are persisted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::funnel::ReviewSubmission;

/// One captured funnel submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub id: Uuid,
    /// The funnel session that produced this record. Unique: a double
    /// submit cannot create a second row.
    pub session_id: Uuid,
    pub campaign_id: String,
    pub rating: u8,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub country: String,
    pub submitted_at: DateTime<Utc>,
}

impl ReviewRecord {
    /// Build a record from an accepted submission.
    pub fn from_submission(
        session_id: Uuid,
        campaign_id: &str,
        submission: &ReviewSubmission,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            campaign_id: campaign_id.to_string(),
            rating: submission.rating,
            name: submission.name.clone(),
            email: submission.email.clone(),
            phone_number: submission.phone_number.clone(),
            country: submission.country.clone(),
            submitted_at: Utc::now(),
        }
    }
}

/// Backend-agnostic review inbox.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), StoreError>;

    /// Insert a review. Idempotent on `session_id`: returns `true` when a
    /// row was actually written, `false` when the session was already
    /// captured.
    async fn insert_review(&self, record: &ReviewRecord) -> Result<bool, StoreError>;

    /// Most recent reviews across all campaigns.
    async fn recent_reviews(&self, limit: usize) -> Result<Vec<ReviewRecord>, StoreError>;

    /// Reviews for one campaign, most recent first.
    async fn reviews_for_campaign(
        &self,
        campaign_id: &str,
        limit: usize,
    ) -> Result<Vec<ReviewRecord>, StoreError>;

    /// Total captured reviews.
    async fn review_count(&self) -> Result<u64, StoreError>;
}
