//! libSQL backend — async [`ReviewStore`] implementation.
//!
//! Supports local file and in-memory databases. Timestamps are written as
//! RFC 3339 and read back tolerantly (SQLite's own `datetime()` format is
//! accepted too).

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::{ReviewRecord, ReviewStore};

/// libSQL review inbox.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlReviews {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlReviews {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Review store opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Map a libsql row to a ReviewRecord.
///
/// Column order: 0:id, 1:session_id, 2:campaign_id, 3:rating, 4:name,
/// 5:email, 6:phone_number, 7:country, 8:submitted_at
fn row_to_review(row: &libsql::Row) -> Result<ReviewRecord, StoreError> {
    let read = |e: libsql::Error| StoreError::Query(format!("Failed to read review row: {e}"));

    let id_str: String = row.get(0).map_err(read)?;
    let session_str: String = row.get(1).map_err(read)?;
    let campaign_id: String = row.get(2).map_err(read)?;
    let rating: i64 = row.get(3).map_err(read)?;
    let name: String = row.get(4).map_err(read)?;
    let email: String = row.get(5).map_err(read)?;
    let phone_number: Option<String> = row.get(6).ok();
    let country: String = row.get(7).map_err(read)?;
    let submitted_str: String = row.get(8).map_err(read)?;

    Ok(ReviewRecord {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
        session_id: Uuid::parse_str(&session_str).unwrap_or_else(|_| Uuid::nil()),
        campaign_id,
        rating: rating.clamp(1, 5) as u8,
        name,
        email,
        phone_number,
        country,
        submitted_at: parse_datetime(&submitted_str),
    })
}

const REVIEW_COLUMNS: &str =
    "id, session_id, campaign_id, rating, name, email, phone_number, country, submitted_at";

#[async_trait]
impl ReviewStore for LibSqlReviews {
    async fn run_migrations(&self) -> Result<(), StoreError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn insert_review(&self, record: &ReviewRecord) -> Result<bool, StoreError> {
        let affected = self
            .conn()
            .execute(
                "INSERT OR IGNORE INTO reviews
                 (id, session_id, campaign_id, rating, name, email, phone_number, country, submitted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.id.to_string(),
                    record.session_id.to_string(),
                    record.campaign_id.as_str(),
                    record.rating as i64,
                    record.name.as_str(),
                    record.email.as_str(),
                    record.phone_number.clone(),
                    record.country.as_str(),
                    record.submitted_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to insert review: {e}")))?;

        Ok(affected > 0)
    }

    async fn recent_reviews(&self, limit: usize) -> Result<Vec<ReviewRecord>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY submitted_at DESC LIMIT ?1"
                ),
                params![limit as i64],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to query reviews: {e}")))?;

        let mut reviews = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to read reviews: {e}")))?
        {
            reviews.push(row_to_review(&row)?);
        }
        Ok(reviews)
    }

    async fn reviews_for_campaign(
        &self,
        campaign_id: &str,
        limit: usize,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews
                     WHERE campaign_id = ?1 ORDER BY submitted_at DESC LIMIT ?2"
                ),
                params![campaign_id, limit as i64],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to query campaign reviews: {e}")))?;

        let mut reviews = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to read campaign reviews: {e}")))?
        {
            reviews.push(row_to_review(&row)?);
        }
        Ok(reviews)
    }

    async fn review_count(&self) -> Result<u64, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM reviews", ())
            .await
            .map_err(|e| StoreError::Query(format!("Failed to count reviews: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to read review count: {e}")))?;

        match row {
            Some(row) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("Failed to parse count: {e}")))?;
                Ok(count as u64)
            }
            None => Ok(0),
        }
    }
}
