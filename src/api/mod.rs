//! Upstream vendor API — the backend that owns campaigns, products,
//! promotions, and user accounts.
//!
//! Consumed as a black box through the [`VendorApi`] trait. The wire shapes
//! here mirror the upstream's JSON (camelCase keys, paged list envelopes,
//! access/refresh token pairs). [`rest::RestApi`] is the reqwest
//! implementation; tests substitute their own.

pub mod rest;

pub use rest::RestApi;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::campaigns::model::CampaignStatus;
use crate::error::ApiError;

/// A user account as the upstream reports it.
///
/// `role` is `USER` for vendors and `ADMIN` for administrators — the
/// upstream's naming, preserved on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub company_id: Option<String>,
}

/// Upstream account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// A vendor account (the upstream calls vendors "USER").
    User,
    /// A platform administrator.
    Admin,
}

impl UserRecord {
    pub fn is_vendor(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// One bearer token with its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub token: String,
    #[serde(default)]
    pub expires: Option<chrono::DateTime<chrono::Utc>>,
}

/// Access/refresh token pair returned by login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: TokenRecord,
    pub refresh: TokenRecord,
}

/// Successful login response: the account plus its tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserRecord,
    pub tokens: TokenPair,
}

/// Paged list envelope the upstream wraps collections in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_count: u64,
}

/// A product a vendor can attach to a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A promotion offered in exchange for a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: String,
    pub title: String,
}

/// A campaign as stored upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub promotion_id: String,
    pub product_ids: Vec<String>,
    pub marketplaces: Vec<String>,
    pub is_active: CampaignStatus,
    /// Share-link slug, generated at create time.
    #[serde(default)]
    pub slug: Option<String>,
}

/// Create/update payload for a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPayload {
    pub title: String,
    pub is_active: CampaignStatus,
    pub promotion_id: String,
    pub product_ids: Vec<String>,
    pub marketplaces: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// The upstream endpoints this service consumes.
///
/// No retry policy: failures surface synchronously and the caller decides
/// what to tell the user.
#[async_trait]
pub trait VendorApi: Send + Sync {
    /// Exchange credentials for an account and a token pair.
    async fn login(&self, email: &str, password: &SecretString)
    -> Result<LoginResponse, ApiError>;

    /// Register a new vendor account.
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<UserRecord, ApiError>;

    /// Invalidate a refresh token upstream.
    async fn logout(&self, refresh_token: &SecretString) -> Result<(), ApiError>;

    /// Products belonging to a company.
    async fn products(&self, access_token: &str, company_id: &str)
    -> Result<Paged<Product>, ApiError>;

    /// Promotions belonging to a company.
    async fn promotions(
        &self,
        access_token: &str,
        company_id: &str,
    ) -> Result<Paged<Promotion>, ApiError>;

    /// Campaigns belonging to a company.
    async fn campaigns(
        &self,
        access_token: &str,
        company_id: &str,
    ) -> Result<Paged<Campaign>, ApiError>;

    /// One campaign by id.
    async fn campaign(&self, access_token: &str, id: &str) -> Result<Campaign, ApiError>;

    /// Create a campaign.
    async fn create_campaign(
        &self,
        access_token: &str,
        payload: &CampaignPayload,
    ) -> Result<Campaign, ApiError>;

    /// Update an existing campaign.
    async fn update_campaign(
        &self,
        access_token: &str,
        id: &str,
        payload: &CampaignPayload,
    ) -> Result<Campaign, ApiError>;
}
