//! Campaign operations for a signed-in vendor, coordinated over the
//! upstream API.

use std::sync::Arc;

use rand::Rng;
use tracing::info;

use crate::api::{Campaign, CampaignPayload, Paged, Product, Promotion, VendorApi};
use crate::auth::Session;
use crate::error::Error;

use super::link::{QrRequest, campaign_slug, share_url};
use super::model::{CampaignDraft, CampaignView};

/// Dashboard operations over the vendor's company data.
///
/// Every operation requires the session's account to belong to a company;
/// callers validate drafts before handing them in.
pub struct CampaignManager {
    api: Arc<dyn VendorApi>,
    public_base: String,
}

impl CampaignManager {
    pub fn new(api: Arc<dyn VendorApi>, public_base: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            api,
            public_base: public_base.into(),
        })
    }

    /// Products the vendor can attach to a campaign.
    pub async fn products(&self, session: &Session) -> Result<Paged<Product>, Error> {
        let company_id = session.company_id()?;
        let page = self
            .api
            .products(session.access_token_str(), company_id)
            .await?;
        Ok(page)
    }

    /// Promotions the vendor can attach to a campaign.
    pub async fn promotions(&self, session: &Session) -> Result<Paged<Promotion>, Error> {
        let company_id = session.company_id()?;
        let page = self
            .api
            .promotions(session.access_token_str(), company_id)
            .await?;
        Ok(page)
    }

    /// All campaigns of the vendor's company, with share links attached.
    pub async fn list(&self, session: &Session) -> Result<Vec<CampaignView>, Error> {
        let company_id = session.company_id()?;
        let page = self
            .api
            .campaigns(session.access_token_str(), company_id)
            .await?;
        Ok(page.data.into_iter().map(|c| self.view(c)).collect())
    }

    /// One campaign by id.
    pub async fn get(&self, session: &Session, id: &str) -> Result<CampaignView, Error> {
        session.company_id()?;
        let campaign = self.api.campaign(session.access_token_str(), id).await?;
        Ok(self.view(campaign))
    }

    /// Create a campaign from a validated draft.
    ///
    /// The share slug is rolled here, once, and persisted with the campaign
    /// so the URL never changes on re-display.
    pub async fn create(
        &self,
        session: &Session,
        draft: CampaignDraft,
        rng: &mut (impl Rng + Send),
    ) -> Result<CampaignView, Error> {
        session.company_id()?;

        let slug = campaign_slug(rng);
        let payload = CampaignPayload {
            title: draft.title,
            is_active: draft.is_active,
            promotion_id: draft.promotion_id,
            product_ids: draft.product_ids,
            marketplaces: draft.marketplaces,
            slug: Some(slug.clone()),
        };

        let campaign = self
            .api
            .create_campaign(session.access_token_str(), &payload)
            .await?;

        info!(campaign_id = %campaign.id, slug = %slug, "Campaign created");
        Ok(self.view(campaign))
    }

    /// Update an existing campaign. The slug is left untouched upstream.
    pub async fn update(
        &self,
        session: &Session,
        id: &str,
        draft: CampaignDraft,
    ) -> Result<CampaignView, Error> {
        session.company_id()?;

        let payload = CampaignPayload {
            title: draft.title,
            is_active: draft.is_active,
            promotion_id: draft.promotion_id,
            product_ids: draft.product_ids,
            marketplaces: draft.marketplaces,
            slug: None,
        };

        let campaign = self
            .api
            .update_campaign(session.access_token_str(), id, &payload)
            .await?;

        info!(campaign_id = %campaign.id, "Campaign updated");
        Ok(self.view(campaign))
    }

    /// Attach the share link and QR payload to an upstream record.
    ///
    /// Legacy campaigns created before slugs fall back to the id, which is
    /// what their printed QR codes already point at.
    fn view(&self, campaign: Campaign) -> CampaignView {
        let key = campaign.slug.clone().unwrap_or_else(|| campaign.id.clone());
        let url = share_url(&self.public_base, &key);
        CampaignView {
            campaign,
            qr: QrRequest::for_url(url.clone()),
            share_url: url,
        }
    }
}

impl Session {
    /// The upstream access token as a borrowed string, for API calls made
    /// on this session's behalf.
    pub(crate) fn access_token_str(&self) -> &str {
        use secrecy::ExposeSecret;
        self.access_token.expose_secret()
    }
}
