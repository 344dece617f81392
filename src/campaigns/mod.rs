//! Vendor campaign management: drafts, share links, and the dashboard
//! operations over the upstream API.

pub mod link;
pub mod manager;
pub mod model;
pub mod routes;

pub use link::{QrRequest, SLUG_LEN, campaign_slug, share_url};
pub use manager::CampaignManager;
pub use model::{CampaignDraft, CampaignStatus, CampaignView};
pub use routes::{CampaignRouteState, campaign_routes};
