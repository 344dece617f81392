//! Campaign form data: the draft a vendor submits and its validation.

use serde::{Deserialize, Serialize};

use crate::api::Campaign;
use crate::error::FieldErrors;
use crate::marketplace;

use super::link::QrRequest;

/// Whether a campaign is live. The upstream stores this as the strings
/// `YES` / `NO` rather than a boolean; kept as-is on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CampaignStatus {
    Yes,
    No,
}

impl Default for CampaignStatus {
    fn default() -> Self {
        Self::Yes
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            _ => Err(format!("Unknown campaign status: {s}")),
        }
    }
}

impl CampaignStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// What the dashboard submits when creating or updating a campaign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub promotion_id: String,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub marketplaces: Vec<String>,
    #[serde(default)]
    pub is_active: CampaignStatus,
}

impl CampaignDraft {
    /// Validate the draft, reporting every problem at once.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.title.trim().is_empty() {
            errors.insert("title".into(), "Campaign title is required".into());
        }
        if self.promotion_id.trim().is_empty() {
            errors.insert("promotion_id".into(), "Please select a promotion".into());
        }
        if self.product_ids.is_empty() {
            errors.insert(
                "product_ids".into(),
                "Please select at least one product".into(),
            );
        }
        if self.marketplaces.is_empty() {
            errors.insert(
                "marketplaces".into(),
                "Please select at least one marketplace".into(),
            );
        } else if let Some(unknown) = self
            .marketplaces
            .iter()
            .find(|m| !marketplace::is_catalog_code(m))
        {
            errors.insert(
                "marketplaces".into(),
                format!("Unknown marketplace: {unknown}"),
            );
        }

        errors
    }
}

/// A campaign as served to the dashboard: the upstream record plus the
/// share link and the payload the external QR renderer needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignView {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub share_url: String,
    pub qr: QrRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CampaignDraft {
        CampaignDraft {
            title: "Summer Kitchen Sale".into(),
            promotion_id: "1".into(),
            product_ids: vec!["1".into(), "4".into()],
            marketplaces: vec!["US".into(), "CA".into(), "GB".into()],
            is_active: CampaignStatus::Yes,
        }
    }

    #[test]
    fn complete_draft_passes() {
        assert!(draft().validate().is_empty());
    }

    #[test]
    fn all_problems_reported_at_once() {
        let errors = CampaignDraft::default().validate();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("promotion_id"));
        assert!(errors.contains_key("product_ids"));
        assert!(errors.contains_key("marketplaces"));
    }

    #[test]
    fn unknown_marketplace_rejected() {
        let bad = CampaignDraft {
            marketplaces: vec!["US".into(), "XX".into()],
            ..draft()
        };
        let errors = bad.validate();
        assert_eq!(
            errors.get("marketplaces").unwrap(),
            "Unknown marketplace: XX"
        );
    }

    #[test]
    fn marketplace_codes_are_case_insensitive() {
        let lower = CampaignDraft {
            marketplaces: vec!["us".into()],
            ..draft()
        };
        assert!(lower.validate().is_empty());
    }

    #[test]
    fn status_wire_format() {
        assert_eq!(serde_json::to_string(&CampaignStatus::Yes).unwrap(), "\"YES\"");
        assert_eq!(serde_json::to_string(&CampaignStatus::No).unwrap(), "\"NO\"");
        assert_eq!("YES".parse::<CampaignStatus>().unwrap(), CampaignStatus::Yes);
        assert!("maybe".parse::<CampaignStatus>().is_err());
        assert!(CampaignStatus::default().is_active());
    }

    #[test]
    fn draft_deserializes_dashboard_shape() {
        let json = r#"{
            "title": "Holiday Push",
            "promotionId": "p_2",
            "productIds": ["1"],
            "marketplaces": ["DE"],
            "isActive": "NO"
        }"#;
        let draft: CampaignDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.promotion_id, "p_2");
        assert_eq!(draft.is_active, CampaignStatus::No);
        assert!(draft.validate().is_empty());
    }
}
