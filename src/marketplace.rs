//! Marketplace tables: the review-redirect resolver used by the funnel and
//! the country catalog vendors pick from when building a campaign.

use serde::{Deserialize, Serialize};

/// Path appended to a storefront domain to reach its "write a review" page.
pub const REVIEW_PATH: &str = "/review/create-review";

/// Country code used when a funnel submission carries an unknown country.
pub const DEFAULT_COUNTRY: &str = "us";

/// Storefront domains the funnel can redirect to, keyed by lowercase
/// country code. Fixed set; unknown codes fall back to `us`.
static REVIEW_DOMAINS: &[(&str, &str)] = &[
    ("us", "https://www.amazon.com"),
    ("ca", "https://www.amazon.ca"),
    ("uk", "https://www.amazon.co.uk"),
    ("de", "https://www.amazon.de"),
    ("fr", "https://www.amazon.fr"),
    ("jp", "https://www.amazon.co.jp"),
    ("au", "https://www.amazon.com.au"),
];

/// Look up the storefront domain for a country code (case-insensitive).
/// Unknown codes resolve to the `us` storefront rather than failing.
pub fn storefront_domain(country: &str) -> &'static str {
    let code = country.trim().to_ascii_lowercase();
    REVIEW_DOMAINS
        .iter()
        .find(|(c, _)| *c == code)
        .or_else(|| REVIEW_DOMAINS.iter().find(|(c, _)| *c == DEFAULT_COUNTRY))
        .map(|(_, domain)| *domain)
        .unwrap_or("https://www.amazon.com")
}

/// Full URL of the public review-creation page for a country.
pub fn review_url(country: &str) -> String {
    format!("{}{}", storefront_domain(country), REVIEW_PATH)
}

/// A marketplace a vendor can attach a campaign to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceCountry {
    pub code: &'static str,
    pub name: &'static str,
}

/// All marketplaces selectable in the campaign form.
static CATALOG: &[MarketplaceCountry] = &[
    MarketplaceCountry { code: "US", name: "United States" },
    MarketplaceCountry { code: "CA", name: "Canada" },
    MarketplaceCountry { code: "MX", name: "Mexico" },
    MarketplaceCountry { code: "GB", name: "United Kingdom" },
    MarketplaceCountry { code: "FR", name: "France" },
    MarketplaceCountry { code: "DE", name: "Germany" },
    MarketplaceCountry { code: "IT", name: "Italy" },
    MarketplaceCountry { code: "ES", name: "Spain" },
    MarketplaceCountry { code: "IN", name: "India" },
    MarketplaceCountry { code: "JP", name: "Japan" },
    MarketplaceCountry { code: "NL", name: "Netherlands" },
    MarketplaceCountry { code: "SE", name: "Sweden" },
    MarketplaceCountry { code: "AU", name: "Australia" },
    MarketplaceCountry { code: "BR", name: "Brazil" },
    MarketplaceCountry { code: "SG", name: "Singapore" },
    MarketplaceCountry { code: "TR", name: "Turkey" },
    MarketplaceCountry { code: "SA", name: "Saudi Arabia" },
    MarketplaceCountry { code: "AE", name: "United Arab Emirates" },
    MarketplaceCountry { code: "PL", name: "Poland" },
    MarketplaceCountry { code: "EG", name: "Egypt" },
    MarketplaceCountry { code: "ZA", name: "South Africa" },
];

/// The vendor-facing marketplace catalog, in display order.
pub fn catalog() -> &'static [MarketplaceCountry] {
    CATALOG
}

/// Whether a code names a marketplace in the catalog (case-insensitive).
pub fn is_catalog_code(code: &str) -> bool {
    CATALOG.iter().any(|m| m.code.eq_ignore_ascii_case(code))
}

/// Display name for a catalog code, if known.
pub fn catalog_name(code: &str) -> Option<&'static str> {
    CATALOG
        .iter()
        .find(|m| m.code.eq_ignore_ascii_case(code))
        .map(|m| m.name)
}
