//! Share links: slug generation and the QR payload handed to the external
//! renderer.
//!
//! The rng is injected so tests can seed it and assert exact output.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of a campaign share slug.
pub const SLUG_LEN: usize = 8;

/// Characters a slug is drawn from.
const SLUG_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a share slug: 8 uppercase alphanumeric characters.
pub fn campaign_slug(rng: &mut impl Rng) -> String {
    (0..SLUG_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..SLUG_ALPHABET.len());
            SLUG_ALPHABET[idx] as char
        })
        .collect()
}

/// Public funnel URL for a slug.
pub fn share_url(public_base: &str, slug: &str) -> String {
    format!("{}/review/{}", public_base.trim_end_matches('/'), slug)
}

/// Payload for the external QR-code renderer. Image generation happens
/// client-side; this is only the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrRequest {
    pub value: String,
    pub size: u32,
    pub bg_color: String,
    pub fg_color: String,
    pub level: String,
    pub include_margin: bool,
}

impl QrRequest {
    /// Standard campaign QR: 200px, black on white, high error correction.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            value: url.into(),
            size: 200,
            bg_color: "#FFFFFF".into(),
            fg_color: "#000000".into(),
            level: "H".into(),
            include_margin: true,
        }
    }
}
