//! REST surface for the marketing site content.

use axum::{
    Json, Router,
    extract::Query,
    routing::get,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use super::content;
use super::stars::{self, DEFAULT_STAR_COUNT};

/// Build the marketing content routes. Stateless.
pub fn site_routes() -> Router {
    Router::new()
        .route("/api/site/hero", get(hero))
        .route("/api/site/features", get(features))
        .route("/api/site/how-it-works", get(how_it_works))
        .route("/api/site/pricing", get(pricing))
        .route("/api/site/faq", get(faq))
        .route("/api/site/stars", get(star_field))
}

async fn hero() -> Json<content::HeroContent> {
    Json(content::hero())
}

async fn features() -> Json<Vec<content::Feature>> {
    Json(content::features())
}

async fn how_it_works() -> Json<Vec<content::HowItWorksStep>> {
    Json(content::how_it_works())
}

async fn pricing() -> Json<Vec<content::PricingTier>> {
    Json(content::pricing_tiers())
}

async fn faq() -> Json<Vec<content::FaqEntry>> {
    Json(content::faq())
}

#[derive(Debug, Deserialize)]
struct StarQuery {
    count: Option<usize>,
}

/// GET /api/site/stars?count=N
async fn star_field(Query(query): Query<StarQuery>) -> Json<Vec<stars::FloatingStar>> {
    let count = query.count.unwrap_or(DEFAULT_STAR_COUNT);
    let mut rng = StdRng::from_entropy();
    Json(stars::star_field(count, &mut rng))
}
