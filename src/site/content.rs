//! Static marketing content: hero, features, how-it-works, pricing, FAQ.
//!
//! Kept as typed values rather than loose JSON so the prices stay Decimal
//! and a renamed field breaks at compile time instead of in the page.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Hero block at the top of the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroContent {
    pub headline: &'static str,
    pub subheadline: &'static str,
    pub cta_label: &'static str,
    pub cta_href: &'static str,
}

/// One entry in the features grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

/// One numbered step in the how-it-works strip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HowItWorksStep {
    pub step: u8,
    pub title: &'static str,
    pub description: &'static str,
}

/// A feature row inside a pricing tier, shown with a check or a cross.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanFeature {
    pub name: &'static str,
    pub included: bool,
}

/// A pricing tier. Prices are per month; the annual price is what a
/// yearly commitment costs per month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingTier {
    pub title: &'static str,
    pub monthly_price: Decimal,
    pub annual_price: Decimal,
    pub description: &'static str,
    pub features: Vec<PlanFeature>,
    pub cta: &'static str,
    pub most_popular: bool,
}

/// A question/answer pair on the FAQ section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

pub fn hero() -> HeroContent {
    HeroContent {
        headline: "Turn happy customers into public reviews",
        subheadline: "ReviewBrothers routes your satisfied Amazon buyers straight to the \
                      marketplace review page — and catches unhappy ones before they get there.",
        cta_label: "Get Started for Free",
        cta_href: "/auth/signup",
    }
}

pub fn features() -> Vec<Feature> {
    vec![
        Feature {
            title: "QR-coded campaigns",
            description: "Bundle products, a promotion, and target marketplaces behind one \
                          shareable link with a printable QR code.",
        },
        Feature {
            title: "Smart review funnel",
            description: "A three-step flow that collects a star rating and contact details, \
                          then sends 4- and 5-star customers to the marketplace review page.",
        },
        Feature {
            title: "Negative feedback gate",
            description: "Lower ratings stay in your private inbox as leads, so you hear the \
                          complaint before the marketplace does.",
        },
        Feature {
            title: "All major marketplaces",
            description: "Route reviews to the right storefront across 21 Amazon marketplaces, \
                          from the US to South Africa.",
        },
    ]
}

pub fn how_it_works() -> Vec<HowItWorksStep> {
    vec![
        HowItWorksStep {
            step: 1,
            title: "Create a campaign",
            description: "Pick your products, attach a promotion, and choose the marketplaces \
                          you sell in.",
        },
        HowItWorksStep {
            step: 2,
            title: "Share the QR code",
            description: "Print the code on your packaging insert or share the campaign link \
                          directly with buyers.",
        },
        HowItWorksStep {
            step: 3,
            title: "Collect the reviews",
            description: "Happy customers land on the marketplace review page; everyone else \
                          lands in your inbox.",
        },
    ]
}

pub fn pricing_tiers() -> Vec<PricingTier> {
    vec![
        PricingTier {
            title: "Silver",
            monthly_price: dec!(59),
            annual_price: dec!(49),
            description: "Great for small vendors starting out",
            features: vec![
                PlanFeature { name: "Unlimited Reviews", included: true },
                PlanFeature { name: "Unlimited Leads", included: true },
                PlanFeature { name: "1 Campaign", included: true },
                PlanFeature { name: "1 Promotion", included: true },
                PlanFeature { name: "1 Product", included: true },
                PlanFeature { name: "1 Marketplace", included: true },
                PlanFeature { name: "Collect Seller Feedback", included: false },
                PlanFeature { name: "Meta Pixel Support", included: false },
                PlanFeature { name: "Business Features", included: false },
            ],
            cta: "Start with Silver",
            most_popular: false,
        },
        PricingTier {
            title: "Gold",
            monthly_price: dec!(99),
            annual_price: dec!(79),
            description: "For growing businesses expanding their reach",
            features: vec![
                PlanFeature { name: "Unlimited Reviews", included: true },
                PlanFeature { name: "Unlimited Leads", included: true },
                PlanFeature { name: "Unlimited Campaigns", included: true },
                PlanFeature { name: "10 Promotions", included: true },
                PlanFeature { name: "30 Products", included: true },
                PlanFeature { name: "All Marketplaces", included: true },
                PlanFeature { name: "Collect Seller Feedback", included: true },
                PlanFeature { name: "Personalized Branding", included: true },
                PlanFeature { name: "Meta Pixel Support", included: true },
            ],
            cta: "Start with Gold",
            most_popular: true,
        },
        PricingTier {
            title: "Platinum",
            monthly_price: dec!(199),
            annual_price: dec!(179),
            description: "For established businesses scaling at full speed",
            features: vec![
                PlanFeature { name: "Unlimited Reviews", included: true },
                PlanFeature { name: "Unlimited Leads", included: true },
                PlanFeature { name: "Unlimited Campaigns", included: true },
                PlanFeature { name: "Unlimited Promotions", included: true },
                PlanFeature { name: "Unlimited Products", included: true },
                PlanFeature { name: "All Marketplaces", included: true },
                PlanFeature { name: "Collect Seller Feedback", included: true },
                PlanFeature { name: "Personalized Branding", included: true },
                PlanFeature { name: "Meta Pixel Support", included: true },
                PlanFeature { name: "Multiple Sub-Accounts", included: true },
            ],
            cta: "Start with Platinum",
            most_popular: false,
        },
    ]
}

pub fn faq() -> Vec<FaqEntry> {
    vec![
        FaqEntry {
            question: "Is this compliant with marketplace review policies?",
            answer: "The funnel never conditions the promotion on a positive review. Every \
                     customer who completes the form receives the same offer; only the final \
                     redirect differs by satisfaction.",
        },
        FaqEntry {
            question: "What happens to ratings below four stars?",
            answer: "They are stored privately in your leads inbox together with the \
                     customer's contact details, so you can resolve the issue directly.",
        },
        FaqEntry {
            question: "Do my customers need an account?",
            answer: "No. The funnel asks for a star rating, a name, and an email — nothing \
                     else, and no signup.",
        },
        FaqEntry {
            question: "Which marketplaces are supported?",
            answer: "Campaigns can target 21 Amazon marketplaces. The review redirect \
                     currently routes to seven storefronts and falls back to amazon.com for \
                     the rest.",
        },
        FaqEntry {
            question: "Can I try it without a credit card?",
            answer: "Yes — every plan starts with a free trial, no credit card required.",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_has_three_tiers_with_annual_discount() {
        let tiers = pricing_tiers();
        assert_eq!(tiers.len(), 3);
        for tier in &tiers {
            assert!(
                tier.annual_price < tier.monthly_price,
                "{} annual price should undercut monthly",
                tier.title
            );
            assert!(!tier.features.is_empty());
        }
        assert_eq!(tiers.iter().filter(|t| t.most_popular).count(), 1);
        assert_eq!(tiers[1].title, "Gold");
        assert_eq!(tiers[1].annual_price, dec!(79));
    }

    #[test]
    fn content_serializes() {
        // The SPA reads these shapes verbatim; a serialization failure here
        // means a blank page there.
        serde_json::to_value(hero()).unwrap();
        serde_json::to_value(features()).unwrap();
        serde_json::to_value(how_it_works()).unwrap();
        serde_json::to_value(pricing_tiers()).unwrap();
        serde_json::to_value(faq()).unwrap();
    }

    #[test]
    fn how_it_works_steps_are_ordered() {
        let steps = how_it_works();
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.step as usize, i + 1);
        }
    }
}
