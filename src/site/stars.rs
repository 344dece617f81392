//! Decorative floating stars for the pricing cards.
//!
//! The rng is injected so the field is deterministic under a seed; the
//! client only applies the values, it never rolls its own.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default number of stars when the client does not ask for a count.
pub const DEFAULT_STAR_COUNT: usize = 8;

/// Upper bound on a requested star count.
pub const MAX_STAR_COUNT: usize = 200;

/// One decorative star: pixel size, position as a percentage of the
/// container, and animation delay in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingStar {
    pub size: u8,
    pub top: f32,
    pub left: f32,
    pub delay: f32,
}

/// Generate `count` stars: 12-21 px, positioned within the top-left 90%
/// of the container, with a 0-5 s animation delay.
pub fn star_field(count: usize, rng: &mut impl Rng) -> Vec<FloatingStar> {
    (0..count.min(MAX_STAR_COUNT))
        .map(|_| FloatingStar {
            size: rng.gen_range(12..22),
            top: rng.gen_range(0.0..90.0),
            left: rng.gen_range(0.0..90.0),
            delay: rng.gen_range(0.0..5.0),
        })
        .collect()
}
