//! Funnel step machine. Three steps, strictly linear, no going back.

use serde::{Deserialize, Serialize};

/// Lowest rating that counts as positive and qualifies for the
/// marketplace redirect.
pub const POSITIVE_RATING_MIN: u8 = 4;

/// Whether a rating qualifies for the marketplace redirect.
pub fn is_positive(rating: u8) -> bool {
    rating >= POSITIVE_RATING_MIN
}

/// The steps of the review funnel.
///
/// Progresses linearly: Rating → Outcome → FollowUp. Positive journeys
/// never reach FollowUp; they exit from Outcome via redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStep {
    Rating,
    Outcome,
    FollowUp,
}

impl FunnelStep {
    /// 1-based step number shown to the visitor.
    pub fn number(&self) -> u8 {
        match self {
            Self::Rating => 1,
            Self::Outcome => 2,
            Self::FollowUp => 3,
        }
    }

    /// Progress percentage for the step indicator: 33 / 67 / 100.
    ///
    /// Derived from the step number, never stored or set directly.
    pub fn progress(&self) -> u8 {
        (f64::from(self.number()) / 3.0 * 100.0).round() as u8
    }

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: FunnelStep) -> bool {
        use FunnelStep::*;
        matches!((self, target), (Rating, Outcome) | (Outcome, FollowUp))
    }

    /// The next step in the linear progression, if any.
    pub fn next(&self) -> Option<FunnelStep> {
        use FunnelStep::*;
        match self {
            Rating => Some(Outcome),
            Outcome => Some(FollowUp),
            FollowUp => None,
        }
    }

    /// Whether this is the last step.
    pub fn is_last(&self) -> bool {
        matches!(self, Self::FollowUp)
    }
}

impl Default for FunnelStep {
    fn default() -> Self {
        Self::Rating
    }
}

impl std::fmt::Display for FunnelStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rating => "rating",
            Self::Outcome => "outcome",
            Self::FollowUp => "follow_up",
        };
        write!(f, "{s}")
    }
}

/// Animation contract for step changes, driven by the machine rather than
/// inferred by the client. While not `Idle`, step-advancing input is
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionState {
    /// No transition in flight; input is accepted.
    Idle,
    /// The outgoing step is animating out.
    Leaving,
    /// The incoming step is animating in.
    Entering,
}

impl Default for TransitionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for TransitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Leaving => "leaving",
            Self::Entering => "entering",
        };
        write!(f, "{s}")
    }
}

/// How a funnel session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelExit {
    /// Positive journey: visitor was sent to the external review page.
    Redirected,
    /// Visitor finished the follow-up step and returned home.
    WentHome,
}

impl std::fmt::Display for FunnelExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Redirected => "redirected",
            Self::WentHome => "went_home",
        };
        write!(f, "{s}")
    }
}
