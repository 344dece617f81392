//! Review funnel: the three-step flow an end customer walks through after
//! scanning a campaign QR code.
//!
//! Sessions live in memory on the [`hub::FunnelHub`]. Step changes and the
//! positive-rating marketplace redirect are timer-driven; clients observe
//! them over the per-session WebSocket and drive input over REST.

pub mod form;
pub mod hub;
pub mod recorder;
pub mod routes;
pub mod state;
pub mod ws;

pub use form::{ReviewForm, ReviewSubmission, validate};
pub use hub::{
    CampaignContext, FunnelConfig, FunnelEvent, FunnelHub, Navigation, SessionSnapshot,
    spawn_expiry_task,
};
pub use recorder::spawn_review_recorder;
pub use routes::{FunnelRouteState, funnel_routes};
pub use state::{FunnelExit, FunnelStep, POSITIVE_RATING_MIN, TransitionState, is_positive};
pub use ws::funnel_ws_routes;
