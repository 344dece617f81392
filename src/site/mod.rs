//! Marketing site content, served as typed JSON for the SPA shell.

pub mod content;
pub mod routes;
pub mod stars;

pub use routes::site_routes;
pub use stars::{FloatingStar, star_field};
