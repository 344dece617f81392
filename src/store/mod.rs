//! Local review/lead inbox persistence.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlReviews;
pub use traits::{ReviewRecord, ReviewStore};
