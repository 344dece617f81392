//! ReviewRelay — review funnel service and vendor campaign backend.

pub mod api;
pub mod auth;
pub mod campaigns;
pub mod config;
pub mod error;
pub mod funnel;
pub mod http;
pub mod marketplace;
pub mod notify;
pub mod site;
pub mod store;
