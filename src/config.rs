//! Service configuration, built from environment variables with defaults
//! for local development.

use std::path::PathBuf;

use crate::funnel::FunnelConfig;

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP/WS server binds.
    pub port: u16,
    /// Public base URL campaign share links are built against.
    pub public_base_url: String,
    /// Base URL of the upstream vendor API.
    pub api_base_url: String,
    /// Path of the local review inbox database.
    pub db_path: PathBuf,
    /// Funnel timings.
    pub funnel: FunnelConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            public_base_url: "http://localhost:8080".to_string(),
            api_base_url: "http://localhost:3000/v1".to_string(),
            db_path: PathBuf::from("./data/review-relay.db"),
            funnel: FunnelConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("REVIEW_RELAY_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let public_base_url = std::env::var("REVIEW_RELAY_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let api_base_url =
            std::env::var("REVIEW_RELAY_API_BASE_URL").unwrap_or(defaults.api_base_url);

        let db_path = std::env::var("REVIEW_RELAY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        Self {
            port,
            public_base_url,
            api_base_url,
            db_path,
            funnel: FunnelConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.public_base_url.starts_with("http://"));
        assert!(config.db_path.to_string_lossy().ends_with(".db"));
    }
}
