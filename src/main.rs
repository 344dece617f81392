use std::sync::Arc;

use review_relay::api::RestApi;
use review_relay::auth::{AuthService, SessionStore, spawn_session_prune_task};
use review_relay::campaigns::CampaignManager;
use review_relay::config::AppConfig;
use review_relay::funnel::{FunnelHub, spawn_expiry_task, spawn_review_recorder};
use review_relay::http;
use review_relay::notify::{FollowUpMailer, MailerConfig};
use review_relay::store::{LibSqlReviews, ReviewStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    eprintln!("⭐ ReviewRelay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Listening: http://0.0.0.0:{}", config.port);
    eprintln!("   Public base: {}", config.public_base_url);
    eprintln!("   Upstream API: {}", config.api_base_url);
    eprintln!("   Database: {}", config.db_path.display());

    // ── Review inbox ────────────────────────────────────────────────────
    let store: Arc<dyn ReviewStore> =
        Arc::new(LibSqlReviews::new_local(&config.db_path).await.map_err(|e| {
            anyhow::anyhow!("Failed to open review store at {}: {e}", config.db_path.display())
        })?);

    // ── Funnel hub + background tasks ───────────────────────────────────
    let hub = FunnelHub::new(config.funnel.clone());
    let _expiry_handle = spawn_expiry_task(Arc::clone(&hub));

    let mailer = match MailerConfig::from_env() {
        Some(mailer_config) => {
            eprintln!("   Follow-up mail: enabled (SMTP: {})", mailer_config.smtp_host);
            Some(Arc::new(FollowUpMailer::new(mailer_config)))
        }
        None => {
            eprintln!("   Follow-up mail: disabled (SMTP_HOST not set)");
            None
        }
    };
    let _recorder_handle = spawn_review_recorder(Arc::clone(&hub), Arc::clone(&store), mailer);

    // ── Upstream API + auth + dashboard ─────────────────────────────────
    let api = Arc::new(RestApi::new(config.api_base_url.clone()));
    let sessions = SessionStore::new();
    let _prune_handle = spawn_session_prune_task(Arc::clone(&sessions));
    let auth = AuthService::new(api.clone(), sessions);
    let campaigns = CampaignManager::new(api, config.public_base_url.clone());

    // ── Serve ───────────────────────────────────────────────────────────
    let app = http::app(hub, auth, campaigns);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Server started");
    axum::serve(listener, app).await?;

    Ok(())
}
