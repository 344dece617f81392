//! Error types for ReviewRelay.

use uuid::Uuid;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Upstream API error: {0}")]
    Api(#[from] ApiError),

    #[error("Funnel error: {0}")]
    Funnel(#[from] FunnelError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Local review store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Upstream vendor API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("Upstream rejected the request ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("Not authenticated with the upstream API")]
    Unauthenticated,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Funnel session errors.
#[derive(Debug, thiserror::Error)]
pub enum FunnelError {
    #[error("Funnel session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Session {id} is at step {step}, cannot accept {action}")]
    WrongStep {
        id: Uuid,
        step: String,
        action: String,
    },

    #[error("Session {id} is mid-transition, input rejected")]
    TransitionPending { id: Uuid },

    #[error("Session {id} already exited ({exit})")]
    AlreadyExited { id: Uuid, exit: String },

    #[error("Continue is not available for rating {rating}")]
    ContinueUnavailable { rating: u8 },
}

/// Auth session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Missing or malformed Authorization header")]
    MissingToken,

    #[error("Unknown or expired session token")]
    Unknown,

    #[error("Operation requires a vendor account with a company")]
    NoCompany,

    #[error("Operation requires role {required}")]
    Forbidden { required: String },
}

/// Follow-up mailer errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("SMTP send failed: {0}")]
    Send(String),

    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Mail build failed: {0}")]
    Build(String),
}

/// Field-keyed validation messages, reported all at once.
///
/// Validation failures are data the client renders next to the fields
/// (HTTP 422), not an `Error` variant. BTreeMap keeps the serialized
/// order stable.
pub type FieldErrors = std::collections::BTreeMap<String, String>;

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
