// ============================================================================
// Engine Errors
// ============================================================================
//
// Failures of the engine itself. Validation call failures are not errors of
// the engine: they become `*Fail` commands (see `domain::checkout::ApiError`).
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Navigation to {path} rejected: {reason}")]
    NavigationRejected { path: String, reason: String },

    #[error("Metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
