use serde::{Deserialize, Serialize};

// ============================================================================
// Validation Call Failures
// ============================================================================
//
// Transport or server failure of a validation call. Serializable because it
// travels inside `*Fail` commands on the command stream.
//
// ============================================================================

pub const BASKET_NOT_FOUND_CODE: &str = "basket.not_found.error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (status {status}, code {code:?})")]
pub struct ApiError {
    /// HTTP-like status; 0 means the request never got a response
    pub status: u16,
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn basket_not_found(message: impl Into<String>) -> Self {
        Self::new(404, message).with_code(BASKET_NOT_FOUND_CODE)
    }

    pub fn is_basket_not_found(&self) -> bool {
        self.code.as_deref() == Some(BASKET_NOT_FOUND_CODE)
    }

    /// Worth another attempt: no response at all or a server-side failure
    pub fn is_transient(&self) -> bool {
        self.status == 0 || self.status >= 500
    }

    /// Short label for metrics
    pub fn code_label(&self) -> &str {
        self.code.as_deref().unwrap_or("unknown")
    }
}
