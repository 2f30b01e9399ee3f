use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::CheckoutError;

/// Path plus query parameters, rendered like a browser location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl NavigationRequest {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Mark the target page as reached because of a problem
    pub fn with_error_marker(self) -> Self {
        self.with_query("error", "true")
    }
}

impl std::fmt::Display for NavigationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let separator = if i == 0 { '?' } else { '&' };
            write!(f, "{separator}{key}={value}")?;
        }
        Ok(())
    }
}

/// Performs the actual route change
pub trait Router: Send + Sync {
    fn navigate(&self, request: &NavigationRequest) -> Result<(), CheckoutError>;
}

/// Keeps every navigation in memory; the last one is the current location
#[derive(Debug, Default)]
pub struct RecordingRouter {
    history: Mutex<Vec<NavigationRequest>>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<NavigationRequest> {
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// Current location, e.g. `/checkout/address?error=true`
    pub fn location(&self) -> Option<String> {
        self.history().last().map(ToString::to_string)
    }
}

impl Router for RecordingRouter {
    fn navigate(&self, request: &NavigationRequest) -> Result<(), CheckoutError> {
        if !request.path.starts_with('/') {
            return Err(CheckoutError::NavigationRejected {
                path: request.path.clone(),
                reason: "path must be absolute".to_string(),
            });
        }
        tracing::info!(location = %request, "Navigating");
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_renders_like_location_path() {
        assert_eq!(NavigationRequest::to("/checkout/address").to_string(), "/checkout/address");
        assert_eq!(
            NavigationRequest::to("/basket").with_error_marker().to_string(),
            "/basket?error=true"
        );
        assert_eq!(
            NavigationRequest::to("/x").with_query("b", "2").with_query("a", "1").to_string(),
            "/x?a=1&b=2"
        );
    }

    #[test]
    fn test_recording_router_tracks_location() {
        let router = RecordingRouter::new();
        assert_eq!(router.location(), None);

        router.navigate(&NavigationRequest::to("/checkout/review")).unwrap();
        router.navigate(&NavigationRequest::to("/basket").with_error_marker()).unwrap();

        assert_eq!(router.history().len(), 2);
        assert_eq!(router.location().as_deref(), Some("/basket?error=true"));
    }

    #[test]
    fn test_relative_path_is_rejected() {
        let router = RecordingRouter::new();
        let result = router.navigate(&NavigationRequest::to("checkout"));

        assert!(matches!(result, Err(CheckoutError::NavigationRejected { .. })));
        assert!(router.history().is_empty());
    }
}
