//! Shared state for the receiver handlers.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::store::NotificationStore;

/// Header carrying the shared secret when one is configured.
pub const SECRET_HEADER: &str = "x-webhook-secret";

/// State accessible from all request handlers.
#[derive(Debug, Clone)]
pub struct ReceiverState {
    pub store: NotificationStore,
    /// When set, notifications must present this value in [`SECRET_HEADER`].
    secret: Option<Arc<str>>,
}

impl ReceiverState {
    pub fn new(store: NotificationStore) -> Self {
        Self {
            store,
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: Option<String>) -> Self {
        self.secret = secret
            .filter(|value| !value.trim().is_empty())
            .map(Arc::from);
        self
    }

    pub fn requires_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Check the request headers against the configured secret.
    ///
    /// Always true when no secret is configured.
    pub fn authorize(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.secret else {
            return true;
        };
        headers
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|presented| presented == expected.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn open_receiver_accepts_anything() {
        let state = ReceiverState::new(NotificationStore::new());
        assert!(!state.requires_secret());
        assert!(state.authorize(&HeaderMap::new()));
    }

    #[test]
    fn blank_secret_is_treated_as_unset() {
        let state =
            ReceiverState::new(NotificationStore::new()).with_secret(Some("  ".to_string()));
        assert!(!state.requires_secret());
    }

    #[test]
    fn secret_must_match_exactly() {
        let state =
            ReceiverState::new(NotificationStore::new()).with_secret(Some("s3cret".to_string()));
        let mut headers = HeaderMap::new();
        assert!(!state.authorize(&headers));

        headers.insert(SECRET_HEADER, HeaderValue::from_static("wrong"));
        assert!(!state.authorize(&headers));

        headers.insert(SECRET_HEADER, HeaderValue::from_static("s3cret"));
        assert!(state.authorize(&headers));
    }
}
