//! Session teardown on 401.
//!
//! Registered as the transport's [`SessionInterceptor`]: drops the bearer
//! token and raises a flag the event loop turns into the sign-in screen.

use crate::api::{ApiClient, ApiError, SessionInterceptor, SharedToken};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

pub struct SessionTeardown {
    token: SharedToken,
    ended: AtomicBool,
}

impl SessionTeardown {
    pub fn new(token: SharedToken) -> Arc<Self> {
        Arc::new(Self {
            token,
            ended: AtomicBool::new(false),
        })
    }

    /// True once after the backend rejected the credentials
    pub fn take_ended(&self) -> bool {
        self.ended.swap(false, Ordering::SeqCst)
    }
}

impl SessionInterceptor for SessionTeardown {
    fn on_unauthorized(&self) {
        let mut token = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *token = None;
        self.ended.store(true, Ordering::SeqCst);
        tracing::warn!("Credentials rejected, session ended");
    }
}

/// Build the API client with session teardown wired into its transport
pub fn connect(
    endpoint: &str,
    api_key: Option<String>,
    timeout: Duration,
) -> Result<(ApiClient, Arc<SessionTeardown>), ApiError> {
    let client = ApiClient::new(endpoint, api_key, timeout)?;
    let session = SessionTeardown::new(client.token_handle());
    let client = client.with_interceptor(session.clone());
    Ok((client, session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_clears_token_once() {
        let (client, session) =
            connect("http://localhost:1", Some("sk-old".to_string()), Duration::from_secs(1))
                .unwrap();
        assert!(client.has_token());

        session.on_unauthorized();
        assert!(!client.has_token());
        assert!(session.take_ended());
        assert!(!session.take_ended());
    }

    #[test]
    fn test_connect_rejects_bad_endpoint() {
        assert!(connect("not a url", None, Duration::from_secs(1)).is_err());
        assert!(connect("ftp://example.com", None, Duration::from_secs(1)).is_err());
    }
}
