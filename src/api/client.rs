//! API Client
//!
//! Main client for the files / vector stores API, combining the shared
//! transport with the configured endpoint and bearer token.

use super::error::ApiError;
use super::files::FilesApi;
use super::http::{ApiHttpClient, SessionInterceptor};
use super::vector_stores::VectorStoresApi;
use reqwest::multipart::Form;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use url::Url;

/// Bearer token shared between the client and the session interceptor
pub type SharedToken = Arc<RwLock<Option<String>>>;

/// Main API client
#[derive(Clone)]
pub struct ApiClient {
    pub http: ApiHttpClient,
    base_url: String,
    token: SharedToken,
}

impl ApiClient {
    /// Create a new client for `endpoint` (e.g. `https://api.example.com/v1`)
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(endpoint)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::validation(
                "endpoint",
                format!("Unsupported scheme: {}", parsed.scheme()),
            ));
        }

        Ok(Self {
            http: ApiHttpClient::new(timeout)?,
            base_url: endpoint.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(token.filter(|t| !t.is_empty()))),
        })
    }

    /// Register the 401 interceptor on the transport
    pub fn with_interceptor(mut self, interceptor: Arc<dyn SessionInterceptor>) -> Self {
        self.http.set_interceptor(interceptor);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle to the token, used by the session interceptor to clear it
    pub fn token_handle(&self) -> SharedToken {
        self.token.clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token.filter(|t| !t.is_empty());
        }
    }

    pub fn has_token(&self) -> bool {
        self.current_token().is_some()
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    /// Build a URL from path segments, percent-encoding each one
    pub fn url(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.base_url, path)
    }

    // =========================================================================
    // Resource clients
    // =========================================================================

    pub fn files(&self) -> FilesApi<'_> {
        FilesApi::new(self)
    }

    pub fn vector_stores(&self) -> VectorStoresApi<'_> {
        VectorStoresApi::new(self)
    }

    // =========================================================================
    // Requests
    // =========================================================================

    pub async fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<Value, ApiError> {
        let token = self.current_token();
        self.http.get(url, token.as_deref(), query).await
    }

    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ApiError> {
        let token = self.current_token();
        self.http.post_json(url, token.as_deref(), body).await
    }

    pub async fn post_multipart(&self, url: &str, form: Form) -> Result<Value, ApiError> {
        let token = self.current_token();
        self.http.post_multipart(url, token.as_deref(), form).await
    }

    pub async fn delete(&self, url: &str) -> Result<Value, ApiError> {
        let token = self.current_token();
        self.http.delete(url, token.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::DEFAULT_TIMEOUT;

    #[test]
    fn test_url_encodes_segments() {
        let client = ApiClient::new("https://api.example.com/v1/", None, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.url(&["vector_stores", "vs 1", "files", "a/b"]),
            "https://api.example.com/v1/vector_stores/vs%201/files/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let result = ApiClient::new("ftp://example.com", None, DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(ApiError::Validation { .. })));
        assert!(ApiClient::new("not a url", None, DEFAULT_TIMEOUT).is_err());
    }

    #[test]
    fn test_token_can_be_cleared_through_handle() {
        let client = ApiClient::new(
            "https://api.example.com",
            Some("secret".to_string()),
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert!(client.has_token());

        let handle = client.token_handle();
        *handle.write().unwrap() = None;
        assert!(!client.has_token());

        client.set_token(Some(String::new()));
        assert!(!client.has_token());
    }
}
