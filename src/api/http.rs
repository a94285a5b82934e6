//! HTTP transport shared by every resource client

use super::error::{ApiError, ErrorEnvelope};
use reqwest::{multipart::Form, Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Hook on the response pipeline, invoked once per 401 response.
pub trait SessionInterceptor: Send + Sync {
    fn on_unauthorized(&self);
}

/// HTTP client wrapper for API calls
#[derive(Clone)]
pub struct ApiHttpClient {
    client: Client,
    interceptor: Option<Arc<dyn SessionInterceptor>>,
}

impl ApiHttpClient {
    /// Create a new HTTP client with a fixed request timeout
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("vstui/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            interceptor: None,
        })
    }

    /// Register the 401 interceptor
    pub fn set_interceptor(&mut self, interceptor: Arc<dyn SessionInterceptor>) {
        self.interceptor = Some(interceptor);
    }

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    /// GET with query parameters
    pub async fn get(
        &self,
        url: &str,
        token: Option<&str>,
        query: &[(&'static str, String)],
    ) -> Result<Value, ApiError> {
        tracing::debug!("GET {}", url);
        let request = Self::authorize(self.client.get(url), token).query(query);
        self.execute(request).await
    }

    /// POST a JSON body
    pub async fn post_json(
        &self,
        url: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<Value, ApiError> {
        tracing::debug!("POST {}", url);
        let request = Self::authorize(self.client.post(url), token).json(body);
        self.execute(request).await
    }

    /// POST a multipart form
    pub async fn post_multipart(
        &self,
        url: &str,
        token: Option<&str>,
        form: Form,
    ) -> Result<Value, ApiError> {
        tracing::debug!("POST {} (multipart)", url);
        let request = Self::authorize(self.client.post(url), token).multipart(form);
        self.execute(request).await
    }

    /// DELETE
    pub async fn delete(&self, url: &str, token: Option<&str>) -> Result<Value, ApiError> {
        tracing::debug!("DELETE {}", url);
        let request = Self::authorize(self.client.delete(url), token);
        self.execute(request).await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        self.handle_response(status, &body)
    }

    fn handle_response(&self, status: StatusCode, body: &str) -> Result<Value, ApiError> {
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("API returned 401, ending session");
            if let Some(ref interceptor) = self.interceptor {
                interceptor.on_unauthorized();
            }
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            // Only log sanitized/truncated error body
            tracing::error!("API error: {} - {}", status, sanitize_for_log(body));
            return Err(backend_error(status, body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(body)?)
    }
}

/// Build a backend error from the `{error: {type, message}}` body,
/// falling back to the status text
fn backend_error(status: StatusCode, body: &str) -> ApiError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let kind = parsed.as_ref().and_then(|e| e.error.kind.clone());
    let message = parsed
        .and_then(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(|r| r.to_string())
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        });

    ApiError::Backend {
        status: status.as_u16(),
        kind,
        message,
    }
}
