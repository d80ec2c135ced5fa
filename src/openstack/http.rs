//! HTTP utilities for block storage REST calls

use crate::error::{Error, Result};
use crate::resource::Query;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Header carrying the Keystone/IAM token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let char_count = body.chars().count();
    let truncated = if char_count > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Transport settings applied to the underlying reqwest client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    /// Per-request timeout; `None` leaves reqwest's default (no timeout)
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("bsctl/{}", crate::VERSION),
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// HTTP client wrapper for block storage API calls
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let mut builder = Client::builder().user_agent(options.user_agent.clone());
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: Option<&str>, query: &Query) -> Result<Value> {
        let mut request = self.request(Method::GET, url, token);
        if !query.is_empty() {
            request = request.query(&query.pairs());
        }
        self.execute(Method::GET, url, request).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, token: Option<&str>, body: Option<&Value>) -> Result<Value> {
        self.send_json(Method::POST, url, token, body).await
    }

    /// Make a PUT request
    pub async fn put(&self, url: &str, token: Option<&str>, body: Option<&Value>) -> Result<Value> {
        self.send_json(Method::PUT, url, token, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: Option<&str>) -> Result<Value> {
        let request = self.request(Method::DELETE, url, token);
        self.execute(Method::DELETE, url, request).await
    }

    async fn send_json(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self.request(method.clone(), url, token);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(method, url, request).await
    }

    fn request(&self, method: Method, url: &str, token: Option<&str>) -> RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match token {
            Some(token) => request.header(AUTH_TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn execute(&self, method: Method, url: &str, request: RequestBuilder) -> Result<Value> {
        tracing::debug!("{} {}", method, url);

        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        // The version root answers 300 Multiple Choices with a JSON body
        if status.is_client_error() || status.is_server_error() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(Error::NotFound {
                    url: url.to_string(),
                });
            }
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        // Handle empty response (202/204 on actions and deletes)
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let logged = sanitize_for_log(&body);
        assert!(logged.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(logged.contains("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("bad\r\nrequest"), "badrequest");
    }

    #[test]
    fn test_sanitize_handles_multibyte_boundaries() {
        let body = "é".repeat(300);
        let logged = sanitize_for_log(&body);
        assert!(logged.contains("truncated"));
    }
}
