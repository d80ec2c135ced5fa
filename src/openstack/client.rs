//! Block storage session
//!
//! Combines the HTTP transport with the service endpoint, the project the
//! calls are scoped to, and the token sent on every request.

use super::http::{ClientOptions, HttpClient};
use crate::error::{Error, Result};
use crate::resource::{PathScope, Query};
use serde_json::Value;
use url::Url;

/// API version prefix for project-scoped calls
const API_VERSION: &str = "v2";

/// Shared session used by every resource call
#[derive(Clone)]
pub struct Session {
    http: HttpClient,
    endpoint: String,
    project_id: String,
    token: Option<String>,
}

impl Session {
    /// Create a session with default transport options
    pub fn new(endpoint: &str, project_id: &str, token: Option<String>) -> Result<Self> {
        Self::with_options(endpoint, project_id, token, &ClientOptions::default())
    }

    /// Create a session with explicit transport options
    pub fn with_options(
        endpoint: &str,
        project_id: &str,
        token: Option<String>,
        options: &ClientOptions,
    ) -> Result<Self> {
        let parsed = Url::parse(endpoint)?;
        if parsed.cannot_be_a_base() {
            return Err(Error::invalid(format!("endpoint '{}' is not a base URL", endpoint)));
        }
        if project_id.trim().is_empty() {
            return Err(Error::invalid("project id is required"));
        }

        Ok(Self {
            http: HttpClient::new(options)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Replace the token (e.g. after the caller re-authenticates)
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build a project-scoped API URL: `{endpoint}/v2/{project_id}{path}`
    pub fn project_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}{}",
            self.endpoint,
            API_VERSION,
            urlencoding::encode(&self.project_id),
            path
        )
    }

    /// Build a URL relative to the service root (version discovery)
    pub fn root_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.endpoint, path)
        } else {
            format!("{}/{}", self.endpoint, path)
        }
    }

    /// Build the URL for a path under the given scope
    pub fn url(&self, scope: PathScope, path: &str) -> String {
        match scope {
            PathScope::Project => self.project_url(path),
            PathScope::Root => self.root_url(path),
        }
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    pub async fn get(&self, url: &str, query: &Query) -> Result<Value> {
        self.http.get(url, self.token.as_deref(), query).await
    }

    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        self.http.post(url, self.token.as_deref(), body).await
    }

    pub async fn put(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        self.http.put(url, self.token.as_deref(), body).await
    }

    pub async fn delete(&self, url: &str) -> Result<Value> {
        self.http.delete(url, self.token.as_deref()).await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
