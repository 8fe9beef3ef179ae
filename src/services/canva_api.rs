use opentelemetry::{KeyValue, global, metrics::Counter};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Read-only resources the proxy exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvaResource {
    Profile,
    Designs,
}

impl CanvaResource {
    /// Path of the resource relative to the API base.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Profile => "me",
            Self::Designs => "designs",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Designs => "designs",
        }
    }
}

impl fmt::Display for CanvaResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug)]
struct Metrics {
    calls_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("canva-connect-server");
        Self {
            calls_total: meter
                .u64_counter("canva_api_calls_total")
                .with_description("Proxied Connect API calls by resource and outcome")
                .build(),
        }
    }
}

/// Forwards GET requests to the Connect REST API with the caller's bearer token.
///
/// The token is passed through as-is; it is neither validated nor refreshed here.
#[derive(Clone, Debug)]
pub struct ApiProxy {
    http: reqwest::Client,
    base_url: String,
    metrics: Metrics,
}

impl ApiProxy {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url, metrics: Metrics::new() }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetches `{base}/{path}` and returns the JSON body untouched.
    ///
    /// # Errors
    /// Returns `ApiError::Upstream` on a non-2xx status and `ApiError::Transport`
    /// if the API is unreachable or the body is not JSON.
    #[tracing::instrument(skip(self, access_token))]
    pub async fn call_api(&self, path: &str, access_token: &str) -> Result<serde_json::Value, ApiError> {
        let result = self.send(path, access_token).await;

        let outcome = if result.is_ok() { "success" } else { "failure" };
        self.metrics
            .calls_total
            .add(1, &[KeyValue::new("path", path.to_string()), KeyValue::new("outcome", outcome)]);

        result
    }

    /// Fetches one of the known resources.
    ///
    /// # Errors
    /// See [`ApiProxy::call_api`].
    pub async fn fetch(&self, resource: CanvaResource, access_token: &str) -> Result<serde_json::Value, ApiError> {
        self.call_api(resource.path(), access_token).await
    }

    async fn send(&self, path: &str, access_token: &str) -> Result<serde_json::Value, ApiError> {
        let response = self.http.get(self.url_for(path)).bearer_auth(access_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream { status: status.as_u16(), body });
        }

        Ok(response.json().await?)
    }
}
