use crate::domain::token::TokenPair;
use opentelemetry::{KeyValue, global, metrics::Counter};
use reqwest::Url;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("{0}")]
    Configuration(String),
    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Clone, Debug)]
struct Metrics {
    exchanges_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("canva-connect-server");
        Self {
            exchanges_total: meter
                .u64_counter("canva_oauth_exchanges_total")
                .with_description("Authorization code exchanges by outcome")
                .build(),
        }
    }
}

/// Client credentials registered with the provider.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: Option<String>,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthCredentials {
    /// The client id, failing when the integration has not been configured.
    ///
    /// # Errors
    /// Returns `OAuthError::Configuration` if no client id is set.
    pub fn require_client_id(&self) -> Result<&str, OAuthError> {
        self.client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| OAuthError::Configuration("CANVA_CLIENT_ID not configured".to_string()))
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Builds the URL the browser is sent to for user consent.
///
/// # Errors
/// Returns `OAuthError::Configuration` if `client_id` is empty.
pub fn build_authorization_url(
    authorize_url: &Url,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[String],
) -> Result<Url, OAuthError> {
    if client_id.is_empty() {
        return Err(OAuthError::Configuration("CANVA_CLIENT_ID not configured".to_string()));
    }

    let mut url = authorize_url.clone();
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &scopes.join(" "));

    Ok(url)
}

/// Performs the authorization-code grant against the provider's token endpoint.
#[derive(Clone, Debug)]
pub struct OAuthClient {
    http: reqwest::Client,
    token_url: Url,
    metrics: Metrics,
}

impl OAuthClient {
    #[must_use]
    pub fn new(http: reqwest::Client, token_url: Url) -> Self {
        Self { http, token_url, metrics: Metrics::new() }
    }

    /// Exchanges a single-use authorization code for an access/refresh token pair.
    ///
    /// Issues exactly one request; failures are never retried.
    ///
    /// # Errors
    /// Returns `OAuthError::Transport` if the endpoint is unreachable or the response
    /// cannot be decoded, and `OAuthError::Rejected` on a non-2xx status.
    #[tracing::instrument(skip_all, name = "oauth_token_exchange")]
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> Result<TokenPair, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("code", code),
        ];

        let result = self.send(&params).await;
        let outcome = if result.is_ok() { "success" } else { "failure" };
        self.metrics.exchanges_total.add(1, &[KeyValue::new("outcome", outcome)]);

        result
    }

    async fn send(&self, params: &[(&str, &str)]) -> Result<TokenPair, OAuthError> {
        let response = self.http.post(self.token_url.clone()).form(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Rejected { status: status.as_u16(), body });
        }

        Ok(response.json::<TokenPair>().await?)
    }
}
