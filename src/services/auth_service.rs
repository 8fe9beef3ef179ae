use crate::domain::session::{Session, SessionId};
use crate::services::oauth_client::{OAuthClient, OAuthCredentials, OAuthError, build_authorization_url};
use crate::storage::SessionStore;
use reqwest::Url;
use std::sync::Arc;

/// Drives the login lifecycle of a browser session: consent redirect, code
/// exchange and logout.
#[derive(Clone, Debug)]
pub struct AuthService {
    client: OAuthClient,
    credentials: OAuthCredentials,
    authorize_url: Url,
    scopes: Vec<String>,
    store: Arc<dyn SessionStore>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        client: OAuthClient,
        credentials: OAuthCredentials,
        authorize_url: Url,
        scopes: Vec<String>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self { client, credentials, authorize_url, scopes, store }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.credentials.require_client_id().is_ok()
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.credentials.redirect_uri
    }

    /// Consent URL for the configured client.
    ///
    /// # Errors
    /// Returns `OAuthError::Configuration` if no client id is configured.
    pub fn authorization_url(&self) -> Result<Url, OAuthError> {
        let client_id = self.credentials.require_client_id()?;
        build_authorization_url(&self.authorize_url, client_id, &self.credentials.redirect_uri, &self.scopes)
    }

    pub async fn session(&self, id: &SessionId) -> Session {
        self.store.get(id).await
    }

    /// Exchanges `code` and binds the resulting tokens to the session.
    ///
    /// Nothing is written to the store unless the exchange succeeds. A destroyed
    /// id never regains tokens, so if `id` was logged out the tokens are bound to
    /// a fresh id instead. Returns the id that now holds the tokens.
    ///
    /// # Errors
    /// Returns `OAuthError::Configuration` if no client id is configured, or the
    /// exchange error otherwise.
    pub async fn complete_login(&self, id: &SessionId, code: &str) -> Result<SessionId, OAuthError> {
        let client_id = self.credentials.require_client_id()?;

        let tokens = self
            .client
            .exchange_code_for_token(code, client_id, &self.credentials.client_secret, &self.credentials.redirect_uri)
            .await?;

        if self.store.set_tokens(id, tokens.access_token.clone(), tokens.refresh_token.clone()).await {
            tracing::info!("Session authenticated");
            return Ok(id.clone());
        }

        let fresh = SessionId::generate();
        self.store.set_tokens(&fresh, tokens.access_token, tokens.refresh_token).await;
        tracing::info!("Session was logged out; authenticated under a new session id");
        Ok(fresh)
    }

    pub async fn logout(&self, id: &SessionId) {
        self.store.destroy(id).await;
        tracing::info!("Session destroyed");
    }
}
