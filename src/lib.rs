#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod storage;
pub mod telemetry;
pub mod workers;

use crate::api::AppState;
use crate::config::Config;
use crate::services::auth_service::AuthService;
use crate::services::canva_api::ApiProxy;
use crate::services::oauth_client::{OAuthClient, OAuthCredentials};
use crate::storage::{MemorySessionStore, SessionStore};
use crate::workers::SessionSweeper;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// A fully wired application: the HTTP router plus the background workers it relies on.
#[derive(Debug)]
pub struct App {
    pub router: axum::Router,
    pub session_store: Arc<dyn SessionStore>,
    pub workers: Workers,
}

#[derive(Debug)]
pub struct Workers {
    pub session_sweeper: SessionSweeper,
}

impl Workers {
    #[must_use]
    pub fn spawn_all(self, shutdown_rx: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        vec![tokio::spawn(self.session_sweeper.run(shutdown_rx).instrument(tracing::info_span!("session_sweeper")))]
    }
}

#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    session_store: Option<Arc<dyn SessionStore>>,
    http_client: Option<reqwest::Client>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, session_store: None, http_client: None }
    }

    /// Replaces the default in-memory session store.
    #[must_use]
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Uses a custom HTTP client for upstream calls.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Wires the services and the router.
    ///
    /// # Errors
    /// Returns an error if an endpoint URL is invalid or the HTTP client cannot be built.
    pub fn build(self) -> anyhow::Result<App> {
        let config = self.config;

        let http = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(Duration::from_secs(config.canva.upstream_timeout_secs))
                .build()?,
        };

        let session_store: Arc<dyn SessionStore> = match self.session_store {
            Some(store) => store,
            None => Arc::new(MemorySessionStore::new(Duration::from_secs(config.session.ttl_secs))),
        };

        if config.canva.client_id().is_none() {
            tracing::warn!("CANVA_CLIENT_ID is not set; the OAuth flow is disabled");
        }
        if config.canva.client_secret.is_none() {
            tracing::warn!("CANVA_CLIENT_SECRET is not set; token exchanges will be rejected");
        }

        let credentials = OAuthCredentials {
            client_id: config.canva.client_id().map(str::to_string),
            client_secret: config.canva.client_secret.clone().unwrap_or_default(),
            redirect_uri: config.redirect_uri(),
        };

        let oauth_client = OAuthClient::new(http.clone(), config.canva.token_url.parse::<reqwest::Url>()?);
        let auth_service = AuthService::new(
            oauth_client,
            credentials,
            config.canva.oauth_url.parse::<reqwest::Url>()?,
            config.canva.scopes.clone(),
            Arc::clone(&session_store),
        );
        let api_proxy = ApiProxy::new(http, config.canva.api_base_url.clone());

        let workers = Workers {
            session_sweeper: SessionSweeper::new(Arc::clone(&session_store), config.session.sweep_interval_secs),
        };

        let state = AppState {
            cookie_key: cookie_key(config.session.secret.as_deref()),
            config,
            auth_service,
            api_proxy,
        };

        Ok(App { router: api::app_router(state), session_store, workers })
    }
}

/// Derives the cookie signing key from the session secret.
///
/// Without a secret a random key is used, so cookies do not survive a restart
/// (the in-memory sessions they point at do not either).
#[must_use]
pub fn cookie_key(secret: Option<&str>) -> Key {
    match secret.filter(|s| !s.is_empty()) {
        Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        None => {
            tracing::warn!("SESSION_SECRET is not set; using a random signing key");
            Key::generate()
        }
    }
}

/// Logs panics through tracing before the default hook runs.
pub fn setup_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "Panic occurred");
        default_hook(info);
    }));
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
