#![allow(dead_code)]
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use canva_connect_server::AppBuilder;
use canva_connect_server::config::{
    CanvaConfig, Config, LogFormat, ServerConfig, SessionConfig, TelemetryConfig,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use tokio::net::TcpListener;

static INIT: Once = Once::new();

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret-do-not-leak";
pub const REDIRECT_URI: &str = "http://localhost:3000/auth/callback";

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("canva_connect_server=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// A recorded call to one of the fake provider's API endpoints.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug)]
pub struct ProviderState {
    pub token_status: Mutex<StatusCode>,
    pub token_body: Mutex<Value>,
    pub api_status: Mutex<StatusCode>,
    pub token_requests: Mutex<Vec<HashMap<String, String>>>,
    pub api_calls: Mutex<Vec<ApiCall>>,
}

/// Stand-in for the Canva OAuth and REST endpoints.
#[derive(Debug, Clone)]
pub struct FakeProvider {
    pub url: String,
    pub state: Arc<ProviderState>,
}

impl FakeProvider {
    pub async fn spawn() -> Self {
        let state = Arc::new(ProviderState {
            token_status: Mutex::new(StatusCode::OK),
            token_body: Mutex::new(json!({
                "access_token": "A",
                "refresh_token": "B",
                "token_type": "Bearer",
                "expires_in": 14400
            })),
            api_status: Mutex::new(StatusCode::OK),
            token_requests: Mutex::new(Vec::new()),
            api_calls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/rest/v1/oauth/token", post(token))
            .route("/rest/v1/me", get(api))
            .route("/rest/v1/designs", get(api))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url: format!("http://{addr}"), state }
    }

    pub fn fail_token_exchange(&self, status: StatusCode) {
        *self.state.token_status.lock().unwrap() = status;
        *self.state.token_body.lock().unwrap() = json!({ "error": "invalid_client" });
    }

    pub fn fail_api(&self, status: StatusCode) {
        *self.state.api_status.lock().unwrap() = status;
    }

    pub fn token_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.token_requests.lock().unwrap().clone()
    }

    pub fn api_calls(&self) -> Vec<ApiCall> {
        self.state.api_calls.lock().unwrap().clone()
    }
}

async fn token(
    State(state): State<Arc<ProviderState>>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    state.token_requests.lock().unwrap().push(form);
    let status = *state.token_status.lock().unwrap();
    let body = state.token_body.lock().unwrap().clone();
    (status, Json(body))
}

async fn api(State(state): State<Arc<ProviderState>>, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    let authorization = headers.get(header::AUTHORIZATION).map(|v| v.to_str().unwrap().to_string());
    state.api_calls.lock().unwrap().push(ApiCall { path: uri.path().to_string(), authorization });

    let status = *state.api_status.lock().unwrap();
    if status != StatusCode::OK {
        return (status, Json(json!({ "code": "upstream_failure" })));
    }

    let body = if uri.path().ends_with("/me") {
        json!({ "team_user": { "user_id": "user-1", "team_id": "team-1" } })
    } else {
        json!({ "items": [{ "id": "design-1", "title": "Poster" }] })
    };
    (StatusCode::OK, Json(body))
}

pub fn get_test_config(provider_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: "public".to_string(),
            shutdown_timeout_secs: 1,
        },
        canva: CanvaConfig {
            client_id: Some(CLIENT_ID.to_string()),
            client_secret: Some(CLIENT_SECRET.to_string()),
            redirect_uri: Some(REDIRECT_URI.to_string()),
            oauth_url: format!("{provider_url}/api/oauth/authorize"),
            token_url: format!("{provider_url}/rest/v1/oauth/token"),
            api_base_url: format!("{provider_url}/rest/v1"),
            scopes: vec!["design:read".to_string(), "profile:read".to_string()],
            upstream_timeout_secs: 5,
        },
        session: SessionConfig {
            secret: Some("integration-test-session-secret".to_string()),
            ttl_secs: 3600,
            sweep_interval_secs: 0,
            cookie_secure: false,
        },
        telemetry: TelemetryConfig { log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub fn cookieless_client() -> reqwest::Client {
    reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build().unwrap()
}

pub struct TestApp {
    pub server_url: String,
    pub client: reqwest::Client,
    pub provider: FakeProvider,
    pub config: Config,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(customize: impl FnOnce(&mut Config)) -> Self {
        setup_tracing();
        let provider = FakeProvider::spawn().await;
        let mut config = get_test_config(&provider.url);
        customize(&mut config);

        let app = AppBuilder::new(config.clone()).build().unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.router).await.unwrap();
        });

        Self { server_url: format!("http://{addr}"), client: browser(), provider, config }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// Completes the OAuth callback for the test browser.
    pub async fn login(&self) {
        let resp = self.get("/auth/callback?code=valid-code").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/");
    }
}

pub fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

pub fn session_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .find(|c| c.starts_with("canva_connect.sid="))
}
