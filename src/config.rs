use clap::{Args, Parser, ValueEnum};
use std::path::Path;

const DEFAULT_OAUTH_URL: &str = "https://www.canva.com/api/oauth/authorize";
const DEFAULT_TOKEN_URL: &str = "https://api.canva.com/rest/v1/oauth/token";
const DEFAULT_API_BASE_URL: &str = "https://api.canva.com/rest/v1";

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub canva: CanvaConfig,

    #[command(flatten)]
    pub session: SessionConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory served for paths that no route matches
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: String,

    /// How long to wait for background tasks during shutdown
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct CanvaConfig {
    /// OAuth client id of the Canva integration
    #[arg(long, env = "CANVA_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret of the Canva integration
    #[arg(long, env = "CANVA_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Redirect URI registered with Canva (defaults to http://localhost:{port}/auth/callback)
    #[arg(long, env = "CANVA_REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    /// Authorization endpoint the browser is sent to
    #[arg(long, env = "CANVA_OAUTH_URL", default_value = DEFAULT_OAUTH_URL)]
    pub oauth_url: String,

    /// Token endpoint used for the code exchange
    #[arg(long, env = "CANVA_TOKEN_URL", default_value = DEFAULT_TOKEN_URL)]
    pub token_url: String,

    /// Base URL of the Connect REST API
    #[arg(long, env = "CANVA_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Space-separated scopes requested during authorization
    #[arg(long, env = "CANVA_SCOPES", default_value = "design:read profile:read", value_delimiter = ' ')]
    pub scopes: Vec<String>,

    /// Timeout applied to every upstream call, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct SessionConfig {
    /// Secret used to sign session cookies (a random key is generated when unset)
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Idle time after which a session is forgotten
    #[arg(long, env = "SESSION_TTL_SECS", default_value_t = 86_400)]
    pub ttl_secs: u64,

    /// How often expired sessions are swept from memory (0 disables the sweeper)
    #[arg(long, env = "SESSION_SWEEP_INTERVAL_SECS", default_value_t = 300)]
    pub sweep_interval_secs: u64,

    /// Mark the session cookie as Secure (enable behind HTTPS)
    #[arg(long, env = "SESSION_COOKIE_SECURE", default_value_t = false)]
    pub cookie_secure: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; traces and metrics are only exported when set
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Reads `.env` from the working directory if present, then parses flags and environment.
    #[must_use]
    pub fn load() -> Self {
        load_env_file(Path::new(".env"));
        Self::parse()
    }

    /// The configured redirect URI, or the local callback on the listening port.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        self.canva
            .redirect_uri
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}/auth/callback", self.server.port))
    }
}

/// Exports the variables of an env file. Variables already set in the process win.
///
/// Returns whether the file was read.
fn load_env_file(path: &Path) -> bool {
    dotenvy::from_path(path).is_ok()
}

impl CanvaConfig {
    /// The client id, treating an empty value the same as a missing one.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref().filter(|id| !id.is_empty())
    }
}
