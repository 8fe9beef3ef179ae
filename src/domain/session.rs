use std::fmt;
use uuid::Uuid;

/// Opaque identifier tying a browser cookie to server-side session state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token state held for one browser session.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Whether a session may call the provider API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState<'a> {
    Unauthenticated,
    Authenticated { access_token: &'a str },
}

impl Session {
    #[must_use]
    pub fn with_tokens(access_token: String, refresh_token: Option<String>) -> Self {
        Self { access_token: Some(access_token), refresh_token }
    }

    #[must_use]
    pub fn auth_state(&self) -> AuthState<'_> {
        match self.access_token.as_deref() {
            Some(token) if !token.is_empty() => AuthState::Authenticated { access_token: token },
            _ => AuthState::Unauthenticated,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth_state(), AuthState::Authenticated { .. })
    }
}

// Tokens are bearer credentials and must never reach the logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
