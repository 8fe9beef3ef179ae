use serde::Deserialize;
use std::fmt;

/// Tokens returned by the provider's token endpoint. Unknown fields are ignored.
#[derive(Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_provider_response_ignoring_extra_fields() {
        let json = r#"{"access_token":"A","refresh_token":"B","token_type":"Bearer","expires_in":14400,"scope":"design:read"}"#;
        let pair: TokenPair = serde_json::from_str(json).unwrap();

        assert_eq!(pair.access_token, "A");
        assert_eq!(pair.refresh_token.as_deref(), Some("B"));
    }

    #[test]
    fn test_missing_refresh_token_is_tolerated() {
        let pair: TokenPair = serde_json::from_str(r#"{"access_token":"A"}"#).unwrap();
        assert!(pair.refresh_token.is_none());
    }

    #[test]
    fn test_missing_access_token_is_rejected() {
        assert!(serde_json::from_str::<TokenPair>(r#"{"refresh_token":"B"}"#).is_err());
    }
}
