use crate::services::canva_api::{ApiError, CanvaResource};
use crate::services::oauth_client::OAuthError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Token exchange failed: {0}")]
    TokenExchange(#[source] OAuthError),
    #[error("Failed to fetch {resource}: {source}")]
    ApiCall {
        resource: CanvaResource,
        #[source]
        source: ApiError,
    },
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<OAuthError> for AppError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::Configuration(msg) => Self::Configuration(msg),
            other => Self::TokenExchange(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Configuration(msg) => {
                tracing::warn!(message = %msg, "Configuration error");
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            Self::TokenExchange(e) => {
                tracing::error!(error = %e, "Error exchanging code for token");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error during authentication").into_response()
            }
            Self::ApiCall { resource, source } => {
                tracing::error!(error = %source, resource = %resource, "Error fetching resource");
                let body = Json(json!({
                    "error": format!("Failed to fetch {resource}")
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
