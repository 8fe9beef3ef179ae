use crate::api::middleware::CurrentSession;
use crate::api::{AppState, found};
use crate::domain::session::AuthState;
use crate::error::{AppError, Result};
use crate::services::canva_api::CanvaResource;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};

pub async fn profile(State(state): State<AppState>, current: CurrentSession) -> Result<Response> {
    fetch(&state, &current, CanvaResource::Profile).await
}

pub async fn designs(State(state): State<AppState>, current: CurrentSession) -> Result<Response> {
    fetch(&state, &current, CanvaResource::Designs).await
}

/// Proxies a resource for authenticated sessions; everyone else is sent to log in.
async fn fetch(state: &AppState, current: &CurrentSession, resource: CanvaResource) -> Result<Response> {
    let AuthState::Authenticated { access_token } = current.session.auth_state() else {
        return Ok(found("/auth"));
    };

    let body = state
        .api_proxy
        .fetch(resource, access_token)
        .await
        .map_err(|source| AppError::ApiCall { resource, source })?;

    Ok(Json(body).into_response())
}
