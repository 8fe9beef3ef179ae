use crate::api::middleware::{clear_session_cookie, session_cookie};
use crate::api::{AppState, found};
use crate::domain::session::SessionId;
use crate::error::{AppError, Result};
use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// Starts the OAuth flow by sending the browser to the provider's consent page.
pub async fn authorize(State(state): State<AppState>) -> Result<Response> {
    let url = state.auth_service.authorization_url()?;
    Ok(found(url.as_str()))
}

/// Receives the authorization code and binds the exchanged tokens to the session.
pub async fn callback(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Query(params): Query<CallbackParams>,
    jar: SignedCookieJar,
) -> Result<Response> {
    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::BadRequest("Authorization code not provided".to_string()))?;

    let bound_id = state.auth_service.complete_login(&session_id, &code).await?;
    if bound_id == session_id {
        return Ok(found("/"));
    }

    let jar = jar.add(session_cookie(&bound_id, state.config.session.cookie_secure));
    Ok((jar, found("/")).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    jar: SignedCookieJar,
) -> impl IntoResponse {
    state.auth_service.logout(&session_id).await;
    (jar.remove(clear_session_cookie()), found("/"))
}
