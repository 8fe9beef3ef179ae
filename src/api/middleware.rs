use crate::api::AppState;
use crate::domain::session::{Session, SessionId};
use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

pub const SESSION_COOKIE: &str = "canva_connect.sid";

/// Resolves the session id from the signed cookie, issuing a new one when the
/// cookie is missing or fails verification.
///
/// The id is stored in the request extensions for [`CurrentSession`].
pub async fn session_layer(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let (session_id, issued) = match jar.get(SESSION_COOKIE) {
        Some(cookie) => (SessionId::from(cookie.value().to_string()), None),
        None => {
            let id = SessionId::generate();
            let jar = jar.add(session_cookie(&id, state.config.session.cookie_secure));
            (id, Some(jar))
        }
    };

    request.extensions_mut().insert(session_id);
    let response = next.run(request).await;

    match issued {
        Some(jar) => (jar, response).into_response(),
        None => response,
    }
}

/// The signed session cookie carrying `id`.
pub fn session_cookie(id: &SessionId, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Removal cookie for the session, sent on logout.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// The caller's session id together with its current token state.
#[derive(Debug)]
pub struct CurrentSession {
    pub id: SessionId,
    pub session: Session,
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = parts.extensions.get::<SessionId>().cloned().ok_or_else(|| {
            tracing::error!("Session layer is not installed");
            AppError::Internal
        })?;

        let session = state.auth_service.session(&id).await;
        Ok(Self { id, session })
    }
}
