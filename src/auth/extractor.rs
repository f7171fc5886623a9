use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::auth::session::{self, SESSION_COOKIE, clear_session_cookie};
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;
use crate::views::found;

pub const LOGIN_PATH: &str = "/login";

/// Signed-in user for page routes. Without a valid session the visitor is
/// sent to the login page and the stale cookie is dropped.
#[derive(Debug, Clone)]
pub struct SessionUser(pub User);

/// Signed-in user for JSON routes. Rejects with 401.
#[derive(Debug, Clone)]
pub struct ApiUser(pub User);

impl ApiUser {
    pub fn require_self_or_admin(&self, user_id: uuid::Uuid) -> Result<(), AppError> {
        if self.0.id == user_id || self.0.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You can only change your own profile".to_string(),
            ))
        }
    }
}

async fn session_user(parts: &Parts, state: &SharedState) -> Result<Option<User>, sqlx::Error> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    session::validate(&state.pool, cookie.value()).await
}

pub fn login_redirect() -> Response {
    (clear_session_cookie(), found(LOGIN_PATH)).into_response()
}

impl FromRequestParts<SharedState> for SessionUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await {
            Ok(Some(user)) => Ok(SessionUser(user)),
            Ok(None) => {
                tracing::debug!(path = %parts.uri.path(), "No valid session, redirecting to login");
                Err(login_redirect())
            }
            Err(e) => Err(AppError::Database(e).into_response()),
        }
    }
}

impl FromRequestParts<SharedState> for ApiUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        session_user(parts, state)
            .await?
            .map(ApiUser)
            .ok_or_else(|| AppError::Unauthorized("Missing or expired session".to_string()))
    }
}
