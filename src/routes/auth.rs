use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::password;
use crate::auth::session::{self, SESSION_COOKIE, clear_session_cookie, session_cookie};
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::{AppState, SharedState};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: User,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Check credentials, counting failures against the login limiter.
pub async fn authenticate(state: &AppState, email: &str, password: &str) -> Result<User, AppError> {
    if state.login_limiter.check(email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(user) = db::users::find_by_email(&state.pool, email).await? else {
        state.login_limiter.record_failure(email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    let valid = password::verify(password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(email);
        tracing::info!(user_id = %user.id, "Rejected login with wrong password");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    state.login_limiter.reset(email);
    Ok(user)
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let user = authenticate(&state, &req.email, &req.password).await?;
    let token = session::start(&state.pool, user.id).await?;
    tracing::info!(user_id = %user.id, "Session started");

    let jar = CookieJar::new().add(session_cookie(&token, state.config.secure_cookies));
    Ok((jar, Json(SessionResponse { user })))
}

pub async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        session::end(&state.pool, cookie.value()).await?;
    }

    Ok((
        clear_session_cookie(),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}
