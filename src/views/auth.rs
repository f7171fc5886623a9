use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::session::{self, SESSION_COOKIE, clear_session_cookie, session_cookie};
use crate::error::AppError;
use crate::routes::auth::authenticate;
use crate::state::SharedState;
use crate::views::{found, render};

const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    // Already signed in
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if session::validate(&state.pool, cookie.value()).await?.is_some() {
            return Ok(found(DASHBOARD_PATH));
        }
    }

    Ok(render(&LoginTemplate { error: None })?.into_response())
}

pub async fn login_submit(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match authenticate(&state, &form.email, &form.password).await {
        Ok(user) => {
            let token = session::start(&state.pool, user.id).await?;
            let jar = CookieJar::new().add(session_cookie(&token, state.config.secure_cookies));
            Ok((jar, found(DASHBOARD_PATH)).into_response())
        }
        Err(AppError::Unauthorized(message) | AppError::RateLimited(message)) => {
            let page = render(&LoginTemplate {
                error: Some(message),
            })?;
            Ok((StatusCode::UNAUTHORIZED, page).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn logout_submit(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        session::end(&state.pool, cookie.value()).await?;
    }
    Ok((clear_session_cookie(), found("/")).into_response())
}
