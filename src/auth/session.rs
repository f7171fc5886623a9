//! Opaque session tokens. The cookie carries a random token; the database
//! only ever sees its SHA-256 digest.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::db;
use crate::models::User;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_DAYS: i64 = 7;

pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The user behind a session token, if the session exists and is unexpired.
pub async fn validate(pool: &PgPool, token: &str) -> Result<Option<User>, sqlx::Error> {
    if token.is_empty() {
        return Ok(None);
    }
    db::sessions::find_user_by_hash(pool, &hash_token(token)).await
}

/// Start a session for `user_id` and return the raw token for the cookie.
pub async fn start(pool: &PgPool, user_id: uuid::Uuid) -> Result<String, sqlx::Error> {
    let token = generate_token();
    db::sessions::create(
        pool,
        user_id,
        &hash_token(&token),
        Utc::now() + Duration::days(SESSION_DAYS),
    )
    .await?;
    Ok(token)
}

pub async fn end(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    db::sessions::delete_by_hash(pool, &hash_token(token)).await
}

pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build()
}

pub fn clear_session_cookie() -> CookieJar {
    let cleared = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(cleared)
}
