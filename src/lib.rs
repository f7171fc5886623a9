pub mod auth;
pub mod client_ip;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod loader;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod store;
pub mod viewmodels;
pub mod views;
pub mod worker;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::email::SystemMailer;
use crate::rate_limit::{ContactRateLimiter, LoginRateLimiter};
use crate::state::{AppState, SharedState};
use crate::store::PgStore;

const MAX_BODY_BYTES: usize = 256 * 1024;

pub fn build_state(pool: PgPool, config: Config) -> SharedState {
    let system_mailer = config
        .smtp
        .as_ref()
        .and_then(|smtp| match SystemMailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!("System SMTP configured");
                Some(Arc::new(mailer))
            }
            Err(e) => {
                tracing::warn!("System SMTP not available: {e}");
                None
            }
        });

    Arc::new(AppState {
        store: PgStore::new(pool.clone()),
        pool,
        config,
        system_mailer,
        contact_limiter: ContactRateLimiter::new(),
        login_limiter: LoginRateLimiter::new(),
    })
}

pub fn build_app(state: SharedState) -> Router {
    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    Router::new()
        .merge(routes::api_routes())
        .merge(views::view_routes())
        .nest_service("/static", ServeDir::new("static"))
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(security_headers)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
