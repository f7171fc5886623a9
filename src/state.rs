use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::email::SystemMailer;
use crate::rate_limit::{ContactRateLimiter, LoginRateLimiter};
use crate::store::PgStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub store: PgStore,
    pub config: Config,
    pub system_mailer: Option<Arc<SystemMailer>>,
    pub contact_limiter: ContactRateLimiter,
    pub login_limiter: LoginRateLimiter,
}
