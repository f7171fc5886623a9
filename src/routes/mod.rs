pub mod auth;
pub mod contact;
pub mod endorsements;
pub mod projects;
pub mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        // Users: read by slug, update by id
        .route("/api/v1/users/{user}", get(users::get).put(users::update))
        // Projects: read by slug, change by id
        .route("/api/v1/projects", post(projects::create))
        .route(
            "/api/v1/projects/{project}",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        // Endorsements
        .route("/api/v1/endorsements", post(endorsements::set))
        // Contact form
        .route("/api/v1/contact", post(contact::send))
}
