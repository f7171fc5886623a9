pub mod auth;
pub mod dashboard;
pub mod developers;
pub mod landing;
pub mod projects;

use askama::Template;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::SharedState;

/// Listing pages visitors land on when a slug matches nothing.
pub const PROJECTS_PATH: &str = "/projects";
pub const DEVELOPERS_PATH: &str = "/developers";

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(landing::index))
        // Projects
        .route(PROJECTS_PATH, get(projects::list))
        .route("/projects/{project}", get(projects::show))
        // Developers
        .route(DEVELOPERS_PATH, get(developers::list))
        .route("/developers/{user}", get(developers::show))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", axum::routing::post(auth::logout_submit))
        // Member area
        .route("/dashboard", get(dashboard::index))
}

/// 302 Found to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_is_a_302_with_location() {
        let response = found("/projects");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/projects"
        );
    }
}
