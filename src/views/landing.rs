use askama::Template;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::error::AppError;
use crate::loader::EntityLoader;
use crate::state::SharedState;
use crate::store::UserFilter;
use crate::viewmodels::{DeveloperCard, ProjectWithAuthors};
use crate::views::render;

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate {
    projects: Vec<ProjectWithAuthors>,
    developers: Vec<DeveloperCard>,
}

/// Curated projects in their configured order, plus the homepage developers.
pub async fn index(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    let loader = EntityLoader::new(&state.store);

    let projects = loader
        .fetch_by_slugs::<ProjectWithAuthors, _>(&state.config.featured_projects)
        .await?;
    let developers = loader
        .fetch_many::<DeveloperCard>(&UserFilter::Homepage)
        .await?;

    render(&LandingTemplate {
        projects,
        developers,
    })
}
