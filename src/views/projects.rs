use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::loader::{EntityLoader, Lookup};
use crate::state::SharedState;
use crate::store::ProjectFilter;
use crate::viewmodels::ProjectWithAuthors;
use crate::views::{PROJECTS_PATH, found, render};

#[derive(Template)]
#[template(path = "projects.html")]
struct ProjectsTemplate {
    projects: Vec<ProjectWithAuthors>,
}

#[derive(Template)]
#[template(path = "project.html")]
struct ProjectTemplate {
    project: ProjectWithAuthors,
}

pub async fn list(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    let projects = EntityLoader::new(&state.store)
        .fetch_many::<ProjectWithAuthors>(&ProjectFilter::Visible)
        .await?;
    render(&ProjectsTemplate { projects })
}

pub async fn show(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let lookup = EntityLoader::new(&state.store)
        .fetch_unique::<ProjectWithAuthors>(&slug)
        .await?;

    match lookup {
        Lookup::Found(project) => Ok(render(&ProjectTemplate { project })?.into_response()),
        Lookup::NotFound => Ok(found(PROJECTS_PATH)),
    }
}
