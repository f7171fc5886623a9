use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::loader::{EntityLoader, Lookup};
use crate::state::SharedState;
use crate::store::UserFilter;
use crate::viewmodels::{DeveloperCard, ProfilePage, load_profile};
use crate::views::{DEVELOPERS_PATH, found, render};

#[derive(Template)]
#[template(path = "developers.html")]
struct DevelopersTemplate {
    developers: Vec<DeveloperCard>,
}

#[derive(Template)]
#[template(path = "profile.html")]
struct ProfileTemplate {
    profile: ProfilePage,
}

pub async fn list(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    let developers = EntityLoader::new(&state.store)
        .fetch_many::<DeveloperCard>(&UserFilter::Visible)
        .await?;
    render(&DevelopersTemplate { developers })
}

pub async fn show(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    match load_profile(&state.store, &slug).await? {
        Lookup::Found(profile) => Ok(render(&ProfileTemplate { profile })?.into_response()),
        Lookup::NotFound => Ok(found(DEVELOPERS_PATH)),
    }
}
