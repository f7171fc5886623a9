use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::auth::extractor::{SessionUser, login_redirect};
use crate::error::AppError;
use crate::loader::{EntityLoader, Lookup};
use crate::state::SharedState;
use crate::viewmodels::UserWithMetadata;
use crate::views::render;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    user: UserWithMetadata,
}

pub async fn index(
    SessionUser(user): SessionUser,
    State(state): State<SharedState>,
) -> Result<Response, AppError> {
    let lookup = EntityLoader::new(&state.store)
        .fetch_unique::<UserWithMetadata>(&user.url)
        .await?;

    match lookup {
        Lookup::Found(user) => Ok(render(&DashboardTemplate { user })?.into_response()),
        // Session outlived its user row
        Lookup::NotFound => Ok(login_redirect()),
    }
}
