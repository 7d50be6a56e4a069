/// Availability checks ahead of submission and registration
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};
use otakuy_core::TitleCheck;
use otakuy_storage::users;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct UsernameCheck {
    pub available: bool,
}

/// GET /api/check/albums?title=
pub async fn album_title(
    State(app_state): State<AppState>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<TitleCheck>> {
    Ok(Json(
        app_state.lifecycle.catalog().check_title(&query.title).await?,
    ))
}

/// GET /api/check/usernames?username=
pub async fn username(
    State(app_state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<UsernameCheck>> {
    let username = query.username.trim();
    if username.is_empty() {
        return Err(ServerError::BadRequest("username must not be empty".to_string()));
    }
    let existing = users::get_by_username(&app_state.pool, username).await?;
    Ok(Json(UsernameCheck {
        available: existing.is_none(),
    }))
}
