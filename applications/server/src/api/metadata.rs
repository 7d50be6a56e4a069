/// External catalog lookup routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use otakuy_core::{AlbumDraft, Suggestion};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub title: String,
}

/// GET /api/metadata/suggestions?title=
pub async fn suggestions(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<Suggestion>>> {
    Ok(Json(app_state.lifecycle.suggest(&query.title).await?))
}

/// GET /api/metadata/albums/:external_id
pub async fn album_detail(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(external_id): Path<String>,
) -> Result<Json<AlbumDraft>> {
    Ok(Json(app_state.lifecycle.detail(&external_id).await?))
}
