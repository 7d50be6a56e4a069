/// Moderator API routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use otakuy_core::{Album, AlbumCounts, AlbumId, AlbumStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub album_ids: BTreeSet<AlbumId>,
    /// Parsed with `AlbumStatus::from_str` so unknown values are a 400
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub album_ids: BTreeSet<AlbumId>,
    pub is_recommend: bool,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub modified: u64,
}

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub page: u32,
}

/// POST /api/admin/albums/status
pub async fn change_status(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<BulkResponse>> {
    let status = req.status.parse::<AlbumStatus>()?;
    let modified = app_state
        .lifecycle
        .moderate(auth.credential(), req.album_ids, status)
        .await?;
    Ok(Json(BulkResponse { modified }))
}

/// POST /api/admin/albums/recommend
pub async fn set_recommended(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<BulkResponse>> {
    let modified = app_state
        .lifecycle
        .set_recommended(auth.credential(), req.album_ids, req.is_recommend)
        .await?;
    Ok(Json(BulkResponse { modified }))
}

/// GET /api/admin/albums?status=&page=
///
/// Moderation queue; defaults to pending albums.
pub async fn moderation_queue(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<QueueQuery>,
) -> Result<Json<Vec<Album>>> {
    let status = match query.status.as_deref() {
        Some(status) => status.parse::<AlbumStatus>()?,
        None => AlbumStatus::Pending,
    };
    let albums = app_state
        .lifecycle
        .moderation_queue(auth.credential(), status, query.page)
        .await?;
    Ok(Json(albums))
}

/// GET /api/admin/albums/counts
pub async fn album_counts(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<AlbumCounts>> {
    Ok(Json(app_state.lifecycle.counts(auth.credential()).await?))
}
