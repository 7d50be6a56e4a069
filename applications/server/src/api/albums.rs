/// Album API routes
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use otakuy_core::{Album, AlbumDraft, AlbumId, FilterKind, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
    #[serde(default)]
    pub param: String,
    #[serde(default)]
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,
}

#[derive(Debug, Serialize)]
pub struct CoverResponse {
    pub cover: String,
}

/// GET /api/albums?filter=&param=&page=
///
/// Public listing of active albums; the filter defaults to `byTime`.
pub async fn list_albums(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Album>>> {
    let catalog = app_state.lifecycle.catalog();
    let albums = match query.filter.as_deref() {
        Some(kind) => catalog.dispatch(kind, &query.param, query.page).await?,
        None => catalog.list(FilterKind::ByTime, "", query.page).await?,
    };
    Ok(Json(albums))
}

/// GET /api/albums/recommended
pub async fn recommended_albums(State(app_state): State<AppState>) -> Result<Json<Vec<Album>>> {
    Ok(Json(app_state.lifecycle.catalog().recommended().await?))
}

/// GET /api/users/:owner/albums
pub async fn owner_albums(
    State(app_state): State<AppState>,
    Path(owner): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Album>>> {
    let owner = UserId::new(owner);
    Ok(Json(
        app_state
            .lifecycle
            .albums_of(&owner, false, query.page)
            .await?,
    ))
}

/// GET /api/users/:owner/albums/active
pub async fn owner_active_albums(
    State(app_state): State<AppState>,
    Path(owner): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Album>>> {
    let owner = UserId::new(owner);
    Ok(Json(
        app_state.lifecycle.albums_of(&owner, true, query.page).await?,
    ))
}

/// GET /api/users/:owner/albums/visible
///
/// Pending and active albums, as shown on the owner's own page.
pub async fn owner_visible_albums(
    State(app_state): State<AppState>,
    Path(owner): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Album>>> {
    let owner = UserId::new(owner);
    Ok(Json(
        app_state
            .lifecycle
            .catalog()
            .by_owner_not_rejected(&owner, query.page)
            .await?,
    ))
}

/// POST /api/albums
pub async fn create_album(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(draft): Json<AlbumDraft>,
) -> Result<(StatusCode, Json<Album>)> {
    let album = app_state.lifecycle.create(auth.credential(), draft).await?;
    Ok((StatusCode::CREATED, Json(album)))
}

/// GET /api/albums/:id
pub async fn get_album(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Album>> {
    let album = app_state
        .lifecycle
        .get(auth.credential(), &AlbumId::new(id))
        .await?;
    Ok(Json(album))
}

/// PUT /api/albums/:id
pub async fn update_album(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    Json(draft): Json<AlbumDraft>,
) -> Result<Json<Album>> {
    let album = app_state
        .lifecycle
        .update(auth.credential(), &AlbumId::new(id), draft)
        .await?;
    Ok(Json(album))
}

/// DELETE /api/albums/:id
pub async fn delete_album(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    app_state
        .lifecycle
        .delete(auth.credential(), &AlbumId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/albums/:id/cover
///
/// Responds with the cover URL as soon as the image is stored; the album
/// record is updated in the background.
pub async fn upload_cover(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<CoverResponse>> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(e.to_string()))?;
            image = Some(bytes.to_vec());
            break;
        }
    }

    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Missing cover file".to_string()))?;

    let upload = app_state
        .lifecycle
        .upload_cover(auth.credential(), &AlbumId::new(id), image)
        .await?;

    Ok(Json(CoverResponse { cover: upload.url }))
}
