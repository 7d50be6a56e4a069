//! Album queries
//!
//! Tags are stored as a JSON array and matched with `json_each`. The gated
//! download resource is split over two nullable columns that are either both
//! set or both null.

use crate::StorageError;
use chrono::{DateTime, Utc};
use otakuy_core::storage::{AlbumField, AlbumFilter, Page};
use otakuy_core::{Album, AlbumId, AlbumStatus, DownloadRes, UserId};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;

type Result<T> = std::result::Result<T, StorageError>;

const COLUMNS: &str = "SELECT id, title, artist, tags, cover, intro, status, owner, \
                       is_recommend, download_url, download_permission, created_at FROM albums";

#[derive(sqlx::FromRow)]
struct AlbumRow {
    id: String,
    title: String,
    artist: String,
    tags: String,
    cover: String,
    intro: String,
    status: String,
    owner: String,
    is_recommend: bool,
    download_url: Option<String>,
    download_permission: Option<i64>,
    created_at: String,
}

impl TryFrom<AlbumRow> for Album {
    type Error = StorageError;

    fn try_from(row: AlbumRow) -> Result<Self> {
        let tags: BTreeSet<String> = serde_json::from_str(&row.tags)
            .map_err(|e| StorageError::corrupt(format!("album {} tags: {e}", row.id)))?;
        let status = row
            .status
            .parse::<AlbumStatus>()
            .map_err(|e| StorageError::corrupt(format!("album {}: {e}", row.id)))?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| StorageError::corrupt(format!("album {} created_at: {e}", row.id)))?
            .with_timezone(&Utc);

        let download_res = match (row.download_url, row.download_permission) {
            (Some(url), Some(permission)) => {
                let permission = u32::try_from(permission).map_err(|_| {
                    StorageError::corrupt(format!("album {} permission out of range", row.id))
                })?;
                Some(DownloadRes::new(url, permission))
            }
            _ => None,
        };

        Ok(Album {
            id: AlbumId::new(row.id),
            title: row.title,
            artist: row.artist,
            tags,
            cover: row.cover,
            intro: row.intro,
            status,
            owner: UserId::new(row.owner),
            is_recommend: row.is_recommend,
            download_res,
            created_at,
        })
    }
}

fn into_albums(rows: Vec<AlbumRow>) -> Result<Vec<Album>> {
    rows.into_iter().map(Album::try_from).collect()
}

/// Append the `WHERE` clause selecting `filter`
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &AlbumFilter) {
    match filter {
        AlbumFilter::Status(status) => {
            qb.push(" WHERE status = ").push_bind(status.as_str());
        }
        AlbumFilter::ActiveByTitle(title) => {
            qb.push(" WHERE status = 'active' AND title = ")
                .push_bind(title.clone());
        }
        AlbumFilter::ActiveByTag(tag) => {
            qb.push(
                " WHERE status = 'active' AND EXISTS \
                 (SELECT 1 FROM json_each(albums.tags) WHERE json_each.value = ",
            )
            .push_bind(tag.clone())
            .push(")");
        }
        AlbumFilter::ActiveByArtist(artist) => {
            qb.push(" WHERE status = 'active' AND artist = ")
                .push_bind(artist.clone());
        }
        AlbumFilter::Owner(owner) => {
            qb.push(" WHERE owner = ").push_bind(owner.as_str().to_string());
        }
        AlbumFilter::OwnerActive(owner) => {
            qb.push(" WHERE status = 'active' AND owner = ")
                .push_bind(owner.as_str().to_string());
        }
        AlbumFilter::OwnerNotRejected(owner) => {
            qb.push(" WHERE status != 'rejected' AND owner = ")
                .push_bind(owner.as_str().to_string());
        }
        AlbumFilter::Recommended(flag) => {
            qb.push(" WHERE is_recommend = ").push_bind(*flag);
        }
    }
}

/// Get an album by ID
pub async fn get_by_id(pool: &SqlitePool, id: &AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query_as::<_, AlbumRow>(&format!("{COLUMNS} WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.map(Album::try_from).transpose()
}

/// Insert a new album or overwrite the stored one with the same ID
pub async fn save(pool: &SqlitePool, album: &Album) -> Result<()> {
    let tags = serde_json::to_string(&album.tags)
        .map_err(|e| StorageError::corrupt(format!("album {} tags: {e}", album.id)))?;
    let (download_url, download_permission) = match &album.download_res {
        Some(res) => (Some(res.url.as_str()), Some(i64::from(res.permission))),
        None => (None, None),
    };

    sqlx::query(
        "INSERT INTO albums (id, title, artist, tags, cover, intro, status, owner,
                             is_recommend, download_url, download_permission, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            artist = excluded.artist,
            tags = excluded.tags,
            cover = excluded.cover,
            intro = excluded.intro,
            status = excluded.status,
            owner = excluded.owner,
            is_recommend = excluded.is_recommend,
            download_url = excluded.download_url,
            download_permission = excluded.download_permission",
    )
    .bind(album.id.as_str())
    .bind(&album.title)
    .bind(&album.artist)
    .bind(tags)
    .bind(&album.cover)
    .bind(&album.intro)
    .bind(album.status.as_str())
    .bind(album.owner.as_str())
    .bind(album.is_recommend)
    .bind(download_url)
    .bind(download_permission)
    .bind(album.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete an album; returns false when no row matched
pub async fn delete(pool: &SqlitePool, id: &AlbumId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM albums WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Albums holding `title` against new submissions
pub async fn find_by_title_active_or_pending(pool: &SqlitePool, title: &str) -> Result<Vec<Album>> {
    let rows = sqlx::query_as::<_, AlbumRow>(&format!(
        "{COLUMNS} WHERE title = ? AND status IN ('pending', 'active') ORDER BY id DESC"
    ))
    .bind(title)
    .fetch_all(pool)
    .await?;

    into_albums(rows)
}

/// Filtered listing, newest first
pub async fn find_filtered(
    pool: &SqlitePool,
    filter: &AlbumFilter,
    page: Option<Page>,
) -> Result<Vec<Album>> {
    let mut qb = QueryBuilder::<Sqlite>::new(COLUMNS);
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY id DESC");

    if let Some(page) = page {
        qb.push(" LIMIT ")
            .push_bind(i64::from(page.size))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
    }

    let rows = qb.build_query_as::<AlbumRow>().fetch_all(pool).await?;
    into_albums(rows)
}

/// Count albums matching a filter
pub async fn count(pool: &SqlitePool, filter: &AlbumFilter) -> Result<u64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM albums");
    push_filter(&mut qb, filter);

    let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Set one field on the given albums in a single statement
///
/// Rows already holding the value are left out so the affected-row count is
/// the number of albums that actually changed. Unknown ids match nothing.
pub async fn bulk_set_field(
    pool: &SqlitePool,
    ids: &BTreeSet<AlbumId>,
    field: AlbumField,
) -> Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE albums SET ");
    match field {
        AlbumField::Status(status) => {
            qb.push("status = ")
                .push_bind(status.as_str())
                .push(" WHERE status != ")
                .push_bind(status.as_str());
        }
        AlbumField::Recommend(flag) => {
            qb.push("is_recommend = ")
                .push_bind(flag)
                .push(" WHERE is_recommend != ")
                .push_bind(flag);
        }
    }

    qb.push(" AND id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str().to_string());
    }
    separated.push_unseparated(")");

    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected())
}
