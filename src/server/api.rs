//! JSON endpoints, mounted under `/api`.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::Redirect,
    Json,
};
use serde::Deserialize;

use crate::db::{GalleryDetail, GalleryFilter, GalleryImage, GalleryTag, ProfileWithGalleries};
use crate::filter::Selection;

use super::error::ApiError;
use super::state::AppState;

const GALLERY_NOT_FOUND: &str = "Gallery not found";

/// The `tagId` / `tagIds` listing parameters.
#[derive(Debug, Default, Deserialize)]
pub struct TagQuery {
    #[serde(rename = "tagId")]
    pub tag_id: Option<String>,
    #[serde(rename = "tagIds")]
    pub tag_ids: Option<String>,
}

impl TagQuery {
    pub fn filter(&self) -> GalleryFilter {
        GalleryFilter::from_params(self.tag_id.as_deref(), self.tag_ids.as_deref())
    }

    /// The pill bar selection these parameters describe, as a multi-select set.
    pub fn selection(&self) -> Selection {
        match (&self.tag_ids, &self.tag_id) {
            (Some(csv), _) | (None, Some(csv)) => Selection::multi_from_csv(csv),
            (None, None) => Selection::multi_from_csv(""),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub url: Option<String>,
}

pub async fn list_galleries(
    State(state): State<AppState>,
    Query(params): Query<TagQuery>,
) -> Result<Json<Vec<GalleryImage>>, ApiError> {
    let filter = params.filter();
    let galleries = state
        .query("Failed to fetch galleries", move |db| db.list_galleries(&filter))
        .await?;
    Ok(Json(galleries))
}

pub async fn gallery_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GalleryDetail>, ApiError> {
    // A non-numeric id cannot name a gallery.
    let id: i64 = id.trim().parse().map_err(|_| ApiError::NotFound(GALLERY_NOT_FOUND))?;
    state
        .query("Failed to fetch gallery detail", move |db| db.get_gallery_detail(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(GALLERY_NOT_FOUND))
}

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<GalleryTag>>, ApiError> {
    let tags = state.query("Failed to fetch tags", |db| db.list_tags()).await?;
    Ok(Json(tags))
}

/// `null` with 404 when the profile is unknown or has no uploads.
pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Option<ProfileWithGalleries>>), ApiError> {
    let id = id.trim().to_string();
    if id.is_empty() {
        return Err(ApiError::BadRequest("Profile id is required".to_string()));
    }

    let found = state
        .query("Internal server error", move |db| db.get_profile_with_galleries(&id))
        .await?;
    let status = if found.is_some() { StatusCode::OK } else { StatusCode::NOT_FOUND };
    Ok((status, Json(found)))
}

/// Redirect to an image URL so the browser downloads it from the origin.
pub async fn download(Query(params): Query<DownloadQuery>) -> Result<Redirect, ApiError> {
    let url = params.url.as_deref().map(str::trim).unwrap_or_default();
    validate_download_url(url)?;
    Ok(Redirect::temporary(url))
}

fn validate_download_url(url: &str) -> Result<(), ApiError> {
    if url.is_empty() {
        return Err(ApiError::BadRequest("Missing url parameter".to_string()));
    }

    let lower = url.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(ApiError::BadRequest("Only http and https URLs can be downloaded".to_string()));
    }

    // Redirect::temporary panics on values that cannot be a header.
    HeaderValue::from_str(url)
        .map_err(|_| ApiError::BadRequest("Invalid url parameter".to_string()))?;
    Ok(())
}
