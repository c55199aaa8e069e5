//! Server-rendered HTML pages.
//!
//! The listing page reads its selection from the same `tagId` / `tagIds`
//! parameters as the JSON API, so every pill is a plain link to the toggled
//! selection and pages work without scripting.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::db::{GalleryDetail, GalleryImage, GalleryTag, ProfileWithGalleries};
use crate::filter::Selection;

use super::api::TagQuery;
use super::error::ApiError;
use super::state::AppState;

const SITE_TITLE: &str = "Interior Design Gallery";

/// Bring the most recently selected pill into view.
const SCROLL_SCRIPT: &str =
    "document.querySelector('.scroll-target')?.scrollIntoView({ inline: 'center', block: 'nearest' });";

const CSS: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #f9fafb; color: #111827; }
a { color: inherit; text-decoration: none; }
header.site-header { position: sticky; top: 0; z-index: 10; background: rgba(255,255,255,.92); border-bottom: 1px solid #e5e7eb; padding: 1rem 1.5rem; }
header.site-header h1 { margin: 0 0 .75rem; font-size: 1.5rem; }
.back { color: #2563eb; font-weight: 600; font-size: .875rem; }
nav.tag-bar { display: flex; gap: .5rem; overflow-x: auto; padding-bottom: .25rem; }
.pill { white-space: nowrap; border-radius: 9999px; padding: .35rem .9rem; font-size: .8rem; background: #f3f4f6; }
.pill.selected { background: #111827; color: #fff; }
main { padding: 1.5rem; }
.masonry { columns: 2; column-gap: 1rem; }
@media (min-width: 768px) { .masonry { columns: 3; } }
@media (min-width: 1200px) { .masonry { columns: 4; } }
.card { display: block; break-inside: avoid; margin-bottom: 1rem; border-radius: .5rem; overflow: hidden; background: #fff; box-shadow: 0 1px 2px rgba(0,0,0,.06); }
.card img { width: 100%; display: block; }
.card .meta { padding: .5rem .75rem; font-size: .75rem; color: #6b7280; }
.card .meta h3 { margin: 0 0 .25rem; font-size: .8rem; color: #111827; }
.empty { text-align: center; color: #6b7280; padding: 4rem 0; }
.hero img { width: 100%; max-height: 75vh; object-fit: cover; border-radius: 1rem; }
.details { margin-top: 1.5rem; background: #fff; border-radius: 1rem; padding: 1.5rem; display: flex; flex-wrap: wrap; gap: 1rem; justify-content: space-between; align-items: center; }
.owner { display: flex; gap: 1rem; align-items: center; }
.avatar { width: 3.5rem; height: 3.5rem; border-radius: 9999px; object-fit: cover; }
.initial { width: 3.5rem; height: 3.5rem; border-radius: 9999px; background: #dbeafe; color: #2563eb; display: flex; align-items: center; justify-content: center; font-weight: 700; font-size: 1.25rem; }
.chips { display: flex; flex-wrap: wrap; gap: .5rem; width: 100%; }
.chip { border-radius: 9999px; background: #eef2ff; color: #4338ca; padding: .2rem .75rem; font-size: .75rem; font-weight: 600; }
.download { border-radius: .5rem; background: #111827; color: #fff; padding: .5rem 1rem; font-size: .875rem; }
.cover img { width: 100%; height: 16rem; object-fit: cover; border-radius: 1rem; }
.stats { display: flex; gap: 2rem; }
.stats p { margin: 0; }
"#;

/// Page failures render as HTML, not JSON.
pub struct PageError(ApiError);

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        PageError(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self.0 {
            ApiError::NotFound(_) => not_found_response(),
            other => {
                let content = html! {
                    main { p.empty { (other.to_string()) } }
                };
                (other.status(), document("Something went wrong", content)).into_response()
            }
        }
    }
}

pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<TagQuery>,
) -> Result<Markup, PageError> {
    let selection = params.selection();
    let filter = params.filter();
    let (galleries, tags) = state
        .query("Failed to fetch galleries", move |db| {
            Ok((db.list_galleries(&filter)?, db.list_tags()?))
        })
        .await?;
    Ok(render_index(&selection, &tags, &galleries))
}

pub async fn gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Markup, PageError> {
    let id: i64 = id.trim().parse().map_err(|_| ApiError::NotFound("Gallery not found"))?;
    let detail = state
        .query("Failed to fetch gallery detail", move |db| db.get_gallery_detail(id))
        .await?
        .ok_or(ApiError::NotFound("Gallery not found"))?;
    Ok(render_gallery(&detail))
}

pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Markup, PageError> {
    let id = id.trim().to_string();
    if id.is_empty() {
        return Err(ApiError::NotFound("Profile not found").into());
    }
    let found = state
        .query("Internal server error", move |db| db.get_profile_with_galleries(&id))
        .await?
        .ok_or(ApiError::NotFound("Profile not found"))?;
    Ok(render_profile(&found))
}

pub async fn not_found() -> Response {
    not_found_response()
}

fn not_found_response() -> Response {
    let content = html! {
        (back_header())
        main {
            p.empty { "This page could not be found." }
        }
    };
    (StatusCode::NOT_FOUND, document("Not found", content)).into_response()
}

// ============================================================================
// Components
// ============================================================================

fn document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body { (content) }
        }
    }
}

fn back_header() -> Markup {
    html! {
        header.site-header {
            a.back href="/" { "‹ Back to Gallery" }
        }
    }
}

fn tag_bar(selection: &Selection, tags: &[GalleryTag]) -> Markup {
    let scroll_target = selection.scroll_target();
    html! {
        nav.tag-bar {
            a.pill.selected[selection.is_all()] href="/" { "All" }
            @for tag in tags {
                @let id = tag.id.to_string();
                a.pill.selected[selection.is_selected(&id)].scroll-target[scroll_target == Some(id.as_str())]
                    id={ "tag-" (id) }
                    href={ "/" (selection.toggled(&id).query_string()) } {
                    (tag.tag_display_name)
                }
            }
        }
        @if scroll_target.is_some() {
            script { (PreEscaped(SCROLL_SCRIPT)) }
        }
    }
}

fn gallery_card(gallery: &GalleryImage) -> Markup {
    html! {
        a.card href={ "/gallery/" (gallery.id) } {
            img src=(gallery.media_url) alt=(gallery.profile_name) loading="lazy";
            div.meta {
                h3 { (gallery.profile_name) }
                span { (gallery.total_photos) " photos" }
                " · "
                span { (short_date(&gallery.created_at)) }
            }
        }
    }
}

fn avatar(name: &str, picture: Option<&str>) -> Markup {
    html! {
        @if let Some(src) = picture {
            img.avatar src=(src) alt=(name);
        } @else {
            div.initial { (name.chars().next().unwrap_or('?')) }
        }
    }
}

// ============================================================================
// Pages
// ============================================================================

fn render_index(selection: &Selection, tags: &[GalleryTag], galleries: &[GalleryImage]) -> Markup {
    let content = html! {
        header.site-header {
            h1 { (SITE_TITLE) }
            (tag_bar(selection, tags))
        }
        main {
            @if galleries.is_empty() {
                p.empty { "No images found" }
            } @else {
                div.masonry {
                    @for gallery in galleries {
                        (gallery_card(gallery))
                    }
                }
            }
        }
    };
    document(SITE_TITLE, content)
}

fn render_gallery(detail: &GalleryDetail) -> Markup {
    let image = &detail.image;
    let download = format!("/api/download?url={}", urlencoding::encode(&image.media_url));

    let content = html! {
        (back_header())
        main {
            section.hero {
                img src=(image.media_url) alt=(image.profile_name);
            }
            section.details {
                a.owner href={ "/profile/" (image.created_by_user_id) } {
                    (avatar(&image.profile_name, image.profile_picture.as_deref()))
                    div {
                        h1 { (image.profile_name) }
                        p { (image.total_photos) " site photos" }
                    }
                }
                span { "Posted on " (long_date(&image.created_at)) }
                a.download href=(download) { "Download" }
                @if !image.tags.is_empty() {
                    div.chips {
                        @for tag in &image.tags {
                            span.chip { "#" (tag.tag_display_name) }
                        }
                    }
                }
            }
            @if !detail.similar_images.is_empty() {
                section.similar {
                    h2 { "Similar Images" }
                    div.masonry {
                        @for similar in &detail.similar_images {
                            (gallery_card(similar))
                        }
                    }
                }
            }
        }
    };
    document(&image.profile_name, content)
}

fn render_profile(found: &ProfileWithGalleries) -> Markup {
    let profile = &found.profile;
    let content = html! {
        (back_header())
        main {
            @if let Some(cover) = &profile.cover_image {
                section.cover {
                    img src=(cover) alt=(profile.profile_name);
                }
            }
            section.details {
                div.owner {
                    (avatar(&profile.profile_name, profile.profile_picture.as_deref()))
                    div {
                        h1 { (profile.profile_name) }
                        p { "Contractor ID: " (profile.contractor_uuid) }
                    }
                }
                div.stats {
                    p { strong { (profile.total_photo_uploaded) } " photos" }
                    p { "Member since " (long_date(&profile.created_at)) }
                    p { "Last updated " (long_date(&profile.updated_at)) }
                }
            }
            div.masonry {
                @for gallery in &found.galleries {
                    (gallery_card(gallery))
                }
            }
        }
    };
    document(&profile.profile_name, content)
}

// ============================================================================
// Dates
// ============================================================================

/// Stored timestamps are `YYYY-MM-DD HH:MM:SS`; RFC 3339 and bare dates are
/// accepted too.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// "Jan 5, 2024"
fn short_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// "January 5, 2024"
fn long_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}
