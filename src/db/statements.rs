//! The SQL behind each gallery operation.
//!
//! Column order is part of the contract with the backends' row mappers:
//!
//! - gallery rows: `id, media_url, created_at, updated_at, created_by_user_id,
//!   profile_name, profile_picture, total_photos`
//! - tag rows: `id, tag, tag_display_name, type`
//! - tag link rows: `gallery_id` followed by the tag row columns
//! - profile rows: `id, contractor_uuid, profile_name, profile_picture,
//!   total_photo_uploaded, created_at, updated_at, cover_image`

use super::query::{Dialect, SelectBuilder, SqlParam, Statement};
use super::tags::GalleryFilter;

/// Maximum rows returned by a gallery listing.
pub const GALLERY_LIST_LIMIT: u32 = 100;

/// Maximum similar images on a detail page.
pub const SIMILAR_IMAGES_LIMIT: u32 = 10;

/// Most ids bound into one `IN (...)` list. SQLite allows 32766 variables per
/// statement and PostgreSQL 65535; longer id lists are split across queries.
pub const MAX_BOUND_IDS: usize = 500;

const GALLERY_SELECT: &str = r#"
SELECT
    pmg.id,
    pmg.media_url,
    pmg.created_at,
    pmg.updated_at,
    pmg.created_by_user_id,
    dp.profile_name,
    dp.profile_picture,
    dp.total_photo_uploaded AS total_photos
FROM project_media_galleries pmg
INNER JOIN digital_profiles dp
    ON pmg.created_by_user_id = dp.contractor_uuid
"#;

const NEWEST_FIRST: &str = "pmg.created_at DESC, pmg.id DESC";

// A subquery rather than a join, so an image matching several tags is still one row.
const HAS_ANY_TAG: &str = "pmg.id IN (
    SELECT l.project_media_gallery_id
    FROM project_media_galleries_tag_id_links l
    WHERE l.project_gallery_tag_id IN ({})
)";

const TAG_LINK_SELECT: &str = r#"
SELECT
    l.project_media_gallery_id,
    t.id,
    t.tag,
    t.tag_display_name,
    t.type
FROM project_media_galleries_tag_id_links l
INNER JOIN project_gallery_tags t
    ON l.project_gallery_tag_id = t.id
"#;

const USED_TAGS_SELECT: &str = r#"
SELECT DISTINCT
    t.id,
    t.tag,
    t.tag_display_name,
    t.type
FROM project_gallery_tags t
INNER JOIN project_media_galleries_tag_id_links l
    ON t.id = l.project_gallery_tag_id
"#;

const PROFILE_SELECT: &str = r#"
SELECT
    dp.id,
    dp.contractor_uuid,
    dp.profile_name,
    dp.profile_picture,
    dp.total_photo_uploaded,
    dp.created_at,
    dp.updated_at,
    (
        SELECT cover.media_url
        FROM project_media_galleries cover
        WHERE cover.created_by_user_id = dp.contractor_uuid
        ORDER BY cover.created_at DESC, cover.id DESC
        LIMIT 1
    ) AS cover_image
FROM digital_profiles dp
"#;

/// The newest galleries, optionally restricted to images with any of the
/// filter's tags. Callers handle an empty [`GalleryFilter::AnyOf`] themselves.
pub fn list_galleries(filter: &GalleryFilter, dialect: Dialect) -> Statement {
    let mut builder = SelectBuilder::new(GALLERY_SELECT);
    if let GalleryFilter::AnyOf(ids) = filter {
        builder = builder.filter_in(HAS_ANY_TAG, ids.iter().copied());
    }
    builder
        .order_by(NEWEST_FIRST)
        .limit(GALLERY_LIST_LIMIT)
        .build(dialect)
}

pub fn gallery_by_id(id: i64, dialect: Dialect) -> Statement {
    SelectBuilder::new(GALLERY_SELECT)
        .filter("pmg.id = ?", vec![SqlParam::Int(id)])
        .build(dialect)
}

/// Images sharing at least one of `tag_ids`, excluding `exclude_id`.
/// `tag_ids` must not be empty.
pub fn similar_galleries(tag_ids: &[i64], exclude_id: i64, dialect: Dialect) -> Statement {
    SelectBuilder::new(GALLERY_SELECT)
        .filter_in(HAS_ANY_TAG, tag_ids.iter().copied())
        .filter("pmg.id <> ?", vec![SqlParam::Int(exclude_id)])
        .order_by(NEWEST_FIRST)
        .limit(SIMILAR_IMAGES_LIMIT)
        .build(dialect)
}

pub fn galleries_by_owner(contractor_uuid: &str, dialect: Dialect) -> Statement {
    SelectBuilder::new(GALLERY_SELECT)
        .filter("pmg.created_by_user_id = ?", vec![contractor_uuid.into()])
        .order_by(NEWEST_FIRST)
        .build(dialect)
}

/// Tag links for a batch of galleries in one round trip. `gallery_ids` must
/// not be empty.
pub fn tag_links_for(gallery_ids: &[i64], dialect: Dialect) -> Statement {
    SelectBuilder::new(TAG_LINK_SELECT)
        .filter_in("l.project_media_gallery_id IN ({})", gallery_ids.iter().copied())
        .order_by("l.project_media_gallery_id, t.id")
        .build(dialect)
}

pub fn used_tags(dialect: Dialect) -> Statement {
    SelectBuilder::new(USED_TAGS_SELECT)
        .order_by("t.tag_display_name ASC, t.id ASC")
        .build(dialect)
}

pub fn profile_by_uuid(contractor_uuid: &str, dialect: Dialect) -> Statement {
    SelectBuilder::new(PROFILE_SELECT)
        .filter("dp.contractor_uuid = ?", vec![contractor_uuid.into()])
        .limit(1)
        .build(dialect)
}
