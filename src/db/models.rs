//! View models returned by the query layer and serialized by the API.

use serde::{Deserialize, Serialize};

/// A categorical label attachable to many gallery images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryTag {
    pub id: i64,
    pub tag: String,
    pub tag_display_name: String,
    #[serde(rename = "type")]
    pub tag_type: String,
}

/// A single uploaded photo with its owner's display data and tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub media_url: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_user_id: String,
    pub profile_name: String,
    pub profile_picture: Option<String>,
    pub total_photos: i64,
    pub tags: Vec<GalleryTag>,
}

/// A gallery image plus the images that share at least one tag with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryDetail {
    #[serde(flatten)]
    pub image: GalleryImage,
    pub similar_images: Vec<GalleryImage>,
}

/// The contractor that owns gallery images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalProfile {
    pub id: i64,
    pub contractor_uuid: String,
    pub profile_name: String,
    pub profile_picture: Option<String>,
    pub total_photo_uploaded: i64,
    pub created_at: String,
    pub updated_at: String,
    /// Media URL of the most recent upload.
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileWithGalleries {
    pub profile: DigitalProfile,
    pub galleries: Vec<GalleryImage>,
}
