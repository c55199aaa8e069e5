//! Tag filters and the normalization of embedded tag collections.
//!
//! Every query path that returns images with tags goes through [`TagIndex`],
//! which groups `(gallery_id, tag)` link rows per image and drops repeated tag
//! ids. Joins over the link table can yield the same tag more than once for an
//! image; the index guarantees the public tag lists never do.

use std::collections::{HashMap, HashSet};

use super::models::{GalleryImage, GalleryTag};

/// Sentinel used by single-select clients for "no filter".
pub const ALL_TAGS: &str = "all";

/// Which images a listing should contain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GalleryFilter {
    /// No filtering.
    #[default]
    All,
    /// Images carrying at least one of these tag ids. An empty list matches
    /// nothing (every requested id was unusable).
    AnyOf(Vec<i64>),
}

impl GalleryFilter {
    /// Build a filter from the `tagId` and `tagIds` query parameters.
    /// `tagIds` wins when both are present.
    pub fn from_params(tag_id: Option<&str>, tag_ids: Option<&str>) -> Self {
        match (tag_ids, tag_id) {
            (Some(csv), _) => Self::from_csv(csv),
            (None, Some(single)) => Self::from_csv(single),
            (None, None) => GalleryFilter::All,
        }
    }

    /// Parse a comma separated id list. Empty segments and the `all` sentinel
    /// are ignored; if nothing remains the filter is [`GalleryFilter::All`].
    /// Segments that are not integers can never match a tag id and are dropped
    /// without widening the filter.
    pub fn from_csv(csv: &str) -> Self {
        let segments: Vec<&str> = csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_TAGS))
            .collect();

        if segments.is_empty() {
            return GalleryFilter::All;
        }

        let mut seen = HashSet::new();
        let ids = segments
            .into_iter()
            .filter_map(|s| s.parse::<i64>().ok())
            .filter(|id| seen.insert(*id))
            .collect();
        GalleryFilter::AnyOf(ids)
    }

    pub fn tag_ids(&self) -> &[i64] {
        match self {
            GalleryFilter::All => &[],
            GalleryFilter::AnyOf(ids) => ids,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, GalleryFilter::All)
    }
}

/// Drop repeated tag ids, keeping the first occurrence and the input order.
pub fn dedup_tags(tags: impl IntoIterator<Item = GalleryTag>) -> Vec<GalleryTag> {
    let mut seen = HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.id)).collect()
}

/// Tag lists grouped by gallery id.
#[derive(Debug, Default)]
pub struct TagIndex {
    by_gallery: HashMap<i64, Vec<GalleryTag>>,
}

impl TagIndex {
    pub fn from_links(links: impl IntoIterator<Item = (i64, GalleryTag)>) -> Self {
        let mut by_gallery: HashMap<i64, Vec<GalleryTag>> = HashMap::new();
        for (gallery_id, tag) in links {
            let tags = by_gallery.entry(gallery_id).or_default();
            if !tags.iter().any(|t| t.id == tag.id) {
                tags.push(tag);
            }
        }
        Self { by_gallery }
    }

    /// Remove and return the tags of one gallery (empty if it has none).
    pub fn take(&mut self, gallery_id: i64) -> Vec<GalleryTag> {
        self.by_gallery.remove(&gallery_id).unwrap_or_default()
    }

    /// Fill in the tag list of every image.
    pub fn attach(mut self, galleries: &mut [GalleryImage]) {
        for gallery in galleries {
            gallery.tags = dedup_tags(self.take(gallery.id));
        }
    }
}
