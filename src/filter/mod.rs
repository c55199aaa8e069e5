//! Tag filter selection state.
//!
//! Two selection models exist side by side:
//!
//! - **single select**: one tag or "all"; picking a tag replaces the current one.
//! - **multi select**: an ordered set of tags; toggling adds or removes, and
//!   "all" is the empty set. Insertion order is kept so the most recently
//!   added tag can be scrolled into view.
//!
//! [`FilterStore`] wraps a [`Selection`] with persistence and a hydration flag.
//! Until the persisted selection has been restored, [`FilterStore::listing_query`]
//! returns `None` so nothing is fetched with the default selection first.

pub mod storage;

use anyhow::Result;
use tracing::{debug, warn};

use crate::db::{GalleryFilter, ALL_TAGS};
pub use storage::{FileStorage, MemoryStorage, PersistedFilter, StateStorage, STORAGE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `None` is "all".
    Single(Option<String>),
    /// Empty is "all".
    Multi(Vec<String>),
}

impl Selection {
    pub fn new(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => Selection::Single(None),
            SelectionMode::Multi => Selection::Multi(Vec::new()),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Selection::Single(_) => SelectionMode::Single,
            Selection::Multi(_) => SelectionMode::Multi,
        }
    }

    /// Multi-select state from a `tagIds` style list. Blank segments and the
    /// `all` sentinel are skipped, repeats collapse.
    pub fn multi_from_csv(csv: &str) -> Self {
        let mut selection = Selection::Multi(Vec::new());
        for segment in csv.split(',').map(str::trim) {
            if !is_all_sentinel(segment) && !selection.is_selected(segment) {
                selection.toggle(segment);
            }
        }
        selection
    }

    pub fn selected(&self) -> &[String] {
        match self {
            Selection::Single(Some(tag)) => std::slice::from_ref(tag),
            Selection::Single(None) => &[],
            Selection::Multi(tags) => tags,
        }
    }

    pub fn is_all(&self) -> bool {
        self.selected().is_empty()
    }

    pub fn is_selected(&self, tag_id: &str) -> bool {
        let tag_id = tag_id.trim();
        self.selected().iter().any(|t| t == tag_id)
    }

    /// Make `tag_id` the only selected tag, or clear the selection for `all`.
    pub fn select(&mut self, tag_id: &str) {
        let tag_id = tag_id.trim();
        let tag = (!is_all_sentinel(tag_id)).then(|| tag_id.to_string());
        match self {
            Selection::Single(current) => *current = tag,
            Selection::Multi(tags) => *tags = tag.into_iter().collect(),
        }
    }

    /// Add the tag if absent, remove it if present. Toggling `all` clears.
    pub fn toggle(&mut self, tag_id: &str) {
        let tag_id = tag_id.trim();
        if is_all_sentinel(tag_id) {
            self.reset();
            return;
        }
        match self {
            Selection::Single(current) => {
                if current.as_deref() == Some(tag_id) {
                    *current = None;
                } else {
                    *current = Some(tag_id.to_string());
                }
            }
            Selection::Multi(tags) => {
                if let Some(pos) = tags.iter().position(|t| t == tag_id) {
                    tags.remove(pos);
                } else {
                    tags.push(tag_id.to_string());
                }
            }
        }
    }

    /// A copy with `tag_id` toggled, for rendering links to the next state.
    pub fn toggled(&self, tag_id: &str) -> Self {
        let mut next = self.clone();
        next.toggle(tag_id);
        next
    }

    pub fn reset(&mut self) {
        *self = Selection::new(self.mode());
    }

    /// The tag the filter bar should scroll into view: the most recently added one.
    pub fn scroll_target(&self) -> Option<&str> {
        self.selected().last().map(String::as_str)
    }

    /// Query string for the gallery listing, including the leading `?`, or
    /// empty for "all".
    pub fn query_string(&self) -> String {
        match self {
            Selection::Single(Some(tag)) => format!("?tagId={}", urlencoding::encode(tag)),
            Selection::Multi(tags) if !tags.is_empty() => {
                let encoded: Vec<_> = tags.iter().map(|t| urlencoding::encode(t)).collect();
                format!("?tagIds={}", encoded.join(","))
            }
            _ => String::new(),
        }
    }

    /// The listing filter this selection asks the server for.
    pub fn gallery_filter(&self) -> GalleryFilter {
        if self.is_all() {
            GalleryFilter::All
        } else {
            GalleryFilter::from_csv(&self.selected().join(","))
        }
    }

    fn to_persisted(&self) -> PersistedFilter {
        match self {
            Selection::Single(tag) => PersistedFilter::Single {
                selected_tag: tag.clone().unwrap_or_else(|| ALL_TAGS.to_string()),
            },
            Selection::Multi(tags) => PersistedFilter::Multi { selected_tags: tags.clone() },
        }
    }

    /// Restore from a persisted record, converting between modes if the record
    /// was written by the other variant.
    fn from_persisted(record: PersistedFilter, mode: SelectionMode) -> Self {
        let mut selection = Selection::new(mode);
        match record {
            PersistedFilter::Single { selected_tag } => selection.select(&selected_tag),
            PersistedFilter::Multi { selected_tags } => match mode {
                SelectionMode::Single => {
                    if let Some(last) = selected_tags.last() {
                        selection.select(last);
                    }
                }
                SelectionMode::Multi => {
                    for tag in selected_tags {
                        if !selection.is_selected(&tag) {
                            selection.toggle(&tag);
                        }
                    }
                }
            },
        }
        selection
    }
}

fn is_all_sentinel(tag_id: &str) -> bool {
    let tag_id = tag_id.trim();
    tag_id.is_empty() || tag_id.eq_ignore_ascii_case(ALL_TAGS)
}

/// Selection state with persistence and a hydration gate.
pub struct FilterStore<S: StateStorage> {
    storage: S,
    selection: Selection,
    hydrated: bool,
}

impl<S: StateStorage> FilterStore<S> {
    pub fn new(storage: S, mode: SelectionMode) -> Self {
        Self {
            storage,
            selection: Selection::new(mode),
            hydrated: false,
        }
    }

    /// Restore the persisted selection. Always ends hydrated: an unreadable or
    /// malformed record leaves the default selection in place.
    pub fn hydrate(&mut self) {
        let mode = self.selection.mode();
        match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedFilter>(&raw) {
                Ok(record) => {
                    self.selection = Selection::from_persisted(record, mode);
                    debug!(selection = ?self.selection, "filter state restored");
                }
                Err(e) => warn!("Ignoring malformed persisted filter state: {}", e),
            },
            Ok(None) => debug!("no persisted filter state"),
            Err(e) => warn!("Failed to read persisted filter state: {:#}", e),
        }
        self.hydrated = true;
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn select(&mut self, tag_id: &str) -> Result<()> {
        self.selection.select(tag_id);
        self.persist()
    }

    pub fn toggle(&mut self, tag_id: &str) -> Result<()> {
        self.selection.toggle(tag_id);
        self.persist()
    }

    pub fn reset(&mut self) -> Result<()> {
        self.selection.reset();
        self.persist()
    }

    pub fn scroll_target(&self) -> Option<&str> {
        self.selection.scroll_target()
    }

    /// Query string for the next listing fetch; `None` until hydrated.
    pub fn listing_query(&self) -> Option<String> {
        self.hydrated.then(|| self.selection.query_string())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // Writing before hydration would overwrite the record we are about to restore.
    fn persist(&mut self) -> Result<()> {
        if !self.hydrated {
            return Ok(());
        }
        let record = serde_json::to_string(&self.selection.to_persisted())?;
        self.storage.set(STORAGE_KEY, &record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hydrated(mode: SelectionMode) -> FilterStore<MemoryStorage> {
        let mut store = FilterStore::new(MemoryStorage::new(), mode);
        store.hydrate();
        store
    }

    #[test]
    fn test_single_select_replaces() {
        let mut store = hydrated(SelectionMode::Single);
        store.select("3").unwrap();
        store.select("5").unwrap();
        assert_eq!(store.selection(), &Selection::Single(Some("5".to_string())));
        assert_eq!(store.listing_query().as_deref(), Some("?tagId=5"));

        store.select("all").unwrap();
        assert!(store.selection().is_all());
        assert_eq!(store.listing_query().as_deref(), Some(""));
    }

    #[test]
    fn test_multi_select_toggles_in_insertion_order() {
        let mut store = hydrated(SelectionMode::Multi);
        store.toggle("4").unwrap();
        store.toggle("1").unwrap();
        store.toggle("9").unwrap();
        assert_eq!(store.selection().selected(), ["4", "1", "9"]);
        assert_eq!(store.scroll_target(), Some("9"));
        assert_eq!(store.listing_query().as_deref(), Some("?tagIds=4,1,9"));

        store.toggle("1").unwrap();
        assert_eq!(store.selection().selected(), ["4", "9"]);

        store.toggle("9").unwrap();
        assert_eq!(store.scroll_target(), Some("4"));
    }

    #[test]
    fn test_all_is_the_empty_set() {
        let mut store = hydrated(SelectionMode::Multi);
        store.toggle("2").unwrap();
        store.toggle("all").unwrap();
        assert_eq!(store.selection(), &Selection::Multi(vec![]));
        assert!(!store.selection().is_selected("all"));
        assert_eq!(store.scroll_target(), None);
    }

    #[test]
    fn test_padded_tag_ids_are_trimmed() {
        let mut store = hydrated(SelectionMode::Single);
        store.select(" all ").unwrap();
        assert!(store.selection().is_all());
        assert_eq!(store.listing_query().as_deref(), Some(""));

        store.select(" 4 ").unwrap();
        assert_eq!(store.selection(), &Selection::Single(Some("4".to_string())));
        assert_eq!(store.listing_query().as_deref(), Some("?tagId=4"));
        assert!(store.selection().is_selected(" 4"));

        store.toggle(" 4 ").unwrap();
        assert!(store.selection().is_all());

        let mut store = hydrated(SelectionMode::Multi);
        store.toggle(" 4").unwrap();
        store.toggle("7 ").unwrap();
        store.toggle("4 ").unwrap();
        assert_eq!(store.selection().selected(), ["7"]);
        store.toggle(" ALL ").unwrap();
        assert_eq!(store.selection(), &Selection::Multi(vec![]));
    }

    #[test]
    fn test_select_then_all_restores_unfiltered_listing() {
        for mode in [SelectionMode::Single, SelectionMode::Multi] {
            let mut store = hydrated(mode);
            let initial_query = store.listing_query();
            let initial_filter = store.selection().gallery_filter();

            store.select("42").unwrap();
            assert_eq!(store.selection().gallery_filter(), GalleryFilter::AnyOf(vec![42]));

            store.select("all").unwrap();
            assert_eq!(store.listing_query(), initial_query);
            assert_eq!(store.selection().gallery_filter(), initial_filter);

            store.toggle("42").unwrap();
            store.reset().unwrap();
            assert_eq!(store.listing_query(), initial_query);
        }
    }

    #[test]
    fn test_no_fetch_before_hydration() {
        let mut store = FilterStore::new(MemoryStorage::new(), SelectionMode::Multi);
        assert!(!store.is_hydrated());
        assert_eq!(store.listing_query(), None);

        store.hydrate();
        assert!(store.is_hydrated());
        assert_eq!(store.listing_query().as_deref(), Some(""));
    }

    #[test]
    fn test_selection_survives_reload() {
        let mut store = hydrated(SelectionMode::Multi);
        store.toggle("7").unwrap();
        store.toggle("2").unwrap();

        let raw = store.storage().get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"selectedTags":["7","2"]}"#);

        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, &raw).unwrap();
        let mut reloaded = FilterStore::new(storage, SelectionMode::Multi);
        reloaded.hydrate();
        assert_eq!(reloaded.selection().selected(), ["7", "2"]);
        assert_eq!(reloaded.scroll_target(), Some("2"));
    }

    #[test]
    fn test_single_select_persists_all_sentinel() {
        let mut store = hydrated(SelectionMode::Single);
        store.select("3").unwrap();
        store.select("all").unwrap();
        let raw = store.storage().get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"selectedTag":"all"}"#);
    }

    #[test]
    fn test_changes_before_hydration_do_not_clobber_storage() {
        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, r#"{"selectedTag":"12"}"#).unwrap();

        let mut store = FilterStore::new(storage, SelectionMode::Single);
        store.select("3").unwrap();
        assert_eq!(
            store.storage().get(STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"selectedTag":"12"}"#)
        );

        store.hydrate();
        assert_eq!(store.selection().selected(), ["12"]);
    }

    #[test]
    fn test_malformed_record_falls_back_to_default() {
        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, "not json").unwrap();
        let mut store = FilterStore::new(storage, SelectionMode::Multi);
        store.hydrate();
        assert!(store.is_hydrated());
        assert!(store.selection().is_all());
    }

    #[test]
    fn test_record_from_other_mode_is_converted() {
        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, r#"{"selectedTag":"5"}"#).unwrap();
        let mut multi = FilterStore::new(storage, SelectionMode::Multi);
        multi.hydrate();
        assert_eq!(multi.selection(), &Selection::Multi(vec!["5".to_string()]));

        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, r#"{"selectedTags":["1","8"]}"#).unwrap();
        let mut single = FilterStore::new(storage, SelectionMode::Single);
        single.hydrate();
        assert_eq!(single.selection(), &Selection::Single(Some("8".to_string())));
    }

    #[test]
    fn test_single_toggle_of_selected_tag_clears() {
        let mut selection = Selection::new(SelectionMode::Single);
        selection.toggle("3");
        assert_eq!(selection.scroll_target(), Some("3"));
        selection.toggle("3");
        assert!(selection.is_all());
    }

    #[test]
    fn test_multi_from_csv_and_toggled_links() {
        let selection = Selection::multi_from_csv("1,,2,1,all");
        assert_eq!(selection.selected(), ["1", "2"]);
        assert_eq!(selection.toggled("2").query_string(), "?tagIds=1");
        assert_eq!(selection.toggled("5").query_string(), "?tagIds=1,2,5");
        assert_eq!(selection.toggled("all").query_string(), "");
        // The original is untouched.
        assert_eq!(selection.query_string(), "?tagIds=1,2");
    }
}
