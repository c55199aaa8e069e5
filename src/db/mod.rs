mod schema;
pub mod models;
pub mod query;
pub mod sqlite;
pub mod statements;
pub mod tags;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "postgres")]
pub mod postgres_schema;

#[cfg(test)]
pub(crate) mod fixtures;

use anyhow::Result;
use std::collections::HashSet;

pub use models::{DigitalProfile, GalleryDetail, GalleryImage, GalleryTag, ProfileWithGalleries};
pub use schema::SCHEMA;
pub use statements::{GALLERY_LIST_LIMIT, MAX_BOUND_IDS, SIMILAR_IMAGES_LIMIT};
pub use tags::{GalleryFilter, TagIndex, ALL_TAGS};

use crate::config::{DatabaseConfig, DatabaseType};
use query::Statement;

/// Macro to dispatch a method call to the active backend variant.
macro_rules! dispatch {
    // No arguments beyond self
    ($self:expr, $method:ident()) => {
        match &$self.inner {
            DatabaseInner::Sqlite(db) => db.$method(),
            #[cfg(feature = "postgres")]
            DatabaseInner::Postgres(db) => db.$method(),
        }
    };
    // With arguments
    ($self:expr, $method:ident($($arg:expr),+ $(,)?)) => {
        match &$self.inner {
            DatabaseInner::Sqlite(db) => db.$method($($arg),+),
            #[cfg(feature = "postgres")]
            DatabaseInner::Postgres(db) => db.$method($($arg),+),
        }
    };
}

enum DatabaseInner {
    Sqlite(sqlite::SqliteDb),
    #[cfg(feature = "postgres")]
    Postgres(postgres::PgDb),
}

pub struct Database {
    inner: DatabaseInner,
}

impl Database {
    /// Open a database connection based on the provided configuration.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        if config.backend == DatabaseType::Postgresql {
            #[cfg(feature = "postgres")]
            {
                let url = config.postgresql_url.as_deref()
                    .ok_or_else(|| anyhow::anyhow!("PostgreSQL URL not configured"))?;
                let pool_size = config.pool_size.unwrap_or(10);
                let pg = postgres::PgDb::open(url, pool_size)?;
                tracing::info!("Using PostgreSQL backend (pool size {})", pool_size);
                return Ok(Self { inner: DatabaseInner::Postgres(pg) });
            }
            #[cfg(not(feature = "postgres"))]
            anyhow::bail!("PostgreSQL backend requested but atelier was built without the `postgres` feature");
        }

        let db = sqlite::SqliteDb::open(&config.sqlite_path)?;
        tracing::info!("Using SQLite backend at {:?}", config.sqlite_path);
        Ok(Self { inner: DatabaseInner::Sqlite(db) })
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = sqlite::SqliteDb::open_in_memory()?;
        Ok(Self { inner: DatabaseInner::Sqlite(db) })
    }

    pub fn initialize(&self) -> Result<()> {
        dispatch!(self, initialize())
    }

    fn dialect(&self) -> query::Dialect {
        dispatch!(self, dialect())
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        match &self.inner {
            DatabaseInner::Sqlite(db) => db.execute_batch(sql),
            #[cfg(feature = "postgres")]
            DatabaseInner::Postgres(_) => anyhow::bail!("test fixtures are SQLite only"),
        }
    }

    // ========================================================================
    // Gallery operations
    // ========================================================================

    /// Up to [`GALLERY_LIST_LIMIT`] images, newest first, each with its tags.
    pub fn list_galleries(&self, filter: &GalleryFilter) -> Result<Vec<GalleryImage>> {
        let dialect = self.dialect();
        let mut galleries = match filter {
            GalleryFilter::All => {
                let stmt = statements::list_galleries(filter, dialect);
                tracing::debug!(sql = %stmt.sql, "listing galleries");
                self.fetch_galleries(&stmt)?
            }
            GalleryFilter::AnyOf(ids) if ids.is_empty() => return Ok(Vec::new()),
            GalleryFilter::AnyOf(ids) => self.fetch_tagged(ids, GALLERY_LIST_LIMIT, |chunk| {
                statements::list_galleries(&GalleryFilter::AnyOf(chunk.to_vec()), dialect)
            })?,
        };
        self.attach_tags(&mut galleries)?;
        Ok(galleries)
    }

    /// One image with its tags and up to [`SIMILAR_IMAGES_LIMIT`] images that
    /// share a tag with it. `None` when the id is unknown.
    pub fn get_gallery_detail(&self, id: i64) -> Result<Option<GalleryDetail>> {
        let dialect = self.dialect();

        let Some(mut image) = self
            .fetch_galleries(&statements::gallery_by_id(id, dialect))?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        self.attach_tags(std::slice::from_mut(&mut image))?;

        let tag_ids: Vec<i64> = image.tags.iter().map(|t| t.id).collect();
        let mut similar_images = if tag_ids.is_empty() {
            Vec::new()
        } else {
            self.fetch_tagged(&tag_ids, SIMILAR_IMAGES_LIMIT, |chunk| {
                statements::similar_galleries(chunk, id, dialect)
            })?
        };
        self.attach_tags(&mut similar_images)?;

        Ok(Some(GalleryDetail { image, similar_images }))
    }

    /// Tags used by at least one image, by display name.
    pub fn list_tags(&self) -> Result<Vec<GalleryTag>> {
        let stmt = statements::used_tags(self.dialect());
        let tags = dispatch!(self, query_tags(&stmt))?;
        Ok(tags::dedup_tags(tags))
    }

    /// A profile and all of its uploads, newest first. A profile without any
    /// upload is reported as `None`, the same as an unknown one.
    pub fn get_profile_with_galleries(&self, contractor_uuid: &str) -> Result<Option<ProfileWithGalleries>> {
        let contractor_uuid = contractor_uuid.trim();
        anyhow::ensure!(!contractor_uuid.is_empty(), "contractor uuid is required");
        let dialect = self.dialect();

        let mut galleries =
            self.fetch_galleries(&statements::galleries_by_owner(contractor_uuid, dialect))?;
        if galleries.is_empty() {
            return Ok(None);
        }

        let stmt = statements::profile_by_uuid(contractor_uuid, dialect);
        let Some(profile) = dispatch!(self, query_profile(&stmt))? else {
            return Ok(None);
        };

        self.attach_tags(&mut galleries)?;
        Ok(Some(ProfileWithGalleries { profile, galleries }))
    }

    fn fetch_galleries(&self, stmt: &Statement) -> Result<Vec<GalleryImage>> {
        dispatch!(self, query_galleries(stmt))
    }

    /// Newest images matching any of `tag_ids`, at most `limit`. Each chunk of
    /// [`MAX_BOUND_IDS`] ids is its own query; chunk results are merged back
    /// into newest-first order and trimmed to `limit`.
    fn fetch_tagged<F>(&self, tag_ids: &[i64], limit: u32, build: F) -> Result<Vec<GalleryImage>>
    where
        F: Fn(&[i64]) -> Statement,
    {
        let mut merged = Vec::new();
        for chunk in tag_ids.chunks(MAX_BOUND_IDS) {
            let stmt = build(chunk);
            tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "fetching tagged galleries");
            merged.extend(self.fetch_galleries(&stmt)?);
        }

        if tag_ids.len() > MAX_BOUND_IDS {
            merged.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            let mut seen = HashSet::new();
            merged.retain(|g| seen.insert(g.id));
            merged.truncate(limit as usize);
        }
        Ok(merged)
    }

    /// Load the tags of every image, [`MAX_BOUND_IDS`] images per query, and
    /// normalize them.
    fn attach_tags(&self, galleries: &mut [GalleryImage]) -> Result<()> {
        if galleries.is_empty() {
            return Ok(());
        }
        let dialect = self.dialect();
        let ids: Vec<i64> = galleries.iter().map(|g| g.id).collect();
        let mut links = Vec::new();
        for chunk in ids.chunks(MAX_BOUND_IDS) {
            let stmt = statements::tag_links_for(chunk, dialect);
            links.extend(dispatch!(self, query_tag_links(&stmt))?);
        }
        TagIndex::from_links(links).attach(galleries);
        Ok(())
    }
}
