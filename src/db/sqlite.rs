//! SQLite backend implementation.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::models::{DigitalProfile, GalleryImage, GalleryTag};
use super::query::{Dialect, Statement};
use super::schema::SCHEMA;

/// A single connection shared by every request. SQLite serializes writers
/// anyway and this service only reads, so one connection behind a mutex is
/// the pool.
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database: {}", path.display()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("SQLite connection mutex poisoned"))
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    #[cfg(test)]
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    // ========================================================================
    // Row queries
    // ========================================================================

    pub fn query_galleries(&self, stmt: &Statement) -> Result<Vec<GalleryImage>> {
        let conn = self.conn()?;
        let mut prepared = conn.prepare(&stmt.sql)?;
        let rows = prepared
            .query_map(rusqlite::params_from_iter(stmt.params.iter()), row_to_gallery)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn query_tags(&self, stmt: &Statement) -> Result<Vec<GalleryTag>> {
        let conn = self.conn()?;
        let mut prepared = conn.prepare(&stmt.sql)?;
        let rows = prepared
            .query_map(rusqlite::params_from_iter(stmt.params.iter()), |row| row_to_tag(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn query_tag_links(&self, stmt: &Statement) -> Result<Vec<(i64, GalleryTag)>> {
        let conn = self.conn()?;
        let mut prepared = conn.prepare(&stmt.sql)?;
        let rows = prepared
            .query_map(rusqlite::params_from_iter(stmt.params.iter()), |row| {
                Ok((row.get(0)?, row_to_tag(row, 1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn query_profile(&self, stmt: &Statement) -> Result<Option<DigitalProfile>> {
        let conn = self.conn()?;
        let profile = conn
            .query_row(
                &stmt.sql,
                rusqlite::params_from_iter(stmt.params.iter()),
                |row| {
                    Ok(DigitalProfile {
                        id: row.get(0)?,
                        contractor_uuid: row.get(1)?,
                        profile_name: row.get(2)?,
                        profile_picture: row.get(3)?,
                        total_photo_uploaded: row.get(4)?,
                        created_at: row.get(5)?,
                        updated_at: row.get(6)?,
                        cover_image: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }
}

fn row_to_gallery(row: &Row) -> rusqlite::Result<GalleryImage> {
    Ok(GalleryImage {
        id: row.get(0)?,
        media_url: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
        created_by_user_id: row.get(4)?,
        profile_name: row.get(5)?,
        profile_picture: row.get(6)?,
        total_photos: row.get(7)?,
        tags: Vec::new(),
    })
}

fn row_to_tag(row: &Row, offset: usize) -> rusqlite::Result<GalleryTag> {
    Ok(GalleryTag {
        id: row.get(offset)?,
        tag: row.get(offset + 1)?,
        tag_display_name: row.get(offset + 2)?,
        tag_type: row.get(offset + 3)?,
    })
}
