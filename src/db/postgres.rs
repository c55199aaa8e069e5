//! PostgreSQL backend implementation.

use anyhow::{Context, Result};
use postgres::types::ToSql;
use postgres::{NoTls, Row};
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;

use super::models::{DigitalProfile, GalleryImage, GalleryTag};
use super::postgres_schema::POSTGRES_SCHEMA;
use super::query::{Dialect, SqlParam, Statement};

/// Requests wait for a free connection when all `pool_size` are checked out.
pub struct PgDb {
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

fn bind(params: &[SqlParam]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| match p {
            SqlParam::Int(v) => v as &(dyn ToSql + Sync),
            SqlParam::Text(s) => s as &(dyn ToSql + Sync),
        })
        .collect()
}

impl PgDb {
    pub fn open(url: &str, pool_size: u32) -> Result<Self> {
        let manager = PostgresConnectionManager::new(
            url.parse().context("Invalid PostgreSQL URL")?,
            NoTls,
        );
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .context("Failed to connect to PostgreSQL")?;
        Ok(Self { pool })
    }

    pub fn initialize(&self) -> Result<()> {
        let mut client = self.pool.get()?;
        client.batch_execute(POSTGRES_SCHEMA)?;
        Ok(())
    }

    pub fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    // ========================================================================
    // Row queries
    // ========================================================================

    pub fn query_galleries(&self, stmt: &Statement) -> Result<Vec<GalleryImage>> {
        let mut client = self.pool.get()?;
        let rows = client.query(stmt.sql.as_str(), &bind(&stmt.params))?;
        Ok(rows.iter().map(row_to_gallery).collect())
    }

    pub fn query_tags(&self, stmt: &Statement) -> Result<Vec<GalleryTag>> {
        let mut client = self.pool.get()?;
        let rows = client.query(stmt.sql.as_str(), &bind(&stmt.params))?;
        Ok(rows.iter().map(|row| row_to_tag(row, 0)).collect())
    }

    pub fn query_tag_links(&self, stmt: &Statement) -> Result<Vec<(i64, GalleryTag)>> {
        let mut client = self.pool.get()?;
        let rows = client.query(stmt.sql.as_str(), &bind(&stmt.params))?;
        Ok(rows.iter().map(|row| (row.get(0), row_to_tag(row, 1))).collect())
    }

    pub fn query_profile(&self, stmt: &Statement) -> Result<Option<DigitalProfile>> {
        let mut client = self.pool.get()?;
        let row = client.query_opt(stmt.sql.as_str(), &bind(&stmt.params))?;
        Ok(row.map(|row| DigitalProfile {
            id: row.get(0),
            contractor_uuid: row.get(1),
            profile_name: row.get(2),
            profile_picture: row.get(3),
            total_photo_uploaded: row.get(4),
            created_at: row.get(5),
            updated_at: row.get(6),
            cover_image: row.get(7),
        }))
    }
}

fn row_to_gallery(row: &Row) -> GalleryImage {
    GalleryImage {
        id: row.get(0),
        media_url: row.get(1),
        created_at: row.get(2),
        updated_at: row.get(3),
        created_by_user_id: row.get(4),
        profile_name: row.get(5),
        profile_picture: row.get(6),
        total_photos: row.get(7),
        tags: Vec::new(),
    }
}

fn row_to_tag(row: &Row, offset: usize) -> GalleryTag {
    GalleryTag {
        id: row.get(offset),
        tag: row.get(offset + 1),
        tag_display_name: row.get(offset + 2),
        tag_type: row.get(offset + 3),
    }
}
