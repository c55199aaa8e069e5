use std::sync::Arc;

use crate::db::Database;

use super::error::ApiError;

/// Shared handler state. Cloned per request; the database is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Run a database call on the blocking pool. Any failure is logged and
    /// surfaces as a 500 carrying only `message`.
    pub async fn query<T, F>(&self, message: &'static str, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| ApiError::internal(message, e.into()))?
            .map_err(|e| ApiError::internal(message, e))
    }
}
