//! Blocking HTTP client for a running gallery server.
//!
//! Listing fetches are superseded rather than raced: starting a new one cancels
//! the ticket of the previous one, and a fetch whose ticket was cancelled
//! reports [`FetchOutcome::Cancelled`] instead of its result, so a slow stale
//! response can never overwrite a newer one.
//!
//! Cancellation does not interrupt the request. The blocking ureq call still
//! runs to completion (or to its transport error); only its result, success
//! or failure, is discarded.
//!
//! Nothing is fetched before the [`FilterStore`] has been hydrated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::db::{GalleryImage, GalleryTag};
use crate::filter::{FilterStore, StateStorage};

pub const GALLERIES_FAILED: &str = "Failed to load galleries";
pub const TAGS_FAILED: &str = "Failed to load tags";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] std::io::Error),
}

impl From<ureq::Error> for ClientError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => ClientError::Status(code),
            ureq::Error::Transport(t) => ClientError::Transport(t.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Loaded(T),
    /// Superseded by a newer fetch. Not an error.
    Cancelled,
    /// A static, user-facing message.
    Failed(&'static str),
}

impl<T> FetchOutcome<T> {
    pub fn loaded(self) -> Option<T> {
        match self {
            FetchOutcome::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Cancellation handle for one in-flight fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchTicket {
    cancelled: Arc<AtomicBool>,
}

impl FetchTicket {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub struct GalleryClient {
    agent: ureq::Agent,
    base_url: String,
    listing: Mutex<Option<FetchTicket>>,
}

impl GalleryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url,
            listing: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `query` is a filter query string such as `?tagIds=1,2`, or empty.
    pub fn galleries_url(&self, query: &str) -> String {
        format!("{}/api/galleries{}", self.base_url, query)
    }

    /// Start a listing fetch, cancelling whichever one was in flight.
    pub fn begin_listing(&self) -> FetchTicket {
        let ticket = FetchTicket::default();
        let mut current = self.listing.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.replace(ticket.clone()) {
            previous.cancel();
        }
        ticket
    }

    /// Fetch the listing for the store's current selection. `None` while the
    /// store has not been hydrated: nothing is requested with a default
    /// selection that is about to be replaced.
    pub fn fetch_galleries<S: StateStorage>(
        &self,
        store: &FilterStore<S>,
    ) -> Option<FetchOutcome<Vec<GalleryImage>>> {
        let query = store.listing_query()?;
        let ticket = self.begin_listing();
        Some(self.fetch_galleries_with(&query, &ticket))
    }

    pub fn fetch_galleries_with(&self, query: &str, ticket: &FetchTicket) -> FetchOutcome<Vec<GalleryImage>> {
        if ticket.is_cancelled() {
            return FetchOutcome::Cancelled;
        }

        let url = self.galleries_url(query);
        debug!(%url, "fetching galleries");
        let result = self.get_json::<Vec<GalleryImage>>(&url);

        if ticket.is_cancelled() {
            debug!(%url, "listing superseded, dropping response");
            return FetchOutcome::Cancelled;
        }
        match result {
            Ok(galleries) => FetchOutcome::Loaded(galleries),
            Err(e) => {
                warn!("Gallery listing failed: {}", e);
                FetchOutcome::Failed(GALLERIES_FAILED)
            }
        }
    }

    /// Fetch the tags for the pill bar. `None` while the store has not been
    /// hydrated, like [`GalleryClient::fetch_galleries`].
    pub fn fetch_tags<S: StateStorage>(&self, store: &FilterStore<S>) -> Option<FetchOutcome<Vec<GalleryTag>>> {
        if !store.is_hydrated() {
            return None;
        }
        let url = format!("{}/api/tags", self.base_url);
        let outcome = match self.get_json(&url) {
            Ok(tags) => FetchOutcome::Loaded(tags),
            Err(e) => {
                warn!("Tag listing failed: {}", e);
                FetchOutcome::Failed(TAGS_FAILED)
            }
        };
        Some(outcome)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self.agent.get(url).call()?;
        Ok(response.into_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::seeded;
    use crate::db::Database;
    use crate::filter::{MemoryStorage, SelectionMode};
    use crate::server::{router, AppState};
    use axum::{routing::get, Json, Router};
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn spawn_server(db: Database) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(AppState::new(db), false);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn listed_ids(outcome: Option<FetchOutcome<Vec<GalleryImage>>>) -> Vec<i64> {
        outcome
            .and_then(FetchOutcome::loaded)
            .unwrap()
            .iter()
            .map(|g| g.id)
            .collect()
    }

    #[test]
    fn test_supersession_cancels_previous_ticket() {
        let client = GalleryClient::new("http://127.0.0.1:9/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9");

        let first = client.begin_listing();
        let second = client.begin_listing();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        assert_eq!(client.fetch_galleries_with("", &first), FetchOutcome::Cancelled);
    }

    #[test]
    fn test_galleries_url() {
        let client = GalleryClient::new("http://localhost:3000");
        assert_eq!(client.galleries_url(""), "http://localhost:3000/api/galleries");
        assert_eq!(client.galleries_url("?tagId=4"), "http://localhost:3000/api/galleries?tagId=4");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_follows_filter_state() {
        let base_url = spawn_server(seeded()).await;

        tokio::task::spawn_blocking(move || {
            let client = GalleryClient::new(base_url);
            let mut store = FilterStore::new(MemoryStorage::new(), SelectionMode::Multi);

            assert!(client.fetch_galleries(&store).is_none());
            assert!(client.fetch_tags(&store).is_none());
            store.hydrate();

            assert_eq!(listed_ids(client.fetch_galleries(&store)), vec![6, 5, 4, 3, 2, 1]);

            store.toggle("2").unwrap();
            assert_eq!(listed_ids(client.fetch_galleries(&store)), vec![5, 1]);

            store.toggle("3").unwrap();
            assert_eq!(listed_ids(client.fetch_galleries(&store)), vec![6, 5, 4, 1]);

            let tags = client.fetch_tags(&store).and_then(FetchOutcome::loaded).unwrap();
            let names: Vec<_> = tags.iter().map(|t| t.tag_display_name.as_str()).collect();
            assert_eq!(names, ["Coastal", "Modern", "Scandinavian"]);
        })
        .await
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_error_is_static_message() {
        // Tables were never created, so every query fails with a 500.
        let base_url = spawn_server(Database::open_in_memory().unwrap()).await;

        tokio::task::spawn_blocking(move || {
            let client = GalleryClient::new(base_url);
            let ticket = client.begin_listing();
            assert_eq!(
                client.fetch_galleries_with("", &ticket),
                FetchOutcome::Failed(GALLERIES_FAILED)
            );
            let mut store = FilterStore::new(MemoryStorage::new(), SelectionMode::Single);
            store.hydrate();
            assert_eq!(client.fetch_tags(&store), Some(FetchOutcome::Failed(TAGS_FAILED)));
        })
        .await
        .unwrap();
    }

    const SLOW: Duration = Duration::from_millis(600);

    /// Answers every listing request with an empty list after [`SLOW`].
    async fn spawn_slow_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route(
            "/api/galleries",
            get(|| async {
                tokio::time::sleep(SLOW).await;
                Json(Vec::<GalleryImage>::new())
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Accepts connections and closes them after [`SLOW`] without answering.
    async fn spawn_hanging_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    tokio::time::sleep(SLOW).await;
                    drop(socket);
                });
            }
        });
        format!("http://{}", addr)
    }

    /// Start a listing fetch on another thread, supersede it while the request
    /// is in flight, and return what the stale fetch reported.
    fn supersede_in_flight(client: Arc<GalleryClient>) -> FetchOutcome<Vec<GalleryImage>> {
        let stale = client.begin_listing();
        let worker = {
            let client = Arc::clone(&client);
            std::thread::spawn(move || client.fetch_galleries_with("", &stale))
        };
        std::thread::sleep(SLOW / 3);
        let fresh = client.begin_listing();
        let outcome = worker.join().unwrap();
        assert!(!fresh.is_cancelled());
        outcome
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_response_arriving_after_supersession_is_dropped() {
        let base_url = spawn_slow_server().await;

        tokio::task::spawn_blocking(move || {
            let client = Arc::new(GalleryClient::new(base_url));

            // The same server answers normally when nothing supersedes the fetch.
            let ticket = client.begin_listing();
            assert_eq!(client.fetch_galleries_with("", &ticket), FetchOutcome::Loaded(vec![]));

            assert_eq!(supersede_in_flight(client), FetchOutcome::Cancelled);
        })
        .await
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failure_after_supersession_is_not_an_error() {
        let base_url = spawn_hanging_server().await;

        tokio::task::spawn_blocking(move || {
            let client = Arc::new(GalleryClient::new(base_url));

            let ticket = client.begin_listing();
            assert_eq!(
                client.fetch_galleries_with("", &ticket),
                FetchOutcome::Failed(GALLERIES_FAILED)
            );

            assert_eq!(supersede_in_flight(client), FetchOutcome::Cancelled);
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_unreachable_server_fails() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = GalleryClient::new(format!("http://127.0.0.1:{}", port));
        let ticket = client.begin_listing();
        assert_eq!(client.fetch_galleries_with("", &ticket), FetchOutcome::Failed(GALLERIES_FAILED));
    }
}
