//! Incremental search session.
//!
//! Turns committed query strings into a published result set while tolerating
//! out-of-order network completions. Every issued request is tagged with a
//! monotonically increasing generation; only a response carrying the current
//! generation may mutate the visible state, so a slow early response can
//! never overwrite the results of a later query.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use reelist_api::traits::{CatalogPage, MediaCatalog};
use reelist_core::models::MediaItem;

/// Point-in-time view of a search session, published to subscribers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchSnapshot {
    /// The committed query the current results belong to.
    pub query: String,
    pub results: Vec<MediaItem>,
    pub total_pages: u32,
    /// A request is in flight for the current generation.
    pub searching: bool,
    /// Diagnostic from the most recent failed fetch; results keep their last
    /// good value when this is set.
    pub error: Option<String>,
}

/// Generation-gated search over a [`MediaCatalog`].
///
/// Owned by the application root and handed to consumers by reference; any
/// number of observers may subscribe to the snapshot channel. Dropping the
/// session prevents in-flight completions from mutating anything.
pub struct SearchSession<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    catalog: Arc<S>,
    state: Mutex<SessionState>,
    snapshot_tx: watch::Sender<SearchSnapshot>,
    min_query_len: usize,
    result_limit: Option<usize>,
    closed: AtomicBool,
}

#[derive(Default)]
struct SessionState {
    query: String,
    results: Vec<MediaItem>,
    total_pages: u32,
    generation: u64,
    searching: bool,
    error: Option<String>,
}

impl<S: MediaCatalog + 'static> SearchSession<S> {
    /// An unbounded session, as used by the full search page.
    pub fn new(catalog: Arc<S>, min_query_len: usize) -> Self {
        Self::build(catalog, min_query_len, None)
    }

    /// A session whose result set is truncated, as used by the inline
    /// suggestion dropdown.
    pub fn with_result_limit(catalog: Arc<S>, min_query_len: usize, limit: usize) -> Self {
        Self::build(catalog, min_query_len, Some(limit))
    }

    fn build(catalog: Arc<S>, min_query_len: usize, result_limit: Option<usize>) -> Self {
        let (snapshot_tx, _) = watch::channel(SearchSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                catalog,
                state: Mutex::new(SessionState::default()),
                snapshot_tx,
                min_query_len,
                result_limit,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Commit a query. Queries shorter than the minimum length clear the
    /// result set without touching the network; anything else issues a fetch
    /// tagged with a fresh generation.
    pub fn submit(&self, query: &str, page: u32) {
        let query = query.trim().to_owned();
        let generation;
        {
            let mut state = self.inner.state();
            state.generation += 1;
            if query.chars().count() < self.inner.min_query_len {
                clear_state(&mut state);
                self.inner.publish(&state);
                return;
            }
            generation = state.generation;
            state.query = query.clone();
            state.searching = true;
            state.error = None;
            self.inner.publish(&state);
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = inner.catalog.search(&query, page).await;
            inner.apply(generation, outcome);
        });
    }

    /// Navigation side effect of picking a result: the committed query and
    /// the result set are cleared, and any in-flight fetch becomes stale.
    pub fn select_result(&self) {
        let mut state = self.inner.state();
        state.generation += 1;
        clear_state(&mut state);
        self.inner.publish(&state);
    }

    /// Observe the session. New subscribers see the current snapshot
    /// immediately.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }
}

impl<S> Drop for SearchSession<S> {
    fn drop(&mut self) {
        // In-flight completions check this before touching state; the fetches
        // themselves are fire-and-ignore.
        self.inner.closed.store(true, Ordering::Release);
    }
}

impl<S: MediaCatalog> Inner<S> {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn apply(&self, generation: u64, outcome: Result<CatalogPage, S::Error>) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }

        let mut state = self.state();
        if generation != state.generation {
            debug!(
                generation,
                current = state.generation,
                "discarding stale search response"
            );
            return;
        }

        match outcome {
            Ok(page) => {
                let mut items = page.items;
                if let Some(limit) = self.result_limit {
                    items.truncate(limit);
                }
                state.results = items;
                state.total_pages = page.total_pages;
                state.searching = false;
                state.error = None;
            }
            Err(e) => {
                // Keep the last good result set; surface the diagnostic.
                warn!(query = %state.query, error = %e, "search request failed");
                state.searching = false;
                state.error = Some(e.to_string());
            }
        }
        self.publish(&state);
    }

    fn publish(&self, state: &SessionState) {
        self.snapshot_tx.send_replace(SearchSnapshot {
            query: state.query.clone(),
            results: state.results.clone(),
            total_pages: state.total_pages,
            searching: state.searching,
            error: state.error.clone(),
        });
    }
}

fn clear_state(state: &mut SessionState) {
    state.query.clear();
    state.results.clear();
    state.total_pages = 0;
    state.searching = false;
    state.error = None;
}
