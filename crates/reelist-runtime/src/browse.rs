//! Paginated browse feeds: trending, popular, top rated, and filtered
//! discovery. Same generation gating as the search session: changing page or
//! filter while a fetch is in flight must never let the slower response win.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use reelist_api::traits::{CatalogPage, DiscoverFilter, MediaCatalog, TimeWindow, TrendingScope};
use reelist_core::models::{MediaItem, MediaType};

/// What a browse surface is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseKind {
    Trending {
        scope: TrendingScope,
        window: TimeWindow,
    },
    Popular(MediaType),
    TopRated(MediaType),
    Discover {
        media_type: MediaType,
        filter: DiscoverFilter,
    },
}

/// Point-in-time view of a browse session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrowseSnapshot {
    pub items: Vec<MediaItem>,
    pub page: u32,
    pub total_pages: u32,
    pub loading: bool,
    /// Diagnostic from the most recent failed fetch; the grid keeps its last
    /// good contents when this is set.
    pub error: Option<String>,
}

/// Generation-gated paginated browsing over a [`MediaCatalog`].
pub struct BrowseSession<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    catalog: Arc<S>,
    state: Mutex<BrowseState>,
    snapshot_tx: watch::Sender<BrowseSnapshot>,
    closed: AtomicBool,
}

#[derive(Default)]
struct BrowseState {
    kind: Option<BrowseKind>,
    items: Vec<MediaItem>,
    page: u32,
    total_pages: u32,
    generation: u64,
    loading: bool,
    error: Option<String>,
}

impl<S: MediaCatalog + 'static> BrowseSession<S> {
    pub fn new(catalog: Arc<S>) -> Self {
        let (snapshot_tx, _) = watch::channel(BrowseSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                catalog,
                state: Mutex::new(BrowseState::default()),
                snapshot_tx,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Show a feed. Changing what is shown always restarts at page 1.
    pub fn show(&self, kind: BrowseKind) {
        self.request(kind, 1);
    }

    /// Jump to a page of the current feed. No-op when nothing is shown yet.
    pub fn set_page(&self, page: u32) {
        let kind = self.inner.state().kind;
        match kind {
            Some(kind) => self.request(kind, page),
            None => debug!(page, "page change ignored: no feed selected"),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BrowseSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> BrowseSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    fn request(&self, kind: BrowseKind, page: u32) {
        let generation;
        {
            let mut state = self.inner.state();
            state.generation += 1;
            generation = state.generation;
            state.kind = Some(kind);
            state.page = page;
            state.loading = true;
            state.error = None;
            self.inner.publish(&state);
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = fetch(inner.catalog.as_ref(), kind, page).await;
            inner.apply(generation, outcome);
        });
    }
}

impl<S> Drop for BrowseSession<S> {
    fn drop(&mut self) {
        self.inner.closed.store(true, Ordering::Release);
    }
}

impl<S: MediaCatalog> Inner<S> {
    fn state(&self) -> MutexGuard<'_, BrowseState> {
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
                "discarding stale browse response"
            );
            return;
        }

        match outcome {
            Ok(page) => {
                state.items = page.items;
                state.total_pages = page.total_pages;
                state.loading = false;
                state.error = None;
            }
            Err(e) => {
                warn!(error = %e, "browse request failed");
                state.loading = false;
                state.error = Some(e.to_string());
            }
        }
        self.publish(&state);
    }

    fn publish(&self, state: &BrowseState) {
        self.snapshot_tx.send_replace(BrowseSnapshot {
            items: state.items.clone(),
            page: state.page,
            total_pages: state.total_pages,
            loading: state.loading,
            error: state.error.clone(),
        });
    }
}

async fn fetch<S: MediaCatalog>(
    catalog: &S,
    kind: BrowseKind,
    page: u32,
) -> Result<CatalogPage, S::Error> {
    match kind {
        BrowseKind::Trending { scope, window } => catalog.trending(scope, window, page).await,
        BrowseKind::Popular(media_type) => catalog.popular(media_type, page).await,
        BrowseKind::TopRated(media_type) => catalog.top_rated(media_type, page).await,
        BrowseKind::Discover { media_type, filter } => {
            catalog.discover(media_type, filter, page).await
        }
    }
}
