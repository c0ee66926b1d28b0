//! Shared test scaffolding: a catalog whose responses the test resolves by
//! hand, so completion order is fully controlled.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use reelist_api::traits::{
    CatalogPage, DiscoverFilter, MediaCatalog, TimeWindow, TrendingScope,
};
use reelist_core::models::{Genre, MediaDetails, MediaItem, MediaType};

#[derive(Debug, thiserror::Error)]
#[error("scripted failure: {0}")]
pub struct TestError(pub &'static str);

pub struct PendingFetch {
    pub label: String,
    pub respond: oneshot::Sender<Result<CatalogPage, TestError>>,
}

/// A catalog that parks every request until the test resolves it.
#[derive(Clone, Default)]
pub struct ManualCatalog {
    pending: Arc<Mutex<Vec<PendingFetch>>>,
}

impl ManualCatalog {
    pub fn take_pending(&self) -> Vec<PendingFetch> {
        self.pending.lock().unwrap().drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    fn enqueue(&self, label: String) -> oneshot::Receiver<Result<CatalogPage, TestError>> {
        let (respond, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap()
            .push(PendingFetch { label, respond });
        rx
    }
}

impl MediaCatalog for ManualCatalog {
    type Error = TestError;

    fn search(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<CatalogPage, TestError>> + Send {
        let rx = self.enqueue(format!("search:{query}:{page}"));
        async move { rx.await.unwrap_or_else(|_| Err(TestError("responder dropped"))) }
    }

    fn details(
        &self,
        _media_type: MediaType,
        _id: u64,
    ) -> impl Future<Output = Result<MediaDetails, TestError>> + Send {
        async { unreachable!("details is not exercised by these tests") }
    }

    fn genres(
        &self,
        _media_type: MediaType,
    ) -> impl Future<Output = Result<Vec<Genre>, TestError>> + Send {
        async { unreachable!("genres is not exercised by these tests") }
    }

    fn discover(
        &self,
        media_type: MediaType,
        _filter: DiscoverFilter,
        page: u32,
    ) -> impl Future<Output = Result<CatalogPage, TestError>> + Send {
        let rx = self.enqueue(format!("discover:{media_type}:{page}"));
        async move { rx.await.unwrap_or_else(|_| Err(TestError("responder dropped"))) }
    }

    fn trending(
        &self,
        scope: TrendingScope,
        window: TimeWindow,
        page: u32,
    ) -> impl Future<Output = Result<CatalogPage, TestError>> + Send {
        let rx = self.enqueue(format!(
            "trending:{}:{}:{page}",
            scope.as_str(),
            window.as_str()
        ));
        async move { rx.await.unwrap_or_else(|_| Err(TestError("responder dropped"))) }
    }

    fn popular(
        &self,
        media_type: MediaType,
        page: u32,
    ) -> impl Future<Output = Result<CatalogPage, TestError>> + Send {
        let rx = self.enqueue(format!("popular:{media_type}:{page}"));
        async move { rx.await.unwrap_or_else(|_| Err(TestError("responder dropped"))) }
    }

    fn top_rated(
        &self,
        media_type: MediaType,
        page: u32,
    ) -> impl Future<Output = Result<CatalogPage, TestError>> + Send {
        let rx = self.enqueue(format!("top_rated:{media_type}:{page}"));
        async move { rx.await.unwrap_or_else(|_| Err(TestError("responder dropped"))) }
    }
}

pub fn media_item(id: u64, media_type: MediaType, title: &str) -> MediaItem {
    MediaItem {
        id,
        media_type,
        title: title.to_owned(),
        overview: None,
        poster_path: None,
        backdrop_path: None,
        release_date: None,
        vote_average: None,
        genre_ids: Vec::new(),
    }
}

pub fn page_of(items: &[(u64, &str)]) -> CatalogPage {
    CatalogPage {
        items: items
            .iter()
            .map(|(id, title)| media_item(*id, MediaType::Movie, title))
            .collect(),
        page: 1,
        total_pages: 1,
    }
}

/// Let spawned tasks run to their next suspension point.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}
