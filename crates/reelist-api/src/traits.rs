//! Trait definitions for remote media catalogs.
//!
//! The TMDB client implements these, and the runtime sessions are written
//! against them, so tests can substitute a scripted catalog.

use std::future::Future;

use reelist_core::models::{Genre, MediaDetails, MediaItem, MediaType};

/// One page of catalog results.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub items: Vec<MediaItem>,
    pub page: u32,
    pub total_pages: u32,
}

/// Optional discover constraints. Year filtering maps to a media-type
/// specific upstream parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoverFilter {
    pub genre: Option<u64>,
    pub year: Option<u16>,
}

/// Trending window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

/// What the trending feed covers: both media types, or one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingScope {
    #[default]
    All,
    Only(MediaType),
}

impl TrendingScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(media_type) => media_type.as_str(),
        }
    }
}

/// A unified media catalog interface.
///
/// All operations are request/response; there is no streaming and no push.
pub trait MediaCatalog: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search movies and series by free text.
    fn search(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<CatalogPage, Self::Error>> + Send;

    /// Fetch the full detail record for one item.
    fn details(
        &self,
        media_type: MediaType,
        id: u64,
    ) -> impl Future<Output = Result<MediaDetails, Self::Error>> + Send;

    /// List the genres defined for a media type.
    fn genres(
        &self,
        media_type: MediaType,
    ) -> impl Future<Output = Result<Vec<Genre>, Self::Error>> + Send;

    /// Browse by filter (genre and/or year).
    fn discover(
        &self,
        media_type: MediaType,
        filter: DiscoverFilter,
        page: u32,
    ) -> impl Future<Output = Result<CatalogPage, Self::Error>> + Send;

    /// The trending feed for a scope and time window.
    fn trending(
        &self,
        scope: TrendingScope,
        window: TimeWindow,
        page: u32,
    ) -> impl Future<Output = Result<CatalogPage, Self::Error>> + Send;

    /// Most popular items of a media type.
    fn popular(
        &self,
        media_type: MediaType,
        page: u32,
    ) -> impl Future<Output = Result<CatalogPage, Self::Error>> + Send;

    /// Top rated items of a media type.
    fn top_rated(
        &self,
        media_type: MediaType,
        page: u32,
    ) -> impl Future<Output = Result<CatalogPage, Self::Error>> + Send;
}
