use serde::Deserialize;
use tracing::debug;

use reelist_core::models::{Genre, MediaDetails, MediaItem, MediaType};

use crate::traits::CatalogPage;

// ── Wire types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PagedResponse {
    pub page: u32,
    pub results: Vec<RawMediaItem>,
    pub total_pages: u32,
    pub total_results: u64,
}

/// A raw list row as TMDB returns it. Movies carry `title`/`release_date`,
/// series carry `name`/`first_air_date`; multi-scoped endpoints add an
/// explicit `media_type` discriminator.
#[derive(Debug, Deserialize)]
pub struct RawMediaItem {
    pub id: u64,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct GenreListResponse {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
pub struct RawDetails {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f32>,
    pub vote_count: Option<u64>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    pub status: Option<String>,
    pub tagline: Option<String>,
    pub homepage: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

// ── Ingestion ────────────────────────────────────────────────────

impl RawMediaItem {
    /// Resolve the concrete media type and produce an ingested item, or
    /// `None` for rows that are not movies or series (e.g. `person` hits
    /// from multi search). The tag is resolved here, once: an explicit
    /// `media_type` wins, then the endpoint's own type, then the
    /// title-vs-name discriminator.
    pub fn resolve(self, endpoint_type: Option<MediaType>) -> Option<MediaItem> {
        let media_type = match self.media_type.as_deref() {
            Some("movie") => MediaType::Movie,
            Some("tv") => MediaType::Tv,
            Some(other) => {
                debug!(kind = other, id = self.id, "skipping non-media result");
                return None;
            }
            None => match endpoint_type {
                Some(t) => t,
                None if self.title.is_some() => MediaType::Movie,
                None if self.name.is_some() => MediaType::Tv,
                None => {
                    debug!(id = self.id, "skipping untyped result");
                    return None;
                }
            },
        };

        let (title, release_date) = match media_type {
            MediaType::Movie => (
                self.title.or(self.name),
                self.release_date.or(self.first_air_date),
            ),
            MediaType::Tv => (
                self.name.or(self.title),
                self.first_air_date.or(self.release_date),
            ),
        };

        Some(MediaItem {
            id: self.id,
            media_type,
            title: title.unwrap_or_default(),
            overview: self.overview,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            release_date,
            vote_average: self.vote_average,
            genre_ids: self.genre_ids,
        })
    }
}

impl PagedResponse {
    pub fn into_catalog_page(self, endpoint_type: Option<MediaType>) -> CatalogPage {
        CatalogPage {
            items: self
                .results
                .into_iter()
                .filter_map(|r| r.resolve(endpoint_type))
                .collect(),
            page: self.page,
            total_pages: self.total_pages,
        }
    }
}

impl RawDetails {
    pub fn into_details(self, media_type: MediaType) -> MediaDetails {
        let (title, release_date) = match media_type {
            MediaType::Movie => (
                self.title.or(self.name),
                self.release_date.or(self.first_air_date),
            ),
            MediaType::Tv => (
                self.name.or(self.title),
                self.first_air_date.or(self.release_date),
            ),
        };

        let runtime = self
            .runtime
            .or_else(|| self.episode_run_time.first().copied());

        MediaDetails {
            item: MediaItem {
                id: self.id,
                media_type,
                title: title.unwrap_or_default(),
                overview: self.overview,
                poster_path: self.poster_path,
                backdrop_path: self.backdrop_path,
                release_date,
                vote_average: self.vote_average,
                genre_ids: self.genres.iter().map(|g| g.id).collect(),
            },
            genres: self.genres,
            runtime,
            status: self.status,
            tagline: self.tagline,
            vote_count: self.vote_count,
            homepage: self.homepage,
        }
    }
}
