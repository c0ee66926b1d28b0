use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use reelist_core::models::{Genre, MediaDetails, MediaType};

use super::error::TmdbError;
use super::types::{GenreListResponse, PagedResponse, RawDetails};
use crate::traits::{CatalogPage, DiscoverFilter, MediaCatalog, TimeWindow, TrendingScope};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TMDB REST client.
pub struct TmdbClient {
    http: Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, TmdbError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: BASE_URL.to_owned(),
            image_base_url: IMAGE_BASE_URL.to_owned(),
        })
    }

    /// Point the client at a different API root. Used by tests and by hosts
    /// that front TMDB with a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_image_base_url(mut self, image_base_url: impl Into<String>) -> Self {
        self.image_base_url = image_base_url.into();
        self
    }

    /// Poster URL for an image path as returned in `poster_path`.
    /// Common sizes: "w185", "w342", "w500", "original".
    pub fn poster_url(&self, path: &str, size: &str) -> String {
        format!("{}/{size}{path}", self.image_base_url)
    }

    /// Backdrop URL for an image path as returned in `backdrop_path`.
    /// Common sizes: "w780", "w1280", "original".
    pub fn backdrop_url(&self, path: &str, size: &str) -> String {
        format!("{}/{size}{path}", self.image_base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        debug!(%path, "tmdb request");

        let resp = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TmdbError::NotFound(path.to_owned()));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TmdbError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json().await.map_err(|e| TmdbError::Parse(e.to_string()))
    }
}

impl MediaCatalog for TmdbClient {
    type Error = TmdbError;

    async fn search(&self, query: &str, page: u32) -> Result<CatalogPage, TmdbError> {
        let resp: PagedResponse = self
            .get_json(
                "/search/multi",
                &[("query", query.to_owned()), ("page", page.to_string())],
            )
            .await?;
        Ok(resp.into_catalog_page(None))
    }

    async fn details(&self, media_type: MediaType, id: u64) -> Result<MediaDetails, TmdbError> {
        let raw: RawDetails = self
            .get_json(&format!("/{}/{id}", media_type.as_str()), &[])
            .await?;
        Ok(raw.into_details(media_type))
    }

    async fn genres(&self, media_type: MediaType) -> Result<Vec<Genre>, TmdbError> {
        let resp: GenreListResponse = self
            .get_json(&format!("/genre/{}/list", media_type.as_str()), &[])
            .await?;
        Ok(resp.genres)
    }

    async fn discover(
        &self,
        media_type: MediaType,
        filter: DiscoverFilter,
        page: u32,
    ) -> Result<CatalogPage, TmdbError> {
        let mut query = vec![("page", page.to_string())];
        if let Some(genre) = filter.genre {
            query.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = filter.year {
            let param = match media_type {
                MediaType::Movie => "primary_release_year",
                MediaType::Tv => "first_air_date_year",
            };
            query.push((param, year.to_string()));
        }

        let resp: PagedResponse = self
            .get_json(&format!("/discover/{}", media_type.as_str()), &query)
            .await?;
        Ok(resp.into_catalog_page(Some(media_type)))
    }

    async fn trending(
        &self,
        scope: TrendingScope,
        window: TimeWindow,
        page: u32,
    ) -> Result<CatalogPage, TmdbError> {
        let resp: PagedResponse = self
            .get_json(
                &format!("/trending/{}/{}", scope.as_str(), window.as_str()),
                &[("page", page.to_string())],
            )
            .await?;
        // Trending rows carry an explicit media_type; a single-type scope
        // also pins it for rows that omit the field.
        let endpoint_type = match scope {
            TrendingScope::All => None,
            TrendingScope::Only(media_type) => Some(media_type),
        };
        Ok(resp.into_catalog_page(endpoint_type))
    }

    async fn popular(&self, media_type: MediaType, page: u32) -> Result<CatalogPage, TmdbError> {
        let resp: PagedResponse = self
            .get_json(
                &format!("/{}/popular", media_type.as_str()),
                &[("page", page.to_string())],
            )
            .await?;
        Ok(resp.into_catalog_page(Some(media_type)))
    }

    async fn top_rated(&self, media_type: MediaType, page: u32) -> Result<CatalogPage, TmdbError> {
        let resp: PagedResponse = self
            .get_json(
                &format!("/{}/top_rated", media_type.as_str()),
                &[("page", page.to_string())],
            )
            .await?;
        Ok(resp.into_catalog_page(Some(media_type)))
    }
}
