use serde::{Deserialize, Serialize};

/// Kind of a catalog record. Resolved exactly once, when a raw payload is
/// ingested; downstream code never re-derives it from field presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    pub const ALL: &[MediaType] = &[Self::Movie, Self::Tv];
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite identity of a media item. Upstream ids are only unique within a
/// media type; a movie and a series can share the same numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaKey {
    pub id: u64,
    pub media_type: MediaType,
}

impl std::fmt::Display for MediaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.media_type, self.id)
    }
}

/// A movie or TV series record from the remote catalog.
///
/// Everything except `id` and `media_type` is opaque display data passed
/// through to the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

impl MediaItem {
    pub fn key(&self) -> MediaKey {
        MediaKey {
            id: self.id,
            media_type: self.media_type,
        }
    }
}

/// A genre as listed by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Full detail record for a single movie or series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    pub item: MediaItem,
    pub genres: Vec<Genre>,
    /// Runtime in minutes; for series, the typical episode runtime.
    pub runtime: Option<u32>,
    pub status: Option<String>,
    pub tagline: Option<String>,
    pub vote_count: Option<u64>,
    pub homepage: Option<String>,
}
