use thiserror::Error;

use reelist_core::error::ReelistError;

/// Errors from the TMDB API client.
#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<TmdbError> for ReelistError {
    fn from(err: TmdbError) -> Self {
        match err {
            TmdbError::Http(e) => ReelistError::Network(e.to_string()),
            TmdbError::Api { status, message } if status == 404 => {
                ReelistError::NotFound(message)
            }
            TmdbError::Api { status, message } => {
                ReelistError::Network(format!("status {status}: {message}"))
            }
            TmdbError::Parse(msg) => ReelistError::MalformedResponse(msg),
            TmdbError::NotFound(what) => ReelistError::NotFound(what),
        }
    }
}
