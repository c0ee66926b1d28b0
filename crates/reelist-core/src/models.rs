pub mod media;
pub mod watchlist;

pub use media::{Genre, MediaDetails, MediaItem, MediaKey, MediaType};
pub use watchlist::WatchlistEntry;
