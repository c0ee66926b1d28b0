use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::media::MediaItem;

/// A saved media item. `added_at` is assigned once, when the entry is added,
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub item: MediaItem,
    pub added_at: DateTime<Utc>,
}
