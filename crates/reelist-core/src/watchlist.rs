//! In-memory watchlist collection.
//!
//! Pure data structure: ordering, deduplication, and snapshot encoding live
//! here; persistence and observer notification are the runtime's concern.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::ReelistError;
use crate::models::{MediaItem, MediaKey, WatchlistEntry};

/// Storage key under which the serialized collection is persisted. The
/// watchlist store is the sole writer of this key.
pub const WATCHLIST_KEY: &str = "watchlist";

/// Insertion-ordered collection of saved media items, keyed by composite
/// `(id, media_type)` identity. Never holds two entries with the same key.
#[derive(Debug, Default)]
pub struct Watchlist {
    entries: Vec<WatchlistEntry>,
    keys: HashSet<MediaKey>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a collection from restored entries, preserving order. Duplicate
    /// keys are dropped (first occurrence wins).
    pub fn from_entries(entries: Vec<WatchlistEntry>) -> Self {
        let mut list = Self::new();
        for entry in entries {
            let key = entry.item.key();
            if !list.keys.insert(key) {
                warn!(%key, "dropping duplicate watchlist entry from snapshot");
                continue;
            }
            list.entries.push(entry);
        }
        list
    }

    pub fn contains(&self, key: MediaKey) -> bool {
        self.keys.contains(&key)
    }

    /// Append an entry for `item` unless its key is already present.
    /// Returns whether the item was newly added.
    pub fn add(&mut self, item: MediaItem, added_at: DateTime<Utc>) -> bool {
        if !self.keys.insert(item.key()) {
            return false;
        }
        self.entries.push(WatchlistEntry { item, added_at });
        true
    }

    /// Remove the entry with the given key, if present. Returns whether an
    /// entry was removed.
    pub fn remove(&mut self, key: MediaKey) -> bool {
        if !self.keys.remove(&key) {
            return false;
        }
        self.entries.retain(|e| e.item.key() != key);
        true
    }

    /// Remove every entry, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.keys.clear();
        removed
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode the full collection as a JSON snapshot.
    pub fn to_snapshot(&self) -> Result<String, ReelistError> {
        serde_json::to_string(&self.entries)
            .map_err(|e| ReelistError::Storage(format!("failed to encode watchlist: {e}")))
    }

    /// Decode a JSON snapshot. Duplicate keys in the snapshot are dropped;
    /// a snapshot that does not parse is an error the caller decides how to
    /// tolerate.
    pub fn from_snapshot(json: &str) -> Result<Self, ReelistError> {
        let entries: Vec<WatchlistEntry> = serde_json::from_str(json)
            .map_err(|e| ReelistError::Storage(format!("invalid watchlist snapshot: {e}")))?;
        Ok(Self::from_entries(entries))
    }
}
