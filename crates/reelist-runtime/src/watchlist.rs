//! Watchlist store handle.
//!
//! The collection lives on a dedicated actor thread; every mutation is a
//! command with a oneshot reply, so check-then-act sequences can never
//! interleave even if the host grows concurrent mutation paths. After each
//! successful mutation the actor persists the full collection, then publishes
//! exactly one snapshot to subscribers.

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{error, warn};

use reelist_core::error::ReelistError;
use reelist_core::models::{MediaItem, MediaKey, WatchlistEntry};
use reelist_core::storage::SnapshotStore;
use reelist_core::watchlist::{Watchlist, WATCHLIST_KEY};

/// Cloneable handle to the watchlist actor.
///
/// The store restores its durable snapshot before the handle exists, so every
/// operation a caller can issue runs against a fully loaded collection.
#[derive(Clone)]
pub struct WatchlistHandle {
    tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<Vec<WatchlistEntry>>,
}

enum Command {
    Add {
        item: MediaItem,
        reply: oneshot::Sender<bool>,
    },
    Remove {
        key: MediaKey,
        reply: oneshot::Sender<bool>,
    },
    Clear {
        reply: oneshot::Sender<usize>,
    },
    Contains {
        key: MediaKey,
        reply: oneshot::Sender<bool>,
    },
    Entries {
        reply: oneshot::Sender<Vec<WatchlistEntry>>,
    },
}

impl WatchlistHandle {
    /// Restore the persisted collection and spawn the actor that owns it.
    /// An absent, unreadable, or malformed snapshot yields an empty
    /// collection, never a startup failure.
    pub fn open<S: SnapshotStore + 'static>(store: S) -> Option<Self> {
        let watchlist = restore(&store);

        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(watchlist.entries().to_vec());

        std::thread::Builder::new()
            .name("watchlist-actor".into())
            .spawn(move || actor_loop(store, watchlist, rx, snapshot_tx))
            .map_err(|e| error!("failed to spawn watchlist thread: {e}"))
            .ok()?;

        Some(Self { tx, snapshot_rx })
    }

    /// Save an item. Returns whether it was newly added; adding an item whose
    /// key is already present is a no-op.
    pub async fn add(&self, item: MediaItem) -> Result<bool, ReelistError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(Command::Add { item, reply });
        rx.await.map_err(|_| actor_closed())
    }

    /// Remove the entry with the given key. Returns whether one was present.
    pub async fn remove(&self, key: MediaKey) -> Result<bool, ReelistError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(Command::Remove { key, reply });
        rx.await.map_err(|_| actor_closed())
    }

    /// Remove everything. Observers see one notification carrying the empty
    /// collection. Returns how many entries were removed.
    pub async fn clear(&self) -> Result<usize, ReelistError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(Command::Clear { reply });
        rx.await.map_err(|_| actor_closed())
    }

    pub async fn contains(&self, key: MediaKey) -> Result<bool, ReelistError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(Command::Contains { key, reply });
        rx.await.map_err(|_| actor_closed())
    }

    /// The current entries, in insertion order.
    pub async fn entries(&self) -> Result<Vec<WatchlistEntry>, ReelistError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(Command::Entries { reply });
        rx.await.map_err(|_| actor_closed())
    }

    /// Observe the collection. Each successful mutation publishes one
    /// snapshot; no intermediate state is ever visible.
    pub fn subscribe(&self) -> watch::Receiver<Vec<WatchlistEntry>> {
        self.snapshot_rx.clone()
    }
}

fn actor_closed() -> ReelistError {
    ReelistError::Storage("watchlist actor closed".into())
}

fn restore<S: SnapshotStore>(store: &S) -> Watchlist {
    match store.load(WATCHLIST_KEY) {
        Ok(Some(json)) => match Watchlist::from_snapshot(&json) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "malformed watchlist snapshot, starting empty");
                Watchlist::new()
            }
        },
        Ok(None) => Watchlist::new(),
        Err(e) => {
            warn!(error = %e, "unreadable watchlist snapshot, starting empty");
            Watchlist::new()
        }
    }
}

fn actor_loop<S: SnapshotStore>(
    store: S,
    mut watchlist: Watchlist,
    mut rx: mpsc::UnboundedReceiver<Command>,
    snapshot_tx: watch::Sender<Vec<WatchlistEntry>>,
) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            Command::Add { item, reply } => {
                let added = watchlist.add(item, Utc::now());
                if added {
                    persist_and_publish(&store, &watchlist, &snapshot_tx);
                }
                let _ = reply.send(added);
            }
            Command::Remove { key, reply } => {
                let removed = watchlist.remove(key);
                if removed {
                    persist_and_publish(&store, &watchlist, &snapshot_tx);
                }
                let _ = reply.send(removed);
            }
            Command::Clear { reply } => {
                let removed = watchlist.clear();
                if removed > 0 {
                    persist_and_publish(&store, &watchlist, &snapshot_tx);
                }
                let _ = reply.send(removed);
            }
            Command::Contains { key, reply } => {
                let _ = reply.send(watchlist.contains(key));
            }
            Command::Entries { reply } => {
                let _ = reply.send(watchlist.entries().to_vec());
            }
        }
    }
}

/// Persist first, then notify: by the time a mutation's reply (or its
/// notification) is observable, the durable write has been attempted. A
/// failed write is logged and tolerated; the in-memory collection stays
/// authoritative for this session.
fn persist_and_publish<S: SnapshotStore>(
    store: &S,
    watchlist: &Watchlist,
    snapshot_tx: &watch::Sender<Vec<WatchlistEntry>>,
) {
    match watchlist.to_snapshot() {
        Ok(json) => {
            if let Err(e) = store.save(WATCHLIST_KEY, &json) {
                warn!(error = %e, "failed to persist watchlist");
            }
        }
        Err(e) => warn!(error = %e, "failed to encode watchlist"),
    }
    snapshot_tx.send_replace(watchlist.entries().to_vec());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{init_tracing, media_item};
    use reelist_core::models::MediaType;
    use reelist_core::storage::MemoryStore;

    fn key(id: u64, media_type: MediaType) -> MediaKey {
        MediaKey { id, media_type }
    }

    #[tokio::test]
    async fn test_add_remove_contains_roundtrip() {
        init_tracing();
        let handle = WatchlistHandle::open(MemoryStore::new()).unwrap();

        assert!(handle.add(media_item(1, MediaType::Movie, "Heat")).await.unwrap());
        assert!(handle.contains(key(1, MediaType::Movie)).await.unwrap());
        assert!(!handle.contains(key(1, MediaType::Tv)).await.unwrap());

        assert!(handle.remove(key(1, MediaType::Movie)).await.unwrap());
        assert!(!handle.remove(key(1, MediaType::Movie)).await.unwrap());
        assert!(handle.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_is_idempotent_through_the_handle() {
        let handle = WatchlistHandle::open(MemoryStore::new()).unwrap();

        assert!(handle.add(media_item(7, MediaType::Tv, "Severance")).await.unwrap());
        assert!(!handle.add(media_item(7, MediaType::Tv, "Severance")).await.unwrap());

        let entries = handle.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item.title, "Severance");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_adds_of_the_same_key_insert_once() {
        let handle = WatchlistHandle::open(MemoryStore::new()).unwrap();

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle.add(media_item(5, MediaType::Movie, "Alien")).await
            }));
        }

        let mut added = 0;
        for task in tasks {
            if task.await.unwrap().unwrap() {
                added += 1;
            }
        }
        assert_eq!(added, 1);
        assert_eq!(handle.entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_publishes_a_single_empty_snapshot() {
        let handle = WatchlistHandle::open(MemoryStore::new()).unwrap();
        let mut rx = handle.subscribe();

        handle.add(media_item(1, MediaType::Movie, "a")).await.unwrap();
        handle.add(media_item(2, MediaType::Movie, "b")).await.unwrap();
        handle.add(media_item(3, MediaType::Tv, "c")).await.unwrap();
        rx.borrow_and_update();

        assert_eq!(handle.clear().await.unwrap(), 3);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
        // Nothing further: one notification for the whole clear.
        assert!(!rx.has_changed().unwrap());

        // Clearing an already-empty collection publishes nothing.
        assert_eq!(handle.clear().await.unwrap(), 0);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_noop_add_does_not_notify() {
        let handle = WatchlistHandle::open(MemoryStore::new()).unwrap();
        let mut rx = handle.subscribe();

        handle.add(media_item(1, MediaType::Movie, "once")).await.unwrap();
        rx.borrow_and_update();

        handle.add(media_item(1, MediaType::Movie, "once")).await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_restart_restores_persisted_entries() {
        let store = MemoryStore::new();
        {
            let handle = WatchlistHandle::open(store.clone()).unwrap();
            handle.add(media_item(42, MediaType::Movie, "Blade Runner")).await.unwrap();
            handle.add(media_item(42, MediaType::Tv, "Scavengers Reign")).await.unwrap();
        }

        let handle = WatchlistHandle::open(store).unwrap();
        let entries = handle.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item.title, "Blade Runner");
        assert_eq!(entries[1].item.media_type, MediaType::Tv);
    }

    #[tokio::test]
    async fn test_malformed_snapshot_starts_empty() {
        init_tracing();
        let store = MemoryStore::new();
        store.seed(WATCHLIST_KEY, "{definitely not json");

        let handle = WatchlistHandle::open(store).unwrap();
        assert!(handle.entries().await.unwrap().is_empty());

        // And the store still works after the tolerated failure.
        assert!(handle.add(media_item(1, MediaType::Movie, "fresh")).await.unwrap());
        assert_eq!(handle.entries().await.unwrap().len(), 1);
    }

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn load(&self, _key: &str) -> Result<Option<String>, ReelistError> {
            Err(ReelistError::Storage("read error".into()))
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), ReelistError> {
            Err(ReelistError::Storage("disk full".into()))
        }
    }

    #[tokio::test]
    async fn test_storage_failures_never_lose_in_memory_state() {
        init_tracing();
        let handle = WatchlistHandle::open(FailingStore).unwrap();
        let mut rx = handle.subscribe();

        assert!(handle.add(media_item(9, MediaType::Tv, "kept")).await.unwrap());

        // The mutation is still observable despite the failed write.
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
        assert!(handle.contains(key(9, MediaType::Tv)).await.unwrap());
    }

    #[tokio::test]
    async fn test_added_at_is_assigned_in_insertion_order() {
        let handle = WatchlistHandle::open(MemoryStore::new()).unwrap();
        handle.add(media_item(1, MediaType::Movie, "first")).await.unwrap();
        handle.add(media_item(2, MediaType::Movie, "second")).await.unwrap();

        let entries = handle.entries().await.unwrap();
        assert!(entries[0].added_at <= entries[1].added_at);
    }
}
