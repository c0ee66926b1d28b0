//! Async orchestration over the core models and the remote catalog:
//! the debounced query controller, the generation-gated search and browse
//! sessions, and the watchlist store handle.
//!
//! Everything here assumes a running Tokio runtime and is consumed by a view
//! layer that subscribes to the published snapshots.

pub mod browse;
pub mod debounce;
pub mod search;
pub mod watchlist;

#[cfg(test)]
mod testutil;

pub use browse::{BrowseKind, BrowseSession, BrowseSnapshot};
pub use debounce::Debouncer;
pub use search::{SearchSession, SearchSnapshot};
pub use watchlist::WatchlistHandle;
