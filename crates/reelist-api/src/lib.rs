//! Remote media catalog clients.
//!
//! The TMDB client implements the [`traits::MediaCatalog`] interface, keeping
//! the orchestration layer service-agnostic.

pub mod tmdb;
pub mod traits;
