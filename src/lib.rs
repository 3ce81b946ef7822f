//! Movie discovery over the TMDB v3 API: typed client, a deduplicating
//! request cache, catalog hooks and terminal browsing screens.

pub mod browse;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod images;
pub mod models;
pub mod tmdb;

pub use cache::{CachePolicy, RequestCache, RequestKey};
pub use catalog::Catalog;
pub use config::TmdbConfig;
pub use error::{TmdbError, TmdbResult};
pub use tmdb::{MovieCategory, TmdbApi, TmdbClient};
