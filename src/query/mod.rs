//! Data-access layer
//!
//! Reads are served from a [`QueryCache`] while inside the staleness
//! window; writes invalidate the affected key prefixes and report their
//! outcome through the notification manager.
//!
//! - [`cache`] - Keys, staleness, prefix invalidation
//! - [`store`] - [`Store`], the read/write operations used by the views

pub mod cache;
pub mod store;

pub use cache::{CacheStats, QueryCache, QueryKey, DEFAULT_STALE_TIME};
pub use store::Store;
