//! View definitions and row shaping
//!
//! The files and vector stores tables are data-driven: columns, facets
//! and color maps come from JSON embedded at compile time, and list pages
//! are flattened into JSON rows carrying display-ready fields.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches view definitions from embedded JSON
//! - [`fetcher`] - Fetches a page through the [`crate::query::Store`] and
//!   builds display rows
//!
//! # View Definitions
//!
//! Views are defined in JSON files under `src/resources/`:
//! - `common.json` - Shared color maps
//! - `files.json` - Files table
//! - `vector_stores.json` - Vector stores table

pub mod fetcher;
pub mod registry;

pub use fetcher::{
    extract_json_value, fetch_rows, format_bytes, format_timestamp, to_row, PaginatedResult,
};
pub use registry::*;
