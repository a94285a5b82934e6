//! Files / vector stores API module
//!
//! Typed access to the remote API. Every call funnels through one shared
//! transport that injects the bearer token and hands 401 responses to a
//! session interceptor.
//!
//! # Module Structure
//!
//! - [`http`] - Transport: timeout, bearer auth, error bodies, 401 interceptor
//! - [`client`] - Main client: endpoint, token, URL building
//! - [`files`] - `/files` resource client
//! - [`vector_stores`] - `/vector_stores` resource client
//! - [`types`] - Entities and envelopes
//! - [`error`] - [`ApiError`] and display formatting
//!
//! # Example
//!
//! ```ignore
//! use vstui::api::{ApiClient, ListParams};
//!
//! async fn example() -> Result<(), vstui::api::ApiError> {
//!     let client = ApiClient::new("https://api.example.com/v1", Some(key), timeout)?;
//!     let page = client.vector_stores().list(&ListParams::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod files;
pub mod http;
pub mod types;
pub mod vector_stores;

pub use client::{ApiClient, SharedToken};
pub use error::{format_api_error, ApiError};
pub use http::{SessionInterceptor, DEFAULT_TIMEOUT};
pub use types::*;
