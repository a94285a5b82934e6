//! vstui - terminal console for files and vector stores
//!
//! Browse, upload and delete files, create and delete vector stores and
//! manage which files belong to which store, over the remote HTTP API.

pub mod api;
pub mod app;
pub mod config;
pub mod dialog;
pub mod event;
pub mod form;
pub mod notification;
pub mod query;
pub mod resource;
pub mod session;
pub mod ui;
pub mod upload;

/// Version injected at compile time via VSTUI_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("VSTUI_VERSION") {
    Some(v) => v,
    None => "dev",
};
