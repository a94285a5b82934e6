//! Row Fetcher
//!
//! Loads one page of a list view through the data-access layer and turns
//! the entities into display rows.

use super::registry::View;
use crate::api::{ApiError, FilePurpose, ListParams, Page};
use crate::query::Store;
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

/// Result of a paginated fetch
#[derive(Debug, Clone, Default)]
pub struct PaginatedResult {
    pub items: Vec<Value>,
    pub first_id: Option<String>,
    pub last_id: Option<String>,
    pub has_more: bool,
}

/// Fetch one page of rows for `view`
pub async fn fetch_rows(
    view: View,
    store: &Store,
    params: &ListParams,
) -> Result<PaginatedResult, ApiError> {
    match view {
        View::Files => into_rows(store.list_files(params).await?),
        View::VectorStores => into_rows(store.list_vector_stores(params).await?),
    }
}

fn into_rows<T: Serialize>(page: Page<T>) -> Result<PaginatedResult, ApiError> {
    let items = page
        .data
        .iter()
        .map(|entity| serde_json::to_value(entity).map(post_process_item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PaginatedResult {
        items,
        first_id: page.first_id,
        last_id: page.last_id,
        has_more: page.has_more,
    })
}

/// Convert one entity to a display row
pub fn to_row<T: Serialize>(entity: &T) -> Result<Value, ApiError> {
    Ok(post_process_item(serde_json::to_value(entity)?))
}

/// Add computed display fields next to the raw ones
pub fn post_process_item(mut item: Value) -> Value {
    if let Value::Object(ref mut map) = item {
        if let Some(bytes) = map.get("bytes").and_then(|v| v.as_u64()) {
            map.insert("bytes_display".to_string(), Value::String(format_bytes(bytes)));
        }

        if let Some(created) = map.get("created_at").and_then(|v| v.as_i64()) {
            map.insert(
                "created_display".to_string(),
                Value::String(format_timestamp(created)),
            );
        }

        let purpose = map
            .get("purpose")
            .and_then(|v| serde_json::from_value::<FilePurpose>(v.clone()).ok());
        if let Some(purpose) = purpose {
            map.insert(
                "purpose_label".to_string(),
                Value::String(purpose.label().to_string()),
            );
        }
    }

    item
}

/// Unix seconds as local `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

/// Format bytes to human readable
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Extract a value from JSON using a dot-notation path
pub fn extract_json_value(item: &Value, path: &str) -> String {
    let mut current = item;

    for part in path.split('.') {
        let next = match part.parse::<usize>() {
            Ok(idx) => current.get(idx),
            Err(_) => current.get(part),
        };
        current = match next {
            Some(v) => v,
            None => return "-".to_string(),
        };
    }

    match current {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(_) => "[object]".to_string(),
    }
}
