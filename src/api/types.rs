//! Wire Types
//!
//! Entities and envelopes exchanged with the files / vector stores API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// =========================================================================
// Envelopes
// =========================================================================

/// Cursor-paginated list: `{object: "list", data, first_id, last_id, has_more}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    #[serde(default)]
    pub object: String,
    pub data: Vec<T>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Receipt returned by every delete endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletionReceipt {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    Asc,
    #[default]
    Desc,
}

impl ListOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Cursor pagination and filters for list endpoints.
/// Absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub order: Option<ListOrder>,
    pub before: Option<String>,
    pub after: Option<String>,
    /// Type filter, only honored by `GET /files`
    pub kind: Option<String>,
}

impl ListParams {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Query pairs in a fixed order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_string()));
        }
        if let Some(ref before) = self.before {
            pairs.push(("before", before.clone()));
        }
        if let Some(ref after) = self.after {
            pairs.push(("after", after.clone()));
        }
        if let Some(ref kind) = self.kind {
            pairs.push(("type", kind.clone()));
        }
        pairs
    }

    /// Stable textual form used as a cache key segment
    pub fn canonical(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// =========================================================================
// Files
// =========================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FilePurpose {
    FileExtract,
    RetrievalText,
    RetrievalImage,
    #[default]
    Storage,
}

impl FilePurpose {
    pub const ALL: [FilePurpose; 4] = [
        FilePurpose::FileExtract,
        FilePurpose::RetrievalText,
        FilePurpose::RetrievalImage,
        FilePurpose::Storage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileExtract => "file-extract",
            Self::RetrievalText => "retrieval-text",
            Self::RetrievalImage => "retrieval-image",
            Self::Storage => "storage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FileExtract => "File extract",
            Self::RetrievalText => "Text retrieval",
            Self::RetrievalImage => "Image retrieval",
            Self::Storage => "Storage",
        }
    }

    /// Next purpose in selection order, wrapping around
    pub fn cycle(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FilePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend processing state. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileStatus {
    #[default]
    Success,
    Processed,
    Other(String),
}

impl From<String> for FileStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => Self::Success,
            "processed" => Self::Processed,
            _ => Self::Other(value),
        }
    }
}

impl From<FileStatus> for String {
    fn from(status: FileStatus) -> Self {
        status.as_str().to_string()
    }
}

impl FileStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Processed => "processed",
            Self::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct File {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub purpose: FilePurpose,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub status: FileStatus,
    #[serde(default)]
    pub created_at: i64,
}

/// Upload request. Exactly one of `url` / `file` must be set.
#[derive(Debug, Clone, Default)]
pub struct FileCreateParams {
    pub purpose: FilePurpose,
    pub url: Option<String>,
    pub file: Option<PathBuf>,
}

impl FileCreateParams {
    pub fn from_url(purpose: FilePurpose, url: impl Into<String>) -> Self {
        Self {
            purpose,
            url: Some(url.into()),
            file: None,
        }
    }

    pub fn from_path(purpose: FilePurpose, path: impl Into<PathBuf>) -> Self {
        Self {
            purpose,
            url: None,
            file: Some(path.into()),
        }
    }
}

// =========================================================================
// Vector stores
// =========================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreType {
    #[default]
    Text,
    Image,
}

impl VectorStoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Text => Self::Image,
            Self::Image => Self::Text,
        }
    }
}

impl fmt::Display for VectorStoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-maintained aggregate of member file states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FileCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub cancelled: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorStore {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: VectorStoreType,
    #[serde(default)]
    pub file_counts: FileCounts,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VectorStoreCreateParams {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VectorStoreType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VectorStoreCreated {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct VectorStoreFileMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_name: String,
}

/// Membership of a file in a vector store; `id` is the file id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VectorStoreFile {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub vector_store_id: String,
    #[serde(default)]
    pub metadata: VectorStoreFileMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachFile {
    pub file_id: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachFilesRequest {
    pub files: Vec<AttachFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AttachResult {
    #[serde(default)]
    pub files: Vec<VectorStoreFile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_skip_absent_fields() {
        let params = ListParams {
            limit: Some(20),
            after: Some("file-9".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.query_pairs(),
            vec![("limit", "20".to_string()), ("after", "file-9".to_string())]
        );
        assert_eq!(params.canonical(), "limit=20&after=file-9");
        assert_eq!(ListParams::default().canonical(), "");
    }

    #[test]
    fn test_file_status_keeps_unknown_values() {
        let file: File = serde_json::from_value(json!({
            "id": "file-1",
            "filename": "a.pdf",
            "purpose": "retrieval-text",
            "bytes": 10,
            "status": "queued",
            "created_at": 1700000000
        }))
        .unwrap();
        assert_eq!(file.status, FileStatus::Other("queued".to_string()));
        assert_eq!(file.status.as_str(), "queued");
        assert_eq!(serde_json::to_value(&file).unwrap()["status"], "queued");
    }

    #[test]
    fn test_purpose_wire_names() {
        assert_eq!(
            serde_json::to_value(FilePurpose::RetrievalImage).unwrap(),
            json!("retrieval-image")
        );
        assert_eq!(FilePurpose::Storage.cycle(), FilePurpose::FileExtract);
    }

    #[test]
    fn test_vector_store_type_field_name() {
        let store: VectorStore = serde_json::from_value(json!({
            "id": "vs-1",
            "name": "Docs",
            "type": "image",
            "created_at": 1
        }))
        .unwrap();
        assert_eq!(store.kind, VectorStoreType::Image);
        assert_eq!(store.file_counts, FileCounts::default());
    }
}
