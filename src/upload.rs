//! Batch Upload
//!
//! Uploads a list of local files one at a time with a shared purpose.
//! Failures are recorded per item and never stop the batch.

use crate::api::{format_api_error, ApiError, FileCreateParams, FilePurpose};
use crate::query::Store;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Delay between the last item settling and the dialog closing itself
pub const AUTO_CLOSE_DELAY: Duration = Duration::from_secs(2);

const FALLBACK_ERROR: &str = "Upload failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success,
    Error(String),
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error(_))
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Success => "done",
            Self::Error(msg) => msg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadItem {
    pub path: PathBuf,
    pub size: u64,
    pub status: UploadStatus,
}

impl UploadItem {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct BatchUpload {
    pub purpose: FilePurpose,
    items: Vec<UploadItem>,
    cursor: usize,
    running: bool,
    finished_at: Option<Instant>,
}

impl Default for BatchUpload {
    fn default() -> Self {
        Self {
            purpose: FilePurpose::RetrievalText,
            items: Vec::new(),
            cursor: 0,
            running: false,
            finished_at: None,
        }
    }
}

impl BatchUpload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }

    pub fn success_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == UploadStatus::Success)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.status, UploadStatus::Error(_)))
            .count()
    }

    /// Queue a local file. Paths already queued are ignored.
    pub fn add(&mut self, path: &Path) -> Result<(), ApiError> {
        if self.running {
            return Err(ApiError::validation("files", "Upload in progress"));
        }
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(ApiError::validation("files", "Not a regular file"));
        }
        if self.items.iter().any(|i| i.path == path) {
            return Ok(());
        }

        self.items.push(UploadItem {
            path: path.to_path_buf(),
            size: meta.len(),
            status: UploadStatus::Pending,
        });
        self.finished_at = None;
        Ok(())
    }

    /// Drop a queued file; refused while the batch runs
    pub fn remove(&mut self, index: usize) -> bool {
        if self.running || index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        true
    }

    /// Begin uploading; every item restarts as pending
    pub fn start(&mut self) -> Result<(), ApiError> {
        if self.items.is_empty() {
            return Err(ApiError::validation("files", "Select at least one file"));
        }
        if self.running {
            return Ok(());
        }
        for item in &mut self.items {
            item.status = UploadStatus::Pending;
        }
        self.cursor = 0;
        self.running = true;
        self.finished_at = None;
        tracing::info!(
            "Batch upload of {} files ({})",
            self.items.len(),
            self.purpose
        );
        Ok(())
    }

    /// Move the batch forward by one state: a pending item is marked
    /// uploading, an uploading item is sent and settled.
    /// Returns false when there was nothing to do.
    pub async fn step(&mut self, store: &mut Store, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        let Some(item) = self.items.get_mut(self.cursor) else {
            self.finish(now);
            return false;
        };

        if item.status == UploadStatus::Pending {
            item.status = UploadStatus::Uploading;
            return true;
        }

        let params = FileCreateParams::from_path(self.purpose, item.path.clone());
        item.status = match store.create_file(&params).await {
            Ok(_) => UploadStatus::Success,
            Err(e) => {
                tracing::warn!("Upload of {:?} failed: {}", item.path, e);
                let message = format_api_error(&e);
                if message.trim().is_empty() {
                    UploadStatus::Error(FALLBACK_ERROR.to_string())
                } else {
                    UploadStatus::Error(message)
                }
            }
        };

        self.cursor += 1;
        if self.cursor >= self.items.len() {
            self.finish(now);
        }
        true
    }

    /// Drive every remaining item
    pub async fn run_to_completion(&mut self, store: &mut Store) {
        while self.step(store, Instant::now()).await {}
    }

    fn finish(&mut self, now: Instant) {
        self.running = false;
        self.finished_at = Some(now);
        tracing::info!(
            "Batch upload finished: {} ok, {} failed",
            self.success_count(),
            self.error_count()
        );
    }

    /// True once every item settled and the close delay elapsed
    pub fn should_auto_close(&self, now: Instant) -> bool {
        match self.finished_at {
            Some(at) => {
                self.items.iter().all(|i| i.status.is_terminal())
                    && now.saturating_duration_since(at) >= AUTO_CLOSE_DELAY
            }
            None => false,
        }
    }

    /// Clear the form after the dialog closes
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(dir: &tempfile::TempDir, name: &str, body: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body).unwrap();
        path
    }

    #[test]
    fn test_default_purpose_is_text_retrieval() {
        assert_eq!(BatchUpload::new().purpose, FilePurpose::RetrievalText);
    }

    #[test]
    fn test_add_records_size_and_skips_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "a.txt", b"hello");
        let mut batch = BatchUpload::new();

        batch.add(&path).unwrap();
        batch.add(&path).unwrap();
        assert_eq!(batch.items().len(), 1);
        assert_eq!(batch.items()[0].size, 5);
        assert_eq!(batch.items()[0].file_name(), "a.txt");
    }

    #[test]
    fn test_add_rejects_directories_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut batch = BatchUpload::new();
        assert!(batch.add(dir.path()).is_err());
        assert!(batch.add(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_start_requires_files() {
        let mut batch = BatchUpload::new();
        let err = batch.start().unwrap_err();
        assert_eq!(err.to_string(), "Select at least one file");
        assert!(!batch.is_running());
    }

    #[test]
    fn test_queue_is_frozen_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let a = temp_file(&dir, "a.txt", b"a");
        let b = temp_file(&dir, "b.txt", b"b");
        let mut batch = BatchUpload::new();
        batch.add(&a).unwrap();
        batch.start().unwrap();

        assert!(batch.add(&b).is_err());
        assert!(!batch.remove(0));
        assert_eq!(batch.items().len(), 1);
    }

    #[test]
    fn test_no_auto_close_before_finish() {
        let dir = tempfile::tempdir().unwrap();
        let a = temp_file(&dir, "a.txt", b"a");
        let mut batch = BatchUpload::new();
        batch.add(&a).unwrap();
        batch.start().unwrap();
        assert!(!batch.should_auto_close(Instant::now() + Duration::from_secs(60)));
    }
}
