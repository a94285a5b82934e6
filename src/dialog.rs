//! Dialog State
//!
//! Which dialog of a view is open, which row it targets, and whether a
//! mutation started from it is still in flight.

use std::future::Future;
use std::time::{Duration, Instant};

/// Delay before the target row is cleared after a dialog closes
pub const ROW_CLEAR_DELAY: Duration = Duration::from_millis(300);

/// Dialogs of the files view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilesDialog {
    Create,
    Delete,
    BatchUpload,
}

/// Dialogs of the vector stores view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorStoresDialog {
    Create,
    Delete,
    /// Member files drawer
    ListFiles,
}

/// Mutually exclusive dialog state for one view.
///
/// `current_row` holds only the target's id; resolve it against the latest
/// fetched list with [`DialogController::resolve_row`].
#[derive(Debug, Clone)]
pub struct DialogController<D> {
    open: Option<D>,
    current_row: Option<String>,
    pending: bool,
    clear_row_at: Option<Instant>,
}

impl<D> Default for DialogController<D> {
    fn default() -> Self {
        Self {
            open: None,
            current_row: None,
            pending: false,
            clear_row_at: None,
        }
    }
}

impl<D: Copy + PartialEq> DialogController<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `dialog`, targeting `row` when given
    pub fn open(&mut self, dialog: D, row: Option<String>) {
        self.open = Some(dialog);
        self.clear_row_at = None;
        if row.is_some() {
            self.current_row = row;
        }
    }

    /// Close the open dialog. Refused while a mutation is pending.
    pub fn close(&mut self) -> bool {
        self.close_at(Instant::now())
    }

    pub fn close_at(&mut self, now: Instant) -> bool {
        if self.pending {
            return false;
        }
        if self.open.take().is_some() {
            self.clear_row_at = Some(now + ROW_CLEAR_DELAY);
        }
        true
    }

    /// Apply the deferred row clear once its deadline has passed
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.clear_row_at {
            if now >= deadline {
                self.current_row = None;
                self.clear_row_at = None;
            }
        }
    }

    pub fn open_dialog(&self) -> Option<D> {
        self.open
    }

    pub fn is_open(&self, dialog: D) -> bool {
        self.open == Some(dialog)
    }

    pub fn is_closed(&self) -> bool {
        self.open.is_none()
    }

    pub fn current_row(&self) -> Option<&str> {
        self.current_row.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn begin_pending(&mut self) {
        self.pending = true;
    }

    pub fn end_pending(&mut self) {
        self.pending = false;
    }

    /// Run a mutation with the close guard held; released on any outcome
    pub async fn guard<F, T>(&mut self, mutation: F) -> T
    where
        F: Future<Output = T>,
    {
        self.begin_pending();
        let outcome = mutation.await;
        self.end_pending();
        outcome
    }

    /// Look the target row up in the freshest list
    pub fn resolve_row<'a, T>(&self, items: &'a [T], id_of: impl Fn(&T) -> &str) -> Option<&'a T> {
        let id = self.current_row.as_deref()?;
        items.iter().find(|item| id_of(item) == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_closed() {
        let dialog: DialogController<FilesDialog> = DialogController::new();
        assert!(dialog.is_closed());
        assert!(dialog.current_row().is_none());
        assert!(!dialog.is_pending());
    }

    #[test]
    fn test_open_is_mutually_exclusive() {
        let mut dialog = DialogController::new();
        dialog.open(VectorStoresDialog::Create, None);
        dialog.open(VectorStoresDialog::Delete, Some("vs-1".to_string()));
        assert!(dialog.is_open(VectorStoresDialog::Delete));
        assert!(!dialog.is_open(VectorStoresDialog::Create));
        assert_eq!(dialog.current_row(), Some("vs-1"));
    }

    #[test]
    fn test_row_cleared_after_delay() {
        let mut dialog = DialogController::new();
        let t0 = Instant::now();
        dialog.open(FilesDialog::Delete, Some("file-1".to_string()));
        assert!(dialog.close_at(t0));
        assert!(dialog.is_closed());

        dialog.tick(t0 + Duration::from_millis(299));
        assert_eq!(dialog.current_row(), Some("file-1"));

        dialog.tick(t0 + ROW_CLEAR_DELAY);
        assert!(dialog.current_row().is_none());
    }

    #[test]
    fn test_reopen_cancels_deferred_clear() {
        let mut dialog = DialogController::new();
        let t0 = Instant::now();
        dialog.open(VectorStoresDialog::ListFiles, Some("vs-1".to_string()));
        dialog.close_at(t0);
        dialog.open(VectorStoresDialog::Delete, None);
        dialog.tick(t0 + Duration::from_secs(1));
        assert_eq!(dialog.current_row(), Some("vs-1"));
    }

    #[test]
    fn test_close_rejected_while_pending() {
        let mut dialog = DialogController::new();
        dialog.open(FilesDialog::Delete, Some("file-1".to_string()));
        dialog.begin_pending();
        assert!(!dialog.close());
        assert!(dialog.is_open(FilesDialog::Delete));

        dialog.end_pending();
        assert!(dialog.close());
    }

    #[tokio::test]
    async fn test_guard_releases_on_failure() {
        let mut dialog = DialogController::new();
        dialog.open(FilesDialog::Delete, Some("file-1".to_string()));

        let outcome: Result<(), &str> = dialog.guard(async { Err("not found") }).await;
        assert!(outcome.is_err());
        assert!(!dialog.is_pending());
        assert!(dialog.close());
    }

    #[test]
    fn test_resolve_row_against_latest_list() {
        let mut dialog = DialogController::new();
        dialog.open(FilesDialog::Delete, Some("b".to_string()));
        let items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            dialog.resolve_row(&items, |s| s.as_str()).map(String::as_str),
            Some("b")
        );

        let refetched = vec!["a".to_string()];
        assert!(dialog.resolve_row(&refetched, |s| s.as_str()).is_none());
    }
}
