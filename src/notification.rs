//! Notification System
//!
//! Toast messages and history for write operations (uploads, creates,
//! deletes, attach/detach).

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Type of operation being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Upload,
    Create,
    Delete,
    Attach,
    Detach,
}

impl OperationType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::Create => "Create",
            Self::Delete => "Delete",
            Self::Attach => "Add",
            Self::Detach => "Remove",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Upload => "Uploaded",
            Self::Create => "Created",
            Self::Delete => "Deleted",
            Self::Attach => "Added",
            Self::Detach => "Removed",
        }
    }

    pub fn present_participle(&self) -> &'static str {
        match self {
            Self::Upload => "Uploading",
            Self::Create => "Creating",
            Self::Delete => "Deleting",
            Self::Attach => "Adding",
            Self::Detach => "Removing",
        }
    }
}

/// Status of a notification/operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    /// Request sent, waiting for the backend
    InProgress,
    Success,
    /// Failed with the backend's message
    Error(String),
}

impl NotificationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error(_))
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::InProgress => "↻",
            Self::Success => "✓",
            Self::Error(_) => "✗",
        }
    }
}

/// A single notification
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub operation_type: OperationType,
    pub resource_type: String,
    /// Subject shown in the toast (id, name, description or count)
    pub subject: String,
    pub status: NotificationStatus,
    pub created_at: Instant,
    pub completed_at: Option<Instant>,
}

impl Notification {
    pub fn new(operation_type: OperationType, resource_type: &str, subject: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation_type,
            resource_type: resource_type.to_string(),
            subject: subject.to_string(),
            status: NotificationStatus::InProgress,
            created_at: Instant::now(),
            completed_at: None,
        }
    }

    pub fn set_success(&mut self, subject: Option<String>) {
        if let Some(subject) = subject {
            self.subject = subject;
        }
        self.status = NotificationStatus::Success;
        self.completed_at = Some(Instant::now());
    }

    pub fn set_error(&mut self, error: String) {
        self.status = NotificationStatus::Error(error);
        self.completed_at = Some(Instant::now());
    }

    /// Get duration of operation (or elapsed time if still running)
    pub fn duration(&self) -> Duration {
        self.completed_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.created_at)
    }

    pub fn duration_display(&self) -> String {
        let d = self.duration();
        if d.as_secs() < 1 {
            format!("{}ms", d.as_millis())
        } else if d.as_secs() < 60 {
            format!("{}s", d.as_secs())
        } else {
            format!("{}m{}s", d.as_secs() / 60, d.as_secs() % 60)
        }
    }

    /// Format notification for toast display
    pub fn toast_message(&self) -> String {
        let icon = self.status.icon();
        match &self.status {
            NotificationStatus::InProgress => format!(
                "{} {} {}...",
                icon,
                self.operation_type.present_participle(),
                self.subject
            ),
            NotificationStatus::Success => format!(
                "{} {} {} ({})",
                icon,
                self.operation_type.past_tense(),
                self.subject,
                self.duration_display()
            ),
            NotificationStatus::Error(err) => format!(
                "{} {} failed: {}",
                icon,
                self.operation_type.display_name(),
                err
            ),
        }
    }
}

/// Notification manager
pub struct NotificationManager {
    /// All notifications (recent first)
    pub notifications: VecDeque<Notification>,
    /// Maximum notifications to keep in history
    pub max_history: usize,
    /// Toast display duration
    pub toast_duration: Duration,
    last_toast_time: Option<Instant>,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            notifications: VecDeque::new(),
            max_history: 50,
            toast_duration: Duration::from_secs(5),
            last_toast_time: None,
        }
    }

    /// Start tracking an operation and return its ID
    pub fn create_notification(
        &mut self,
        operation_type: OperationType,
        resource_type: &str,
        subject: &str,
    ) -> Uuid {
        let notification = Notification::new(operation_type, resource_type, subject);
        let id = notification.id;
        self.notifications.push_front(notification);
        self.last_toast_time = Some(Instant::now());
        self.trim_history();
        id
    }

    /// Mark a notification as successful, optionally replacing its subject
    pub fn mark_success(&mut self, id: Uuid, subject: Option<String>) {
        if let Some(notif) = self.notifications.iter_mut().find(|n| n.id == id) {
            notif.set_success(subject);
            self.last_toast_time = Some(Instant::now());
        }
    }

    /// Mark a notification as failed
    pub fn mark_error(&mut self, id: Uuid, error: String) {
        if let Some(notif) = self.notifications.iter_mut().find(|n| n.id == id) {
            notif.set_error(error);
            self.last_toast_time = Some(Instant::now());
        }
    }

    /// Drop a notification without showing an outcome
    pub fn dismiss(&mut self, id: Uuid) {
        self.notifications.retain(|n| n.id != id);
        if self.notifications.is_empty() {
            self.last_toast_time = None;
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    /// Most recent notification while the toast is still visible
    pub fn current_toast(&self) -> Option<&Notification> {
        let last_time = self.last_toast_time?;
        if last_time.elapsed() > self.toast_duration {
            return None;
        }
        self.notifications.front()
    }

    pub fn in_progress_count(&self) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.status == NotificationStatus::InProgress)
            .count()
    }

    pub fn success_count(&self) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.status == NotificationStatus::Success)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.notifications
            .iter()
            .filter(|n| matches!(n.status, NotificationStatus::Error(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
        self.last_toast_time = None;
    }

    fn trim_history(&mut self) {
        while self.notifications.len() > self.max_history {
            // Remove oldest completed notification first
            if let Some(pos) = self.notifications.iter().rposition(|n| n.status.is_terminal()) {
                self.notifications.remove(pos);
            } else {
                self.notifications.pop_back();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_lifecycle() {
        let mut manager = NotificationManager::new();

        let id = manager.create_notification(OperationType::Delete, "file", "file-abc");
        assert_eq!(manager.in_progress_count(), 1);

        manager.mark_success(id, None);
        assert_eq!(manager.get(id).unwrap().status, NotificationStatus::Success);
        assert_eq!(manager.success_count(), 1);
        assert_eq!(manager.in_progress_count(), 0);
    }

    #[test]
    fn test_toast_message_formats() {
        let mut notif = Notification::new(OperationType::Upload, "file", "report.pdf");
        assert!(notif.toast_message().contains("Uploading report.pdf"));

        notif.set_success(Some("file-123".to_string()));
        let msg = notif.toast_message();
        assert!(msg.starts_with("✓ Uploaded file-123"));

        let mut failed = Notification::new(OperationType::Create, "vector_store", "Docs");
        failed.set_error("name already taken".to_string());
        assert_eq!(failed.toast_message(), "✗ Create failed: name already taken");
    }

    #[test]
    fn test_dismiss_removes_entry() {
        let mut manager = NotificationManager::new();
        let id = manager.create_notification(OperationType::Detach, "vector_store_file", "f1");
        manager.dismiss(id);
        assert!(manager.get(id).is_none());
        assert!(manager.current_toast().is_none());
    }

    #[test]
    fn test_history_is_trimmed() {
        let mut manager = NotificationManager::new();
        manager.max_history = 3;
        for i in 0..5 {
            let id = manager.create_notification(OperationType::Upload, "file", &i.to_string());
            manager.mark_success(id, None);
        }
        assert_eq!(manager.notifications.len(), 3);
        assert_eq!(manager.notifications.front().unwrap().subject, "4");
    }
}
