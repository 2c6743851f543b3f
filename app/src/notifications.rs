//! FILENAME: app/src/notifications.rs
// PURPOSE: User-facing notifications raised by the matrix view.
// CONTEXT: Notifications carry a stable message key; turning keys into
// localized text is up to the UI. The view queues them and the UI drains them.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const FETCH_FAILED: &str = "matrix.fetch.failed";
pub const INDEX_MISSING: &str = "matrix.index.missing";
pub const FLUSH_SUCCESS: &str = "matrix.flush.success";
pub const FLUSH_FAILED: &str = "matrix.flush.failed";
pub const IMPORT_SUCCESS: &str = "matrix.import.success";
pub const IMPORT_FAILED: &str = "matrix.import.failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NotificationLevel,
    pub key: &'static str,
    /// Technical detail (error message), shown as secondary text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Notifications {
    queue: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Notifications::default()
    }

    pub fn push(&mut self, level: NotificationLevel, key: &'static str, detail: Option<String>) {
        let text = detail.as_deref().unwrap_or("");
        match level {
            NotificationLevel::Error => crate::log_error!("NOTIFY", "{} {}", key, text),
            NotificationLevel::Warning => crate::log_warn!("NOTIFY", "{} {}", key, text),
            _ => crate::log_debug!("NOTIFY", "{}", key),
        }
        self.queue.push(Notification {
            level,
            key,
            detail,
            created_at: Utc::now(),
        });
    }

    pub fn error(&mut self, key: &'static str, detail: impl ToString) {
        self.push(NotificationLevel::Error, key, Some(detail.to_string()));
    }

    pub fn warning(&mut self, key: &'static str, detail: impl ToString) {
        self.push(NotificationLevel::Warning, key, Some(detail.to_string()));
    }

    pub fn success(&mut self, key: &'static str) {
        self.push(NotificationLevel::Success, key, None);
    }

    /// Removes and returns every queued notification, oldest first.
    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
