use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::alerts::Alert;
use crate::fleet::domain::{AlertCategory, Severity};

/// Outbound notification derived from a danger alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetNotification {
    pub message: String,
    pub severity: Severity,
    pub category: AlertCategory,
    pub subject_label: String,
    pub sent_on: NaiveDate,
    pub read: bool,
}

impl FleetNotification {
    pub fn from_alert(alert: &Alert, today: NaiveDate) -> Self {
        Self {
            message: alert.message.clone(),
            severity: alert.severity,
            category: alert.category,
            subject_label: alert.subject_label.clone(),
            sent_on: today,
            read: false,
        }
    }

    /// Dedup key: one notification per subject and category, however many
    /// times the underlying alert is re-evaluated.
    pub fn tag(&self) -> String {
        format!("alert-{}-{}", self.subject_label, self.category.name())
    }
}

/// Trait describing the outbound delivery channel (push service, e-mail
/// bridge, test recorder).
pub trait AlertNotifier: Send + Sync {
    fn notify(&self, notification: &FleetNotification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

const MAX_LOG_ENTRIES: usize = 100;

/// Bounded history of sent notifications; the tag set doubles as the dedup
/// filter for periodic dispatch.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<VecDeque<FleetNotification>>,
}

impl NotificationLog {
    pub fn contains_tag(&self, tag: &str) -> bool {
        let guard = self.entries.lock().expect("notification mutex poisoned");
        guard.iter().any(|entry| entry.tag() == tag)
    }

    pub fn record(&self, notification: FleetNotification) {
        let mut guard = self.entries.lock().expect("notification mutex poisoned");
        guard.push_back(notification);
        while guard.len() > MAX_LOG_ENTRIES {
            guard.pop_front();
        }
    }

    pub fn entries(&self) -> Vec<FleetNotification> {
        let guard = self.entries.lock().expect("notification mutex poisoned");
        guard.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        let guard = self.entries.lock().expect("notification mutex poisoned");
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
