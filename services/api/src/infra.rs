use chrono::NaiveDate;
use fleet_ops::fleet::{AlertNotifier, FleetNotification, NotifyError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Server-side stand-in for the browser push channel: danger alerts land in
/// the service log, tagged for operators to grep.
#[derive(Default, Clone)]
pub(crate) struct LogNotifier;

impl AlertNotifier for LogNotifier {
    fn notify(&self, notification: &FleetNotification) -> Result<(), NotifyError> {
        warn!(
            category = notification.category.name(),
            subject = %notification.subject_label,
            "{}",
            notification.message
        );
        Ok(())
    }
}

/// Test and demo notifier keeping everything it was asked to send.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    events: Arc<Mutex<Vec<FleetNotification>>>,
}

impl AlertNotifier for InMemoryNotifier {
    fn notify(&self, notification: &FleetNotification) -> Result<(), NotifyError> {
        let mut guard = self.events.lock().expect("notifier mutex poisoned");
        guard.push(notification.clone());
        Ok(())
    }
}

impl InMemoryNotifier {
    pub(crate) fn events(&self) -> Vec<FleetNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
