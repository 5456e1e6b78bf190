//! The alert engine: a pure rule evaluator over a [`FleetSnapshot`] plus a
//! stable priority ranker. Alerts are recomputed from scratch on every call
//! and never persisted; callers slice or filter the ranked output.

mod config;
mod rank;
mod rules;

pub use config::AlertThresholds;
pub use rank::rank_alerts;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fleet::domain::{AlertCategory, Priority, Severity};
use crate::store::FleetSnapshot;

/// Transient warning record derived from the current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub severity: Severity,
    pub category: AlertCategory,
    #[serde(default = "fallback_priority")]
    pub priority: Priority,
    /// Truck number or driver name, whichever the alert is about.
    pub subject_label: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<u64>,
}

const fn fallback_priority() -> Priority {
    Priority::Low
}

/// Stateless evaluator applying the configured thresholds to a snapshot.
pub struct AlertEngine {
    thresholds: AlertThresholds,
}

impl AlertEngine {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// Produces the unordered list of active alerts for `today`. Trucks are
    /// evaluated independently in snapshot order, drivers afterwards; within
    /// a truck the rules fire in a fixed sequence so that equal-priority
    /// alerts keep a deterministic relative order through [`rank_alerts`].
    pub fn evaluate(&self, snapshot: &FleetSnapshot, today: NaiveDate) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for truck in &snapshot.trucks {
            rules::document_expiry(truck, &snapshot.documents, today, &self.thresholds, &mut alerts);
            rules::builtin_document_expiry(truck, today, &self.thresholds, &mut alerts);
            rules::pending_repairs(truck, &snapshot.repairs, &self.thresholds, &mut alerts);
            rules::oil_change_due(
                truck,
                &snapshot.oil,
                &snapshot.operations,
                today,
                &self.thresholds,
                &mut alerts,
            );
            rules::fuel_consumption(truck, &snapshot.fuel, &self.thresholds, &mut alerts);
            rules::high_mileage(truck, &self.thresholds, &mut alerts);
        }

        rules::license_expiry(&snapshot.drivers, today, &self.thresholds, &mut alerts);

        alerts
    }
}

/// Evaluates every rule with the default thresholds.
pub fn evaluate_alerts(snapshot: &FleetSnapshot, today: NaiveDate) -> Vec<Alert> {
    AlertEngine::new(AlertThresholds::default()).evaluate(snapshot, today)
}
