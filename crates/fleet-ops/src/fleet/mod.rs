//! Fleet record-keeping and the alert pipeline built on top of it.

pub mod alerts;
pub mod domain;
pub mod notifications;
pub mod report;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use alerts::{evaluate_alerts, rank_alerts, Alert, AlertEngine, AlertThresholds};
pub use domain::{
    AdBlueEntry, AlertCategory, Driver, FuelEntry, OilChange, Operation, Priority, Repair,
    Severity, Truck, TruckDocument,
};
pub use notifications::{AlertNotifier, FleetNotification, NotificationLog, NotifyError};
pub use report::{
    dashboard_summary, fleet_comparison, maintenance_costs, monthly_km, technical_review_csv,
    technical_review_report, DashboardSummary, FleetComparisonEntry, MaintenanceCosts,
    ReportError, ReviewFilter, ReviewStatus, TechnicalReviewEntry,
};
pub use router::fleet_router;
pub use service::{FleetService, FleetServiceError};
