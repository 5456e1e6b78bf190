use super::Alert;

/// Stable priority sort: critical first, then high, medium, low. Alerts with
/// equal priority keep the evaluator's emission order. No filtering happens
/// here; callers slice the result ("top 5 for the dashboard", "danger-only
/// for notifications").
pub fn rank_alerts(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by_key(|alert| alert.priority.weight());
    alerts
}
