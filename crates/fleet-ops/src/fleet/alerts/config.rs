/// Thresholds driving the alert rules. The defaults are the operational
/// settings the fleet runs with; tests narrow or widen them to hit
/// boundaries cheaply.
#[derive(Debug, Clone)]
pub struct AlertThresholds {
    /// Documents expiring in at most this many days escalate to danger/high.
    pub document_danger_days: i64,
    /// Documents expiring in at most this many days warn; beyond it, silence.
    pub document_warning_days: i64,
    /// Licenses expiring in at most this many days escalate to danger/high.
    pub license_danger_days: i64,
    /// Licenses expiring in at most this many days warn.
    pub license_warning_days: i64,
    /// Strictly more pending repairs than this escalates to danger/high.
    pub pending_repairs_danger: usize,
    pub oil_months_due: i64,
    pub oil_months_warning: i64,
    pub oil_km_due: i64,
    pub oil_km_warning: i64,
    /// Newest fill-up above the recent average times this ratio is anomalous.
    pub fuel_spike_ratio: f64,
    pub high_mileage_km: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            document_danger_days: 5,
            document_warning_days: 15,
            license_danger_days: 7,
            license_warning_days: 30,
            pending_repairs_danger: 2,
            oil_months_due: 6,
            oil_months_warning: 5,
            oil_km_due: 10_000,
            oil_km_warning: 8_000,
            fuel_spike_ratio: 1.4,
            high_mileage_km: 500_000,
        }
    }
}
