//! Read-only projections over a snapshot: the dashboard header, the
//! technical-review board, and the cost/comparison tables behind the report
//! screens.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::alerts::{evaluate_alerts, rank_alerts, Alert};
use crate::fleet::domain::Operation;
use crate::store::FleetSnapshot;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_trucks: usize,
    pub total_drivers: usize,
    pub total_alerts: usize,
    /// Sum of monthly km over operations of `today`'s month.
    pub monthly_km: i64,
    pub recent_alerts: Vec<Alert>,
}

/// The dashboard header: entity counts, the current month's kilometers, and
/// the five highest-ranked alerts.
pub fn dashboard_summary(snapshot: &FleetSnapshot, today: NaiveDate) -> DashboardSummary {
    let alerts = rank_alerts(evaluate_alerts(snapshot, today));
    let current_month = today.format("%Y-%m").to_string();
    let monthly_km = snapshot
        .operations
        .iter()
        .filter(|operation| operation.month == current_month)
        .map(|operation| operation.monthly_km)
        .sum();

    DashboardSummary {
        total_trucks: snapshot.trucks.len(),
        total_drivers: snapshot.drivers.len(),
        total_alerts: alerts.len(),
        monthly_km,
        recent_alerts: alerts.into_iter().take(5).collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Vigente,
    PorVencer,
    Vencida,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vigente => "Vigente",
            Self::PorVencer => "Por vencer",
            Self::Vencida => "Vencida",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFilter {
    #[default]
    All,
    Expiring,
    Expired,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalReviewEntry {
    pub truck_id: u64,
    pub number: String,
    pub plate: String,
    pub review_date: NaiveDate,
    pub days_remaining: i64,
    pub status: ReviewStatus,
    pub status_label: &'static str,
}

/// Per-truck technical-review standing, soonest expiry first. Trucks without
/// a recorded review date are left out entirely.
pub fn technical_review_report(
    snapshot: &FleetSnapshot,
    today: NaiveDate,
    filter: ReviewFilter,
) -> Vec<TechnicalReviewEntry> {
    let mut entries: Vec<TechnicalReviewEntry> = snapshot
        .trucks
        .iter()
        .filter_map(|truck| {
            let review_date = truck.revision_tecnica?;
            let days_remaining = (review_date - today).num_days();
            let status = if days_remaining < 0 {
                ReviewStatus::Vencida
            } else if days_remaining <= 15 {
                ReviewStatus::PorVencer
            } else {
                ReviewStatus::Vigente
            };
            Some(TechnicalReviewEntry {
                truck_id: truck.id,
                number: truck.number.clone(),
                plate: truck.plate.clone(),
                review_date,
                days_remaining,
                status,
                status_label: status.label(),
            })
        })
        .filter(|entry| match filter {
            ReviewFilter::All => true,
            ReviewFilter::Expiring => entry.days_remaining > 0 && entry.days_remaining <= 15,
            ReviewFilter::Expired => entry.days_remaining < 0,
        })
        .collect();

    entries.sort_by_key(|entry| entry.days_remaining);
    entries
}

/// CSV rendering of the technical-review board for export.
pub fn technical_review_csv(entries: &[TechnicalReviewEntry]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Camión",
        "Patente",
        "Fecha de Revisión",
        "Estado",
        "Días Restantes",
    ])?;
    for entry in entries {
        let review_date = entry.review_date.format("%Y-%m-%d").to_string();
        let days_remaining = entry.days_remaining.to_string();
        writer.write_record([
            entry.number.as_str(),
            entry.plate.as_str(),
            review_date.as_str(),
            entry.status_label,
            days_remaining.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|error| ReportError::Csv(error.into_error().into()))
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to render csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Cost totals per maintenance kind, optionally restricted to a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceCosts {
    pub repairs: i64,
    pub fuel: i64,
    pub adblue: i64,
    pub oil: i64,
}

impl MaintenanceCosts {
    pub const fn total(self) -> i64 {
        self.repairs + self.fuel + self.adblue + self.oil
    }
}

pub fn maintenance_costs(
    snapshot: &FleetSnapshot,
    truck_id: u64,
    range: Option<(NaiveDate, NaiveDate)>,
) -> MaintenanceCosts {
    let in_range = |date: Option<NaiveDate>| match (date, range) {
        (Some(date), Some((from, to))) => date >= from && date <= to,
        (Some(_), None) => true,
        // Undated records only count when no range is requested.
        (None, None) => true,
        (None, Some(_)) => false,
    };

    MaintenanceCosts {
        repairs: snapshot
            .repairs
            .iter()
            .filter(|r| r.truck_id == truck_id && in_range(r.date))
            .map(|r| r.cost)
            .sum(),
        fuel: snapshot
            .fuel
            .iter()
            .filter(|f| f.truck_id == truck_id && in_range(f.date))
            .map(|f| f.cost)
            .sum(),
        adblue: snapshot
            .adblue
            .iter()
            .filter(|a| a.truck_id == truck_id && in_range(a.date))
            .map(|a| a.cost)
            .sum(),
        oil: snapshot
            .oil
            .iter()
            .filter(|o| o.truck_id == truck_id && in_range(o.date))
            .map(|o| o.cost)
            .sum(),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetComparisonEntry {
    pub truck_id: u64,
    pub number: String,
    pub operations: usize,
    pub revenue: i64,
    pub fuel_liters: f64,
    pub fuel_cost: i64,
    pub maintenance_cost: i64,
    pub profit: i64,
    /// Percent of revenue, one decimal; zero when there is no revenue.
    pub profit_margin: f64,
}

/// Side-by-side revenue vs. cost per truck over a date range. Operations are
/// matched by their `YYYY-MM` month falling inside the range's months.
pub fn fleet_comparison(
    snapshot: &FleetSnapshot,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<FleetComparisonEntry> {
    let from_month = from.format("%Y-%m").to_string();
    let to_month = to.format("%Y-%m").to_string();

    snapshot
        .trucks
        .iter()
        .map(|truck| {
            let operations: Vec<&Operation> = snapshot
                .operations
                .iter()
                .filter(|op| {
                    op.truck_id == truck.id && op.month >= from_month && op.month <= to_month
                })
                .collect();
            let revenue: i64 = operations
                .iter()
                .filter_map(|op| op.total_revenue)
                .sum();

            let costs = maintenance_costs(snapshot, truck.id, Some((from, to)));
            let fuel_liters: f64 = snapshot
                .fuel
                .iter()
                .filter(|f| {
                    f.truck_id == truck.id
                        && f.date.map(|d| d >= from && d <= to).unwrap_or(false)
                })
                .map(|f| f.liters)
                .sum();

            let maintenance_cost = costs.repairs;
            let profit = revenue - costs.fuel - maintenance_cost;
            let profit_margin = if revenue > 0 {
                ((profit as f64 / revenue as f64) * 1000.0).round() / 10.0
            } else {
                0.0
            };

            FleetComparisonEntry {
                truck_id: truck.id,
                number: truck.number.clone(),
                operations: operations.len(),
                revenue,
                fuel_liters,
                fuel_cost: costs.fuel,
                maintenance_cost,
                profit,
                profit_margin,
            }
        })
        .collect()
}

/// Kilometers attributable to `month`: the closing odometer minus the latest
/// earlier month's closing odometer (zero-padded `YYYY-MM` keeps the string
/// order correct). Returns 0 when the truck has no record for that month.
pub fn monthly_km(operations: &[Operation], truck_id: u64, month: &str) -> i64 {
    let Some(current) = operations
        .iter()
        .find(|op| op.truck_id == truck_id && op.month == month)
    else {
        return 0;
    };

    let previous = operations
        .iter()
        .filter(|op| op.truck_id == truck_id && op.month.as_str() < month)
        .max_by(|a, b| a.month.cmp(&b.month));

    current.final_km - previous.map(|op| op.final_km).unwrap_or(0)
}
