use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::alerts::{rank_alerts, Alert, AlertEngine, AlertThresholds};
use super::notifications::{AlertNotifier, FleetNotification, NotificationLog, NotifyError};
use super::report::{
    self, DashboardSummary, FleetComparisonEntry, MaintenanceCosts, ReportError, ReviewFilter,
    TechnicalReviewEntry,
};
use crate::fleet::domain::{Operation, Severity};
use crate::store::{Collection, FleetSnapshot, FleetStore, StoreError};

/// Service composing the snapshot store, the alert engine, and the
/// notification channel. All reads go through the store so the evaluator
/// never touches ambient state.
pub struct FleetService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    engine: AlertEngine,
    log: NotificationLog,
}

impl<S, N> FleetService<S, N>
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, thresholds: AlertThresholds) -> Self {
        Self {
            store,
            notifier,
            engine: AlertEngine::new(thresholds),
            log: NotificationLog::default(),
        }
    }

    pub fn snapshot(&self) -> Result<FleetSnapshot, FleetServiceError> {
        Ok(self.store.load()?)
    }

    /// The raw JSON of one collection, as the generic data endpoint serves it.
    pub fn collection_json(&self, collection: Collection) -> Result<Value, FleetServiceError> {
        let snapshot = self.store.load()?;
        let encoded = match collection {
            Collection::Trucks => serde_json::to_value(&snapshot.trucks),
            Collection::Drivers => serde_json::to_value(&snapshot.drivers),
            Collection::Documents => serde_json::to_value(&snapshot.documents),
            Collection::Operations => serde_json::to_value(&snapshot.operations),
            Collection::Repairs => serde_json::to_value(&snapshot.repairs),
            Collection::Fuel => serde_json::to_value(&snapshot.fuel),
            Collection::Adblue => serde_json::to_value(&snapshot.adblue),
            Collection::Oil => serde_json::to_value(&snapshot.oil),
        };
        encoded.map_err(|source| FleetServiceError::Encode {
            collection: collection.name(),
            source,
        })
    }

    /// Replaces one collection wholesale. The payload must deserialize into
    /// the collection's record type in full; otherwise nothing is written.
    /// Replacing operations re-derives every record's monthly km from the
    /// latest earlier month of the same truck.
    pub fn replace_collection(
        &self,
        collection: Collection,
        payload: Value,
    ) -> Result<usize, FleetServiceError> {
        let mut snapshot = self.store.load()?;

        let count = match collection {
            Collection::Trucks => {
                snapshot.trucks = decode(collection, payload)?;
                snapshot.trucks.len()
            }
            Collection::Drivers => {
                snapshot.drivers = decode(collection, payload)?;
                snapshot.drivers.len()
            }
            Collection::Documents => {
                snapshot.documents = decode(collection, payload)?;
                snapshot.documents.len()
            }
            Collection::Operations => {
                let mut operations: Vec<Operation> = decode(collection, payload)?;
                if let Some(bad) = operations
                    .iter()
                    .find(|operation| !valid_month(&operation.month))
                {
                    return Err(FleetServiceError::InvalidPayload {
                        collection: collection.name(),
                        detail: format!(
                            "month '{}' is not a zero-padded YYYY-MM value",
                            bad.month
                        ),
                    });
                }
                let derived: Vec<i64> = operations
                    .iter()
                    .map(|operation| {
                        report::monthly_km(&operations, operation.truck_id, &operation.month)
                    })
                    .collect();
                for (operation, km) in operations.iter_mut().zip(derived) {
                    operation.monthly_km = km;
                }
                snapshot.operations = operations;
                snapshot.operations.len()
            }
            Collection::Repairs => {
                snapshot.repairs = decode(collection, payload)?;
                snapshot.repairs.len()
            }
            Collection::Fuel => {
                snapshot.fuel = decode(collection, payload)?;
                snapshot.fuel.len()
            }
            Collection::Adblue => {
                snapshot.adblue = decode(collection, payload)?;
                snapshot.adblue.len()
            }
            Collection::Oil => {
                snapshot.oil = decode(collection, payload)?;
                snapshot.oil.len()
            }
        };

        self.store.store(&snapshot)?;
        Ok(count)
    }

    /// All active alerts, priority-ranked.
    pub fn alerts(&self, today: NaiveDate) -> Result<Vec<Alert>, FleetServiceError> {
        let snapshot = self.store.load()?;
        Ok(rank_alerts(self.engine.evaluate(&snapshot, today)))
    }

    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardSummary, FleetServiceError> {
        let snapshot = self.store.load()?;
        Ok(report::dashboard_summary(&snapshot, today))
    }

    pub fn technical_review(
        &self,
        today: NaiveDate,
        filter: ReviewFilter,
    ) -> Result<Vec<TechnicalReviewEntry>, FleetServiceError> {
        let snapshot = self.store.load()?;
        Ok(report::technical_review_report(&snapshot, today, filter))
    }

    pub fn fleet_comparison(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FleetComparisonEntry>, FleetServiceError> {
        let snapshot = self.store.load()?;
        Ok(report::fleet_comparison(&snapshot, from, to))
    }

    pub fn maintenance_costs(
        &self,
        truck_id: u64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<MaintenanceCosts, FleetServiceError> {
        let snapshot = self.store.load()?;
        Ok(report::maintenance_costs(&snapshot, truck_id, range))
    }

    pub fn notifications(&self) -> Vec<FleetNotification> {
        self.log.entries()
    }

    /// Sends the danger-severity subset of the ranked alerts, skipping any
    /// subject+category already in the log so a polling caller does not
    /// re-notify the same condition every cycle. Returns how many went out.
    pub fn dispatch_notifications(&self, today: NaiveDate) -> Result<usize, FleetServiceError> {
        let ranked = self.alerts(today)?;
        let mut sent = 0;

        for alert in ranked
            .into_iter()
            .filter(|alert| alert.severity == Severity::Danger)
        {
            let notification = FleetNotification::from_alert(&alert, today);
            if self.log.contains_tag(&notification.tag()) {
                continue;
            }
            self.notifier.notify(&notification)?;
            self.log.record(notification);
            sent += 1;
        }

        Ok(sent)
    }
}

fn decode<T: DeserializeOwned>(
    collection: Collection,
    payload: Value,
) -> Result<Vec<T>, FleetServiceError> {
    serde_json::from_value(payload).map_err(|source| FleetServiceError::InvalidPayload {
        collection: collection.name(),
        detail: source.to_string(),
    })
}

fn valid_month(month: &str) -> bool {
    let bytes = month.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return false;
    }
    if !bytes[..4].iter().all(u8::is_ascii_digit) || !bytes[5..].iter().all(u8::is_ascii_digit) {
        return false;
    }
    month[5..]
        .parse::<u8>()
        .map(|m| (1..=12).contains(&m))
        .unwrap_or(false)
}

/// Error raised by the fleet service.
#[derive(Debug, thiserror::Error)]
pub enum FleetServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid payload for {collection}: {detail}")]
    InvalidPayload {
        collection: &'static str,
        detail: String,
    },
    #[error("failed to encode {collection}: {source}")]
    Encode {
        collection: &'static str,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
