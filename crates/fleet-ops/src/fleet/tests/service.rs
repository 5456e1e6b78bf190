use std::sync::{Arc, Mutex};

use super::common::*;
use crate::fleet::alerts::AlertThresholds;
use crate::fleet::notifications::{AlertNotifier, FleetNotification, NotifyError};
use crate::fleet::service::{FleetService, FleetServiceError};
use crate::store::{Collection, FleetSnapshot, FleetStore, InMemoryStore};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<FleetNotification>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<FleetNotification> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl AlertNotifier for RecordingNotifier {
    fn notify(&self, notification: &FleetNotification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification.clone());
        Ok(())
    }
}

fn service_with(
    snapshot: FleetSnapshot,
) -> (
    FleetService<InMemoryStore, RecordingNotifier>,
    Arc<InMemoryStore>,
    Arc<RecordingNotifier>,
) {
    let store = Arc::new(InMemoryStore::seeded(snapshot));
    let notifier = Arc::new(RecordingNotifier::default());
    let service = FleetService::new(
        store.clone(),
        notifier.clone(),
        AlertThresholds::default(),
    );
    (service, store, notifier)
}

#[test]
fn replace_collection_swaps_records_wholesale() {
    let (service, store, _) = service_with(quiet_snapshot(1, "12"));

    let payload = serde_json::json!([
        { "id": 5, "number": "20" },
        { "id": 6, "number": "21" }
    ]);
    let count = service
        .replace_collection(Collection::Trucks, payload)
        .expect("replace succeeds");
    assert_eq!(count, 2);

    let snapshot = store.load().expect("store loads");
    let numbers: Vec<&str> = snapshot
        .trucks
        .iter()
        .map(|truck| truck.number.as_str())
        .collect();
    assert_eq!(numbers, vec!["20", "21"]);
}

#[test]
fn invalid_payload_leaves_the_store_untouched() {
    let (service, store, _) = service_with(quiet_snapshot(1, "12"));

    let payload = serde_json::json!({ "not": "a list" });
    let result = service.replace_collection(Collection::Drivers, payload);
    match result {
        Err(FleetServiceError::InvalidPayload { collection, .. }) => {
            assert_eq!(collection, "drivers")
        }
        other => panic!("expected invalid payload error, got {other:?}"),
    }

    let snapshot = store.load().expect("store loads");
    assert_eq!(snapshot.trucks.len(), 1);
    assert!(snapshot.drivers.is_empty());
}

#[test]
fn replacing_operations_derives_monthly_km_per_truck() {
    let (service, store, _) = service_with(quiet_snapshot(1, "12"));

    let payload = serde_json::to_value(vec![
        operation(1, 1, "2024-09", 50_000),
        operation(2, 1, "2024-11", 57_500),
        operation(3, 2, "2024-11", 9_000),
    ])
    .expect("payload encodes");
    service
        .replace_collection(Collection::Operations, payload)
        .expect("replace succeeds");

    let snapshot = store.load().expect("store loads");
    assert_eq!(snapshot.operations[0].monthly_km, 50_000);
    assert_eq!(snapshot.operations[1].monthly_km, 7_500);
    assert_eq!(snapshot.operations[2].monthly_km, 9_000);
}

#[test]
fn alerts_are_ranked_before_returning() {
    let mut snapshot = quiet_snapshot(1, "12");
    snapshot.trucks[0].mileage = 600_000;
    snapshot.drivers = vec![driver(1, "Pedro Soto", Some(days_from_today(-1)))];
    let (service, _, _) = service_with(snapshot);

    let alerts = service.alerts(today()).expect("alerts evaluate");
    assert_eq!(alerts.len(), 2);
    // Critical license first, informational mileage last.
    assert_eq!(
        alerts[0].message,
        "Licencia de conducir de Pedro Soto VENCIDA hace 1 días"
    );
    assert_eq!(alerts[1].subject_label, "12");
}

#[test]
fn dispatch_sends_danger_alerts_once() {
    let mut snapshot = quiet_snapshot(1, "12");
    snapshot.trucks[0].revision_tecnica = Some(days_from_today(-2));
    snapshot.trucks[0].mileage = 700_000;
    let (service, _, notifier) = service_with(snapshot);

    let sent = service
        .dispatch_notifications(today())
        .expect("dispatch succeeds");
    assert_eq!(sent, 1);
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(notifier.sent()[0].tag(), "alert-12-documento");

    // Unchanged snapshot: everything is already in the log.
    let sent = service
        .dispatch_notifications(today())
        .expect("dispatch succeeds");
    assert_eq!(sent, 0);
    assert_eq!(service.notifications().len(), 1);
}

#[test]
fn dispatch_skips_non_danger_severities() {
    let mut snapshot = quiet_snapshot(1, "12");
    snapshot.trucks[0].mileage = 700_000;
    snapshot.documents = vec![document(4, 1, "Otro", Some(days_from_today(10)))];
    let (service, _, notifier) = service_with(snapshot);

    let sent = service
        .dispatch_notifications(today())
        .expect("dispatch succeeds");
    assert_eq!(sent, 0);
    assert!(notifier.sent().is_empty());
}

#[test]
fn collection_json_round_trips_each_collection() {
    let mut snapshot = quiet_snapshot(1, "12");
    snapshot.drivers = vec![driver(1, "Pedro Soto", None)];
    let (service, _, _) = service_with(snapshot);

    for collection in Collection::all() {
        let value = service
            .collection_json(collection)
            .expect("collection encodes");
        assert!(value.is_array(), "{} should be a list", collection.name());
    }

    let drivers = service
        .collection_json(Collection::Drivers)
        .expect("drivers encode");
    assert_eq!(drivers[0]["name"], "Pedro Soto");
}
