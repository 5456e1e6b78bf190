use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::util::ServiceExt;

use super::common::*;
use crate::fleet::alerts::AlertThresholds;
use crate::fleet::notifications::{AlertNotifier, FleetNotification, NotifyError};
use crate::fleet::router::fleet_router;
use crate::fleet::service::FleetService;
use crate::store::{FleetSnapshot, InMemoryStore};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<FleetNotification>>,
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

fn router_with(snapshot: FleetSnapshot) -> axum::Router {
    let store = Arc::new(InMemoryStore::seeded(snapshot));
    let notifier = Arc::new(RecordingNotifier::default());
    let service = Arc::new(FleetService::new(
        store,
        notifier,
        AlertThresholds::default(),
    ));
    fleet_router(service)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}

#[tokio::test]
async fn collection_endpoint_serves_trucks() {
    let router = router_with(quiet_snapshot(1, "12"));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/data/trucks")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["number"], "12");
}

#[tokio::test]
async fn unknown_collection_is_not_found() {
    let router = router_with(FleetSnapshot::default());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/data/settings")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Collection not found");
}

#[tokio::test]
async fn replace_rejects_malformed_payload() {
    let router = router_with(quiet_snapshot(1, "12"));

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/data/trucks")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"[{"id": "not-a-number"}]"#))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // The stored snapshot is untouched.
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/data/trucks")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let body = body_json(response).await;
    assert_eq!(body[0]["number"], "12");
}

#[tokio::test]
async fn replace_operations_recomputes_monthly_km() {
    let router = router_with(quiet_snapshot(1, "12"));

    let payload = serde_json::json!([
        { "id": 1, "truckId": 1, "month": "2024-09", "finalKm": 50000 },
        { "id": 2, "truckId": 1, "month": "2024-10", "finalKm": 54000 }
    ]);
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/data/operations")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["records"], 2);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/data/operations")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let body = body_json(response).await;
    assert_eq!(body[0]["monthlyKm"], 50000);
    assert_eq!(body[1]["monthlyKm"], 4000);
}

#[tokio::test]
async fn replace_operations_rejects_unpadded_months() {
    let router = router_with(FleetSnapshot::default());

    let payload = serde_json::json!([
        { "id": 1, "truckId": 1, "month": "2024-9", "finalKm": 50000 }
    ]);
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/data/operations")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("zero-padded"));
}

#[tokio::test]
async fn alerts_endpoint_supports_danger_only_and_limit() {
    let mut snapshot = quiet_snapshot(1, "12");
    snapshot.trucks[0].revision_tecnica = Some(days_from_today(2));
    snapshot.documents = vec![document(7, 1, "Otro", Some(days_from_today(10)))];

    let router = router_with(snapshot);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/fleet/alerts?today=2025-06-15&danger_only=true&limit=1")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let alerts = body["alerts"].as_array().expect("alerts array");
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["severity"], "danger");
    assert_eq!(alerts[0]["priority"], "high");
}

#[tokio::test]
async fn technical_review_endpoint_renders_csv() {
    let mut snapshot = quiet_snapshot(1, "07");
    snapshot.trucks[0].revision_tecnica = Some(days_from_today(3));

    let router = router_with(snapshot);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/fleet/reports/technical-review?today=2025-06-15&format=csv")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let rendered = String::from_utf8(bytes.to_vec()).expect("utf8 csv");
    assert!(rendered.starts_with("Camión,Patente"));
}

#[tokio::test]
async fn dispatch_endpoint_sends_then_dedups() {
    let mut snapshot = quiet_snapshot(1, "12");
    snapshot.trucks[0].revision_tecnica = Some(days_from_today(-2));

    let router = router_with(snapshot);
    let dispatch = |router: axum::Router| async move {
        router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/fleet/notifications/dispatch?today=2025-06-15")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds")
    };

    let body = body_json(dispatch(router.clone()).await).await;
    assert_eq!(body["sent"], 1);

    let body = body_json(dispatch(router.clone()).await).await;
    assert_eq!(body["sent"], 0);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/fleet/notifications")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let body = body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["category"], "documento");
}
