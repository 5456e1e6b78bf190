use crate::cli::ServeArgs;
use crate::infra::{AppState, LogNotifier};
use crate::routes::with_fleet_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use fleet_ops::config::AppConfig;
use fleet_ops::error::AppError;
use fleet_ops::fleet::{AlertThresholds, FleetService};
use fleet_ops::store::JsonFileStore;
use fleet_ops::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DISPATCH_INTERVAL: Duration = Duration::from_secs(3600);

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(database) = args.db.take() {
        config.store.database_path = database;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(JsonFileStore::open(config.store.database_path.clone())?);
    let notifier = Arc::new(LogNotifier);
    let fleet_service = Arc::new(FleetService::new(
        store,
        notifier,
        AlertThresholds::default(),
    ));

    spawn_dispatch_loop(fleet_service.clone());

    let app = with_fleet_routes(fleet_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        database = %config.store.database_path.display(),
        "fleet administration service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Checks for danger alerts immediately and then once an hour, mirroring the
/// polling cadence the notification feature has always used. The service's
/// log dedups by subject and category, so an unchanged fleet sends nothing.
fn spawn_dispatch_loop<S, N>(service: Arc<FleetService<S, N>>)
where
    S: fleet_ops::store::FleetStore + 'static,
    N: fleet_ops::fleet::AlertNotifier + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(DISPATCH_INTERVAL);
        loop {
            ticker.tick().await;
            let today = Local::now().date_naive();
            match service.dispatch_notifications(today) {
                Ok(0) => {}
                Ok(sent) => info!(sent, "dispatched danger alert notifications"),
                Err(err) => warn!(error = %err, "notification dispatch failed"),
            }
        }
    });
}
