use crate::infra::{parse_date, InMemoryNotifier, LogNotifier};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use fleet_ops::config::AppConfig;
use fleet_ops::error::AppError;
use fleet_ops::fleet::{
    report, AlertThresholds, Driver, FleetService, FleetServiceError, FuelEntry, OilChange,
    Operation, Repair, ReviewFilter, Severity, Truck,
};
use fleet_ops::store::{FleetSnapshot, FleetStore, InMemoryStore, JsonFileStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct AlertsArgs {
    /// Database file (defaults to the configured FLEET_DB_PATH)
    #[arg(long)]
    pub(crate) db: Option<PathBuf>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Only show danger-severity alerts
    #[arg(long)]
    pub(crate) danger_only: bool,
    /// Cap the number of alerts printed
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReviewArgs {
    /// Database file (defaults to the configured FLEET_DB_PATH)
    #[arg(long)]
    pub(crate) db: Option<PathBuf>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Restrict the report to expiring or expired reviews
    #[arg(long, value_parser = parse_filter)]
    pub(crate) filter: Option<ReviewFilter>,
    /// Also write the report as CSV to this path
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn parse_filter(raw: &str) -> Result<ReviewFilter, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "all" => Ok(ReviewFilter::All),
        "expiring" => Ok(ReviewFilter::Expiring),
        "expired" => Ok(ReviewFilter::Expired),
        other => Err(format!(
            "unknown filter '{other}' (expected all, expiring, or expired)"
        )),
    }
}

fn open_store(db: Option<PathBuf>) -> Result<JsonFileStore, AppError> {
    let path = match db {
        Some(path) => path,
        None => AppConfig::load()?.store.database_path,
    };
    Ok(JsonFileStore::open(path)?)
}

pub(crate) fn run_alerts(args: AlertsArgs) -> Result<(), AppError> {
    let AlertsArgs {
        db,
        today,
        danger_only,
        limit,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let store = Arc::new(open_store(db)?);
    let service = FleetService::new(store, Arc::new(LogNotifier), AlertThresholds::default());

    let mut alerts = service.alerts(today)?;
    if danger_only {
        alerts.retain(|alert| alert.severity == Severity::Danger);
    }
    if let Some(limit) = limit {
        alerts.truncate(limit);
    }

    println!("Alertas activas al {today}: {}", alerts.len());
    if alerts.is_empty() {
        println!("No hay alertas activas");
        return Ok(());
    }
    for alert in &alerts {
        println!(
            "[{}] ({}) {}",
            alert.priority.label(),
            alert.category.label(),
            alert.message
        );
    }

    Ok(())
}

pub(crate) fn run_technical_review(args: ReviewArgs) -> Result<(), AppError> {
    let ReviewArgs {
        db,
        today,
        filter,
        csv,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let store = open_store(db)?;
    let snapshot = store.load()?;
    let entries = report::technical_review_report(&snapshot, today, filter.unwrap_or_default());

    println!("Revisión técnica al {today}: {} camiones", entries.len());
    for entry in &entries {
        let days = if entry.days_remaining < 0 {
            format!("{} días vencida", entry.days_remaining.abs())
        } else {
            format!("{} días restantes", entry.days_remaining)
        };
        println!(
            "Camión {:<6} {:<10} {}  {:<10} {}",
            entry.number, entry.plate, entry.review_date, entry.status_label, days
        );
    }

    if let Some(path) = csv {
        let body = report::technical_review_csv(&entries).map_err(FleetServiceError::from)?;
        std::fs::write(&path, body)?;
        println!("Informe CSV guardado en {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(InMemoryStore::seeded(sample_fleet(today)));
    let notifier = Arc::new(InMemoryNotifier::default());
    let service = FleetService::new(store, notifier.clone(), AlertThresholds::default());

    println!("Demostración de administración de flota — {today}");

    let summary = service.dashboard(today)?;
    println!("\nResumen");
    println!("  camiones:    {}", summary.total_trucks);
    println!("  conductores: {}", summary.total_drivers);
    println!("  alertas:     {}", summary.total_alerts);
    println!("  km del mes:  {}", summary.monthly_km);

    let alerts = service.alerts(today)?;
    println!("\nAlertas ({}):", alerts.len());
    for alert in &alerts {
        println!(
            "  [{}] ({}) {}",
            alert.priority.label(),
            alert.category.label(),
            alert.message
        );
    }

    let sent = service.dispatch_notifications(today)?;
    println!("\nNotificaciones críticas enviadas: {sent}");
    for event in notifier.events() {
        println!("  {} -> {}", event.tag(), event.message);
    }

    Ok(())
}

/// A small fleet exercising every rule: an overdue license, a close revisión
/// técnica, a stale oil change, a fuel spike, and a worn-out truck.
fn sample_fleet(today: NaiveDate) -> FleetSnapshot {
    let truck = |id: u64, number: &str, mileage: u64| Truck {
        id,
        number: number.to_string(),
        brand: "Mercedes-Benz".to_string(),
        model: "Actros".to_string(),
        year: Some(2018),
        plate: format!("PLT-{number}"),
        capacity: Some(28),
        delivery_mode: "Reparto".to_string(),
        driver_id: None,
        mileage,
        revision_tecnica: None,
        seguro_obligatorio: None,
        impuestos_municipales: None,
        created_at: None,
        updated_at: None,
    };

    let mut truck_12 = truck(1, "12", 620_000);
    truck_12.revision_tecnica = Some(today + Duration::days(4));
    let mut truck_14 = truck(2, "14", 310_000);
    truck_14.seguro_obligatorio = Some(today + Duration::days(20));

    let driver = |id: u64, name: &str, expiry: NaiveDate| Driver {
        id,
        name: name.to_string(),
        rut: String::new(),
        hire_date: None,
        license_number: format!("L-{id:04}"),
        license_expiry: Some(expiry),
        created_at: None,
        updated_at: None,
    };

    let oil = |id: u64, truck_id: u64, date: NaiveDate, km: i64| OilChange {
        id,
        truck_id,
        date: Some(date),
        cost: 180_000,
        km,
        observations: String::new(),
        has_invoice: true,
        created_at: None,
    };

    let fuel = |id: u64, truck_id: u64, date: NaiveDate, liters: f64| FuelEntry {
        id,
        truck_id,
        date: Some(date),
        liters,
        cost: 0,
        km: 0,
        has_invoice: false,
        created_at: None,
    };

    let repair = |id: u64, truck_id: u64, status: &str| Repair {
        id,
        truck_id,
        date: Some(today - Duration::days(12)),
        observations: "Frenos".to_string(),
        cost: 90_000,
        km: 0,
        status: status.to_string(),
        has_photos: false,
        created_at: None,
    };

    let current_month = today.format("%Y-%m").to_string();
    let operation = Operation {
        id: 1,
        truck_id: 1,
        month: current_month,
        products: 1_200,
        clients: 85,
        recharges: 3,
        final_km: 621_500,
        monthly_km: 4_300,
        is_replacement: false,
        total_revenue: Some(12_500_000),
        created_at: None,
    };

    FleetSnapshot {
        trucks: vec![truck_12, truck_14],
        drivers: vec![
            driver(1, "Pedro Soto", today - Duration::days(2)),
            driver(2, "Ana Rivas", today + Duration::days(25)),
        ],
        operations: vec![operation],
        repairs: vec![
            repair(1, 2, "Pendiente"),
            repair(2, 2, "Pendiente"),
            repair(3, 2, "Pendiente"),
        ],
        fuel: vec![
            fuel(1, 1, today - Duration::days(21), 38.0),
            fuel(2, 1, today - Duration::days(14), 40.0),
            fuel(3, 1, today - Duration::days(7), 39.0),
            fuel(4, 1, today - Duration::days(1), 75.0),
        ],
        oil: vec![
            oil(1, 1, today - Duration::days(200), 612_000),
            oil(2, 2, today - Duration::days(30), 305_000),
        ],
        ..FleetSnapshot::default()
    }
}
