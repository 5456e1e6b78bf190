use chrono::{Datelike, NaiveDate};

use super::config::AlertThresholds;
use super::Alert;
use crate::fleet::domain::{
    AlertCategory, Driver, FuelEntry, OilChange, Operation, Priority, Repair, Severity, Truck,
    TruckDocument,
};

/// Rule (a): every tracked document of the truck, independently of the
/// truck's own built-in date fields.
pub(super) fn document_expiry(
    truck: &Truck,
    documents: &[TruckDocument],
    today: NaiveDate,
    thresholds: &AlertThresholds,
    out: &mut Vec<Alert>,
) {
    for document in documents.iter().filter(|doc| doc.truck_id == truck.id) {
        let Some(expiry) = document.expiry_date else {
            continue;
        };
        let days = days_until(today, expiry);

        let (severity, priority, message) = if days < 0 {
            (
                Severity::Danger,
                Priority::Critical,
                format!(
                    "{} del camión {} VENCIDO hace {} días",
                    document.doc_type,
                    truck.number,
                    days.abs()
                ),
            )
        } else if days <= thresholds.document_danger_days {
            (
                Severity::Danger,
                Priority::High,
                format!(
                    "{} del camión {} vence en {} días",
                    document.doc_type, truck.number, days
                ),
            )
        } else if days <= thresholds.document_warning_days {
            (
                Severity::Warning,
                Priority::Medium,
                format!(
                    "{} del camión {} vence en {} días",
                    document.doc_type, truck.number, days
                ),
            )
        } else {
            continue;
        };

        out.push(Alert {
            severity,
            category: AlertCategory::Documento,
            priority,
            subject_label: truck.number.clone(),
            message,
            document_id: Some(document.id),
            driver_id: None,
        });
    }
}

/// Rule (b): the truck's own revisión técnica and seguro obligatorio dates.
/// These fire in addition to any overlapping tracked document; the two
/// sources are intentionally not merged. `impuestos_municipales` is stored
/// but has no rule.
pub(super) fn builtin_document_expiry(
    truck: &Truck,
    today: NaiveDate,
    thresholds: &AlertThresholds,
    out: &mut Vec<Alert>,
) {
    builtin_date_field(
        truck,
        truck.revision_tecnica,
        "Revisión Técnica",
        "VENCIDA",
        today,
        thresholds,
        out,
    );
    builtin_date_field(
        truck,
        truck.seguro_obligatorio,
        "Seguro Obligatorio",
        "VENCIDO",
        today,
        thresholds,
        out,
    );
}

#[allow(clippy::too_many_arguments)]
fn builtin_date_field(
    truck: &Truck,
    field: Option<NaiveDate>,
    label: &str,
    expired_word: &str,
    today: NaiveDate,
    thresholds: &AlertThresholds,
    out: &mut Vec<Alert>,
) {
    let Some(expiry) = field else {
        return;
    };
    let days = days_until(today, expiry);

    if days < 0 {
        out.push(Alert {
            severity: Severity::Danger,
            category: AlertCategory::Documento,
            priority: Priority::Critical,
            subject_label: truck.number.clone(),
            message: format!(
                "{} del camión {} {} hace {} días",
                label,
                truck.number,
                expired_word,
                days.abs()
            ),
            document_id: None,
            driver_id: None,
        });
    } else if days <= thresholds.document_warning_days {
        let urgent = days <= thresholds.document_danger_days;
        out.push(Alert {
            severity: if urgent {
                Severity::Danger
            } else {
                Severity::Warning
            },
            category: AlertCategory::Documento,
            priority: if urgent {
                Priority::High
            } else {
                Priority::Medium
            },
            subject_label: truck.number.clone(),
            message: format!(
                "{} del camión {} vence en {} días",
                label, truck.number, days
            ),
            document_id: None,
            driver_id: None,
        });
    }
}

/// Rule (c): repairs whose status is the literal "Pendiente".
pub(super) fn pending_repairs(
    truck: &Truck,
    repairs: &[Repair],
    thresholds: &AlertThresholds,
    out: &mut Vec<Alert>,
) {
    let pending = repairs
        .iter()
        .filter(|repair| repair.truck_id == truck.id && repair.status == "Pendiente")
        .count();

    if pending == 0 {
        return;
    }

    let urgent = pending > thresholds.pending_repairs_danger;
    out.push(Alert {
        severity: if urgent {
            Severity::Danger
        } else {
            Severity::Warning
        },
        category: AlertCategory::Reparacion,
        priority: if urgent {
            Priority::High
        } else {
            Priority::Medium
        },
        subject_label: truck.number.clone(),
        message: format!(
            "Camión {}: {} reparación(es) pendiente(s)",
            truck.number, pending
        ),
        document_id: None,
        driver_id: None,
    });
}

/// Rule (d): oil change due by elapsed calendar months or by kilometers run
/// since the last change. The current odometer comes from the latest
/// operation month (lexicographic `YYYY-MM` order).
pub(super) fn oil_change_due(
    truck: &Truck,
    oil: &[OilChange],
    operations: &[Operation],
    today: NaiveDate,
    thresholds: &AlertThresholds,
    out: &mut Vec<Alert>,
) {
    let last_change = oil
        .iter()
        .filter(|change| change.truck_id == truck.id)
        .filter_map(|change| change.date.map(|date| (date, change)))
        .max_by_key(|(date, _)| *date);

    let Some((change_date, last_change)) = last_change else {
        out.push(Alert {
            severity: Severity::Danger,
            category: AlertCategory::Mantenimiento,
            priority: Priority::Critical,
            subject_label: truck.number.clone(),
            message: format!(
                "Camión {}: No hay registro de cambio de aceite - Revisar mantenimiento",
                truck.number
            ),
            document_id: None,
            driver_id: None,
        });
        return;
    };

    let months_since = months_between(change_date, today);
    let km_since = operations
        .iter()
        .filter(|operation| operation.truck_id == truck.id)
        .max_by(|a, b| a.month.cmp(&b.month))
        .map(|operation| (operation.final_km - last_change.km).max(0))
        .unwrap_or(0);

    let due_by_time = months_since >= thresholds.oil_months_due;
    let due_by_km = km_since >= thresholds.oil_km_due;
    let near_by_time = months_since >= thresholds.oil_months_warning;
    let near_by_km = km_since >= thresholds.oil_km_warning;

    if due_by_time || due_by_km {
        out.push(Alert {
            severity: Severity::Danger,
            category: AlertCategory::Mantenimiento,
            priority: Priority::High,
            subject_label: truck.number.clone(),
            message: format!(
                "Camión {} necesita cambio de aceite URGENTE ({} desde último cambio)",
                truck.number,
                oil_reason(due_by_time, due_by_km, months_since, km_since)
            ),
            document_id: None,
            driver_id: None,
        });
    } else if near_by_time || near_by_km {
        out.push(Alert {
            severity: Severity::Warning,
            category: AlertCategory::Mantenimiento,
            priority: Priority::Medium,
            subject_label: truck.number.clone(),
            message: format!(
                "Camión {} se acerca al cambio de aceite ({} desde último cambio)",
                truck.number,
                oil_reason(near_by_time, near_by_km, months_since, km_since)
            ),
            document_id: None,
            driver_id: None,
        });
    }
}

fn oil_reason(by_time: bool, by_km: bool, months: i64, km: i64) -> String {
    match (by_time, by_km) {
        (true, true) => format!("{} meses y {} km", months, format_thousands(km)),
        (true, false) => format!("{} meses", months),
        _ => format!("{} km", format_thousands(km)),
    }
}

/// Rule (e): the newest fill-up well above the average of the three most
/// recent ones.
pub(super) fn fuel_consumption(
    truck: &Truck,
    fuel: &[FuelEntry],
    thresholds: &AlertThresholds,
    out: &mut Vec<Alert>,
) {
    let mut entries: Vec<&FuelEntry> = fuel
        .iter()
        .filter(|entry| entry.truck_id == truck.id && entry.date.is_some())
        .collect();
    if entries.len() < 3 {
        return;
    }
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    let recent = &entries[..3];
    let average = recent.iter().map(|entry| entry.liters).sum::<f64>() / 3.0;
    let newest = recent[0].liters;

    if newest > average * thresholds.fuel_spike_ratio {
        out.push(Alert {
            severity: Severity::Warning,
            category: AlertCategory::Combustible,
            priority: Priority::Medium,
            subject_label: truck.number.clone(),
            message: format!(
                "Camión {}: Consumo de combustible {:.0}% superior al promedio",
                truck.number,
                (thresholds.fuel_spike_ratio - 1.0) * 100.0
            ),
            document_id: None,
            driver_id: None,
        });
    }
}

/// Rule (f): informational flag for trucks past the renewal mileage.
pub(super) fn high_mileage(truck: &Truck, thresholds: &AlertThresholds, out: &mut Vec<Alert>) {
    if truck.mileage > thresholds.high_mileage_km {
        out.push(Alert {
            severity: Severity::Info,
            category: AlertCategory::Kilometraje,
            priority: Priority::Low,
            subject_label: truck.number.clone(),
            message: format!(
                "Camión {}: Alto kilometraje ({} km) - Considerar renovación",
                truck.number,
                format_thousands(truck.mileage as i64)
            ),
            document_id: None,
            driver_id: None,
        });
    }
}

/// Rule (g): driver license expiry, independent of the truck loop.
pub(super) fn license_expiry(
    drivers: &[Driver],
    today: NaiveDate,
    thresholds: &AlertThresholds,
    out: &mut Vec<Alert>,
) {
    for driver in drivers {
        let Some(expiry) = driver.license_expiry else {
            continue;
        };
        let days = days_until(today, expiry);

        let (severity, priority, message) = if days < 0 {
            (
                Severity::Danger,
                Priority::Critical,
                format!(
                    "Licencia de conducir de {} VENCIDA hace {} días",
                    driver.name,
                    days.abs()
                ),
            )
        } else if days <= thresholds.license_danger_days {
            (
                Severity::Danger,
                Priority::High,
                format!(
                    "Licencia de conducir de {} vence en {} días",
                    driver.name, days
                ),
            )
        } else if days <= thresholds.license_warning_days {
            (
                Severity::Warning,
                Priority::Medium,
                format!(
                    "Licencia de conducir de {} vence en {} días",
                    driver.name, days
                ),
            )
        } else {
            continue;
        };

        out.push(Alert {
            severity,
            category: AlertCategory::Licencia,
            priority,
            subject_label: driver.name.clone(),
            message,
            document_id: None,
            driver_id: Some(driver.id),
        });
    }
}

/// Whole calendar days from `today` to `date`; both are midnight-truncated,
/// so an expiry later today counts as 0, never negative.
fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Calendar-month difference ignoring the day of month.
fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() - from.year()) as i64 * 12 + (to.month() as i64 - from.month() as i64)
}

/// es-CL style thousands grouping, e.g. 12345 -> "12.345".
fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
