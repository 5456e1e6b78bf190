use chrono::NaiveDate;

use crate::fleet::domain::{
    Driver, FuelEntry, OilChange, Operation, Repair, Truck, TruckDocument,
};
use crate::store::FleetSnapshot;

/// Fixed reference date so every rule boundary is expressed as an offset.
pub(crate) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid reference date")
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn days_from_today(offset: i64) -> NaiveDate {
    today() + chrono::Duration::days(offset)
}

pub(crate) fn truck(id: u64, number: &str) -> Truck {
    Truck {
        id,
        number: number.to_string(),
        brand: String::new(),
        model: String::new(),
        year: None,
        plate: format!("PLT-{number}"),
        capacity: None,
        delivery_mode: String::new(),
        driver_id: None,
        mileage: 0,
        revision_tecnica: None,
        seguro_obligatorio: None,
        impuestos_municipales: None,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn driver(id: u64, name: &str, license_expiry: Option<NaiveDate>) -> Driver {
    Driver {
        id,
        name: name.to_string(),
        rut: String::new(),
        hire_date: None,
        license_number: String::new(),
        license_expiry,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn document(
    id: u64,
    truck_id: u64,
    doc_type: &str,
    expiry_date: Option<NaiveDate>,
) -> TruckDocument {
    TruckDocument {
        id,
        truck_id,
        doc_type: doc_type.to_string(),
        expiry_date,
        notes: String::new(),
        has_file: false,
        upload_date: None,
    }
}

pub(crate) fn repair(id: u64, truck_id: u64, status: &str) -> Repair {
    Repair {
        id,
        truck_id,
        date: Some(today()),
        observations: String::new(),
        cost: 0,
        km: 0,
        status: status.to_string(),
        has_photos: false,
        created_at: None,
    }
}

pub(crate) fn fuel_entry(id: u64, truck_id: u64, date: NaiveDate, liters: f64) -> FuelEntry {
    FuelEntry {
        id,
        truck_id,
        date: Some(date),
        liters,
        cost: 0,
        km: 0,
        has_invoice: false,
        created_at: None,
    }
}

pub(crate) fn oil_change(id: u64, truck_id: u64, date: NaiveDate, km: i64) -> OilChange {
    OilChange {
        id,
        truck_id,
        date: Some(date),
        cost: 0,
        km,
        observations: String::new(),
        has_invoice: false,
        created_at: None,
    }
}

pub(crate) fn operation(id: u64, truck_id: u64, month: &str, final_km: i64) -> Operation {
    Operation {
        id,
        truck_id,
        month: month.to_string(),
        products: 0,
        clients: 0,
        recharges: 0,
        final_km,
        monthly_km: 0,
        is_replacement: false,
        total_revenue: None,
        created_at: None,
    }
}

/// A snapshot with one truck that has a recent oil change, so only the rule
/// under test fires.
pub(crate) fn quiet_snapshot(truck_id: u64, number: &str) -> FleetSnapshot {
    FleetSnapshot {
        trucks: vec![truck(truck_id, number)],
        oil: vec![oil_change(1, truck_id, today(), 0)],
        ..FleetSnapshot::default()
    }
}
