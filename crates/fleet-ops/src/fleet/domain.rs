use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Truck master record. `number` is the stable display label used in alert
/// messages; the date fields feed the document-expiry rules directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    pub id: u64,
    pub number: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub delivery_mode: String,
    #[serde(default)]
    pub driver_id: Option<u64>,
    #[serde(default)]
    pub mileage: u64,
    #[serde(default, deserialize_with = "lenient_date")]
    pub revision_tecnica: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub seguro_obligatorio: Option<NaiveDate>,
    /// Recorded for completeness; no alert rule reads it.
    #[serde(default, deserialize_with = "lenient_date")]
    pub impuestos_municipales: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub rut: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub hire_date: Option<NaiveDate>,
    #[serde(default)]
    pub license_number: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub license_expiry: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Per-truck document tracked independently of the truck's own built-in date
/// fields. Both sources are alerted on; they are intentionally not merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckDocument {
    pub id: u64,
    pub truck_id: u64,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    /// The upload itself is simulated; only the fact that a file was attached
    /// survives.
    #[serde(default)]
    pub has_file: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repair {
    pub id: u64,
    pub truck_id: u64,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub km: i64,
    /// Free text; only the literal value "Pendiente" counts as outstanding.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub has_photos: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEntry {
    pub id: u64,
    pub truck_id: u64,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub liters: f64,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub km: i64,
    #[serde(default)]
    pub has_invoice: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Same shape as [`FuelEntry`]; tracked separately for cost reporting and
/// never alerted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdBlueEntry {
    pub id: u64,
    pub truck_id: u64,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub liters: f64,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub km: i64,
    #[serde(default)]
    pub has_invoice: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OilChange {
    pub id: u64,
    pub truck_id: u64,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub cost: i64,
    /// Odometer reading at change time.
    #[serde(default)]
    pub km: i64,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub has_invoice: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Monthly operating record. `month` is a zero-padded `YYYY-MM` string and is
/// compared lexicographically; `monthly_km` is derived from the previous
/// month's closing odometer on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: u64,
    pub truck_id: u64,
    pub month: String,
    #[serde(default)]
    pub products: u32,
    #[serde(default)]
    pub clients: u32,
    #[serde(default)]
    pub recharges: u32,
    #[serde(default)]
    pub final_km: i64,
    #[serde(default)]
    pub monthly_km: i64,
    #[serde(default)]
    pub is_replacement: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// UI styling class of an alert, independent of its priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Danger,
    Warning,
    Info,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Danger => "Peligro",
            Self::Warning => "Advertencia",
            Self::Info => "Información",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Documento,
    Mantenimiento,
    Reparacion,
    Combustible,
    Kilometraje,
    Licencia,
}

impl AlertCategory {
    /// Wire token, also used as the notification dedup tag component.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Documento => "documento",
            Self::Mantenimiento => "mantenimiento",
            Self::Reparacion => "reparacion",
            Self::Combustible => "combustible",
            Self::Kilometraje => "kilometraje",
            Self::Licencia => "licencia",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Documento => "Documento",
            Self::Mantenimiento => "Mantenimiento",
            Self::Reparacion => "Reparación",
            Self::Combustible => "Combustible",
            Self::Kilometraje => "Kilometraje",
            Self::Licencia => "Licencia",
        }
    }
}

/// Ordering class for alerts. Foreign values fall back to `Low` so a ranked
/// list degrades instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    #[serde(other)]
    Low,
}

impl Priority {
    pub const fn weight(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Crítica",
            Self::High => "Alta",
            Self::Medium => "Media",
            Self::Low => "Baja",
        }
    }
}

/// Lenient deserializer for optional `YYYY-MM-DD` fields: empty strings,
/// nulls, and unparseable values all become `None` so one bad record cannot
/// abort a snapshot load.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_lenient_date))
}

fn parse_lenient_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Tolerate full timestamps by reading only the date prefix.
    let candidate = trimmed.get(..10).unwrap_or(trimmed);
    match NaiveDate::parse_from_str(candidate, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!(value = trimmed, "skipping unparseable date");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_date_accepts_plain_and_timestamped_values() {
        assert_eq!(
            parse_lenient_date("2025-03-14"),
            NaiveDate::from_ymd_opt(2025, 3, 14)
        );
        assert_eq!(
            parse_lenient_date("2025-03-14T10:00:00Z"),
            NaiveDate::from_ymd_opt(2025, 3, 14)
        );
    }

    #[test]
    fn lenient_date_turns_garbage_into_none() {
        assert_eq!(parse_lenient_date(""), None);
        assert_eq!(parse_lenient_date("   "), None);
        assert_eq!(parse_lenient_date("pronto"), None);
        assert_eq!(parse_lenient_date("14/03/2025"), None);
    }

    #[test]
    fn unknown_priority_deserializes_as_low() {
        let priority: Priority = serde_json::from_str("\"urgent\"").expect("fallback variant");
        assert_eq!(priority, Priority::Low);
    }

    #[test]
    fn truck_round_trips_camel_case_fields() {
        let raw = r#"{
            "id": 7,
            "number": "12",
            "plate": "ABCD-12",
            "mileage": 250000,
            "revisionTecnica": "2026-01-31",
            "seguroObligatorio": "",
            "impuestosMunicipales": "no-aplica"
        }"#;
        let truck: Truck = serde_json::from_str(raw).expect("truck deserializes");
        assert_eq!(truck.number, "12");
        assert_eq!(
            truck.revision_tecnica,
            NaiveDate::from_ymd_opt(2026, 1, 31)
        );
        assert_eq!(truck.seguro_obligatorio, None);
        assert_eq!(truck.impuestos_municipales, None);

        let value = serde_json::to_value(&truck).expect("truck serializes");
        assert_eq!(value["revisionTecnica"], "2026-01-31");
    }
}
