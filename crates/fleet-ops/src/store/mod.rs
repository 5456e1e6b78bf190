//! Whole-snapshot persistence. The database is small enough that every read
//! and write moves the full entity set, which keeps collection replacement
//! atomic at the file level.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

use serde::{Deserialize, Serialize};

use crate::fleet::domain::{
    AdBlueEntry, Driver, FuelEntry, OilChange, Operation, Repair, Truck, TruckDocument,
};

/// Full in-memory read of every collection at one instant. Also the on-disk
/// layout of the database file and the backup/restore format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetSnapshot {
    pub trucks: Vec<Truck>,
    pub drivers: Vec<Driver>,
    pub documents: Vec<TruckDocument>,
    pub operations: Vec<Operation>,
    pub repairs: Vec<Repair>,
    pub fuel: Vec<FuelEntry>,
    pub adblue: Vec<AdBlueEntry>,
    pub oil: Vec<OilChange>,
}

/// Names addressable through the generic collection endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Trucks,
    Drivers,
    Documents,
    Operations,
    Repairs,
    Fuel,
    Adblue,
    Oil,
}

impl Collection {
    pub const fn all() -> [Self; 8] {
        [
            Self::Trucks,
            Self::Drivers,
            Self::Documents,
            Self::Operations,
            Self::Repairs,
            Self::Fuel,
            Self::Adblue,
            Self::Oil,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Trucks => "trucks",
            Self::Drivers => "drivers",
            Self::Documents => "documents",
            Self::Operations => "operations",
            Self::Repairs => "repairs",
            Self::Fuel => "fuel",
            Self::Adblue => "adblue",
            Self::Oil => "oil",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|collection| collection.name() == raw)
    }
}

/// Storage abstraction so the service and router can be exercised against an
/// in-memory snapshot in tests.
pub trait FleetStore: Send + Sync {
    fn load(&self) -> Result<FleetSnapshot, StoreError>;
    fn store(&self, snapshot: &FleetSnapshot) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("database file {path} is not valid JSON: {source}")]
    Malformed {
        path: String,
        source: serde_json::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}
