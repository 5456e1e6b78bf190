use std::sync::Mutex;

use super::{FleetSnapshot, FleetStore, StoreError};

/// Mutex-held snapshot for tests, demos, and ephemeral runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    snapshot: Mutex<FleetSnapshot>,
}

impl InMemoryStore {
    pub fn seeded(snapshot: FleetSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }
}

impl FleetStore for InMemoryStore {
    fn load(&self) -> Result<FleetSnapshot, StoreError> {
        let guard = self.snapshot.lock().expect("snapshot mutex poisoned");
        Ok(guard.clone())
    }

    fn store(&self, snapshot: &FleetSnapshot) -> Result<(), StoreError> {
        let mut guard = self.snapshot.lock().expect("snapshot mutex poisoned");
        *guard = snapshot.clone();
        Ok(())
    }
}
