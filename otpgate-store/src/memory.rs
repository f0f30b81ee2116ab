//! In-memory key registry.

use crate::error::{StoreError, StoreResult};
use crate::KeyRegistry;
use otpgate_core::{Advance, DeviceRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

/// Devices held in process memory.
///
/// The outer map lock is only held long enough to find a device; each device
/// has its own mutex, so advances for different devices never wait on each
/// other.
#[derive(Default)]
pub struct MemoryKeyStore {
    devices: RwLock<HashMap<String, Arc<Mutex<DeviceRecord>>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device. Fails if the public id is taken.
    pub fn insert_device(&self, record: &DeviceRecord) -> StoreResult<()> {
        let mut devices = self
            .devices
            .write()
            .map_err(|_| StoreError::Storage("device map lock poisoned".into()))?;
        if devices.contains_key(&record.public_id) {
            return Err(StoreError::AlreadyExists(record.public_id.clone()));
        }
        devices.insert(record.public_id.clone(), Arc::new(Mutex::new(record.clone())));
        Ok(())
    }

    /// Enables or disables a device.
    pub fn set_active(&self, public_id: &str, active: bool) -> StoreResult<()> {
        let slot = self.slot(public_id)?;
        let mut record = slot
            .lock()
            .map_err(|_| StoreError::Storage(format!("device lock poisoned: {public_id}")))?;
        record.active = active;
        Ok(())
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, public_id: &str) -> StoreResult<Arc<Mutex<DeviceRecord>>> {
        let devices = self
            .devices
            .read()
            .map_err(|_| StoreError::Storage("device map lock poisoned".into()))?;
        devices
            .get(public_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(public_id.to_string()))
    }
}

impl KeyRegistry for MemoryKeyStore {
    fn lookup(&self, public_id: &str) -> StoreResult<DeviceRecord> {
        let slot = self.slot(public_id)?;
        let record = slot
            .lock()
            .map_err(|_| StoreError::Storage(format!("device lock poisoned: {public_id}")))?;
        Ok(record.clone())
    }

    fn compare_and_advance(&self, public_id: &str, advance: &Advance) -> StoreResult<()> {
        let slot = self.slot(public_id)?;
        let mut record = slot
            .lock()
            .map_err(|_| StoreError::Storage(format!("device lock poisoned: {public_id}")))?;

        if !record.active {
            debug!("Advance for disabled device {}", public_id);
            return Err(StoreError::Disabled(public_id.to_string()));
        }

        if advance.counters <= record.counters {
            debug!(
                "Stale advance for {}: proposed {} but stored {}",
                public_id, advance.counters, record.counters
            );
            return Err(StoreError::StaleUpdate(public_id.to_string()));
        }

        record.apply(advance);
        Ok(())
    }
}
