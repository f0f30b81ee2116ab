//! Device and client registries for otpgate.
//!
//! The key registry is the only component that mutates durable state. All
//! counter writes go through [`KeyRegistry::compare_and_advance`], which
//! re-checks the ordering invariant at commit time, so two requests racing
//! with the same token cannot both be accepted.
//!
//! # Implementations
//!
//! - [`MemoryKeyStore`] / [`MemoryClientStore`]: in-process maps, one lock
//!   per device
//! - [`SqliteKeyStore`]: a single SQLite file holding both devices and
//!   clients

mod client;
mod error;
mod memory;
mod sqlite;

pub use client::{ClientRecord, MacKey, MemoryClientStore};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryKeyStore;
pub use sqlite::SqliteKeyStore;

use otpgate_core::{Advance, DeviceRecord};

/// Persistent per-device secrets and replay counters.
pub trait KeyRegistry: Send + Sync {
    /// Fetches a snapshot of the device with this public id.
    fn lookup(&self, public_id: &str) -> StoreResult<DeviceRecord>;

    /// Writes `advance` if and only if the device is still active and its
    /// counters are strictly greater than the stored ones at the moment of
    /// the write.
    ///
    /// Fails with [`StoreError::Disabled`] when the device was disabled after
    /// the lookup, and with [`StoreError::StaleUpdate`] when another advance
    /// got there first. Linearizable per public id.
    fn compare_and_advance(&self, public_id: &str, advance: &Advance) -> StoreResult<()>;
}

/// Resolves client identifiers to the keys their responses are signed with.
pub trait ClientRegistry: Send + Sync {
    fn mac_key(&self, client_id: &str) -> StoreResult<MacKey>;
}
