//! Per-device state the gate validates against.

use crate::token::INTERNAL_ID_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Composite replay clock of a device.
///
/// Ordering is lexicographic: the session counter dominates and the usage
/// counter breaks ties within a session. Field order matters for the
/// derived `Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Counters {
    /// Incremented each time the device is powered up.
    pub session: u16,
    /// Incremented for each token generated within a session.
    pub usage: u8,
}

impl Counters {
    #[must_use]
    pub const fn new(session: u16, usage: u8) -> Self {
        Self { session, usage }
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.session, self.usage)
    }
}

/// State to commit after an accepted validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    pub counters: Counters,
    /// The token's 24-bit timestamp, kept for audit.
    pub timestamp: u32,
}

/// A device's AES key, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: Vec<u8>,
}

impl SecretKey {
    /// Wraps raw key bytes. The length is checked by the cipher, not here,
    /// so a corrupt stored key surfaces as a fault at validation time.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// One enrolled device.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    /// Modhex prefix of every token from this device.
    pub public_id: String,
    pub secret_key: SecretKey,
    /// Identifier sealed inside every token; proves the right key was used.
    pub internal_id: [u8; INTERNAL_ID_SIZE],
    /// Counters of the last accepted token.
    pub counters: Counters,
    /// Timestamp of the last accepted token.
    pub last_timestamp: u32,
    /// Disabled devices reject every token.
    pub active: bool,
}

impl DeviceRecord {
    /// A freshly enrolled, active device with zeroed counters.
    pub fn new(
        public_id: impl Into<String>,
        secret_key: SecretKey,
        internal_id: [u8; INTERNAL_ID_SIZE],
    ) -> Self {
        Self {
            public_id: public_id.into(),
            secret_key,
            internal_id,
            counters: Counters::default(),
            last_timestamp: 0,
            active: true,
        }
    }

    /// Applies an accepted advance to this record.
    pub fn apply(&mut self, advance: &Advance) {
        self.counters = advance.counters;
        self.last_timestamp = advance.timestamp;
    }
}
