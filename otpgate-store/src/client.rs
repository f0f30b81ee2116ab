//! Client (API consumer) records.

use crate::error::{StoreError, StoreResult};
use crate::ClientRegistry;
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Shared secret a client uses to verify response signatures.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MacKey {
    bytes: Vec<u8>,
}

impl MacKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for MacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A registered API client.
#[derive(Debug, Clone)]
pub struct ClientRecord {
    pub client_id: String,
    pub mac_key: MacKey,
}

impl ClientRecord {
    pub fn new(client_id: impl Into<String>, mac_key: MacKey) -> Self {
        Self {
            client_id: client_id.into(),
            mac_key,
        }
    }
}

/// In-memory client registry.
#[derive(Default)]
pub struct MemoryClientStore {
    clients: RwLock<HashMap<String, MacKey>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client. Fails if the id is taken.
    pub fn insert_client(&self, client: &ClientRecord) -> StoreResult<()> {
        let mut clients = self
            .clients
            .write()
            .map_err(|_| StoreError::Storage("client map lock poisoned".into()))?;
        if clients.contains_key(&client.client_id) {
            return Err(StoreError::AlreadyExists(client.client_id.clone()));
        }
        clients.insert(client.client_id.clone(), client.mac_key.clone());
        Ok(())
    }
}

impl ClientRegistry for MemoryClientStore {
    fn mac_key(&self, client_id: &str) -> StoreResult<MacKey> {
        let clients = self
            .clients
            .read()
            .map_err(|_| StoreError::Storage("client map lock poisoned".into()))?;
        clients
            .get(client_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(client_id.to_string()))
    }
}
