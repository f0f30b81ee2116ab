//! SQLite-backed registry for devices and clients.
//!
//! Counter advances are a single conditional `UPDATE`, so the ordering check
//! and the write are one atomic step even if several processes share the
//! database file.

use crate::client::{ClientRecord, MacKey};
use crate::error::{StoreError, StoreResult};
use crate::{ClientRegistry, KeyRegistry};
use otpgate_core::{Advance, Counters, DeviceRecord, SecretKey};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Persistent store for devices and clients backed by SQLite.
#[derive(Clone)]
pub struct SqliteKeyStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS devices (
                public_id TEXT PRIMARY KEY,
                secret_key BLOB NOT NULL,
                internal_id BLOB NOT NULL,
                session_counter INTEGER NOT NULL DEFAULT 0,
                usage_counter INTEGER NOT NULL DEFAULT 0,
                last_timestamp INTEGER NOT NULL DEFAULT 0,
                active INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS clients (
                client_id TEXT PRIMARY KEY,
                mac_key BLOB NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Storage("connection lock poisoned".into()))
    }

    // ── Devices ──────────────────────────────────────────────────

    /// Registers a device. Fails if the public id is taken.
    pub fn insert_device(&self, record: &DeviceRecord) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO devices (public_id, secret_key, internal_id, session_counter, usage_counter, last_timestamp, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.public_id,
                record.secret_key.as_bytes(),
                record.internal_id.as_slice(),
                record.counters.session,
                record.counters.usage,
                record.last_timestamp,
                record.active,
            ],
        )
        .map_err(|e| map_conflict(e, &record.public_id))?;
        Ok(())
    }

    /// Enables or disables a device.
    pub fn set_active(&self, public_id: &str, active: bool) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE devices SET active = ?2 WHERE public_id = ?1",
            params![public_id, active],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(public_id.to_string()));
        }
        Ok(())
    }

    // ── Clients ──────────────────────────────────────────────────

    /// Registers a client. Fails if the id is taken.
    pub fn insert_client(&self, client: &ClientRecord) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO clients (client_id, mac_key) VALUES (?1, ?2)",
            params![client.client_id, client.mac_key.as_bytes()],
        )
        .map_err(|e| map_conflict(e, &client.client_id))?;
        Ok(())
    }
}

impl KeyRegistry for SqliteKeyStore {
    fn lookup(&self, public_id: &str) -> StoreResult<DeviceRecord> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT secret_key, internal_id, session_counter, usage_counter, last_timestamp, active
                 FROM devices WHERE public_id = ?1",
                params![public_id],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, u16>(2)?,
                        row.get::<_, u8>(3)?,
                        row.get::<_, u32>(4)?,
                        row.get::<_, bool>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((secret_key, internal_id, session, usage, last_timestamp, active)) = row else {
            return Err(StoreError::NotFound(public_id.to_string()));
        };

        let internal_id: [u8; 6] = internal_id.as_slice().try_into().map_err(|_| {
            StoreError::InvalidData(format!(
                "internal id of {public_id} has {} bytes",
                internal_id.len()
            ))
        })?;

        Ok(DeviceRecord {
            public_id: public_id.to_string(),
            secret_key: SecretKey::from_bytes(secret_key),
            internal_id,
            counters: Counters::new(session, usage),
            last_timestamp,
            active,
        })
    }

    fn compare_and_advance(&self, public_id: &str, advance: &Advance) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE devices
             SET session_counter = ?2, usage_counter = ?3, last_timestamp = ?4
             WHERE public_id = ?1
               AND active = 1
               AND (session_counter < ?2 OR (session_counter = ?2 AND usage_counter < ?3))",
            params![
                public_id,
                advance.counters.session,
                advance.counters.usage,
                advance.timestamp,
            ],
        )?;
        if changed == 1 {
            return Ok(());
        }

        let active: Option<bool> = conn
            .query_row(
                "SELECT active FROM devices WHERE public_id = ?1",
                params![public_id],
                |row| row.get(0),
            )
            .optional()?;
        match active {
            Some(true) => {
                debug!("Stale advance for {} to {}", public_id, advance.counters);
                Err(StoreError::StaleUpdate(public_id.to_string()))
            }
            Some(false) => {
                debug!("Advance for disabled device {}", public_id);
                Err(StoreError::Disabled(public_id.to_string()))
            }
            None => Err(StoreError::NotFound(public_id.to_string())),
        }
    }
}

impl ClientRegistry for SqliteKeyStore {
    fn mac_key(&self, client_id: &str) -> StoreResult<MacKey> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT mac_key FROM clients WHERE client_id = ?1",
            params![client_id],
            |row| row.get::<_, Vec<u8>>(0),
        )
        .optional()?
        .map(MacKey::from_bytes)
        .ok_or_else(|| StoreError::NotFound(client_id.to_string()))
    }
}

fn map_conflict(err: rusqlite::Error, id: &str) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::AlreadyExists(id.to_string())
        }
        other => StoreError::Database(other),
    }
}
