//! Shared fixtures for server tests.

#![allow(dead_code)]

use std::sync::Arc;

use otpgate_core::{Counters, DecodedToken, DeviceRecord, SecretKey};
use otpgate_server::{AppState, ServerConfig, build_router};
use otpgate_store::{ClientRecord, MacKey, MemoryClientStore, MemoryKeyStore};

pub const PUBLIC_ID: &str = "vvccccbbcccc";
pub const DEVICE_KEY: [u8; 16] = [
    0xec, 0xde, 0x18, 0xdb, 0xe7, 0x6f, 0xbd, 0x0c, 0x33, 0x33, 0x0f, 0x1c, 0x35, 0x48, 0x71, 0xdb,
];
pub const INTERNAL_ID: [u8; 6] = [0x87, 0x92, 0xeb, 0xfe, 0x26, 0xcc];
pub const CLIENT_ID: &str = "1";
pub const CLIENT_KEY: &[u8] = b"client-shared-secret";

/// Renders the token a device would emit at the given counters.
pub fn token(session: u16, usage: u8) -> String {
    DecodedToken::new(INTERNAL_ID, Counters::new(session, usage), 0x00_0a0b, 0x5150)
        .seal(PUBLIC_ID, &DEVICE_KEY)
        .unwrap()
}

/// Stores with one enrolled device at counters (0, 0) and one client.
pub fn stores() -> (Arc<MemoryKeyStore>, Arc<MemoryClientStore>) {
    let devices = MemoryKeyStore::new();
    devices
        .insert_device(&DeviceRecord::new(
            PUBLIC_ID,
            SecretKey::from_bytes(DEVICE_KEY),
            INTERNAL_ID,
        ))
        .unwrap();

    let clients = MemoryClientStore::new();
    clients
        .insert_client(&ClientRecord::new(CLIENT_ID, MacKey::from_bytes(CLIENT_KEY.to_vec())))
        .unwrap();

    (Arc::new(devices), Arc::new(clients))
}

pub fn app_state(
    devices: Arc<MemoryKeyStore>,
    clients: Arc<MemoryClientStore>,
    config: ServerConfig,
) -> Arc<AppState> {
    Arc::new(AppState {
        devices,
        clients,
        config,
    })
}

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
pub async fn spawn_test_server(state: Arc<AppState>) -> String {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

/// Splits a response body into its `key=value` lines.
pub fn parse_body(body: &str) -> Vec<(String, String)> {
    body.lines()
        .map(|line| {
            let (k, v) = line.split_once('=').unwrap();
            (k.to_string(), v.to_string())
        })
        .collect()
}
