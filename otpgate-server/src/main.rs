//! otpgate verification server
//!
//! Validates hardware-token OTPs against a SQLite registry of devices and
//! answers with signed verdicts.
//!
//! Usage:
//!   otpgate --port 8080 --database /var/lib/otpgate/otpgate.db
//!
//! Devices and clients are provisioned directly in the database.

use std::{net::IpAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use otpgate_server::{AppState, ServerConfig, VERIFY_PATH, build_router};
use otpgate_store::SqliteKeyStore;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "otpgate")]
#[command(about = "Hardware-token OTP validation server")]
struct Args {
    /// Port to listen on (HTTP)
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Path to the device and client database
    #[arg(short, long, default_value = "otpgate.db")]
    database: PathBuf,

    /// Echo the token as `opt=` instead of `otp=`
    #[arg(long)]
    legacy_token_field: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    info!("otpgate starting...");
    let store = SqliteKeyStore::open(&args.database)
        .with_context(|| format!("Failed to open database {}", args.database.display()))?;
    info!("Using database {}", args.database.display());

    let state = Arc::new(AppState {
        devices: Arc::new(store.clone()),
        clients: Arc::new(store),
        config: ServerConfig::with_legacy_token_field(args.legacy_token_field),
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((args.bind, args.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", args.bind, args.port))?;
    info!(
        "Listening on http://{}{}",
        listener.local_addr().context("Failed to read local address")?,
        VERIFY_PATH
    );

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
