//! wcrs-sched - Community radio scheduler service
//!
//! Serves the catalog endpoints the episode puller polls and the CRUD
//! endpoints the station web UI calls. Settings resolve CLI flag, then
//! environment variable, then config.toml, then compiled default.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use wcrs_common::config::{
    default_data_folder, resolve_setting, StationConfig, DEFAULT_LEAD_TIME_MINUTES,
    DEFAULT_STATION_TZ,
};
use wcrs_common::db::init_database;
use wcrs_common::storage::B2Client;
use wcrs_sched::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "wcrs-sched", about = "WCRS scheduler service")]
struct Args {
    /// Path to the schedule database
    #[arg(long)]
    database: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<String>,

    /// Station IANA timezone, e.g. America/New_York
    #[arg(long)]
    timezone: Option<String>,

    /// Publish lead time in minutes
    #[arg(long)]
    lead_time_minutes: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting WCRS scheduler (wcrs-sched) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let db_path = resolve_setting(args.database.as_deref(), "WCRS_DATABASE", "database")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| default_data_folder().join("wcrs.db"));

    let port: u16 = resolve_setting(args.port.as_deref(), "WCRS_PORT", "port")
        .unwrap_or_else(|| "5780".to_string())
        .parse()
        .context("port must be a number")?;

    let tz_name = resolve_setting(args.timezone.as_deref(), "WCRS_STATION_TZ", "station_tz")
        .unwrap_or_else(|| DEFAULT_STATION_TZ.to_string());
    let lead_minutes: i64 = resolve_setting(
        args.lead_time_minutes.as_deref(),
        "WCRS_LEAD_TIME_MINUTES",
        "lead_time_minutes",
    )
    .unwrap_or_else(|| DEFAULT_LEAD_TIME_MINUTES.to_string())
    .parse()
    .context("lead time must be a number of minutes")?;

    let station = StationConfig::new(&tz_name, lead_minutes)?;
    info!(
        "Station timezone {}, publish lead time {} minutes",
        station.timezone, station.lead_time_minutes
    );

    let pool = init_database(&db_path).await?;
    info!("✓ Connected to database: {}", db_path.display());

    let mut state = AppState::new(pool, station);

    // Upload handshake is optional: without B2 credentials the scheduler
    // still serves the catalog and CRUD endpoints.
    let b2_key_id = resolve_setting(None, "WCRS_B2_KEY_ID", "b2_key_id");
    let b2_key = resolve_setting(None, "WCRS_B2_KEY", "b2_key");
    let bucket_id = resolve_setting(None, "WCRS_B2_BUCKET_ID", "b2_bucket_id");
    match (b2_key_id, b2_key, bucket_id) {
        (Some(key_id), Some(key), Some(bucket)) => {
            let client = B2Client::authorize(&key_id, &key).await?;
            info!("✓ Authorized with object storage");
            state = state.with_object_store(Arc::new(client), bucket);
        }
        _ => warn!("Object storage not configured; /api/upload_url disabled"),
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("wcrs-sched listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
