//! wcrs-pull - Unattended episode puller
//!
//! Invoked once per pass by an external timer (cron or a systemd timer).
//! Exits non-zero when the catalog cannot be fetched or startup
//! configuration is incomplete; per-episode failures are logged and
//! reported in the run summary instead.

use anyhow::Result;
use chrono::Utc;
use tracing::info;
use wcrs_common::storage::B2Client;
use wcrs_pull::catalog::HttpCatalog;
use wcrs_pull::config::PullConfig;
use wcrs_pull::pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting WCRS episode puller (wcrs-pull) v{}", env!("CARGO_PKG_VERSION"));

    let config = PullConfig::from_env()?;
    info!(
        "Staging root '{}', catalog '{}', retention {} days",
        config.staging_root.display(),
        config.catalog_url,
        config.retention_days
    );

    let store = B2Client::authorize(&config.b2_key_id, &config.b2_key).await?;
    info!("✓ Authorized with object storage");

    let catalog = HttpCatalog::new(&config.catalog_url);
    let pipeline = Pipeline::new(&catalog, &store, &config.staging_root, config.retention_days);

    let summary = pipeline.run_once(Utc::now()).await?;
    info!(
        "Run summary: {} shows, {} downloaded, {} already staged, {} promoted, {} purged, {} failures",
        summary.shows,
        summary.downloaded,
        summary.skipped,
        summary.promoted,
        summary.purged,
        summary.failures
    );

    Ok(())
}
