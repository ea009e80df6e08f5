//! Smartmon Agent - S.M.A.R.T. health telemetry service
//!
//! Startup sequence:
//! - Load configuration (TOML, `$SMARTMON_CONFIG` override, `.env` honoured)
//! - Resolve devices from config or `smartctl --scan`
//! - Warm the cache with one refresh cycle
//! - Serve the JSON API

use anyhow::{Context, Result};
use smartmon_agent::http::{build_router, AppState};
use smartmon_agent::{AgentConfig, Device, DeviceScanner, SmartService, SmartctlCommand};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

async fn resolve_devices(config: &AgentConfig, scanner: &DeviceScanner) -> Vec<Device> {
    if !config.devices.is_empty() {
        info!("Using {} configured device(s)", config.devices.len());
        return config.devices.clone();
    }
    scanner.discover().await
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("smartmon_agent=info")),
        )
        .init();

    info!("Smartmon Agent v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = AgentConfig::load().await.context("Failed to load configuration")?;
    let runner = Arc::new(
        SmartctlCommand::new(config.smartctl.path.clone())
            .with_timeout(config.smartctl.collect_timeout()?),
    );

    let scanner = DeviceScanner::new(runner.clone(), config.smartctl.scan_device_types.clone());
    let devices = resolve_devices(&config, &scanner).await;
    if devices.is_empty() {
        warn!("No devices found, readings will stay empty");
    }

    let service = Arc::new(
        SmartService::from_config(&config, runner).context("Failed to build collection service")?,
    );
    let warmup = service.refresh_all_devices(&devices).await;
    info!(
        "Initial refresh: {} admitted, {} rejected, {} failed",
        warmup.admitted, warmup.rejected, warmup.failed
    );

    let app = build_router(AppState {
        service,
        devices: Arc::new(devices),
    });

    let listener = TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;
    info!("Listening on http://{}", config.server.listen);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
