use anyhow::Result;
use dashboard::{load_snapshot, router};
use gradboard_core::{clear_ready, init_tracing, load_config, mark_not_live, mark_ready, set_dataset_rows, start_health_server};
use std::path::Path;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = load_config("dashboard").await?;
    init_tracing(&cfg.service_name, &cfg.log_level)?;
    info!(?cfg, "config loaded");

    start_health_server(cfg.health_port).await?;

    let board = load_snapshot(
        Path::new(&cfg.dataset_path),
        cfg.sheet.as_deref(),
        cfg.region_table_path.as_deref().map(Path::new),
    )?;
    set_dataset_rows(board.len());

    let addr = cfg.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    mark_ready();
    info!(%addr, rows = board.len(), "dashboard listening");

    axum::serve(listener, router(board)).with_graceful_shutdown(shutdown_signal()).await?;
    mark_not_live();
    info!("shutdown");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = ?e, "ctrl_c handler failed");
    }
    // not ready while in-flight requests drain
    clear_ready();
}
