//! Core shared utilities for gradboard services.

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{routing::get, Router};
use once_cell::sync::OnceCell;
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod metrics;
pub use metrics::{record_query, record_rejected, set_dataset_rows, QueryMetrics, QUERY_METRICS};

static TRACING_INIT: OnceCell<()> = OnceCell::new();
static ACTIVE_CONFIG: OnceCell<DynamicConfig> = OnceCell::new();

static NODE_LIVENESS: AtomicBool = AtomicBool::new(true);
static NODE_READINESS: AtomicBool = AtomicBool::new(false);
pub fn mark_ready() { NODE_READINESS.store(true, Ordering::SeqCst); }
pub fn clear_ready() { NODE_READINESS.store(false, Ordering::SeqCst); }
pub fn mark_not_live() { NODE_LIVENESS.store(false, Ordering::SeqCst); }

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`;
/// `GRADBOARD_JSON_LOG=1` switches to JSON lines.
pub fn init_tracing(service: &str, default_level: &str) -> Result<()> {
    TRACING_INIT.get_or_try_init(|| -> Result<()> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(default_level)?,
        };
        let json = std::env::var("GRADBOARD_JSON_LOG").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
        let registry = tracing_subscriber::registry().with(env_filter);
        if json {
            registry
                .with(tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false))
                .try_init()?;
        } else {
            registry
                .with(tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(true))
                .try_init()?;
        }
        Ok(())
    })?;
    info!(target: "gradboard", service, "tracing initialized");
    Ok(())
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DynamicConfig {
    pub service_name: String,
    pub log_level: String,
    pub bind_addr: String,
    pub health_port: u16,
    pub dataset_path: String,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub region_table_path: Option<String>,
    pub config_version: Option<String>,
}

impl DynamicConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind_addr {:?}: {e}", self.bind_addr))
    }
}

/// Defaults, then `GRADBOARD_CONFIG_FILE` (optional), then `GRADBOARD__*` env vars.
pub async fn load_config(service: &str) -> Result<DynamicConfig> {
    let file = std::env::var("GRADBOARD_CONFIG_FILE").ok();
    let cfg = build_config(service, file.as_deref(), None)?;
    cfg.socket_addr()?;
    let _ = ACTIVE_CONFIG.set(cfg.clone());
    Ok(cfg)
}

/// Layered config resolution. `env` replaces the process environment when given.
pub fn build_config(service: &str, file: Option<&str>, env: Option<config::Map<String, String>>) -> Result<DynamicConfig> {
    let mut builder = config::Config::builder()
        .set_default("service_name", service)?
        .set_default("log_level", "info")?
        .set_default("bind_addr", "0.0.0.0:8080")?
        .set_default("health_port", 9091_i64)?
        .set_default("dataset_path", "Merged_IPEDS_Data.xlsx")?
        .set_default("config_version", "0")?;
    if let Some(file) = file {
        builder = builder.add_source(config::File::with_name(file).required(false));
    }
    builder = builder.add_source(config::Environment::with_prefix("GRADBOARD").separator("__").source(env));
    let cfg: DynamicConfig = builder.build()?.try_deserialize()?;
    Ok(cfg)
}

pub fn health_router() -> Router {
    Router::new()
        .route("/live", get(|| async { axum::Json(serde_json::json!({"live": NODE_LIVENESS.load(Ordering::SeqCst)})) }))
        .route("/ready", get(|| async { axum::Json(serde_json::json!({"ready": NODE_READINESS.load(Ordering::SeqCst)})) }))
        .route("/status", get(|| async {
            axum::Json(serde_json::json!({
                "live": NODE_LIVENESS.load(Ordering::SeqCst),
                "ready": NODE_READINESS.load(Ordering::SeqCst),
                "config_version": ACTIVE_CONFIG.get().and_then(|c| c.config_version.clone()),
            }))
        }))
        .route("/metrics", get(metrics_handler))
}

pub async fn start_health_server(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(?addr, "health server listening");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_router()).await {
            tracing::error!(error=?e, "health server failed");
        }
    });
    Ok(())
}

async fn metrics_handler() -> axum::response::Response {
    let metric_families = prometheus::gather();
    let mut buf = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&metric_families, &mut buf) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("encode error: {e}")).into_response();
    }
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], buf).into_response()
}
