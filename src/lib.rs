//! riskwatch -- per-employee security incident risk aggregation.
//!
//! This crate pulls raw incident records of seven distinct shapes from a
//! remote source, resolves each record to an employee identity, buckets the
//! results by severity, and serves the aggregate through a low-latency read
//! path backed by a periodically refreshed cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod incident;
pub mod model;
pub mod refresh;
pub mod source;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Build the HTTP source and pipeline from settings.
pub fn build_pipeline(settings: &config::Settings) -> Result<incident::AggregationPipeline> {
    let source = source::HttpIncidentSource::new(
        &settings.api.host,
        &settings.api.username,
        &settings.api.password,
        Duration::from_secs(settings.api.timeout_secs),
        settings.dump_dir.clone(),
    )?;
    Ok(incident::AggregationPipeline::new(Arc::new(source)))
}

/// Start the riskwatch daemon: scheduled cache refresh plus the read API.
pub async fn serve(settings: config::Settings) -> Result<()> {
    let pipeline = build_pipeline(&settings)?;
    let state = api::state::AppState::new(pipeline);

    let refresh_state = state.clone();
    let period = Duration::from_secs(settings.refresh.interval_secs);
    tokio::spawn(async move {
        refresh::run_refresh_loop(refresh_state, period).await;
    });

    let addr: std::net::SocketAddr = settings.server.bind.parse()?;
    let app = api::router(state);

    tracing::info!(%addr, "riskwatch listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
