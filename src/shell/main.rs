use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use health_bridge::shell::config::AppConfig;
use health_bridge::shell::http::router;
use health_bridge::shell::workers::run_scheduler;
use health_bridge::shell::{build_state, schedule};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = AppConfig::from_env()?;
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let state = build_state(&config)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(run_scheduler(
        Arc::clone(&state.runner),
        schedule(&config),
        shutdown_rx,
    ));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %config.bind,
        entity_id = %config.entity_id,
        data_dir = %config.data_dir.display(),
        "health bridge listening"
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown requested");
        })
        .await?;

    shutdown_tx.send(true).ok();
    scheduler.await?;
    Ok(())
}
