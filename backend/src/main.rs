//! Main entry point for the Keyward server.
//!
//! Loads configuration from the environment, wires the services over the
//! in-memory stores, and serves the API. Everything lives in process memory,
//! so this binary is meant for development: queued e-mail tasks are flushed
//! to the log instead of delivered, and all state is lost on exit.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use keyward::config::Config;
use keyward::database::Repositories;
use keyward::utils::{logging, outbox};
use keyward::{create_router, AppState};
use keyward_adapters::InMemoryTaskQueue;
use tracing::info;

const OUTBOX_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env().context("invalid configuration")?;
    let queue = InMemoryTaskQueue::new();
    let state = AppState::new(&config, Repositories::in_memory(), Arc::new(queue.clone()))
        .context("failed to initialise services")?;
    outbox::spawn(queue, OUTBOX_FLUSH_INTERVAL);

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
