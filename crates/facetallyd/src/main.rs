use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod config;
mod display;
mod engine;
mod store_writer;

/// Bounded queue between the capture loop and the store writer. The engine
/// uses try_send, so a backed-up writer drops events instead of delaying
/// the next frame.
const EVENT_QUEUE_DEPTH: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = config::Config::from_env();
    tracing::info!(
        device = %config.camera_device,
        interval_ms = config.poll_interval_ms,
        data_dir = %config.data_dir.display(),
        "facetallyd starting"
    );

    std::fs::create_dir_all(&config.data_dir)?;
    if !config.settings_path.exists() {
        facetally_store::StoreConfig::default().save(&config.settings_path)?;
        tracing::info!(path = %config.settings_path.display(), "wrote default store settings");
    }

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let writer = store_writer::spawn(
        config.settings_path.clone(),
        config.data_dir.clone(),
        events_rx,
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let capture = engine::spawn_capture_loop(
        &config,
        events_tx,
        Box::new(display::LogDisplaySink::new()),
        Arc::clone(&shutdown),
    )?;
    tracing::info!("facetallyd ready");

    let mut capture_done = tokio::task::spawn_blocking(move || capture.join());
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
            shutdown.store(true, Ordering::Relaxed);
            let _ = (&mut capture_done).await;
        }
        _ = &mut capture_done => {
            tracing::error!("capture loop exited; shutting down");
        }
    }

    // The capture thread owned the only event sender; once it is gone the
    // writer drains whatever is queued and stops.
    let _ = writer.await;
    tracing::info!("facetallyd stopped");
    Ok(())
}
