use std::sync::Arc;

use tracing::info;

use roomlock::config::{Config, Seed};
use roomlock::directory::{InMemoryRequesterDirectory, InMemoryResourceDirectory};
use roomlock::{sweeper, Coordinator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    roomlock::observability::init(config.metrics_port)?;

    let resources = Arc::new(InMemoryResourceDirectory::new());
    let requesters = Arc::new(InMemoryRequesterDirectory::new());
    if let Some(path) = &config.seed_file {
        Seed::load(path)?.apply(&resources, &requesters)?;
        info!("seeded {} resources, {} requesters from {}", resources.len(), requesters.len(), path.display());
    }

    let coordinator = Arc::new(Coordinator::with_defaults(requesters, resources));

    let sweeper = tokio::spawn(sweeper::run_sweeper(coordinator.clone(), config.sweep_interval));
    info!("roomlockd running");
    info!("  sweep_interval: {:?}", config.sweep_interval);
    info!("  metrics: {}", config.metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    // Graceful shutdown on SIGTERM/ctrl-c
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await?;
    }

    info!("shutdown signal received");
    sweeper.abort();
    info!("roomlockd stopped with {} bookings on record", coordinator.booking_count());
    Ok(())
}
