use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::coordinator::Coordinator;
use crate::model::BookingId;

/// Complete every active booking that has already ended, as of the
/// coordinator's clock.
pub async fn sweep_once(coordinator: &Coordinator) -> Vec<BookingId> {
    let completed = coordinator.complete_elapsed(coordinator.now_ms()).await;
    for id in &completed {
        debug!("completed elapsed booking {id}");
    }
    if !completed.is_empty() {
        info!("sweeper completed {} bookings", completed.len());
    }
    completed
}

/// Background task that periodically completes elapsed bookings.
pub async fn run_sweeper(coordinator: Arc<Coordinator>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        sweep_once(&coordinator).await;
    }
}
