use std::net::SocketAddr;

use crate::coordinator::ReservationError;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: reservation attempts. Labels: outcome.
pub const RESERVATIONS_TOTAL: &str = "roomlock_reservations_total";

/// Histogram: end-to-end `reserve` latency in seconds.
pub const RESERVE_DURATION_SECONDS: &str = "roomlock_reserve_duration_seconds";

/// Counter: cancellation attempts. Labels: outcome.
pub const CANCELLATIONS_TOTAL: &str = "roomlock_cancellations_total";

/// Counter: availability scans.
pub const AVAILABILITY_QUERIES_TOTAL: &str = "roomlock_availability_queries_total";

/// Counter: bookings moved to COMPLETED.
pub const BOOKINGS_COMPLETED_TOTAL: &str = "roomlock_bookings_completed_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Histogram: time spent queued for a resource lock, in seconds. Labels: mode.
pub const LOCK_WAIT_SECONDS: &str = "roomlock_lock_wait_seconds";

/// Gauge: per-resource locks created so far.
pub const RESOURCE_LOCKS: &str = "roomlock_resource_locks";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a call result to a short label for metrics.
pub fn outcome_label<T>(result: &Result<T, ReservationError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(ReservationError::ResourceUnavailable(..)) => "unavailable",
        Err(ReservationError::InvalidStateTransition { .. }) => "invalid_state",
        Err(ReservationError::NotFound(..)) => "not_found",
        Err(ReservationError::AlreadyExists(..)) => "already_exists",
        Err(ReservationError::InvalidInterval { .. }) => "invalid_interval",
        Err(ReservationError::PastInterval { .. }) => "past_interval",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::EntityKind;

    #[test]
    fn outcome_labels() {
        assert_eq!(outcome_label::<()>(&Ok(())), "ok");
        assert_eq!(
            outcome_label::<()>(&Err(ReservationError::NotFound(EntityKind::Booking, "x".into()))),
            "not_found"
        );
        assert_eq!(
            outcome_label::<()>(&Err(ReservationError::PastInterval { start: 0, now: 1 })),
            "past_interval"
        );
    }

    #[test]
    fn init_without_port_is_noop() {
        assert!(init(None).is_ok());
    }
}
