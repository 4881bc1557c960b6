mod availability;
mod conflict;
mod error;
mod index;
mod locks;
mod mutations;
mod queries;

pub use availability::{free_windows, merge_overlapping, subtract_intervals};
pub use error::{EntityKind, ReservationError};
use index::BookingIndex;
use locks::LockRegistry;

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard};

use crate::clock::{Clock, SystemClock};
use crate::directory::{IdGenerator, RequesterDirectory, ResourceDirectory, UlidGenerator};
use crate::model::*;
use crate::observability::LOCK_WAIT_SECONDS;

/// Orchestrates reservations: validates requests against the directories,
/// serializes work per resource through the lock registry, and keeps the
/// booking index free of overlapping active bookings.
///
/// Built explicitly by the embedding application and shared behind an `Arc`.
///
/// The index and the lock registry are internal: bookings only enter through
/// [`Coordinator::reserve`], and nothing outside the crate can take a
/// resource lock or insert around the overlap check.
///
/// ```compile_fail
/// fn sneak(c: &roomlock::Coordinator, b: std::sync::Arc<roomlock::model::Booking>) {
///     c.index().insert(b);
/// }
/// ```
///
/// ```compile_fail
/// async fn hold(c: &roomlock::Coordinator) {
///     let _guard = c.locks().write(&"R1".into()).await;
/// }
/// ```
pub struct Coordinator {
    requesters: Arc<dyn RequesterDirectory>,
    resources: Arc<dyn ResourceDirectory>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    index: BookingIndex,
    locks: LockRegistry,
}

impl Coordinator {
    pub fn new(
        requesters: Arc<dyn RequesterDirectory>,
        resources: Arc<dyn ResourceDirectory>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requesters,
            resources,
            ids,
            clock,
            index: BookingIndex::new(),
            locks: LockRegistry::new(),
        }
    }

    /// ULID booking ids and the wall clock.
    pub fn with_defaults(
        requesters: Arc<dyn RequesterDirectory>,
        resources: Arc<dyn ResourceDirectory>,
    ) -> Self {
        Self::new(requesters, resources, Arc::new(UlidGenerator), Arc::new(SystemClock))
    }

    pub fn now_ms(&self) -> Ms {
        self.clock.now_ms()
    }

    /// Bookings on record, any status.
    pub fn booking_count(&self) -> usize {
        self.index.len()
    }

    /// Per-resource locks created so far.
    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    pub(super) async fn require_requester(&self, id: &RequesterId) -> Result<(), ReservationError> {
        if self.requesters.exists(id).await {
            Ok(())
        } else {
            Err(ReservationError::NotFound(EntityKind::Requester, id.to_string()))
        }
    }

    pub(super) async fn require_resource(&self, id: &ResourceId) -> Result<(), ReservationError> {
        if self.resources.exists(id).await {
            Ok(())
        } else {
            Err(ReservationError::NotFound(EntityKind::Resource, id.to_string()))
        }
    }

    pub(super) fn require_booking(&self, id: &BookingId) -> Result<Arc<Booking>, ReservationError> {
        self.index
            .get(id)
            .ok_or_else(|| ReservationError::NotFound(EntityKind::Booking, id.to_string()))
    }

    /// Acquire a resource's write lock, recording how long we queued.
    pub(super) async fn lock_write(&self, resource_id: &ResourceId) -> OwnedRwLockWriteGuard<()> {
        let wait = Instant::now();
        let guard = self.locks.write(resource_id).await;
        metrics::histogram!(LOCK_WAIT_SECONDS, "mode" => "write").record(wait.elapsed().as_secs_f64());
        guard
    }

    pub(super) async fn lock_read(&self, resource_id: &ResourceId) -> OwnedRwLockReadGuard<()> {
        let wait = Instant::now();
        let guard = self.locks.read(resource_id).await;
        metrics::histogram!(LOCK_WAIT_SECONDS, "mode" => "read").record(wait.elapsed().as_secs_f64());
        guard
    }
}
