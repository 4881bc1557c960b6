use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::model::*;
use crate::observability::{
    outcome_label, BOOKINGS_COMPLETED_TOTAL, CANCELLATIONS_TOTAL, RESERVATIONS_TOTAL,
    RESERVE_DURATION_SECONDS,
};

use super::conflict::check_no_conflict;
use super::{Coordinator, ReservationError};

impl Coordinator {
    /// Book `resource_id` for `[start, end)` on behalf of `requester_id`.
    ///
    /// Of any number of concurrent calls for overlapping slots on the same
    /// resource, exactly one succeeds; the others get `ResourceUnavailable`.
    pub async fn reserve(
        &self,
        requester_id: &RequesterId,
        resource_id: &ResourceId,
        start: Ms,
        end: Ms,
    ) -> Result<BookingInfo, ReservationError> {
        let started = Instant::now();
        let result = self.try_reserve(requester_id, resource_id, start, end).await;
        metrics::histogram!(RESERVE_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        metrics::counter!(RESERVATIONS_TOTAL, "outcome" => outcome_label(&result)).increment(1);
        result
    }

    async fn try_reserve(
        &self,
        requester_id: &RequesterId,
        resource_id: &ResourceId,
        start: Ms,
        end: Ms,
    ) -> Result<BookingInfo, ReservationError> {
        self.require_requester(requester_id).await?;
        self.require_resource(resource_id).await?;
        let slot = TimeSlot::new(start, end, self.clock.now_ms())?;

        // Critical section: overlap check and insert are atomic per resource.
        let _guard = self.lock_write(resource_id).await;
        check_no_conflict(&self.index, resource_id, &slot)?;

        let booking = Arc::new(Booking::new(
            self.ids.next_id(),
            resource_id.clone(),
            requester_id.clone(),
            slot,
            self.clock.now_ms(),
        ));
        self.index.insert(Arc::clone(&booking));
        info!("booking {} confirmed: {resource_id} {slot} for {requester_id}", booking.id());
        Ok(booking.info())
    }

    /// Cancel an active booking. Serialized with reservations on the same
    /// resource so no overlap check sees a half-applied cancellation.
    pub async fn cancel(&self, booking_id: &BookingId) -> Result<BookingInfo, ReservationError> {
        let result = self.try_cancel(booking_id).await;
        metrics::counter!(CANCELLATIONS_TOTAL, "outcome" => outcome_label(&result)).increment(1);
        result
    }

    async fn try_cancel(&self, booking_id: &BookingId) -> Result<BookingInfo, ReservationError> {
        let booking = self.require_booking(booking_id)?;
        let _guard = self.lock_write(booking.resource_id()).await;
        booking.cancel()?;
        info!("booking {booking_id} cancelled on {}", booking.resource_id());
        Ok(booking.info())
    }

    /// Mark an active booking completed. Completing a booking that is
    /// already terminal is a no-op and returns its current state.
    pub async fn complete(&self, booking_id: &BookingId) -> Result<BookingInfo, ReservationError> {
        let booking = self.require_booking(booking_id)?;
        let _guard = self.lock_write(booking.resource_id()).await;
        if booking.complete() {
            metrics::counter!(BOOKINGS_COMPLETED_TOTAL).increment(1);
            debug!("booking {booking_id} completed");
        }
        Ok(booking.info())
    }

    /// Complete every active booking whose slot ended at or before `now`.
    /// Takes one resource lock at a time. Returns the ids that transitioned.
    pub async fn complete_elapsed(&self, now: Ms) -> Vec<BookingId> {
        let mut by_resource: BTreeMap<ResourceId, Vec<Arc<Booking>>> = BTreeMap::new();
        for booking in self.index.active_ended_by(now) {
            by_resource
                .entry(booking.resource_id().clone())
                .or_default()
                .push(booking);
        }

        let mut completed = Vec::new();
        for (resource_id, bookings) in by_resource {
            let _guard = self.lock_write(&resource_id).await;
            for booking in bookings {
                if booking.complete() {
                    completed.push(booking.id().clone());
                }
            }
        }

        if !completed.is_empty() {
            metrics::counter!(BOOKINGS_COMPLETED_TOTAL).increment(completed.len() as u64);
        }
        completed
    }
}
