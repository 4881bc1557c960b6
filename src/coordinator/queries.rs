use crate::model::*;
use crate::observability::AVAILABILITY_QUERIES_TOTAL;

use super::availability::free_windows;
use super::{Coordinator, ReservationError};

impl Coordinator {
    pub fn booking(&self, booking_id: &BookingId) -> Result<BookingInfo, ReservationError> {
        self.require_booking(booking_id).map(|b| b.info())
    }

    /// Every booking ever made, oldest first.
    pub fn all_bookings(&self) -> Vec<BookingInfo> {
        self.index.all().iter().map(|b| b.info()).collect()
    }

    /// All bookings on a resource, any status, in slot-start order.
    pub async fn bookings_for_resource(
        &self,
        resource_id: &ResourceId,
    ) -> Result<Vec<BookingInfo>, ReservationError> {
        self.require_resource(resource_id).await?;
        Ok(self.index.find_by_resource(resource_id).iter().map(|b| b.info()).collect())
    }

    pub async fn active_bookings_for_resource(
        &self,
        resource_id: &ResourceId,
    ) -> Result<Vec<BookingInfo>, ReservationError> {
        self.require_resource(resource_id).await?;
        Ok(self.index.active_by_resource(resource_id).iter().map(|b| b.info()).collect())
    }

    /// All bookings by a requester, any status, in creation order.
    pub async fn bookings_for_requester(
        &self,
        requester_id: &RequesterId,
    ) -> Result<Vec<BookingInfo>, ReservationError> {
        self.require_requester(requester_id).await?;
        Ok(self.index.find_by_requester(requester_id).iter().map(|b| b.info()).collect())
    }

    pub async fn active_bookings_for_requester(
        &self,
        requester_id: &RequesterId,
    ) -> Result<Vec<BookingInfo>, ReservationError> {
        self.require_requester(requester_id).await?;
        Ok(self.index.active_by_requester(requester_id).iter().map(|b| b.info()).collect())
    }

    /// Resources with no active booking overlapping `[start, end)`.
    pub async fn available_resources(
        &self,
        start: Ms,
        end: Ms,
    ) -> Result<Vec<Resource>, ReservationError> {
        self.available_resources_matching(start, end, &ResourceFilter::default())
            .await
    }

    /// Like [`Coordinator::available_resources`], restricted to resources the
    /// filter accepts.
    ///
    /// Each resource is checked under its own read lock, one at a time, so a
    /// reservation in flight delays only the check for its own resource.
    pub async fn available_resources_matching(
        &self,
        start: Ms,
        end: Ms,
        filter: &ResourceFilter,
    ) -> Result<Vec<Resource>, ReservationError> {
        let slot = TimeSlot::new(start, end, self.clock.now_ms())?;
        metrics::counter!(AVAILABILITY_QUERIES_TOTAL).increment(1);

        let mut free = Vec::new();
        for resource in self.resources.list_all().await {
            if !filter.matches(&resource) {
                continue;
            }
            let _guard = self.lock_read(&resource.id).await;
            if self.index.is_available(&resource.id, &slot) {
                free.push(resource);
            }
        }
        Ok(free)
    }

    /// Free sub-intervals of `[start, end)` on one resource.
    pub async fn free_windows(
        &self,
        resource_id: &ResourceId,
        start: Ms,
        end: Ms,
    ) -> Result<Vec<TimeSlot>, ReservationError> {
        self.require_resource(resource_id).await?;
        let window = TimeSlot::window(start, end)?;
        let busy: Vec<TimeSlot> = {
            let _guard = self.lock_read(resource_id).await;
            self.index
                .overlapping(resource_id, &window)
                .iter()
                .map(|b| *b.slot())
                .collect()
        };
        Ok(free_windows(&window, &busy))
    }
}
