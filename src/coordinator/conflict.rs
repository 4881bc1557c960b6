use crate::model::*;

use super::ReservationError;
use super::index::BookingIndex;

/// Reject `slot` if any active booking on the resource overlaps it.
/// Caller must hold the resource's write lock for the result to stay true
/// until the following insert.
pub(crate) fn check_no_conflict(
    index: &BookingIndex,
    resource_id: &ResourceId,
    slot: &TimeSlot,
) -> Result<(), ReservationError> {
    if let Some(existing) = index.overlapping(resource_id, slot).first() {
        tracing::debug!(
            "{resource_id} {slot} conflicts with {} {}",
            existing.id(),
            existing.slot()
        );
        return Err(ReservationError::ResourceUnavailable(resource_id.clone(), *slot));
    }
    Ok(())
}
