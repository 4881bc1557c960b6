use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::model::*;

/// Back-reference from a resource to one of its bookings. The slot is copied
/// so overlap candidates can be found without touching the canonical map.
#[derive(Debug, Clone)]
struct SlotEntry {
    slot: TimeSlot,
    id: BookingId,
}

/// Canonical booking store plus by-resource and by-requester indexes.
///
/// The canonical map owns the records; the secondary indexes hold ids only.
/// A resource's bookings are only inserted under that resource's write lock,
/// but the requester index spans resources, so every map here is a `DashMap`.
#[derive(Default)]
pub struct BookingIndex {
    bookings: DashMap<BookingId, Arc<Booking>>,
    /// Sorted by `slot.start`.
    by_resource: DashMap<ResourceId, Vec<SlotEntry>>,
    /// Insertion order.
    by_requester: DashMap<RequesterId, Vec<BookingId>>,
}

impl BookingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Writes ───────────────────────────────────────────────

    /// Add a booking to all three maps. An id that is already present is left
    /// as it was; ids are unique by contract.
    pub(crate) fn insert(&self, booking: Arc<Booking>) -> bool {
        match self.bookings.entry(booking.id().clone()) {
            Entry::Occupied(_) => {
                tracing::warn!("duplicate booking id {} ignored", booking.id());
                return false;
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&booking));
            }
        }

        self.by_requester
            .entry(booking.requester_id().clone())
            .or_default()
            .push(booking.id().clone());

        let mut entries = self.by_resource.entry(booking.resource_id().clone()).or_default();
        let start = booking.slot().start();
        let pos = entries.partition_point(|e| e.slot.start() <= start);
        entries.insert(
            pos,
            SlotEntry {
                slot: *booking.slot(),
                id: booking.id().clone(),
            },
        );
        true
    }

    // ── Reads (all return owned snapshots) ───────────────────

    pub fn get(&self, id: &BookingId) -> Option<Arc<Booking>> {
        self.bookings.get(id).map(|e| Arc::clone(e.value()))
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    /// Every booking, oldest first.
    pub fn all(&self) -> Vec<Arc<Booking>> {
        let mut all: Vec<Arc<Booking>> = self.bookings.iter().map(|e| Arc::clone(e.value())).collect();
        all.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.id().cmp(b.id())));
        all
    }

    /// Bookings on a resource in slot-start order, any status.
    pub fn find_by_resource(&self, resource_id: &ResourceId) -> Vec<Arc<Booking>> {
        let ids: Vec<BookingId> = self
            .by_resource
            .get(resource_id)
            .map(|e| e.iter().map(|s| s.id.clone()).collect())
            .unwrap_or_default();
        self.resolve(&ids)
    }

    /// Bookings made by a requester in creation order, any status.
    pub fn find_by_requester(&self, requester_id: &RequesterId) -> Vec<Arc<Booking>> {
        let ids: Vec<BookingId> = self
            .by_requester
            .get(requester_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        self.resolve(&ids)
    }

    pub fn active_by_resource(&self, resource_id: &ResourceId) -> Vec<Arc<Booking>> {
        let mut bookings = self.find_by_resource(resource_id);
        bookings.retain(|b| b.is_active());
        bookings
    }

    pub fn active_by_requester(&self, requester_id: &RequesterId) -> Vec<Arc<Booking>> {
        let mut bookings = self.find_by_requester(requester_id);
        bookings.retain(|b| b.is_active());
        bookings
    }

    /// Active bookings on `resource_id` that overlap `slot`.
    /// Uses binary search to skip bookings starting at or after `slot.end`.
    pub fn overlapping(&self, resource_id: &ResourceId, slot: &TimeSlot) -> Vec<Arc<Booking>> {
        let candidates: Vec<BookingId> = match self.by_resource.get(resource_id) {
            Some(entries) => {
                // Everything at index >= right_bound starts at or after slot.end → can't overlap.
                let right_bound = entries.partition_point(|e| e.slot.start() < slot.end());
                entries[..right_bound]
                    .iter()
                    .filter(|e| e.slot.end() > slot.start())
                    .map(|e| e.id.clone())
                    .collect()
            }
            None => return Vec::new(),
        };
        let mut hits = self.resolve(&candidates);
        hits.retain(|b| b.overlaps(slot));
        hits
    }

    pub fn is_available(&self, resource_id: &ResourceId, slot: &TimeSlot) -> bool {
        self.overlapping(resource_id, slot).is_empty()
    }

    /// Active bookings whose slot has ended at or before `now`.
    pub fn active_ended_by(&self, now: Ms) -> Vec<Arc<Booking>> {
        let mut due: Vec<Arc<Booking>> = self
            .bookings
            .iter()
            .filter(|e| e.is_active() && e.slot().end() <= now)
            .map(|e| Arc::clone(e.value()))
            .collect();
        due.sort_by(|a, b| a.resource_id().cmp(b.resource_id()).then_with(|| a.slot().start().cmp(&b.slot().start())));
        due
    }

    fn resolve(&self, ids: &[BookingId]) -> Vec<Arc<Booking>> {
        ids.iter().filter_map(|id| self.get(id)).collect()
    }
}
