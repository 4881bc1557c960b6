use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::coordinator::ReservationError;

/// Unix milliseconds. All instants and slot bounds use it.
pub type Ms = i64;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifies a bookable resource (a meeting room).
    ResourceId
);
string_id!(
    /// Identifies the party making a reservation (an employee).
    RequesterId
);
string_id!(
    /// Opaque, globally unique booking identifier.
    BookingId
);

/// Half-open interval `[start, end)`.
///
/// Construction is validated: `start < end`, and for reservations `start`
/// may not precede the supplied `now`. Back-to-back slots do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeSlot {
    start: Ms,
    end: Ms,
}

impl TimeSlot {
    /// Slot for a new reservation. Rejects empty/inverted intervals and
    /// intervals that start before `now`.
    pub fn new(start: Ms, end: Ms, now: Ms) -> Result<Self, ReservationError> {
        let slot = Self::window(start, end)?;
        if start < now {
            return Err(ReservationError::PastInterval { start, now });
        }
        Ok(slot)
    }

    /// Slot without the past check, for read-only windows.
    pub fn window(start: Ms, end: Ms) -> Result<Self, ReservationError> {
        if start >= end {
            return Err(ReservationError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub(crate) fn from_bounds(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "TimeSlot start must be before end");
        Self { start, end }
    }

    pub fn start(&self) -> Ms {
        self.start
    }

    pub fn end(&self) -> Ms {
        self.end
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Booking lifecycle. `Active` is initial; the other two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum BookingStatus {
    Active = 0,
    Cancelled = 1,
    Completed = 2,
}

impl BookingStatus {
    /// Only ever fed values written from `BookingStatus as u8`.
    fn from_u8(v: u8) -> Self {
        match v {
            0 => BookingStatus::Active,
            1 => BookingStatus::Cancelled,
            2 => BookingStatus::Completed,
            other => unreachable!("invalid booking status byte {other}"),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Active => "ACTIVE",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}

/// A reservation of one resource by one requester over one slot.
///
/// Everything except the status is fixed at creation. The status lives in
/// its own atomic cell so `cancel` and `complete` are safe to race without
/// holding the resource lock.
#[derive(Debug)]
pub struct Booking {
    id: BookingId,
    resource_id: ResourceId,
    requester_id: RequesterId,
    slot: TimeSlot,
    created_at: Ms,
    status: AtomicU8,
}

impl Booking {
    pub fn new(
        id: BookingId,
        resource_id: ResourceId,
        requester_id: RequesterId,
        slot: TimeSlot,
        created_at: Ms,
    ) -> Self {
        Self {
            id,
            resource_id,
            requester_id,
            slot,
            created_at,
            status: AtomicU8::new(BookingStatus::Active as u8),
        }
    }

    pub fn id(&self) -> &BookingId {
        &self.id
    }

    pub fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    pub fn requester_id(&self) -> &RequesterId {
        &self.requester_id
    }

    pub fn slot(&self) -> &TimeSlot {
        &self.slot
    }

    pub fn created_at(&self) -> Ms {
        self.created_at
    }

    pub fn status(&self) -> BookingStatus {
        BookingStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.status() == BookingStatus::Active
    }

    /// Only active bookings take part in conflict checks.
    pub fn overlaps(&self, slot: &TimeSlot) -> bool {
        self.is_active() && self.slot.overlaps(slot)
    }

    /// ACTIVE → CANCELLED. Any other starting state is an error and leaves
    /// the status untouched.
    pub fn cancel(&self) -> Result<(), ReservationError> {
        self.transition(BookingStatus::Cancelled)
            .map_err(|from| ReservationError::InvalidStateTransition {
                booking_id: self.id.clone(),
                from,
                to: BookingStatus::Cancelled,
            })
    }

    /// ACTIVE → COMPLETED. Idempotent: returns false if the booking was
    /// already terminal.
    pub fn complete(&self) -> bool {
        self.transition(BookingStatus::Completed).is_ok()
    }

    fn transition(&self, to: BookingStatus) -> Result<(), BookingStatus> {
        self.status
            .compare_exchange(
                BookingStatus::Active as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(BookingStatus::from_u8)
    }

    pub fn info(&self) -> BookingInfo {
        BookingInfo {
            id: self.id.clone(),
            resource_id: self.resource_id.clone(),
            requester_id: self.requester_id.clone(),
            slot: self.slot,
            created_at: self.created_at,
            status: self.status(),
        }
    }
}

/// A meeting room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub capacity: u32,
    pub location: String,
}

/// An employee who can book rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub id: RequesterId,
    pub name: String,
    pub contact: String,
}

/// Narrows an availability scan by room attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    pub min_capacity: Option<u32>,
    /// Compared case-insensitively.
    pub location: Option<String>,
}

impl ResourceFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(min) = self.min_capacity
            && resource.capacity < min {
                return false;
            }
        if let Some(ref loc) = self.location
            && resource.location.to_lowercase() != loc.to_lowercase() {
                return false;
            }
        true
    }
}

// ── Query result types ───────────────────────────────────────────

/// Point-in-time copy of a booking. Never aliases the live record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingInfo {
    pub id: BookingId,
    pub resource_id: ResourceId,
    pub requester_id: RequesterId,
    pub slot: TimeSlot,
    pub created_at: Ms,
    pub status: BookingStatus,
}
