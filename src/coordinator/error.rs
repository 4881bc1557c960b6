use std::fmt;

use crate::model::{BookingId, BookingStatus, Ms, ResourceId, TimeSlot};

/// What kind of entity a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Booking,
    Resource,
    Requester,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Booking => "booking",
            EntityKind::Resource => "resource",
            EntityKind::Requester => "requester",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    NotFound(EntityKind, String),
    AlreadyExists(EntityKind, String),
    InvalidInterval {
        start: Ms,
        end: Ms,
    },
    PastInterval {
        start: Ms,
        now: Ms,
    },
    ResourceUnavailable(ResourceId, TimeSlot),
    InvalidStateTransition {
        booking_id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    },
}

impl ReservationError {
    /// Caller-correctable input problems: fix the request, don't retry it.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ReservationError::NotFound(..)
                | ReservationError::AlreadyExists(..)
                | ReservationError::InvalidInterval { .. }
                | ReservationError::PastInterval { .. }
        )
    }

    /// The slot is taken; another slot or resource may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReservationError::ResourceUnavailable(..))
    }

    pub fn is_state(&self) -> bool {
        matches!(self, ReservationError::InvalidStateTransition { .. })
    }
}

impl fmt::Display for ReservationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationError::NotFound(kind, id) => write!(f, "{kind} not found: {id}"),
            ReservationError::AlreadyExists(kind, id) => write!(f, "{kind} already exists: {id}"),
            ReservationError::InvalidInterval { start, end } => {
                write!(f, "invalid interval: start {start} must be before end {end}")
            }
            ReservationError::PastInterval { start, now } => {
                write!(f, "interval starts in the past: {start} < now {now}")
            }
            ReservationError::ResourceUnavailable(resource_id, slot) => {
                write!(f, "resource {resource_id} is not available for {slot}")
            }
            ReservationError::InvalidStateTransition { booking_id, from, to } => {
                write!(f, "booking {booking_id} cannot move from {from} to {to}")
            }
        }
    }
}

impl std::error::Error for ReservationError {}
