//! Concurrent meeting-room reservations.
//!
//! [`Coordinator`] guarantees that, per resource, active bookings never
//! overlap, however many tasks reserve and cancel at once. Work on one
//! resource never waits on another.

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod directory;
pub mod model;
pub mod observability;
pub mod sweeper;

pub use coordinator::{Coordinator, EntityKind, ReservationError};
