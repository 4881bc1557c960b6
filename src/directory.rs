//! Collaborators the coordinator consults but does not own: who may book,
//! what can be booked, and where booking ids come from.
//!
//! The in-memory directories stand in for whatever lookup service the
//! embedding application has.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use ulid::Ulid;

use crate::coordinator::{EntityKind, ReservationError};
use crate::model::*;

#[async_trait]
pub trait RequesterDirectory: Send + Sync {
    async fn exists(&self, id: &RequesterId) -> bool;
}

#[async_trait]
pub trait ResourceDirectory: Send + Sync {
    async fn exists(&self, id: &ResourceId) -> bool;

    /// Every bookable resource, in a stable order.
    async fn list_all(&self) -> Vec<Resource>;
}

/// Produces globally unique booking ids. Called inside the critical section,
/// so it must not block or take locks of its own.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> BookingId;
}

/// `BKG-` followed by a fresh ULID.
#[derive(Debug, Default, Clone, Copy)]
pub struct UlidGenerator;

impl IdGenerator for UlidGenerator {
    fn next_id(&self) -> BookingId {
        BookingId::new(format!("BKG-{}", Ulid::new()))
    }
}

// ── Resources ────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryResourceDirectory {
    resources: DashMap<ResourceId, Resource>,
}

impl InMemoryResourceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, resource: Resource) -> Result<(), ReservationError> {
        match self.resources.entry(resource.id.clone()) {
            Entry::Occupied(_) => Err(ReservationError::AlreadyExists(
                EntityKind::Resource,
                resource.id.to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(resource);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &ResourceId) -> Option<Resource> {
        self.resources.get(id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// All resources ordered by id.
    pub fn list(&self) -> Vec<Resource> {
        let mut all: Vec<Resource> = self.resources.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn matching(&self, filter: &ResourceFilter) -> Vec<Resource> {
        self.list().into_iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn with_min_capacity(&self, min_capacity: u32) -> Vec<Resource> {
        self.matching(&ResourceFilter {
            min_capacity: Some(min_capacity),
            location: None,
        })
    }

    pub fn at_location(&self, location: &str) -> Vec<Resource> {
        self.matching(&ResourceFilter {
            min_capacity: None,
            location: Some(location.to_string()),
        })
    }
}

#[async_trait]
impl ResourceDirectory for InMemoryResourceDirectory {
    async fn exists(&self, id: &ResourceId) -> bool {
        self.resources.contains_key(id)
    }

    async fn list_all(&self) -> Vec<Resource> {
        self.list()
    }
}

// ── Requesters ───────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRequesterDirectory {
    requesters: DashMap<RequesterId, Requester>,
}

impl InMemoryRequesterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, requester: Requester) -> Result<(), ReservationError> {
        match self.requesters.entry(requester.id.clone()) {
            Entry::Occupied(_) => Err(ReservationError::AlreadyExists(
                EntityKind::Requester,
                requester.id.to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(requester);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &RequesterId) -> Option<Requester> {
        self.requesters.get(id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.requesters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requesters.is_empty()
    }

    pub fn list(&self) -> Vec<Requester> {
        let mut all: Vec<Requester> = self.requesters.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

#[async_trait]
impl RequesterDirectory for InMemoryRequesterDirectory {
    async fn exists(&self, id: &RequesterId) -> bool {
        self.requesters.contains_key(id)
    }
}
