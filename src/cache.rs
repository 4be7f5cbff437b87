use std::{fmt::Debug, hash::Hash};

use chrono::{DateTime, Utc};

use crate::domain::{Reservation, ReservationId, Table, TableId};

// Records that can live in an EntityCache
pub trait CachedEntity: Clone + PartialEq {
    type Id: Clone + Eq + Hash + Debug;

    fn id(&self) -> &Self::Id;

    // Server-side modification time, when the backend supplies one
    fn version(&self) -> Option<DateTime<Utc>>;
}

impl CachedEntity for Table {
    type Id = TableId;

    fn id(&self) -> &TableId {
        &self.id
    }

    fn version(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl CachedEntity for Reservation {
    type Id = ReservationId;

    fn id(&self) -> &ReservationId {
        &self.id
    }

    fn version(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheInput<T: CachedEntity> {
    LocalOptimistic(T),
    ServerConfirmed(T),
    ServerDeleted(T::Id),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheChange {
    Inserted,
    Updated,
    Removed,
    // Re-application of state already held
    Unchanged,
    // Server record older than the one already held
    Stale,
}

impl CacheChange {
    pub fn is_visible(&self) -> bool {
        matches!(self, CacheChange::Inserted | CacheChange::Updated | CacheChange::Removed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Optimistic,
    Server,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    origin: Origin,
}

/// Eventually consistent local copy of one backend collection.
///
/// Last writer wins per id, with two exceptions: a server record always
/// replaces an optimistic local patch, and a server record carrying an older
/// `updatedAt` than the server record already held is dropped.
#[derive(Debug, Clone)]
pub struct EntityCache<T: CachedEntity> {
    entries: Vec<Entry<T>>,
}

impl<T: CachedEntity> Default for EntityCache<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: CachedEntity> EntityCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, input: CacheInput<T>) -> CacheChange {
        match input {
            CacheInput::LocalOptimistic(value) => self.upsert(value, Origin::Optimistic),
            CacheInput::ServerConfirmed(value) => self.upsert(value, Origin::Server),
            CacheInput::ServerDeleted(id) => self.remove(&id),
        }
    }

    fn upsert(&mut self, value: T, origin: Origin) -> CacheChange {
        let Some(position) = self.position(value.id()) else {
            self.entries.push(Entry { value, origin });
            return CacheChange::Inserted;
        };

        let entry = &mut self.entries[position];
        if entry.value == value {
            // An echo of something we already hold; a server echo still settles an optimistic patch
            if origin == Origin::Server {
                entry.origin = Origin::Server;
            }
            return CacheChange::Unchanged;
        }

        if origin == Origin::Server && entry.origin == Origin::Server {
            if let (Some(held), Some(incoming)) = (entry.value.version(), value.version()) {
                if incoming < held {
                    return CacheChange::Stale;
                }
            }
        }

        entry.value = value;
        entry.origin = origin;
        CacheChange::Updated
    }

    fn remove(&mut self, id: &T::Id) -> CacheChange {
        match self.position(id) {
            Some(position) => {
                self.entries.remove(position);
                CacheChange::Removed
            }
            None => CacheChange::Unchanged,
        }
    }

    // Swap in a fresh server snapshot, keeping the snapshot's order
    pub fn replace_all(&mut self, values: Vec<T>) {
        self.entries = values
            .into_iter()
            .map(|value| Entry { value, origin: Origin::Server })
            .collect();
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.entries.iter().position(|entry| entry.value.id() == id)
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.position(id).map(|position| &self.entries[position].value)
    }

    pub fn origin(&self, id: &T::Id) -> Option<Origin> {
        self.position(id).map(|position| self.entries[position].origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|entry| &entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
