//! Local lists kept in step with the real-time change feed.
//!
//! A [`LiveList`] starts from a snapshot (the initial GET) and then absorbs
//! `added` / `modified` / `removed` events. Events are idempotent: replaying
//! one leaves the list in the same state.
//!
//! Records submitted locally can be shown before the server confirms them via
//! [`LiveList::insert_optimistic`]. The matching feed event (or an explicit
//! [`LiveList::confirm`]) clears the pending flag; [`LiveList::rollback`]
//! drops the record when the submission failed.

use serde::de::DeserializeOwned;
use std::cmp::Ordering;

use crate::error::ListError;
use crate::models::{ChangeEvent, ChangeKind, Collection, Device, Rating};

/// A record type that lives in a feed-backed collection.
pub trait Record: DeserializeOwned + Clone {
    /// Collection whose events apply to this type.
    const COLLECTION: Collection;

    /// Stable identifier used to match events to records.
    fn record_id(&self) -> &str;
}

impl Record for Rating {
    const COLLECTION: Collection = Collection::Ratings;

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for Device {
    const COLLECTION: Collection = Collection::Devices;

    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Outcome of applying one event or local edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    /// A record was appended
    Inserted { id: String },
    /// An existing record was replaced
    Updated { id: String },
    /// A pending optimistic record was confirmed by the server
    Confirmed { id: String },
    /// A record was deleted
    Removed { id: String },
    /// Nothing changed (foreign collection, or removal of an unknown id)
    Ignored { id: String },
}

impl ListChange {
    /// Whether the list contents changed.
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Ignored { .. })
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    record: T,
    pending: bool,
    /// Server copy replaced by a pending optimistic edit
    previous: Option<T>,
}

impl<T> Entry<T> {
    const fn confirmed(record: T) -> Self {
        Self { record, pending: false, previous: None }
    }
}

/// Ordered local copy of a collection.
#[derive(Debug, Clone)]
pub struct LiveList<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for LiveList<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: Record> LiveList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from a full snapshot.
    pub fn from_snapshot(records: Vec<T>) -> Self {
        let mut list = Self::new();
        list.replace_all(records);
        list
    }

    /// Reset to a full snapshot.
    ///
    /// Pending optimistic records absent from the snapshot are kept, since
    /// their submission may still be in flight.
    pub fn replace_all(&mut self, records: Vec<T>) {
        let pending: Vec<Entry<T>> = self
            .entries
            .drain(..)
            .filter(|e| e.pending && !records.iter().any(|r| r.record_id() == e.record.record_id()))
            .collect();

        self.entries = records.into_iter().map(Entry::confirmed).collect();
        self.entries.extend(pending);
    }

    /// Apply one change-feed event.
    ///
    /// On a decode error the list is left untouched.
    pub fn apply(&mut self, event: &ChangeEvent) -> Result<ListChange, ListError> {
        let id = event.id.clone();
        if event.collection != T::COLLECTION {
            return Ok(ListChange::Ignored { id });
        }

        match event.kind {
            ChangeKind::Added | ChangeKind::Modified => {
                let record: T = event.decode()?;
                Ok(self.upsert(record, false))
            },
            ChangeKind::Removed => Ok(match self.position(&id) {
                Some(idx) => {
                    self.entries.remove(idx);
                    ListChange::Removed { id }
                },
                None => ListChange::Ignored { id },
            }),
        }
    }

    /// Show a locally submitted record before the server confirms it.
    ///
    /// Editing a confirmed record keeps the server copy so [`LiveList::rollback`]
    /// can restore it.
    pub fn insert_optimistic(&mut self, record: T) -> ListChange {
        self.upsert(record, true)
    }

    /// Mark a pending record as confirmed. Returns false if it was not pending.
    pub fn confirm(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.record.record_id() == id && e.pending) {
            Some(entry) => {
                entry.pending = false;
                entry.previous = None;
                true
            },
            None => false,
        }
    }

    /// Undo a pending record whose submission failed, returning it.
    ///
    /// An optimistic edit reverts to the server copy it replaced; an
    /// optimistic insert is dropped. Confirmed records are never touched.
    pub fn rollback(&mut self, id: &str) -> Option<T> {
        let idx = self.entries.iter().position(|e| e.record.record_id() == id && e.pending)?;
        let entry = &mut self.entries[idx];
        match entry.previous.take() {
            Some(previous) => {
                entry.pending = false;
                Some(std::mem::replace(&mut entry.record, previous))
            },
            None => Some(self.entries.remove(idx).record),
        }
    }

    fn upsert(&mut self, record: T, pending: bool) -> ListChange {
        let id = record.record_id().to_string();
        match self.position(&id) {
            Some(idx) => {
                let entry = &mut self.entries[idx];
                let was_pending = entry.pending;
                let replaced = std::mem::replace(&mut entry.record, record);
                entry.previous = match (pending, was_pending) {
                    (false, _) => None,
                    (true, true) => entry.previous.take(),
                    (true, false) => Some(replaced),
                };
                entry.pending = pending;
                if was_pending && !pending {
                    ListChange::Confirmed { id }
                } else {
                    ListChange::Updated { id }
                }
            },
            None => {
                self.entries.push(Entry { record, pending, previous: None });
                ListChange::Inserted { id }
            },
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.record.record_id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.record.record_id() == id).map(|e| &e.record)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.record.record_id() == id && e.pending)
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.pending).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.record)
    }

    /// Records in display order.
    pub fn sorted_by<F>(&self, mut compare: F) -> Vec<&T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut records: Vec<&T> = self.iter().collect();
        records.sort_by(|a, b| compare(a, b));
        records
    }

    /// Owned copy of the current records.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
