// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::ids::{IdSequence, RecordId};
use crate::model::{Flaggable, Record};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record {0} not found -- it may have been removed; refresh and retry")]
    NotFound(RecordId),
    #[error("record id {0} appears more than once")]
    DuplicateId(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(RecordId),
    Updated(RecordId),
}

impl UpsertOutcome {
    pub fn id(&self) -> &RecordId {
        match self {
            Self::Inserted(id) | Self::Updated(id) => id,
        }
    }
}

/// Ordered, uniquely keyed collection. Owns the id sequence for new records.
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    records: Vec<R>,
    sequence: IdSequence,
}

impl<R: Record> RecordStore<R> {
    pub fn new(sequence: IdSequence) -> Self {
        Self {
            records: Vec::new(),
            sequence,
        }
    }

    /// Seeds the store, advancing the sequence past every existing id.
    /// Records with blank ids are assigned fresh ones.
    pub fn with_records(
        mut sequence: IdSequence,
        records: impl IntoIterator<Item = R>,
    ) -> Result<Self, StoreError> {
        let records: Vec<R> = records.into_iter().collect();
        for record in &records {
            sequence.observe(record.id());
        }
        let mut store = Self::new(sequence);
        for record in records {
            if record.id().is_assigned() && store.contains(record.id()) {
                return Err(StoreError::DuplicateId(record.id().clone()));
            }
            if record.id().is_assigned() {
                store.records.push(record);
            } else {
                store.upsert(record)?;
            }
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    pub fn get(&self, id: &RecordId) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.position(id).is_some()
    }

    pub const fn next_sequence(&self) -> u64 {
        self.sequence.peek()
    }

    /// Sequence number carried by a stored id, if it came from this store's prefix.
    pub fn number_of(&self, id: &RecordId) -> Option<u64> {
        self.sequence.number_of(id)
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// Replaces the record with the same id, or appends it under a fresh id
    /// when its id is blank. A non-blank id that is not stored is stale.
    pub fn upsert(&mut self, mut record: R) -> Result<UpsertOutcome, StoreError> {
        if record.id().is_assigned() {
            let index = self
                .position(record.id())
                .ok_or_else(|| StoreError::NotFound(record.id().clone()))?;
            let id = record.id().clone();
            self.records[index] = record;
            return Ok(UpsertOutcome::Updated(id));
        }

        let mut id = self.sequence.next_id();
        while self.contains(&id) {
            id = self.sequence.next_id();
        }
        record.set_id(id.clone());
        self.records.push(record);
        Ok(UpsertOutcome::Inserted(id))
    }

    /// Applies `change` to the stored record and returns its result.
    pub fn update<T>(
        &mut self,
        id: &RecordId,
        change: impl FnOnce(&mut R) -> T,
    ) -> Result<T, StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(change(&mut self.records[index]))
    }

    /// Removes the record when present. Returns whether anything was removed.
    pub fn remove_by_id(&mut self, id: &RecordId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        }
    }
}

impl<R: Flaggable> RecordStore<R> {
    /// Flips the flag and returns the new value.
    pub fn toggle_flag(&mut self, id: &RecordId) -> Result<bool, StoreError> {
        self.update(id, |record| {
            let flagged = !record.is_flagged();
            record.set_flagged(flagged);
            flagged
        })
    }
}
