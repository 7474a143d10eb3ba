//! In-memory lesson store.
//!
//! # Responsibilities
//! - Hold lesson records in seed order
//! - Serve snapshots and lookups
//! - Lend exclusive per-record access to the inventory adjuster
//!
//! Records live in a `DashMap` keyed by id so a write guard on one lesson
//! never blocks reads or writes of another. Iteration order comes from a
//! separate immutable id list.

use dashmap::DashMap;
use std::collections::HashSet;

use crate::catalog::types::{seed_lessons, CatalogError, CatalogResult, LessonId, LessonRecord};

/// Ordered, process-local collection of lessons.
#[derive(Debug)]
pub struct CatalogStore {
    order: Vec<LessonId>,
    records: DashMap<LessonId, LessonRecord>,
}

impl CatalogStore {
    /// Store populated with the built-in seed set.
    pub fn seeded() -> Self {
        // Seed data is static and known to be valid.
        Self::build(seed_lessons())
    }

    /// Build a store from an explicit record set.
    ///
    /// Rejects duplicate ids and prices that are negative or not finite.
    pub fn from_records(records: Vec<LessonRecord>) -> CatalogResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(CatalogError::InvalidInput(format!(
                    "duplicate lesson id {}",
                    record.id
                )));
            }
            if !record.price.is_finite() || record.price < 0.0 {
                return Err(CatalogError::InvalidInput(format!(
                    "lesson {} has invalid price {}",
                    record.id, record.price
                )));
            }
        }
        Ok(Self::build(records))
    }

    fn build(records: Vec<LessonRecord>) -> Self {
        let order = records.iter().map(|r| r.id).collect();
        let records = records.into_iter().map(|r| (r.id, r)).collect();
        Self { order, records }
    }

    /// Snapshot of every lesson in seed order.
    pub fn list(&self) -> Vec<LessonRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| r.value().clone()))
            .collect()
    }

    /// Look up one lesson.
    pub fn find_by_id(&self, id: LessonId) -> CatalogResult<LessonRecord> {
        self.records
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(CatalogError::NotFound(id))
    }

    pub fn contains(&self, id: LessonId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Run `f` while holding the exclusive guard for `id`.
    ///
    /// `f` must not block or await: the shard stays write-locked until it returns.
    pub(crate) fn with_record_mut<R>(
        &self,
        id: LessonId,
        f: impl FnOnce(&mut LessonRecord) -> CatalogResult<R>,
    ) -> CatalogResult<R> {
        let mut guard = self.records.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        f(guard.value_mut())
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::seeded()
    }
}
