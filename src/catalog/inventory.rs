//! Space adjustments.
//!
//! The adjuster is the only code path that changes `spaces`. The read,
//! bounds check, and write happen inside `CatalogStore::with_record_mut`,
//! so two concurrent adjustments of the same lesson are serialized.

use std::sync::Arc;

use crate::catalog::store::CatalogStore;
use crate::catalog::types::{CatalogError, CatalogResult, Delta, LessonId, LessonRecord};

/// Applies validated deltas to lesson capacity.
#[derive(Debug, Clone)]
pub struct InventoryAdjuster {
    store: Arc<CatalogStore>,
}

impl InventoryAdjuster {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store }
    }

    /// Add `delta` to the lesson's spaces and return the updated record.
    ///
    /// Fails with `InsufficientCapacity` (state unchanged) if the result
    /// would be negative.
    pub fn adjust_spaces(&self, id: LessonId, delta: Delta) -> CatalogResult<LessonRecord> {
        let result = self.store.with_record_mut(id, |record| {
            let next = apply_delta(record.id, record.spaces, delta)?;
            record.spaces = next;
            Ok(record.clone())
        });

        match &result {
            Ok(record) => tracing::debug!(
                lesson_id = id,
                delta = delta.get(),
                spaces = record.spaces,
                "Spaces adjusted"
            ),
            Err(e) => tracing::warn!(lesson_id = id, delta = delta.get(), error = %e, "Adjustment rejected"),
        }

        result
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }
}

fn apply_delta(id: LessonId, spaces: u32, delta: Delta) -> CatalogResult<u32> {
    let next = i64::from(spaces)
        .checked_add(delta.get())
        .ok_or_else(|| CatalogError::InvalidInput("delta out of range".to_string()))?;

    if next < 0 {
        return Err(CatalogError::InsufficientCapacity {
            id,
            available: spaces,
            delta: delta.get(),
        });
    }

    u32::try_from(next)
        .map_err(|_| CatalogError::InvalidInput(format!("spaces would exceed {}", u32::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjuster() -> InventoryAdjuster {
        InventoryAdjuster::new(Arc::new(CatalogStore::seeded()))
    }

    #[test]
    fn decrement_then_reject_when_short() {
        let adjuster = adjuster();

        let updated = adjuster.adjust_spaces(5, Delta::new(-3)).unwrap();
        assert_eq!(updated.spaces, 2);

        let err = adjuster.adjust_spaces(5, Delta::new(-3)).unwrap_err();
        assert_eq!(
            err,
            CatalogError::InsufficientCapacity {
                id: 5,
                available: 2,
                delta: -3
            }
        );
        assert_eq!(adjuster.store().find_by_id(5).unwrap().spaces, 2);
    }

    #[test]
    fn unknown_lesson_is_not_found() {
        let err = adjuster().adjust_spaces(999, Delta::new(-1)).unwrap_err();
        assert_eq!(err, CatalogError::NotFound(999));
    }

    #[test]
    fn delta_and_inverse_restore_original() {
        let adjuster = adjuster();
        for delta in [-5, -1, 0, 1, 7] {
            let before = adjuster.store().find_by_id(2).unwrap().spaces;
            adjuster.adjust_spaces(2, Delta::new(delta)).unwrap();
            adjuster.adjust_spaces(2, Delta::new(-delta)).unwrap();
            assert_eq!(adjuster.store().find_by_id(2).unwrap().spaces, before);
        }
    }

    #[test]
    fn draining_to_zero_is_allowed() {
        let adjuster = adjuster();
        assert_eq!(adjuster.adjust_spaces(1, Delta::new(-5)).unwrap().spaces, 0);
        assert!(adjuster.adjust_spaces(1, Delta::new(-1)).is_err());
    }

    #[test]
    fn overflow_is_invalid_input() {
        let adjuster = adjuster();
        assert!(matches!(
            adjuster.adjust_spaces(1, Delta::new(i64::MAX)),
            Err(CatalogError::InvalidInput(_))
        ));
        assert!(matches!(
            adjuster.adjust_spaces(1, Delta::new(i64::from(u32::MAX))),
            Err(CatalogError::InvalidInput(_))
        ));
        assert_eq!(adjuster.store().find_by_id(1).unwrap().spaces, 5);
    }

    #[test]
    fn concurrent_decrements_never_go_negative() {
        let adjuster = adjuster();
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let adjuster = adjuster.clone();
                std::thread::spawn(move || adjuster.adjust_spaces(4, Delta::new(-1)).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 5);
        assert_eq!(adjuster.store().find_by_id(4).unwrap().spaces, 0);
    }
}
