//! Lesson catalog subsystem.
//!
//! # Data Flow
//! ```text
//! seed_lessons() at startup
//!     → store.rs (ordered records, per-record locking)
//!     → inventory.rs (validated deltas, the only writer of `spaces`)
//!     → HTTP handlers read snapshots / request adjustments
//! ```

pub mod inventory;
pub mod store;
pub mod types;

pub use inventory::InventoryAdjuster;
pub use store::CatalogStore;
pub use types::{CatalogError, CatalogResult, Delta, LessonId, LessonRecord};
