//! Catalog types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identifier of a lesson. Unique for the lifetime of a store.
pub type LessonId = u32;

/// A bookable lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub id: LessonId,
    pub title: String,
    pub location: String,
    pub price: f64,
    /// Remaining bookable capacity.
    pub spaces: u32,
    /// Icon name used by the front-end.
    pub icon: String,
}

impl LessonRecord {
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        location: impl Into<String>,
        price: f64,
        spaces: u32,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            location: location.into(),
            price,
            spaces,
            icon: icon.into(),
        }
    }
}

/// The fixed record set every store starts from.
pub fn seed_lessons() -> Vec<LessonRecord> {
    vec![
        LessonRecord::new(1, "Math", "Hendon", 100.0, 5, "fa-calculator"),
        LessonRecord::new(2, "English", "Colindale", 80.0, 5, "fa-book"),
        LessonRecord::new(3, "Science", "Brent Cross", 90.0, 5, "fa-flask"),
        LessonRecord::new(4, "Music", "Golders Green", 70.0, 5, "fa-music"),
        LessonRecord::new(5, "Art", "Hendon", 60.0, 5, "fa-palette"),
        LessonRecord::new(6, "History", "Colindale", 75.0, 5, "fa-landmark"),
        LessonRecord::new(7, "Geography", "Brent Cross", 65.0, 5, "fa-globe"),
        LessonRecord::new(8, "Coding", "Golders Green", 120.0, 5, "fa-code"),
        LessonRecord::new(9, "Drama", "Hendon", 55.0, 5, "fa-masks-theater"),
        LessonRecord::new(10, "Chess", "Mill Hill", 50.0, 5, "fa-chess"),
    ]
}

/// Signed adjustment to a lesson's spaces, already validated as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta(i64);

impl Delta {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Parse the `delta` field of a JSON request body.
    ///
    /// Only JSON integers (or floats with no fractional part) are accepted.
    pub fn from_json(body: &Value) -> CatalogResult<Self> {
        let raw = body
            .get("delta")
            .ok_or_else(|| CatalogError::InvalidInput("delta is required".to_string()))?;

        if let Some(value) = raw.as_i64() {
            return Ok(Self(value));
        }

        match raw.as_f64() {
            Some(value)
                if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 =>
            {
                Ok(Self(value as i64))
            }
            Some(_) => Err(CatalogError::InvalidInput("delta must be an integer".to_string())),
            None => Err(CatalogError::InvalidInput("delta must be a number".to_string())),
        }
    }
}

/// Errors raised by the catalog and inventory adjuster.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// No lesson with this id.
    #[error("Lesson {0} not found")]
    NotFound(LessonId),

    /// Malformed input (delta, id, or record set).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The adjustment would leave fewer than zero spaces.
    #[error("Not enough spaces for lesson {id}: {available} available, delta {delta}")]
    InsufficientCapacity {
        id: LessonId,
        available: u32,
        delta: i64,
    },
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
