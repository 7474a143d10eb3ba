//! Checkout types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{CatalogError, LessonId};

/// One line of a checkout: how many spaces of which lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub lesson_id: LessonId,
    pub spaces: u32,
}

/// Payload posted by the front-end at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// An accepted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

/// Errors raised while accepting or looking up orders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    /// A field failed format validation.
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// An item references a lesson the catalog doesn't have.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// No order with this id.
    #[error("Order {0} not found")]
    NotFound(Uuid),
}

impl OrderError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for order operations.
pub type OrderResult<T> = Result<T, OrderError>;
