//! Checkout validation and the in-memory order book.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::{CatalogError, CatalogStore};
use crate::orders::types::{CheckoutRequest, Order, OrderError, OrderResult};

const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

/// Accepts checkout requests and keeps the resulting orders.
#[derive(Clone)]
pub struct OrderBook {
    catalog: Arc<CatalogStore>,
    orders: Arc<DashMap<Uuid, Order>>,
}

impl OrderBook {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        Self {
            catalog,
            orders: Arc::new(DashMap::new()),
        }
    }

    /// Validate a checkout and record it as an order.
    pub fn checkout(&self, request: CheckoutRequest) -> OrderResult<Order> {
        let name = validate_name(&request.name)?;
        let phone = validate_phone(&request.phone)?;
        self.validate_items(&request)?;

        let order = Order {
            id: Uuid::new_v4(),
            name,
            phone,
            items: request.items,
            created_at: Utc::now(),
        };

        self.orders.insert(order.id, order.clone());
        tracing::info!(order_id = %order.id, items = order.items.len(), "Order accepted");

        Ok(order)
    }

    /// Get an order by ID.
    pub fn get(&self, id: Uuid) -> OrderResult<Order> {
        self.orders
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(OrderError::NotFound(id))
    }

    pub fn count(&self) -> usize {
        self.orders.len()
    }

    fn validate_items(&self, request: &CheckoutRequest) -> OrderResult<()> {
        if request.items.is_empty() {
            return Err(OrderError::invalid("items", "at least one lesson is required"));
        }
        for item in &request.items {
            if item.spaces == 0 {
                return Err(OrderError::invalid(
                    "items",
                    format!("lesson {} must book at least one space", item.lesson_id),
                ));
            }
            if !self.catalog.contains(item.lesson_id) {
                return Err(CatalogError::NotFound(item.lesson_id).into());
            }
        }
        Ok(())
    }
}

fn validate_name(raw: &str) -> OrderResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(OrderError::invalid("name", "must not be empty"));
    }
    if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(OrderError::invalid("name", "letters and spaces only"));
    }
    Ok(name.to_string())
}

fn validate_phone(raw: &str) -> OrderResult<String> {
    let phone = raw.trim();
    if !phone.chars().all(|c| c.is_ascii_digit()) || !PHONE_DIGITS.contains(&phone.len()) {
        return Err(OrderError::invalid(
            "phone",
            format!("{}-{} digits required", PHONE_DIGITS.start(), PHONE_DIGITS.end()),
        ));
    }
    Ok(phone.to_string())
}
