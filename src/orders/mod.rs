//! Checkout handling.

pub mod book;
pub mod types;

pub use book::OrderBook;
pub use types::{CheckoutRequest, Order, OrderError, OrderItem};
