//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → observability::observer (timing, body capture)
//!     → api::handlers (catalog, inventory, orders, history)
//!     → response.rs (domain errors → status + JSON body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::{AppState, HttpServer};
