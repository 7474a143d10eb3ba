//! Lesson booking backend library.

pub mod api;
pub mod catalog;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod orders;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
