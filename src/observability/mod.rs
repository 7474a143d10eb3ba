//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → observer.rs (timing, body capture, one LogEntry per request)
//!     → request_log.rs (bounded FIFO history, queried by /api/logs)
//!     → logging.rs (console line with truncated body preview)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Request history is in memory and bounded; oldest entries go first
//! - Observation is best-effort: no failure here reaches the client
//! - Metrics are no-ops unless the Prometheus exporter is enabled

pub mod logging;
pub mod metrics;
pub mod observer;
pub mod request_log;

pub use observer::{observe_requests, RequestMeta, RequestObserver};
pub use request_log::{LogEntry, RequestLog};
