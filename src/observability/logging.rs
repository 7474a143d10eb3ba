//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Render request bodies for the console without ever failing
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config and `RUST_LOG`

use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Appended to a body preview that was cut short.
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Printed in place of a body that could not be serialized.
pub const UNSERIALIZABLE_BODY: &str = "[unserializable body]";

/// Install the global subscriber. `RUST_LOG` takes precedence over config.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "lesson_booking={level},tower_http={level}",
            level = config.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

/// Whether a request body carries anything worth recording.
pub fn has_fields(body: &Value) -> bool {
    match body {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

/// Serialize `body` for a console line, capped at `max_chars` characters.
///
/// Serialization failures produce [`UNSERIALIZABLE_BODY`] instead of an error.
pub fn preview_body<T: Serialize + ?Sized>(body: &T, max_chars: usize) -> String {
    match serde_json::to_string(body) {
        Ok(json) => truncate_chars(json, max_chars),
        Err(e) => {
            tracing::debug!(error = %e, "Request body not serializable");
            UNSERIALIZABLE_BODY.to_string()
        }
    }
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text,
    }
}
