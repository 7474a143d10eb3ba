//! Lesson booking backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                  BOOKING SERVICE                     │
//!                 │                                                      │
//!   Request  ─────┼─▶ TraceLayer ─▶ observer ─▶ timeout ─▶ catch-panic  │
//!                 │                    │                      │          │
//!                 │                    ▼                      ▼          │
//!                 │             ┌────────────┐        ┌──────────────┐  │
//!                 │             │ RequestLog │        │ api handlers │  │
//!                 │             │ (ring buf) │        └──────┬───────┘  │
//!                 │             └────────────┘               │          │
//!                 │                            ┌─────────────┼────────┐ │
//!                 │                            ▼             ▼        ▼ │
//!                 │                      CatalogStore  Inventory  Orders│
//!                 │                                                      │
//!                 │  static files (ServeDir) for everything else        │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use lesson_booking::config::{loader::CONFIG_PATH_ENV, resolve_config};
use lesson_booking::lifecycle::startup;
use lesson_booking::observability::logging::init_tracing;

#[derive(Parser)]
#[command(name = "lesson-booking")]
#[command(about = "Lesson catalog and booking API", long_about = None)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(args.config.as_deref())?;

    init_tracing(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.listener.port,
        max_logs = config.observability.max_logs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Service failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
