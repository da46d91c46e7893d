// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod dedup;
pub mod history;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod scheduler;
pub mod sector;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::pipeline::{Pipeline, RunReport};
pub use crate::store::{HistoricalEvent, PersistedState, StateStore, StoredEvent};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "borderadar=info,ingest=info,pipeline=info,store=info,notify=info,warn";

/// Compact fmt logs filtered by `RUST_LOG` (default: info for our targets, warn elsewhere).
/// Uses `try_init`, so a subscriber installed by the platform wins.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
