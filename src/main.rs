//! Borderadar service entrypoint.
//! Boots the Axum HTTP server: trigger endpoint, history endpoint, metrics,
//! and the optional in-process poller.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use borderadar::api::{self, AppState};
use borderadar::config::{Catalog, Settings};
use borderadar::metrics::Metrics;
use borderadar::pipeline::Pipeline;
use borderadar::scheduler::spawn_scheduler;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    borderadar::init_tracing();

    let settings = Settings::from_env();
    let catalog = Catalog::load_default().context("loading feed catalog")?;
    let pipeline = Pipeline::from_settings(&settings, &catalog).context("wiring pipeline")?;
    let state = AppState::new(pipeline);

    if let Some(every) = settings.poll_interval {
        tracing::info!(secs = every.as_secs(), "in-process poller enabled");
        spawn_scheduler(state.pipeline.clone(), every);
    }

    let mut router = api::router(state);
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics disabled"),
    }

    Ok(router.into())
}
