// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::pipeline::Pipeline;

/// Run the pipeline every `every`, first tick immediately.
/// For deployments without an external cron hitting `/api/fetch-news`.
pub fn spawn_scheduler(pipeline: Arc<Pipeline>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let report = pipeline.run_once().await;
            tracing::debug!(target: "pipeline", sent = report.sent, "scheduled tick");
        }
    })
}
