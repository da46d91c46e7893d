use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe_all();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_all() {
    describe_counter!("pipeline_runs_total", "Pipeline runs started.");
    describe_counter!("pipeline_failures_total", "Runs aborted at the HTTP boundary.");
    describe_counter!("feed_items_total", "Entries parsed from feeds.");
    describe_counter!("feed_errors_total", "Feed fetch/parse failures.");
    describe_counter!("candidates_kept_total", "Entries that passed keyword filtering.");
    describe_counter!("dedup_seen_total", "Candidates dropped as already notified.");
    describe_counter!("dedup_title_total", "Candidates dropped as same-title duplicates.");
    describe_counter!("notify_sent_total", "Messages accepted by the channel.");
    describe_counter!("notify_failed_total", "Messages that failed to send.");
    describe_counter!("store_errors_total", "State load/save failures.");
    describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
    describe_gauge!("ingest_last_run_ts", "Unix ts when feeds were last polled.");
    describe_gauge!("pipeline_last_run_ts", "Unix ts when the pipeline last finished.");
}
