//! pipeline.rs — one fetch → filter → dedupe → cap → notify → persist pass.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use serde::Serialize;
use std::sync::Arc;

use crate::config::{Catalog, Limits, Settings};
use crate::dedup;
use crate::ingest::{self, providers, types::FeedSource};
use crate::notify::{format_message, Delivery, Notifier, TelegramNotifier};
use crate::sector::{self, Sector};
use crate::store::{HistoricalEvent, StateStore};

/// Outcome of a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Notifications attempted (≤ notify cap).
    pub sent: usize,
    /// Of those, accepted by the channel.
    pub delivered: usize,
    /// Of those, rejected or failed in transit.
    pub failed: usize,
    /// Fresh, unique candidates before the cap.
    pub candidates: usize,
}

pub struct Pipeline {
    sources: Vec<Box<dyn FeedSource>>,
    keywords: Vec<String>,
    sectors: Vec<Sector>,
    store: StateStore,
    notifier: Arc<dyn Notifier>,
    limits: Limits,
}

impl Pipeline {
    pub fn new(
        sources: Vec<Box<dyn FeedSource>>,
        catalog: &Catalog,
        store: StateStore,
        notifier: Arc<dyn Notifier>,
        limits: Limits,
    ) -> Self {
        Self {
            sources,
            keywords: catalog.keywords.clone(),
            sectors: catalog.sectors.clone(),
            store,
            notifier,
            limits,
        }
    }

    /// Production wiring: HTTP feeds from the catalog, Gist store, Telegram.
    pub fn from_settings(settings: &Settings, catalog: &Catalog) -> Result<Self> {
        let client = providers::rss::feed_client()?;
        let sources = providers::from_catalog(catalog, &client);
        let store = StateStore::from_settings(settings).context("building state store")?;
        let notifier = TelegramNotifier::new(settings.telegram.clone())?;

        tracing::info!(
            target: "pipeline",
            sources = sources.len(),
            store = store.is_enabled(),
            telegram = notifier.is_enabled(),
            "pipeline configured"
        );
        Ok(Self::new(sources, catalog, store, Arc::new(notifier), settings.limits))
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub async fn run_once(&self) -> RunReport {
        self.run_at(Utc::now()).await
    }

    /// Run with an explicit clock (fetch time + fallback publish time).
    pub async fn run_at(&self, now: DateTime<Utc>) -> RunReport {
        counter!("pipeline_runs_total").increment(1);

        let mut state = self.store.load().await;

        let collected =
            ingest::collect(&self.sources, &self.keywords, self.limits.per_source, now).await;
        let mut fresh = dedup::dedupe(collected, &state.seen_identifiers);
        let candidates = fresh.len();
        fresh.truncate(self.limits.notify_cap);

        let mut report = RunReport {
            candidates,
            ..RunReport::default()
        };

        for item in &fresh {
            let sector = sector::classify(&format!("{} {}", item.title, item.snippet), &self.sectors);
            let text = format_message(item, sector);

            report.sent += 1;
            match self.notifier.send(&text).await {
                Ok(Delivery::Sent) => {
                    report.delivered += 1;
                    counter!("notify_sent_total").increment(1);
                }
                Ok(Delivery::Disabled) => {}
                Err(e) => {
                    // still recorded as seen below: no re-send storms on a flaky channel
                    report.failed += 1;
                    counter!("notify_failed_total").increment(1);
                    tracing::warn!(target: "notify", error = %e, source = %item.source_name, "send failed");
                }
            }

            state.record(
                HistoricalEvent::from_candidate(item, sector.cloned(), now),
                &self.limits,
            );
        }

        if let Err(e) = self.store.save(&state).await {
            counter!("store_errors_total").increment(1);
            tracing::warn!(target: "store", error = %e, "state save failed");
        }

        gauge!("pipeline_last_run_ts").set(now.timestamp() as f64);
        tracing::info!(
            target: "pipeline",
            candidates = report.candidates,
            sent = report.sent,
            delivered = report.delivered,
            failed = report.failed,
            "run finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::providers::rss::RssFeedProvider;
    use crate::store::MemoryStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        texts: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Notifier for Recorder {
        async fn send(&self, text: &str) -> Result<Delivery> {
            self.texts.lock().unwrap().push(text.to_string());
            Ok(Delivery::Sent)
        }
    }

    fn feed(items: &[(&str, &str)]) -> String {
        let body: String = items
            .iter()
            .map(|(t, l)| format!("<item><title>{t}</title><link>{l}</link></item>"))
            .collect();
        format!("<rss><channel>{body}</channel></rss>")
    }

    #[tokio::test]
    async fn second_run_surfaces_nothing_new() {
        let xml = feed(&[("Troop buildup at border", "https://a/1")]);
        let sources: Vec<Box<dyn FeedSource>> = vec![Box::new(RssFeedProvider::from_fixture("AP", &xml))];
        let backend = Arc::new(MemoryStore::new());
        let notifier = Arc::new(Recorder::default());
        let p = Pipeline::new(
            sources,
            &Catalog::default_seed(),
            StateStore::new(backend.clone(), "state.json"),
            notifier.clone(),
            Limits::default(),
        );

        assert_eq!(p.run_once().await.sent, 1);
        assert_eq!(p.run_once().await.sent, 0);
        assert_eq!(notifier.texts.lock().unwrap().len(), 1);
        assert_eq!(backend.write_count(), 2);
    }
}
