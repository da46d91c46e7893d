// src/ingest/providers/mod.rs
pub mod rss;

use crate::config::Catalog;
use crate::ingest::types::FeedSource;

/// One HTTP RSS provider per catalog source, in declaration order.
pub fn from_catalog(catalog: &Catalog, client: &reqwest::Client) -> Vec<Box<dyn FeedSource>> {
    catalog
        .sources
        .iter()
        .map(|s| Box::new(rss::RssFeedProvider::from_source(s, client.clone())) as Box<dyn FeedSource>)
        .collect()
}
