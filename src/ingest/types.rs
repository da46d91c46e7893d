// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A configured feed: display name plus where to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// One parsed feed entry, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>, // None when missing/unparseable
    pub snippet: String,                     // plain text, HTML stripped
}

/// A keyword-relevant entry tagged with its dedupe identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub identifier: String,
    pub source_name: String,
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub snippet: String,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<FeedEntry>>;
    fn name(&self) -> &str;
}
