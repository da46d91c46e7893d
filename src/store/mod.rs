// src/store/mod.rs
//! Persisted watcher state: one JSON document holding the seen-identifier list
//! and the rolling event history, kept in a generic key-value blob store.
//!
//! `StateStore::load` never fails (unreachable or malformed reads as empty).
//! `StateStore::save` overwrites the whole document; last writer wins.

pub mod gist;
pub mod memory;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::{Limits, Settings};
use crate::ingest::parse_timestamp;
use crate::ingest::types::CandidateItem;
use crate::sector::Sector;

pub use gist::GistStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store answered HTTP {status}")]
    Status { status: u16 },
    #[error("state document encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Narrow blob interface so a stronger backend can replace the gist.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    /// `Ok(None)` when the key does not exist yet.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, doc: &str) -> Result<(), StoreError>;
}

/// An event that was surfaced (notification attempted) in some run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEvent {
    #[serde(alias = "id")]
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(alias = "pubDate", deserialize_with = "de_timestamp")]
    pub published_at: DateTime<Utc>,
    #[serde(alias = "source")]
    pub source_name: String,
    #[serde(default)]
    pub sector: Option<Sector>,
    #[serde(deserialize_with = "de_timestamp")]
    pub fetched_at: DateTime<Utc>,
}

impl HistoricalEvent {
    pub fn from_candidate(item: &CandidateItem, sector: Option<Sector>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            identifier: item.identifier.clone(),
            title: item.title.clone(),
            link: item.link.clone(),
            published_at: item.published_at,
            source_name: item.source_name.clone(),
            sector,
            fetched_at,
        }
    }
}

// Older documents carry RSS-style `pubDate` strings.
fn de_timestamp<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(d)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("bad timestamp `{raw}`")))
}

/// One history entry. Entries that do not read as a `HistoricalEvent` (an odd
/// `pubDate`, a missing field) are carried through the next save untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredEvent {
    Known(HistoricalEvent),
    Opaque(Value),
}

impl StoredEvent {
    pub fn known(&self) -> Option<&HistoricalEvent> {
        match self {
            Self::Known(ev) => Some(ev),
            Self::Opaque(_) => None,
        }
    }
}

impl From<HistoricalEvent> for StoredEvent {
    fn from(ev: HistoricalEvent) -> Self {
        Self::Known(ev)
    }
}

impl<'de> Deserialize<'de> for StoredEvent {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(d)?;
        Ok(match HistoricalEvent::deserialize(&raw) {
            Ok(ev) => Self::Known(ev),
            Err(_) => Self::Opaque(raw),
        })
    }
}

// A wrong-typed list reads as empty; stray non-string ids are skipped.
fn de_identifiers<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(xs) => xs
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn de_events<'de, D>(d: D) -> Result<Vec<StoredEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(d)? {
        Value::Array(xs) => xs
            .into_iter()
            .map(|v| StoredEvent::deserialize(v).map_err(<D::Error as serde::de::Error>::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

/// Only a document that is not a JSON object counts as malformed; field-level
/// oddities are tolerated so one bad entry never wipes the state on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Append-only per run; oldest first.
    #[serde(default, alias = "lastIds", deserialize_with = "de_identifiers")]
    pub seen_identifiers: Vec<String>,
    /// Newest first.
    #[serde(default, deserialize_with = "de_events")]
    pub events: Vec<StoredEvent>,
}

impl PersistedState {
    /// Mark the event's identifier as seen and prepend it to the history.
    pub fn record(&mut self, event: HistoricalEvent, limits: &Limits) {
        self.seen_identifiers.push(event.identifier.clone());
        if let Some(cap) = limits.max_seen {
            if self.seen_identifiers.len() > cap {
                let excess = self.seen_identifiers.len() - cap;
                self.seen_identifiers.drain(0..excess);
            }
        }

        self.events.insert(0, event.into());
        self.events.truncate(limits.max_events);
    }

    /// History entries this version can read, newest first.
    pub fn known_events(&self) -> impl Iterator<Item = &HistoricalEvent> {
        self.events.iter().filter_map(StoredEvent::known)
    }
}

/// Loads/saves the state document; a store without backend is a no-op.
#[derive(Clone)]
pub struct StateStore {
    backend: Option<Arc<dyn KvStore>>,
    key: String,
}

impl StateStore {
    pub fn new(backend: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            backend: Some(backend),
            key: key.into(),
        }
    }

    /// No credentials: loads empty, saves nothing.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            key: String::new(),
        }
    }

    /// Gist-backed when credentials are present, otherwise disabled.
    pub fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        match &settings.gist {
            Some(g) => Ok(Self::new(Arc::new(GistStore::from_settings(g)?), g.file_name.clone())),
            None => Ok(Self::disabled()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Raw document text; `None` when disabled, missing, or unreachable.
    pub async fn load_document(&self) -> Option<String> {
        let Some(backend) = &self.backend else {
            tracing::debug!(target: "store", "state store disabled (no credentials)");
            return None;
        };

        match backend.get(&self.key).await {
            Ok(Some(doc)) => Some(doc),
            Ok(None) => {
                tracing::info!(target: "store", key = %self.key, "no state document yet");
                None
            }
            Err(e) => {
                tracing::warn!(target: "store", error = %e, "state load failed; starting empty");
                counter!("store_errors_total").increment(1);
                None
            }
        }
    }

    pub async fn load(&self) -> PersistedState {
        let Some(doc) = self.load_document().await else {
            return PersistedState::default();
        };

        match serde_json::from_str(&doc) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(target: "store", error = %e, "state document malformed; starting empty");
                counter!("store_errors_total").increment(1);
                PersistedState::default()
            }
        }
    }

    pub async fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        let Some(backend) = &self.backend else {
            tracing::debug!(target: "store", "state store disabled; skipping save");
            return Ok(());
        };
        let doc = serde_json::to_string_pretty(state)?;
        backend.put(&self.key, &doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ev(id: &str) -> HistoricalEvent {
        let t = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        HistoricalEvent {
            identifier: id.into(),
            title: format!("t-{id}"),
            link: format!("l-{id}"),
            published_at: t,
            source_name: "AP".into(),
            sector: None,
            fetched_at: t,
        }
    }

    #[test]
    fn record_prepends_and_caps_events() {
        let limits = Limits {
            max_events: 2,
            ..Limits::default()
        };
        let mut s = PersistedState::default();
        for id in ["a", "b", "c"] {
            s.record(ev(id), &limits);
        }
        let ids: Vec<&str> = s.known_events().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert_eq!(s.seen_identifiers, vec!["a", "b", "c"]);
    }

    #[test]
    fn seen_cap_drops_oldest() {
        let limits = Limits {
            max_seen: Some(2),
            ..Limits::default()
        };
        let mut s = PersistedState::default();
        for id in ["a", "b", "c"] {
            s.record(ev(id), &limits);
        }
        assert_eq!(s.seen_identifiers, vec!["b", "c"]);
    }

    #[test]
    fn reads_legacy_document_shape() {
        let doc = r#"{
            "lastIds": ["x1"],
            "events": [{
                "id": "x1",
                "title": "Clash",
                "link": "https://l",
                "pubDate": "Mon, 19 Oct 2026 10:00:00 GMT",
                "source": "BBC",
                "sector": {"id":"surin","name":"Surin / Sisaket","lat":14.8,"lon":103.5,"keywords":["surin","sisaket"]},
                "fetchedAt": "2026-10-19T10:05:00.000Z"
            }]
        }"#;
        let s: PersistedState = serde_json::from_str(doc).unwrap();
        assert_eq!(s.seen_identifiers, vec!["x1"]);
        let ev = s.events[0].known().expect("legacy event readable");
        assert_eq!(ev.source_name, "BBC");
        assert_eq!(ev.sector.as_ref().unwrap().latitude, 14.8);
    }

    #[test]
    fn writes_camel_case_document() {
        let mut s = PersistedState::default();
        s.record(ev("a"), &Limits::default());
        let v = serde_json::to_value(&s).unwrap();
        assert!(v.get("seenIdentifiers").is_some());
        assert!(v["events"][0].get("publishedAt").is_some());
        assert!(v["events"][0].get("sourceName").is_some());
        assert!(v["events"][0]["sector"].is_null());
    }

    #[test]
    fn unreadable_event_is_kept_verbatim_next_to_good_ones() {
        let doc = r#"{
            "lastIds": ["a", "b", "c"],
            "events": [
                {"id":"b","title":"Shelling","link":"https://b","pubDate":"Sat, 19 Oct 2026 10:00:00 GMT","source":"AP","sector":null,"fetchedAt":"2026-10-19T10:05:00Z"},
                {"id":"a","title":"Clash","link":"https://a","pubDate":"Mon, 19 Oct 2026 09:00:00 GMT","source":"BBC","sector":null,"fetchedAt":"2026-10-19T09:05:00Z"}
            ]
        }"#;
        let mut s: PersistedState = serde_json::from_str(doc).unwrap();
        assert_eq!(s.seen_identifiers, vec!["a", "b", "c"]);
        assert_eq!(s.events.len(), 2);
        assert!(s.events[0].known().is_none());
        assert_eq!(s.events[1].known().map(|e| e.identifier.as_str()), Some("a"));

        s.record(ev("d"), &Limits::default());
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["seenIdentifiers"].as_array().unwrap().len(), 4);
        assert_eq!(v["events"][1]["pubDate"], "Sat, 19 Oct 2026 10:00:00 GMT");
        assert_eq!(v["events"][1]["source"], "AP");
    }

    #[test]
    fn wrong_typed_fields_read_as_empty() {
        let s: PersistedState =
            serde_json::from_str(r#"{"seenIdentifiers":["a",7,null],"events":{"x":1}}"#).unwrap();
        assert_eq!(s.seen_identifiers, vec!["a"]);
        assert!(s.events.is_empty());
    }
}
