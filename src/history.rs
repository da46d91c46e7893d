//! history.rs — read-only view of the persisted event history.

use serde_json::Value;

use crate::store::StateStore;

/// The stored `events` array exactly as written (newest first); empty when
/// the store is disabled, unreachable, or holds something that is not JSON.
pub async fn latest_events(store: &StateStore) -> Vec<Value> {
    let Some(doc) = store.load_document().await else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(&doc) {
        Ok(mut v) => match v.get_mut("events").map(Value::take) {
            Some(Value::Array(events)) => events,
            _ => Vec::new(),
        },
        Err(e) => {
            tracing::warn!(target: "store", error = %e, "state document malformed; no history");
            Vec::new()
        }
    }
}
