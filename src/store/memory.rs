// src/store/memory.rs
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{KvStore, StoreError};

/// In-process blob store for local runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(key: &str, doc: &str) -> Self {
        let s = Self::new();
        s.lock().insert(key.to_string(), doc.to_string());
        s
    }

    pub fn doc(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Number of successful `put` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // a poisoned map is still a usable map
        self.docs.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, doc: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), doc.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
