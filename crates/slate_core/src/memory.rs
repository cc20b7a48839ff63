//! crates/slate_core/src/memory.rs
//!
//! An in-process `DocumentStore`. Used by tests, and by the service when no
//! database is configured (in which case it stays closed).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::filter::Filter;
use crate::ports::{DocumentStore, PortError, PortResult, QueryOutcome, RawDocument, STORE_ID_FIELD};

/// Documents per collection, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<BTreeMap<String, Vec<RawDocument>>>,
    open: AtomicBool,
}

impl InMemoryStore {
    /// Creates an empty, open store.
    pub fn new() -> Self {
        let store = Self::closed();
        store.open();
        store
    }

    /// Creates an empty store that reports itself unavailable until opened.
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn is_available(&self) -> bool {
        self.is_open()
    }

    async fn list_collections(&self) -> Vec<String> {
        if !self.is_open() {
            return Vec::new();
        }
        match self.collections.read() {
            Ok(collections) => collections.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    async fn fetch(&self, collection: &str, filter: &Filter, limit: usize) -> QueryOutcome {
        if !self.is_open() {
            return QueryOutcome::Unavailable;
        }
        let Ok(collections) = self.collections.read() else {
            return QueryOutcome::Unavailable;
        };
        let documents = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(doc))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        QueryOutcome::from_documents(documents)
    }

    async fn insert(&self, collection: &str, mut document: RawDocument) -> PortResult<String> {
        if !self.is_open() {
            return Err(PortError::StoreUnavailable);
        }
        let id = Uuid::new_v4().to_string();
        document.insert(STORE_ID_FIELD.to_string(), Value::String(id.clone()));

        let mut collections = self
            .collections
            .write()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        debug!(collection, id = %id, "Inserted document");
        Ok(id)
    }

    async fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}
