//! crates/slate_core/src/ports.rs
//!
//! Defines the service contracts (traits) at the boundary of the core.
//! Store drivers and response generators live outside this crate and plug in
//! through these traits.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{ChatRequest, ChatResponse};
use crate::filter::Filter;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The errors a caller of this core can observe.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Document store is unavailable")]
    StoreUnavailable,
    #[error("Malformed filter: {0}")]
    MalformedFilter(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// An unvalidated record as returned by a store. May carry the store key.
pub type RawDocument = Map<String, Value>;

/// Name of the store-internal identifier field in raw documents.
pub const STORE_ID_FIELD: &str = "_id";

/// The result of a read against the store, before it is collapsed for callers.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Found(Vec<RawDocument>),
    Empty,
    Unavailable,
}

impl QueryOutcome {
    /// Builds an outcome from a fetched batch, mapping no rows to `Empty`.
    pub fn from_documents(documents: Vec<RawDocument>) -> Self {
        if documents.is_empty() {
            Self::Empty
        } else {
            Self::Found(documents)
        }
    }

    pub fn into_documents(self) -> Vec<RawDocument> {
        match self {
            Self::Found(documents) => documents,
            Self::Empty | Self::Unavailable => Vec::new(),
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether a live connection exists. Never fails; any problem reads as `false`.
    async fn is_available(&self) -> bool;

    /// Known collection names, best-effort. Empty when unsupported or down.
    async fn list_collections(&self) -> Vec<String>;

    /// Fetches up to `limit` matching documents in store-native order.
    async fn fetch(&self, collection: &str, filter: &Filter, limit: usize) -> QueryOutcome;

    /// Creates one document and returns its store key.
    async fn insert(&self, collection: &str, document: RawDocument) -> PortResult<String>;

    /// Releases the connection. Later reads report the store as unavailable.
    async fn close(&self);

    /// Like `fetch`, with "store down" and "no match" both reading as no documents.
    async fn query(&self, collection: &str, filter: &Filter, limit: usize) -> Vec<RawDocument> {
        self.fetch(collection, filter, limit).await.into_documents()
    }
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Produces a reply for a chat message, optionally grounded in course context.
    async fn reply(&self, request: &ChatRequest) -> PortResult<ChatResponse>;
}
