pub mod domain;
pub mod fallback;
pub mod filter;
pub mod memory;
pub mod normalizer;
pub mod ports;
pub mod retrieval;
pub mod schema;

pub use domain::{ChatRequest, ChatResponse, Course, Lecture, LectureListing, StoreStatus, Summary};
pub use fallback::{fallback_for, Fallback, FallbackParams, FALLBACK_VERSION};
pub use filter::Filter;
pub use memory::InMemoryStore;
pub use normalizer::normalize;
pub use ports::{
    ChatService, DocumentStore, PortError, PortResult, QueryOutcome, RawDocument, STORE_ID_FIELD,
};
pub use retrieval::RetrievalService;
pub use schema::{Entity, EntityKind, FieldSpec, ValidationError};
