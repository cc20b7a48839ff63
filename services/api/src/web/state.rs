//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use slate_core::ports::{ChatService, DocumentStore};
use slate_core::retrieval::RetrievalService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub retrieval: RetrievalService,
    pub chat: Arc<dyn ChatService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        chat: Arc<dyn ChatService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            retrieval: RetrievalService::new(store),
            chat,
            config,
        }
    }
}
