//! services/api/src/adapters/chat.rs
//!
//! The chat adapter. Response generation is not wired to a model; it returns
//! a fixed assistant reply so the chat endpoint has a stable contract.

use async_trait::async_trait;
use slate_core::domain::{ChatRequest, ChatResponse};
use slate_core::ports::{ChatService, PortResult};
use tracing::debug;

pub const MOCK_REPLY: &str = "Here's a helpful explanation based on your course context. \
I'm a demo AI assistant in Slate LMS.";

pub const MOCK_SOURCES: [&str; 2] = ["Course materials", "Lecture notes"];

/// An adapter that implements `ChatService` with a canned reply.
#[derive(Clone, Default)]
pub struct MockChatAdapter;

impl MockChatAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatService for MockChatAdapter {
    async fn reply(&self, request: &ChatRequest) -> PortResult<ChatResponse> {
        debug!(
            message_len = request.message.len(),
            has_context = request.context.is_some(),
            "Answering chat message"
        );
        Ok(ChatResponse {
            reply: MOCK_REPLY.to_string(),
            sources: Some(MOCK_SOURCES.iter().map(|s| s.to_string()).collect()),
        })
    }
}
