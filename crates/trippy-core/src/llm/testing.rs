//! Helpers for driving providers against a mock server

use super::{ChatMessage, LlmError, LlmProvider};
use crate::relay::TextSink;

/// Keeps every write as its own chunk
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub chunks: Vec<String>,
}

impl TextSink for RecordingSink {
    fn write(&mut self, text: &str) -> usize {
        self.chunks.push(text.to_string());
        text.chars().count()
    }

    fn label(&self) -> &str {
        "recording"
    }
}

/// Run one blocking chat off the async runtime, returning its result and the
/// chunks it streamed
pub async fn stream_chat<P>(provider: P) -> (Result<String, LlmError>, Vec<String>)
where
    P: LlmProvider + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let messages = [
            ChatMessage::system("You are a travel agent"),
            ChatMessage::user("Plan a week in Bali"),
        ];
        let mut sink = RecordingSink::default();
        let result = provider.chat(&messages, &mut sink);
        (result, sink.chunks)
    })
    .await
    .unwrap()
}
