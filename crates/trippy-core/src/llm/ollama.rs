//! Ollama LLM provider
//!
//! Connects to a local Ollama instance; the response streams as one JSON
//! object per line.

use super::{ChatMessage, LlmError, LlmProvider};
use crate::relay::TextSink;
use std::io::{BufRead, BufReader};

/// Ollama provider for local LLM inference
pub struct OllamaProvider {
    agent: ureq::Agent,

    /// Base URL for Ollama API
    base_url: String,

    model: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    pub fn new(agent: ureq::Agent, base_url: &str, model: &str) -> Self {
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

impl LlmProvider for OllamaProvider {
    fn id(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn chat(
        &self,
        messages: &[ChatMessage],
        output: &mut dyn TextSink,
    ) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages.iter().map(ChatMessage::to_json).collect::<Vec<_>>(),
            "stream": true
        });

        let response = self
            .agent
            .post(&format!("{}/api/chat", self.base_url))
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| match LlmError::from(e) {
                LlmError::Api { status: 404, .. } => {
                    LlmError::InvalidRequest(format!("model {} is not pulled", self.model))
                }
                other => other,
            })?;

        let reader = BufReader::new(response.into_reader());
        let mut full = String::new();

        for line in reader.lines() {
            let line = line?;

            if line.is_empty() {
                continue;
            }

            let json: serde_json::Value = serde_json::from_str(&line)?;

            if let Some(error) = json.get("error").and_then(|e| e.as_str()) {
                return Err(LlmError::Api {
                    status: 500,
                    message: error.to_string(),
                });
            }

            if let Some(content) = json
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str())
            {
                if !content.is_empty() {
                    output.write(content);
                    full.push_str(content);
                }
            }

            if json.get("done").and_then(|v| v.as_bool()).unwrap_or(false) {
                break;
            }
        }

        if full.is_empty() {
            return Err(LlmError::MalformedResponse(
                "Ollama returned no text".to_string(),
            ));
        }

        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::stream_chat;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(body: &str, status: u16) -> (MockServer, OllamaProvider) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(status).set_body_raw(body.to_string(), "application/x-ndjson"),
            )
            .mount(&server)
            .await;
        let provider = OllamaProvider::new(ureq::agent(), &format!("{}/", server.uri()), "llama3");
        (server, provider)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_streams_until_done() {
        let body = concat!(
            r#"{"message":{"role":"assistant","content":"Day 1"},"done":false}"#,
            "\n\n",
            r#"{"message":{"role":"assistant","content":": Ubud"},"done":false}"#,
            "\n",
            r#"{"message":{"role":"assistant","content":""},"done":true}"#,
            "\n",
            r#"{"message":{"role":"assistant","content":"after done"},"done":false}"#,
            "\n",
        );
        let (_server, provider) = provider_for(body, 200).await;

        let (result, chunks) = stream_chat(provider).await;
        assert_eq!(result.unwrap(), "Day 1: Ubud");
        assert_eq!(chunks, vec!["Day 1".to_string(), ": Ubud".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_model_is_not_pulled() {
        let (_server, provider) = provider_for(r#"{"error":"model 'llama3' not found"}"#, 404).await;

        let (result, chunks) = stream_chat(provider).await;
        assert_eq!(
            result.unwrap_err(),
            LlmError::InvalidRequest("model llama3 is not pulled".to_string())
        );
        assert!(chunks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_error_line_and_empty_stream() {
        let (_server, provider) = provider_for("{\"error\":\"out of memory\"}\n", 200).await;
        let (result, _) = stream_chat(provider).await;
        assert_eq!(
            result.unwrap_err(),
            LlmError::Api {
                status: 500,
                message: "out of memory".to_string()
            }
        );

        let (_server, provider) =
            provider_for("{\"message\":{\"content\":\"\"},\"done\":true}\n", 200).await;
        let (result, _) = stream_chat(provider).await;
        assert!(matches!(result, Err(LlmError::MalformedResponse(_))));
    }
}
