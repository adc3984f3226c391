//! OpenAI LLM provider

use super::{ChatMessage, LlmError, LlmProvider};
use crate::relay::TextSink;
use std::io::{BufRead, BufReader};

/// OpenAI provider (chat completions API, streamed)
pub struct OpenAIProvider {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAIProvider {
    pub fn new(agent: ureq::Agent, api_key: &str, model: &str) -> Self {
        Self {
            agent,
            api_key: api_key.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.to_string(),
            temperature: 0.7,
        }
    }

    /// Point at an OpenAI-compatible endpoint
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

impl LlmProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
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
            "stream": true,
            "temperature": self.temperature
        });

        let response = self
            .agent
            .post(&format!("{}/chat/completions", self.base_url))
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)?;

        let reader = BufReader::new(response.into_reader());
        let mut full = String::new();

        for line in reader.lines() {
            let line = line?;

            let Some(data) = line.strip_prefix("data: ") else {
                continue;
            };

            if data == "[DONE]" {
                break;
            }

            if let Ok(json) = serde_json::from_str::<serde_json::Value>(data) {
                match parse_delta(&json)? {
                    Delta::Text(content) => {
                        output.write(&content);
                        full.push_str(&content);
                    }
                    Delta::Finished => break,
                    Delta::Empty => {}
                }
            }
        }

        if full.is_empty() {
            return Err(LlmError::MalformedResponse(
                "OpenAI returned no text".to_string(),
            ));
        }

        Ok(full)
    }
}

#[derive(Debug, PartialEq)]
enum Delta {
    Text(String),
    Finished,
    Empty,
}

/// Interpret one streamed `chat.completion.chunk`
fn parse_delta(json: &serde_json::Value) -> Result<Delta, LlmError> {
    // Check for errors
    if let Some(error) = json.get("error") {
        let error_msg = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(LlmError::Api {
            status: 500,
            message: error_msg.to_string(),
        });
    }

    let Some(choice) = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
    else {
        return Ok(Delta::Empty);
    };

    if let Some(content) = choice
        .get("delta")
        .and_then(|d| d.get("content"))
        .and_then(|c| c.as_str())
    {
        if !content.is_empty() {
            return Ok(Delta::Text(content.to_string()));
        }
    }

    match choice.get("finish_reason") {
        Some(reason) if !reason.is_null() => Ok(Delta::Finished),
        _ => Ok(Delta::Empty),
    }
}
