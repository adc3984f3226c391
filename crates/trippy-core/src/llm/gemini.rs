//! Gemini (Google AI) LLM provider
//!
//! Connects to Google's Gemini API and streams completions over SSE.

use super::{ChatMessage, LlmError, LlmProvider};
use crate::llm::message::Role;
use crate::relay::TextSink;
use std::io::{BufRead, BufReader};

/// Gemini provider for Google AI
pub struct GeminiProvider {
    agent: ureq::Agent,

    /// API key
    api_key: String,

    /// Base URL for the API
    base_url: String,

    model: String,

    temperature: f32,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(agent: ureq::Agent, api_key: &str, model: &str) -> Self {
        Self {
            agent,
            api_key: api_key.to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: model.to_string(),
            temperature: 0.7,
        }
    }

    /// Create with a specific base URL
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

impl LlmProvider for GeminiProvider {
    fn id(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn chat(
        &self,
        messages: &[ChatMessage],
        output: &mut dyn TextSink,
    ) -> Result<String, LlmError> {
        let body = request_body(messages, self.temperature);

        // Use streamGenerateContent endpoint
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );

        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", &self.api_key)
            .send_json(&body)?;

        let reader = BufReader::new(response.into_reader());
        let mut full = String::new();

        for line in reader.lines() {
            let line = line?;

            let Some(data) = line.strip_prefix("data: ") else {
                continue;
            };

            let json: serde_json::Value = match serde_json::from_str(data) {
                Ok(json) => json,
                Err(_) => continue,
            };

            let text = chunk_text(&json)?;
            if !text.is_empty() {
                output.write(&text);
                full.push_str(&text);
            }
        }

        if full.is_empty() {
            return Err(LlmError::MalformedResponse(
                "Gemini returned no text".to_string(),
            ));
        }

        Ok(full)
    }
}

/// Convert messages to Gemini format
///
/// Gemini takes the system prompt as `system_instruction` rather than a role.
fn request_body(messages: &[ChatMessage], temperature: f32) -> serde_json::Value {
    let mut contents: Vec<serde_json::Value> = Vec::new();
    let mut system_instruction = String::new();

    for msg in messages {
        let role = match msg.role {
            Role::System => {
                if !system_instruction.is_empty() {
                    system_instruction.push('\n');
                }
                system_instruction.push_str(&msg.content);
                continue;
            }
            Role::Assistant => "model",
            Role::User => "user",
        };

        contents.push(serde_json::json!({
            "role": role,
            "parts": [{ "text": msg.content }]
        }));
    }

    let mut body = serde_json::json!({
        "contents": contents,
        "generationConfig": {
            "maxOutputTokens": 8192,
            "temperature": temperature
        }
    });

    if !system_instruction.is_empty() {
        body["system_instruction"] = serde_json::json!({
            "parts": [{ "text": system_instruction }]
        });
    }

    body
}

/// Extract text from one streamed chunk, surfacing embedded API errors
fn chunk_text(json: &serde_json::Value) -> Result<String, LlmError> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        let status = error.get("code").and_then(|c| c.as_u64()).unwrap_or(500) as u16;
        if status == 429 {
            return Err(LlmError::RateLimited { retry_after: None });
        }
        return Err(LlmError::Api {
            status,
            message: message.to_string(),
        });
    }

    let mut text = String::new();
    let parts = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .into_iter()
        .flatten()
        .filter_map(|candidate| candidate.get("content")?.get("parts")?.as_array())
        .flatten();
    for part in parts {
        if let Some(t) = part.get("text").and_then(|t| t.as_str()) {
            text.push_str(t);
        }
    }
    Ok(text)
}
