//! Language-model seam: the generator trait, prompts, and reply cleaning.

use crate::error::{CanvasError, Result};
use crate::ir::Archetype;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A\s*```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?```\s*\z").unwrap());

pub const CANVAS_SYSTEM_PROMPT: &str = r#"You produce canvas documents as JSON.
Reply with a single JSON object and nothing else:
{"nodes": [{"id": "...", "type": "text"|"group", "x": 0, "y": 0, "width": 200, "height": 100, "text": "...", "label": "...", "color": "1"-"6"}],
 "edges": [{"id": "...", "fromNode": "...", "toNode": "...", "fromSide": "top"|"right"|"bottom"|"left", "toSide": "...", "label": "..."}]}
Group nodes carry a label, text nodes carry text. Every edge must reference node ids you defined."#;

pub const TASKS_SYSTEM_PROMPT: &str = r#"You break work down into tasks.
Reply with a JSON array and nothing else. Each element is
{"title": "...", "description": "...", "status": "todo"|"in progress"|"review"|"done", "priority": "low"|"medium"|"high", "due": "YYYY-MM-DD" or omitted}."#;

/// Black-box text generation. One request, one reply or failure; no retries.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str, &str) -> Result<String>,
{
    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String> {
        self(prompt, system_prompt)
    }
}

pub fn canvas_prompt(archetype: Archetype, description: &str) -> String {
    let shape = match archetype {
        Archetype::Taskboard => "a kanban board with To Do, In Progress, Review and Done columns",
        Archetype::RiskMatrix => "a 3x3 risk matrix of likelihood against impact",
        Archetype::MindMap => "a radial mind map around one central theme",
        Archetype::Personnel => "an organisation chart of the people and roles mentioned",
    };
    format!("Create {shape} for the following description.\n\n{description}")
}

pub fn tasks_prompt(description: &str) -> String {
    format!("List the tasks described below.\n\n{description}")
}

/// Removes one surrounding markdown code fence, with or without a language tag.
pub fn strip_code_fences(reply: &str) -> &str {
    match CODE_FENCE_RE.captures(reply) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).trim(),
        None => reply.trim(),
    }
}

/// Parses a model reply as JSON, falling back to JSON5 for trailing commas,
/// comments and unquoted keys.
pub fn parse_json_reply(reply: &str) -> Result<Value> {
    let body = strip_code_fences(reply);
    if body.is_empty() {
        return Err(CanvasError::UpstreamGeneration("empty reply".to_string()));
    }
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(strict) => {
            debug!("strict JSON parse failed ({strict}), retrying as JSON5");
            json5::from_str::<Value>(body).map_err(|lenient| {
                CanvasError::UpstreamGeneration(format!("reply is not valid JSON: {lenient}"))
            })
        }
    }
}

#[cfg(feature = "llm")]
pub use client::AnthropicClient;

#[cfg(feature = "llm")]
mod client {
    use super::TextGenerator;
    use crate::config::LlmConfig;
    use crate::error::{CanvasError, Result};
    use log::{debug, info};
    use serde_json::{Value, json};
    use std::time::Duration;

    const API_VERSION: &str = "2023-06-01";

    /// Messages API client. Blocking: the layout side needs the whole reply anyway.
    #[derive(Debug, Clone)]
    pub struct AnthropicClient {
        client: reqwest::blocking::Client,
        endpoint: String,
        model: String,
        api_key: String,
        max_tokens: u32,
    }

    impl AnthropicClient {
        pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|err| CanvasError::UpstreamGeneration(err.to_string()))?;
            Ok(Self {
                client,
                endpoint: config.endpoint.clone(),
                model: config.model.clone(),
                api_key: api_key.into(),
                max_tokens: config.max_tokens,
            })
        }

        /// Reads the key from the environment variable named in the config.
        pub fn from_env(config: &LlmConfig) -> Result<Self> {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                CanvasError::UpstreamGeneration(format!("{} is not set", config.api_key_env))
            })?;
            Self::new(config, api_key)
        }
    }

    impl TextGenerator for AnthropicClient {
        fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String> {
            let body = json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "system": system_prompt,
                "messages": [{"role": "user", "content": prompt}],
            });
            info!("requesting completion from {}", self.model);
            let response = self
                .client
                .post(&self.endpoint)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&body)
                .send()
                .map_err(|err| CanvasError::UpstreamGeneration(err.to_string()))?;

            let status = response.status();
            let payload: Value = response
                .json()
                .map_err(|err| CanvasError::UpstreamGeneration(err.to_string()))?;
            if !status.is_success() {
                let message = payload["error"]["message"].as_str().unwrap_or("request failed");
                return Err(CanvasError::UpstreamGeneration(format!("{status}: {message}")));
            }
            let text = reply_text(&payload)?;
            debug!("received {} chars", text.len());
            Ok(text)
        }
    }

    fn reply_text(payload: &Value) -> Result<String> {
        let blocks = payload["content"].as_array().ok_or_else(|| {
            CanvasError::UpstreamGeneration("response has no content".to_string())
        })?;
        Ok(blocks
            .iter()
            .filter(|block| block["type"] == "text")
            .filter_map(|block| block["text"].as_str())
            .collect::<Vec<_>>()
            .join(""))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn joins_text_blocks() {
            let payload = json!({"content": [
                {"type": "text", "text": "{\"nodes\":"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "[]}"}
            ]});
            assert_eq!(reply_text(&payload).unwrap(), "{\"nodes\":[]}");
            assert!(reply_text(&json!({"error": {}})).is_err());
        }

        #[test]
        fn missing_key_is_an_upstream_failure() {
            let config = LlmConfig {
                api_key_env: "VAULT_CANVAS_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
                ..LlmConfig::default()
            };
            assert!(matches!(
                AnthropicClient::from_env(&config),
                Err(CanvasError::UpstreamGeneration(_))
            ));
        }
    }
}
