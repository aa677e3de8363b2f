use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{LlmProvider, Message};

/// Chat against a local Ollama instance. Generation is pinned to
/// temperature zero so the extraction adapters see repeatable JSON for the
/// same note.
pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            url,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn request_body(&self, system_prompt: &str, messages: &[Message]) -> serde_json::Value {
        let mut chat = vec![json!({
            "role": "system",
            "content": system_prompt,
        })];
        chat.extend(messages.iter().map(|msg| {
            json!({
                "role": msg.role,
                "content": msg.content,
            })
        }));

        json!({
            "model": self.model,
            "messages": chat,
            "stream": false,
            "options": { "temperature": 0 },
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let resp = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&self.request_body(system_prompt, messages))
            .send()
            .await
            .context("failed to call Ollama API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Ollama response")?;

        if !status.is_success() {
            anyhow::bail!("Ollama API error ({}): {}", status, data);
        }

        data["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing content in Ollama response"))
    }
}
