pub mod assembly;
pub mod entities;
pub mod extraction;
pub mod gemini;
pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String>;
}

/// Result of the tolerant parse applied to every LLM response. Nothing
/// escapes this boundary: a response we cannot make sense of becomes a
/// `ParseFailed` marker carrying the raw text, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmJson {
    Parsed(serde_json::Value),
    ParseFailed { raw: String },
}

pub fn parse_llm_json(response: &str) -> LlmJson {
    // Try direct parse first
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(response) {
        if value.is_object() {
            return LlmJson::Parsed(value);
        }
    }

    // Strip markdown code fences
    let cleaned = response
        .trim()
        .strip_prefix("```json")
        .or_else(|| response.trim().strip_prefix("```"))
        .unwrap_or(response.trim());
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(cleaned) {
        if value.is_object() {
            return LlmJson::Parsed(value);
        }
    }

    // Try to find a JSON object somewhere in the response
    if let Some(start) = cleaned.find('{') {
        if let Some(end) = cleaned.rfind('}') {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned[start..=end]) {
                if value.is_object() {
                    return LlmJson::Parsed(value);
                }
            }
        }
    }

    tracing::warn!("failed to parse LLM response as JSON, degrading to parse_failed");
    LlmJson::ParseFailed {
        raw: response.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let result = parse_llm_json(r#"{"raw_text":"hi","confidence":0.9}"#);
        match result {
            LlmJson::Parsed(v) => assert_eq!(v["raw_text"], "hi"),
            _ => panic!("expected parsed"),
        }
    }

    #[test]
    fn test_parse_fenced_json() {
        let result = parse_llm_json("```json\n{\"confidence\": 0.5}\n```");
        match result {
            LlmJson::Parsed(v) => assert_eq!(v["confidence"], 0.5),
            _ => panic!("expected parsed"),
        }
    }

    #[test]
    fn test_parse_embedded_json() {
        let result = parse_llm_json("Sure! Here you go: {\"department\": \"dentist\"} hope that helps");
        match result {
            LlmJson::Parsed(v) => assert_eq!(v["department"], "dentist"),
            _ => panic!("expected parsed"),
        }
    }

    #[test]
    fn test_parse_garbage_degrades() {
        let raw = "I cannot produce JSON today";
        match parse_llm_json(raw) {
            LlmJson::ParseFailed { raw: r } => assert_eq!(r, raw),
            _ => panic!("expected parse_failed"),
        }
    }

    #[test]
    fn test_non_object_json_degrades() {
        // A bare array or string is not a usable adapter payload
        assert!(matches!(
            parse_llm_json("[1, 2, 3]"),
            LlmJson::ParseFailed { .. }
        ));
    }
}
