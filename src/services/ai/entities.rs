use serde_json::json;

use crate::models::{Entities, EntityExtraction, ExtractedText};
use crate::services::ai::{parse_llm_json, LlmJson, LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"You are a smart appointment assistant capable of understanding casual human language.
The input is text extracted from a user message, which can be informal, abbreviated, or slightly noisy.
Your job is to extract the appointment details as structured JSON.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "entities": {
    "date_phrase": "any phrase describing the day or date",
    "time_phrase": "any phrase describing the time",
    "department": "type of appointment (e.g., dentist, cardiologist)"
  },
  "entities_confidence": 0.9
}

Instructions:
- If uncertain, still provide your best guess, but reduce the confidence.
- Handle casual phrases like "next Fri at 3pm", "can I see a dentist tomorrow afternoon?",
  "book me a cardiologist for Monday morning".
- Omit a field entirely if the input gives no hint of it.
"#;

/// Stage-2 adapter: feed the corrected text to the entity LLM and coerce
/// its output to one shape. The `entities` field sometimes comes back as a
/// string-encoded JSON object and `entities_confidence` as a string number;
/// both are normalized here, defaulting to empty/0.0, so nothing downstream
/// ever sees the raw ambiguity.
pub async fn extract_entities(
    llm: &dyn LlmProvider,
    extracted: &ExtractedText,
) -> anyhow::Result<EntityExtraction> {
    let input_json = json!({
        "raw_text": extracted.raw_text,
        "confidence": extracted.confidence,
    });

    let messages = [Message {
        role: "user".to_string(),
        content: input_json.to_string(),
    }];

    let response = llm.chat(SYSTEM_PROMPT, &messages).await?;

    Ok(entities_from_response(&response))
}

fn entities_from_response(response: &str) -> EntityExtraction {
    let value = match parse_llm_json(response) {
        LlmJson::Parsed(value) => value,
        LlmJson::ParseFailed { raw } => {
            tracing::warn!(raw = %raw, "entity extraction degraded to empty result");
            return EntityExtraction::default();
        }
    };

    let entities = match &value["entities"] {
        // String-encoded object: decode, fall back to empty on failure
        serde_json::Value::String(s) => serde_json::from_str::<Entities>(s).unwrap_or_default(),
        other => serde_json::from_value::<Entities>(other.clone()).unwrap_or_default(),
    };

    let entities_confidence = match &value["entities_confidence"] {
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        other => other.as_f64().unwrap_or(0.0),
    };

    EntityExtraction {
        entities,
        entities_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_object_form() {
        let out = entities_from_response(
            r#"{"entities":{"date_phrase":"next friday","time_phrase":"3pm","department":"dentist"},"entities_confidence":0.85}"#,
        );
        assert_eq!(out.entities.date_phrase.as_deref(), Some("next friday"));
        assert_eq!(out.entities.department.as_deref(), Some("dentist"));
        assert_eq!(out.entities_confidence, 0.85);
    }

    #[test]
    fn test_entities_string_encoded_form() {
        let out = entities_from_response(
            r#"{"entities":"{\"date_phrase\":\"tomorrow\",\"time_phrase\":\"morning\"}","entities_confidence":"0.7"}"#,
        );
        assert_eq!(out.entities.date_phrase.as_deref(), Some("tomorrow"));
        assert!(out.entities.department.is_none());
        assert_eq!(out.entities_confidence, 0.7);
    }

    #[test]
    fn test_entities_bad_string_defaults_empty() {
        let out =
            entities_from_response(r#"{"entities":"not {json","entities_confidence":"lots"}"#);
        assert!(out.entities.date_phrase.is_none());
        assert!(out.entities.time_phrase.is_none());
        assert_eq!(out.entities_confidence, 0.0);
    }

    #[test]
    fn test_entities_parse_failed_is_empty() {
        let out = entities_from_response("no structure here");
        assert!(!out.entities.has_required_fields());
        assert_eq!(out.entities_confidence, 0.0);
    }
}
