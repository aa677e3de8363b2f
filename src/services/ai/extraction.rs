use crate::models::ExtractedText;
use crate::services::ai::{parse_llm_json, LlmJson, LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"You are an OCR/text extraction assistant.

Your job:
1. Extract the text from the input.
2. Correct common human mistakes/typos to proper words (e.g., "nxt" -> "next", "dentst" -> "dentist", "3 pm" -> "3pm", "@" -> "at").
3. Keep meaning intact, do not hallucinate new words.
4. Return strictly valid JSON (no markdown, no explanation) with:
   - raw_text: corrected text as a string
   - confidence: float 0-1 representing confidence
"#;

/// Stage-1 adapter: run the raw input through the correction LLM and pull
/// out `{raw_text, confidence}`. A response we cannot parse degrades to an
/// empty extraction instead of failing the stage.
pub async fn extract_text(llm: &dyn LlmProvider, input_text: &str) -> anyhow::Result<ExtractedText> {
    let messages = [Message {
        role: "user".to_string(),
        content: input_text.to_string(),
    }];

    let response = llm.chat(SYSTEM_PROMPT, &messages).await?;

    Ok(extraction_from_response(&response))
}

fn extraction_from_response(response: &str) -> ExtractedText {
    match parse_llm_json(response) {
        LlmJson::Parsed(value) => ExtractedText {
            raw_text: value["raw_text"].as_str().unwrap_or_default().to_string(),
            confidence: value["confidence"].as_f64().unwrap_or(0.0),
        },
        LlmJson::ParseFailed { raw } => {
            tracing::warn!(raw = %raw, "text extraction degraded to empty result");
            ExtractedText {
                raw_text: String::new(),
                confidence: 0.0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_from_valid_response() {
        let out =
            extraction_from_response(r#"{"raw_text":"dentist next friday 3pm","confidence":0.92}"#);
        assert_eq!(out.raw_text, "dentist next friday 3pm");
        assert_eq!(out.confidence, 0.92);
    }

    #[test]
    fn test_extraction_from_garbage_degrades() {
        let out = extraction_from_response("not json at all");
        assert_eq!(out.raw_text, "");
        assert_eq!(out.confidence, 0.0);
    }

    #[test]
    fn test_extraction_missing_fields_default() {
        let out = extraction_from_response(r#"{"something_else": true}"#);
        assert_eq!(out.raw_text, "");
        assert_eq!(out.confidence, 0.0);
    }
}
