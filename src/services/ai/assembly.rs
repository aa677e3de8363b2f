use serde_json::json;

use crate::models::{Appointment, Entities, NormalizedDateTime};
use crate::services::ai::{parse_llm_json, LlmJson, LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"You are a final appointment agent.

Combine the input strictly into JSON:
- appointment: must be a proper JSON object (not a string) with fields:
    - department
    - date
    - time
    - tz
- status: "ok"

Example output:
{
  "appointment": {
    "department": "dentist",
    "date": "2025-09-29",
    "time": "21:00",
    "tz": "Asia/Kolkata"
  },
  "status": "ok"
}

If the input has no department, supply your best guess (e.g. "general").
Return strictly as JSON (do NOT put the appointment inside quotes).
"#;

/// Stage-4 adapter: merge the normalized date/time with the department into
/// the canonical four-field appointment. The department from entity
/// extraction wins when present and non-empty; otherwise the adapter
/// supplies its own guess. Anything beyond the four fields in the adapter's
/// reply is discarded.
pub async fn assemble(
    llm: &dyn LlmProvider,
    normalized: &NormalizedDateTime,
    entities: Option<&Entities>,
) -> anyhow::Result<Appointment> {
    let mut input = json!({
        "date": normalized.date.format("%Y-%m-%d").to_string(),
        "time": normalized.time.format("%H:%M").to_string(),
        "tz": normalized.tz,
    });

    if let Some(dept) = entities
        .and_then(|e| e.department.as_deref())
        .filter(|d| !d.trim().is_empty())
    {
        input["department"] = json!(dept);
    }

    let messages = [Message {
        role: "user".to_string(),
        content: input.to_string(),
    }];

    let response = llm.chat(SYSTEM_PROMPT, &messages).await?;

    appointment_from_response(&response)
}

fn appointment_from_response(response: &str) -> anyhow::Result<Appointment> {
    let value = match parse_llm_json(response) {
        LlmJson::Parsed(value) => value,
        LlmJson::ParseFailed { raw } => {
            anyhow::bail!("assembly adapter returned unparseable output: {raw}")
        }
    };

    let appointment = &value["appointment"];
    if !appointment.is_object() {
        anyhow::bail!("assembly adapter returned a non-object appointment");
    }

    // Deserializing into the struct drops any extra fields the adapter added
    let appointment: Appointment = serde_json::from_value(appointment.clone())
        .map_err(|e| anyhow::anyhow!("assembly adapter appointment is malformed: {e}"))?;

    if let Some(status) = value["status"].as_str() {
        tracing::debug!(status = %status, "assembly adapter status");
    }

    Ok(appointment)
}
