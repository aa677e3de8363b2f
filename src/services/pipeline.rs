use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;

use crate::models::{Appointment, ExtractedText};
use crate::services::ai::{assembly, entities, extraction};
use crate::services::normalize::{self, CONFIDENCE_THRESHOLD};
use crate::state::AppState;

/// The four stages of the chain. Every failure surfaced by the pipeline
/// names the stage it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Entities,
    Normalize,
    Finalize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Entities => "entities",
            Stage::Normalize => "normalize",
            Stage::Finalize => "finalize",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: anyhow::Error,
}

fn stage_err(stage: Stage) -> impl FnOnce(anyhow::Error) -> StageError {
    move |source| StageError { stage, source }
}

/// Terminal states of a pipeline run. `NeedsClarification` is an expected
/// branch of normal operation, not an error.
#[derive(Debug)]
pub enum PipelineOutcome {
    Appointment(Appointment),
    NeedsClarification { message: String },
}

const CLARIFICATION_MESSAGE: &str = "Ambiguous date/time or department";

fn clarify() -> PipelineOutcome {
    PipelineOutcome::NeedsClarification {
        message: CLARIFICATION_MESSAGE.to_string(),
    }
}

/// Text entry point: the input is already text, stage 1 only corrects it.
pub async fn run_text(
    state: &Arc<AppState>,
    input_text: &str,
) -> Result<PipelineOutcome, StageError> {
    let extracted = extraction::extract_text(state.llm.as_ref(), input_text)
        .await
        .map_err(stage_err(Stage::Extract))?;

    run_from_extracted(state, extracted).await
}

/// Image entry point: OCR first, then the same correction and chain.
pub async fn run_image(state: &Arc<AppState>, image: &[u8]) -> Result<PipelineOutcome, StageError> {
    let ocr_text = state
        .ocr
        .read_text(image)
        .await
        .map_err(stage_err(Stage::Extract))?;

    let extracted = extraction::extract_text(state.llm.as_ref(), &ocr_text)
        .await
        .map_err(stage_err(Stage::Extract))?;

    run_from_extracted(state, extracted).await
}

async fn run_from_extracted(
    state: &Arc<AppState>,
    extracted: ExtractedText,
) -> Result<PipelineOutcome, StageError> {
    let extraction = entities::extract_entities(state.llm.as_ref(), &extracted)
        .await
        .map_err(stage_err(Stage::Entities))?;

    tracing::info!(
        date_phrase = ?extraction.entities.date_phrase,
        time_phrase = ?extraction.entities.time_phrase,
        department = ?extraction.entities.department,
        entities_confidence = extraction.entities_confidence,
        "entities extracted"
    );

    // Without both phrases there is nothing to normalize
    if !extraction.entities.has_required_fields() {
        return Ok(clarify());
    }

    let tz: Tz = state.config.default_timezone.parse().map_err(|_| StageError {
        stage: Stage::Normalize,
        source: anyhow::anyhow!(
            "invalid default timezone: {}",
            state.config.default_timezone
        ),
    })?;
    let now = Utc::now().with_timezone(&tz);

    let date_phrase = extraction.entities.date_phrase.as_deref().unwrap_or_default();
    let time_phrase = extraction.entities.time_phrase.as_deref().unwrap_or_default();

    let normalized = match normalize::normalize(date_phrase, time_phrase, now) {
        Some(n) => n,
        None => {
            tracing::info!(date_phrase, time_phrase, "date/time unresolvable");
            return Ok(clarify());
        }
    };

    if normalized.confidence < CONFIDENCE_THRESHOLD {
        tracing::info!(
            confidence = normalized.confidence,
            "normalization confidence below threshold"
        );
        return Ok(clarify());
    }

    let appointment = assembly::assemble(
        state.llm.as_ref(),
        &normalized,
        Some(&extraction.entities),
    )
    .await
    .map_err(stage_err(Stage::Finalize))?;

    Ok(PipelineOutcome::Appointment(appointment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_names_the_stage() {
        let err = StageError {
            stage: Stage::Entities,
            source: anyhow::anyhow!("adapter timed out"),
        };
        assert_eq!(err.to_string(), "entities stage failed: adapter timed out");
    }
}
