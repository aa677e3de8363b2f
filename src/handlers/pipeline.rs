use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::services::pipeline::{self, PipelineOutcome};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TextPipelineRequest {
    pub input_text: String,
}

pub async fn text_pipeline(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextPipelineRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let input = req.input_text.trim();
    if input.is_empty() {
        return Err(AppError::Validation(
            "text input must be provided".to_string(),
        ));
    }

    tracing::info!(input_len = input.len(), "running text pipeline");

    let outcome = pipeline::run_text(&state, input).await?;
    Ok(Json(outcome_body(outcome)))
}

pub async fn image_pipeline(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("bad multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("failed to read file part: {e}")))?;
            image = Some(bytes.to_vec());
            break;
        }
    }

    let image =
        image.ok_or_else(|| AppError::Validation("image file must be provided".to_string()))?;

    tracing::info!(image_bytes = image.len(), "running image pipeline");

    let outcome = pipeline::run_image(&state, &image).await?;
    Ok(Json(outcome_body(outcome)))
}

fn outcome_body(outcome: PipelineOutcome) -> serde_json::Value {
    match outcome {
        PipelineOutcome::Appointment(appointment) => serde_json::json!({
            "appointment": appointment,
            "status": "ok",
        }),
        PipelineOutcome::NeedsClarification { message } => serde_json::json!({
            "status": "needs_clarification",
            "message": message,
        }),
    }
}
