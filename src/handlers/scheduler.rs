use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::Appointment;
use crate::services::scheduler;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ScheduleRequest {
    pub appointment: AppointmentPayload,
}

#[derive(Deserialize)]
pub struct AppointmentPayload {
    pub department: String,
    pub date: String,
    pub time: String,
    /// IANA zone id; the configured default is used when omitted.
    pub tz: Option<String>,
}

pub async fn schedule_appointment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let appointment = Appointment {
        department: req.appointment.department,
        date: req.appointment.date,
        time: req.appointment.time,
        tz: req
            .appointment
            .tz
            .unwrap_or_else(|| state.config.default_timezone.clone()),
    };

    let (task, run_at) = scheduler::schedule(&state, appointment).await?;

    Ok(Json(serde_json::json!({
        "task_id": task.task_id,
        "status": task.status,
        "run_at": run_at.to_rfc3339(),
    })))
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tasks = scheduler::list(&state)?;
    Ok(Json(serde_json::json!(tasks)))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let task = scheduler::get(&state, &task_id)?
        .ok_or_else(|| AppError::NotFound(format!("appointment {task_id}")))?;
    Ok(Json(serde_json::json!(task)))
}
