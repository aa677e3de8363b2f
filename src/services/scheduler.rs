use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::db::queries;
use crate::models::{Appointment, ScheduledTask, TaskStatus};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("invalid appointment: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Combine date + time and localize in the appointment's own zone. A date,
/// time or zone that does not parse, or a wall time the zone skips or
/// repeats around a DST transition, is rejected here before any side
/// effect.
pub fn compute_fire_time(appointment: &Appointment) -> Result<DateTime<Tz>, SchedulerError> {
    if appointment.department.trim().is_empty() {
        return Err(SchedulerError::Validation(
            "department must not be empty".to_string(),
        ));
    }

    let tz: Tz = appointment
        .tz
        .parse()
        .map_err(|_| SchedulerError::Validation(format!("unknown timezone: {}", appointment.tz)))?;

    let date = NaiveDate::parse_from_str(&appointment.date, "%Y-%m-%d")
        .map_err(|_| SchedulerError::Validation(format!("bad date: {}", appointment.date)))?;

    let time = NaiveTime::parse_from_str(&appointment.time, "%H:%M")
        .map_err(|_| SchedulerError::Validation(format!("bad time: {}", appointment.time)))?;

    let local = date.and_time(time);
    tz.from_local_datetime(&local).single().ok_or_else(|| {
        SchedulerError::Validation(format!(
            "time {local} is ambiguous or nonexistent in {}",
            tz.name()
        ))
    })
}

/// Durably record the appointment, then enqueue its deferred job. The row
/// exists before the timer is spawned, so a job whose fire time is already
/// due still finds the record to move out of `scheduled`, and a lookup
/// issued right after this call never misses it. Returns the stored task
/// together with the localized fire time.
pub async fn schedule(
    state: &Arc<AppState>,
    appointment: Appointment,
) -> Result<(ScheduledTask, DateTime<Tz>), SchedulerError> {
    let fire_at = compute_fire_time(&appointment)?;

    tracing::info!(
        department = %appointment.department,
        fire_at = %fire_at.to_rfc3339(),
        "scheduling appointment"
    );

    let task = ScheduledTask {
        task_id: uuid::Uuid::new_v4().to_string(),
        appointment,
        status: TaskStatus::Scheduled,
        created_at: Utc::now().naive_utc(),
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_task(&db, &task)?;
    }

    state
        .queue
        .enqueue(
            &task.task_id,
            task.appointment.clone(),
            fire_at.with_timezone(&Utc),
        )
        .await?;

    Ok((task, fire_at))
}

pub fn get(state: &Arc<AppState>, task_id: &str) -> Result<Option<ScheduledTask>, SchedulerError> {
    let db = state.db.lock().unwrap();
    Ok(queries::get_task(&db, task_id)?)
}

pub fn list(state: &Arc<AppState>) -> Result<Vec<ScheduledTask>, SchedulerError> {
    let db = state.db.lock().unwrap();
    Ok(queries::list_tasks(&db)?)
}
