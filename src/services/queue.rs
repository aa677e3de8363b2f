use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Appointment, TaskStatus};

/// Deferred execution seam: bind a payload to an absolute fire time under a
/// caller-chosen job id. The caller persists the task record before calling
/// this, so a job that fires immediately still finds its row. There is no
/// unschedule operation.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(
        &self,
        task_id: &str,
        appointment: Appointment,
        fire_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}

/// In-process queue backed by the tokio timer. Each job sleeps until its
/// fire time (a past fire time fires immediately), runs the appointment
/// handler, and writes the terminal status back to the store: `done` on
/// success, `error` on handler failure.
pub struct TokioJobQueue {
    db: Arc<Mutex<Connection>>,
}

impl TokioJobQueue {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JobQueue for TokioJobQueue {
    async fn enqueue(
        &self,
        task_id: &str,
        appointment: Appointment,
        fire_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let db = Arc::clone(&self.db);
        let id = task_id.to_string();

        tokio::spawn(async move {
            let delay = (fire_at - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep(delay).await;

            let status = match run_appointment(&id, &appointment) {
                Ok(()) => TaskStatus::Done,
                Err(e) => {
                    tracing::error!(task_id = %id, error = %e, "appointment job failed");
                    TaskStatus::Error
                }
            };

            let updated = {
                let conn = db.lock().unwrap();
                queries::update_task_status(&conn, &id, status)
            };
            match updated {
                Ok(true) => {}
                Ok(false) => tracing::warn!(task_id = %id, "fired job has no stored record"),
                Err(e) => tracing::error!(task_id = %id, error = %e, "failed to record job status"),
            }
        });

        Ok(())
    }
}

/// The run-appointment handler every deferred job fires into. This is the
/// single canonical handler; the scheduler has no alternate entry point.
fn run_appointment(task_id: &str, appointment: &Appointment) -> anyhow::Result<()> {
    tracing::info!(
        task_id,
        department = %appointment.department,
        date = %appointment.date,
        time = %appointment.time,
        tz = %appointment.tz,
        "appointment triggered"
    );
    Ok(())
}
