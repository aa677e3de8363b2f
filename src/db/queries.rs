use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::models::{Appointment, ScheduledTask, TaskStatus};

fn parse_task_row(row: &Row) -> rusqlite::Result<ScheduledTask> {
    let status_str: String = row.get(5)?;
    let created_at_str: String = row.get(6)?;

    let created_at = NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(ScheduledTask {
        task_id: row.get(0)?,
        appointment: Appointment {
            department: row.get(1)?,
            date: row.get(2)?,
            time: row.get(3)?,
            tz: row.get(4)?,
        },
        status: TaskStatus::from_str(&status_str),
        created_at,
    })
}

pub fn create_task(conn: &Connection, task: &ScheduledTask) -> rusqlite::Result<()> {
    let created_at = task.created_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO appointments (task_id, department, date, time, tz, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            task.task_id,
            task.appointment.department,
            task.appointment.date,
            task.appointment.time,
            task.appointment.tz,
            task.status.as_str(),
            created_at,
        ],
    )?;
    Ok(())
}

pub fn get_task(conn: &Connection, task_id: &str) -> rusqlite::Result<Option<ScheduledTask>> {
    let mut stmt = conn.prepare(
        "SELECT task_id, department, date, time, tz, status, created_at
         FROM appointments WHERE task_id = ?1",
    )?;

    let result = stmt.query_row(params![task_id], parse_task_row);

    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn list_tasks(conn: &Connection) -> rusqlite::Result<Vec<ScheduledTask>> {
    let mut stmt = conn.prepare(
        "SELECT task_id, department, date, time, tz, status, created_at
         FROM appointments ORDER BY rowid ASC",
    )?;

    let rows = stmt.query_map([], parse_task_row)?;

    let mut tasks = vec![];
    for row in rows {
        tasks.push(row?);
    }
    Ok(tasks)
}

pub fn update_task_status(
    conn: &Connection,
    task_id: &str,
    status: TaskStatus,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE appointments SET status = ?1 WHERE task_id = ?2",
        params![status.as_str(), task_id],
    )?;
    Ok(changed > 0)
}
