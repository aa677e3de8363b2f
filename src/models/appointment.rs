use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A concrete calendar moment produced by the normalization engine.
/// Date and time are wall-clock values in `tz`; no UTC conversion happens
/// anywhere in this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDateTime {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub tz: String,
    pub confidence: f64,
}

/// The canonical scheduling request. Exactly these four fields; anything
/// richer coming back from the assembly adapter is dropped at this boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub department: String,
    /// ISO-8601 date, e.g. "2025-09-29".
    pub date: String,
    /// 24h clock, "HH:MM".
    pub time: String,
    /// IANA zone id, e.g. "Asia/Kolkata".
    pub tz: String,
}
