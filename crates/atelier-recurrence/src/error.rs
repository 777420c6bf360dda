use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Recurrence engine errors
#[derive(Error, Debug)]
pub enum RecurrenceError {
    #[error("Invalid series window: end {end} must be after start {start}")]
    InvalidRuleWindow { start: NaiveDate, end: NaiveDate },

    #[error("Invalid time-of-day window: end {end} must be after start {start}")]
    InvalidTimeWindow { start: NaiveTime, end: NaiveTime },

    #[error("A rule must select at least one weekday")]
    EmptyWeekdays,

    #[error("A rule must reference at least one workshop")]
    MissingWorkshops,

    #[error("Invalid occurrence id: {0}")]
    InvalidOccurrenceId(String),

    #[error("Failed to build recurrence set: {0}")]
    Build(String),

    #[error(transparent)]
    Core(#[from] atelier_core::error::CoreError),
}

pub type RecurrenceResult<T> = std::result::Result<T, RecurrenceError>;
