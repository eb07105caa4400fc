use chrono::NaiveDate;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unrecognized IANA timezone: {0}")]
    InvalidTimeZone(String),

    #[error("Invalid local date/time: {0}")]
    InvalidLocalTime(String),

    #[error("At least one weekday must be selected")]
    EmptyWeekdaySelection,

    #[error("End date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Request would produce {requested} occurrences, limit is {limit}")]
    TooManyOccurrences { requested: usize, limit: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}
