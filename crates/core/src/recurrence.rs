//! Recurrence expansion: turning a rule (date range, weekdays, local
//! times, timezone) into concrete candidate occurrences.
//!
//! Enumeration is stateless and deterministic: the same inputs always
//! produce the same ordered sequence, which is what makes preview/commit
//! parity possible.

use chrono::{Datelike, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::CoreError;
use crate::timezone;
use crate::types::Timestamp;

/// Hard ceiling on occurrences produced by one request: a year of daily
/// sessions. Checked against the raw candidate count before any timezone
/// resolution so oversized requests fail cheaply.
pub const MAX_OCCURRENCES: usize = 366;

/// One concrete instance of a recurring session. Derived, never persisted
/// as its own entity; it is the unit of classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub local_date: NaiveDate,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
}

/// Expand a recurrence rule into ordered occurrences.
///
/// Walks the local calendar from `start_date` to `end_date` inclusive,
/// keeps dates whose ISO weekday (Monday=1) is in `weekdays`, and resolves
/// each kept date's start/end wall-clock times to UTC. The result is
/// explicitly sorted by `start_at` rather than trusting date order to
/// survive pathological DST transitions.
pub fn enumerate(
    start_date: NaiveDate,
    end_date: NaiveDate,
    weekdays: &[u8],
    start_time: NaiveTime,
    end_time: NaiveTime,
    tz: Tz,
) -> Result<Vec<Occurrence>, CoreError> {
    if weekdays.is_empty() {
        return Err(CoreError::EmptyWeekdaySelection);
    }
    if let Some(&bad) = weekdays.iter().find(|&&d| !(1..=7).contains(&d)) {
        return Err(CoreError::Validation(format!(
            "weekdays must be ISO 1..7 (Monday=1), got {bad}"
        )));
    }
    if end_date < start_date {
        return Err(CoreError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }
    if end_time <= start_time {
        return Err(CoreError::Validation(
            "endTime must be strictly after startTime".to_string(),
        ));
    }

    let candidates: Vec<NaiveDate> = start_date
        .iter_days()
        .take_while(|d| *d <= end_date)
        .filter(|d| weekdays.contains(&(d.weekday().number_from_monday() as u8)))
        .collect();

    if candidates.len() > MAX_OCCURRENCES {
        return Err(CoreError::TooManyOccurrences {
            requested: candidates.len(),
            limit: MAX_OCCURRENCES,
        });
    }

    let mut occurrences = Vec::with_capacity(candidates.len());
    for local_date in candidates {
        let start_at = timezone::resolve_local(tz, local_date, start_time)?;
        let end_at = timezone::resolve_local(tz, local_date, end_time)?;
        // A session lying wholly inside a spring-forward gap resolves both
        // wall clocks to the same instant. Such a zero-length occurrence
        // can never be persisted, so the request is rejected up front
        // rather than letting commit fail where preview succeeded.
        if end_at <= start_at {
            return Err(CoreError::Validation(format!(
                "session on {local_date} collapses to zero duration: \
                 {start_time}-{end_time} falls inside a DST transition in {tz}"
            )));
        }
        occurrences.push(Occurrence {
            local_date,
            start_at,
            end_at,
        });
    }

    occurrences.sort_by_key(|o| o.start_at);
    Ok(occurrences)
}
