//! Local wall-clock to UTC resolution.
//!
//! All DST handling for the generation engine lives in this module so the
//! gap/overlap tie-break is enforced in exactly one place. Both preview and
//! commit resolve instants through here; if they ever used different
//! policies the two endpoints could silently disagree.

use std::str::FromStr;

use chrono::offset::LocalResult;
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Upper bound on the forward scan out of a DST gap, in minutes. Real
/// transitions skip at most an hour; 48h also covers calendar-day skips
/// like Samoa's 2011 dateline change.
const GAP_SCAN_LIMIT_MINUTES: i64 = 48 * 60;

/// Parse an IANA timezone name (e.g. `America/New_York`).
pub fn parse_zone(name: &str) -> Result<Tz, CoreError> {
    Tz::from_str(name).map_err(|_| CoreError::InvalidTimeZone(name.to_string()))
}

/// Parse a 24-hour `HH:mm` wall-clock time.
pub fn parse_hhmm(value: &str) -> Result<NaiveTime, CoreError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| CoreError::InvalidLocalTime(format!("'{value}' is not a valid HH:mm time")))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidLocalTime(format!("'{value}' is not a valid date")))
}

/// Resolve a local (date, time) pair in `tz` to a UTC instant.
///
/// DST policy:
/// - Nonexistent wall-clock time (spring-forward gap): the first valid
///   instant at or after the requested wall clock, found by scanning
///   forward in one-minute steps.
/// - Ambiguous wall-clock time (fall-back overlap): the earlier of the two
///   UTC candidates, i.e. the pre-transition offset.
pub fn resolve_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> Result<Timestamp, CoreError> {
    let naive = date.and_time(time);

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _later) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => {
            for step in 1..=GAP_SCAN_LIMIT_MINUTES {
                let candidate = naive + Duration::minutes(step);
                match tz.from_local_datetime(&candidate) {
                    LocalResult::Single(dt) => return Ok(dt.with_timezone(&Utc)),
                    LocalResult::Ambiguous(earlier, _) => return Ok(earlier.with_timezone(&Utc)),
                    LocalResult::None => continue,
                }
            }
            Err(CoreError::InvalidLocalTime(format!(
                "no valid instant at or after {naive} in {tz}"
            )))
        }
    }
}
