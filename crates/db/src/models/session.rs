//! Session entity model and the generation request/response DTOs.
//!
//! JSON field names are camelCase to match the admin UI contract.

use centerops_core::classify::{SampleEntry, SessionType, UtcRange};
use centerops_core::error::CoreError;
use centerops_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: DbId,
    pub tenant_id: DbId,
    pub center_id: DbId,
    pub tutor_id: DbId,
    pub session_type: String,
    pub student_id: Option<DbId>,
    pub group_id: Option<DbId>,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub timezone: String,
    pub zoom_link: Option<String>,
    pub created_at: Timestamp,
}

/// Insert payload for one generated session. Ownership fields are fixed at
/// creation and never mutated by the generator.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub tenant_id: DbId,
    pub center_id: DbId,
    pub tutor_id: DbId,
    pub session_type: SessionType,
    pub student_id: Option<DbId>,
    pub group_id: Option<DbId>,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub timezone: String,
    pub zoom_link: Option<String>,
}

// ---------------------------------------------------------------------------
// Generation request
// ---------------------------------------------------------------------------

/// Body of `POST /sessions/generate` and `POST /sessions/generate/preview`.
///
/// Transient: constructed per call, never stored. Serde covers shape,
/// `validator` covers field formats, and [`validate_participant`] covers
/// the student/group XOR invariant.
///
/// [`validate_participant`]: GenerateSessionsRequest::validate_participant
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSessionsRequest {
    pub center_id: DbId,
    pub tutor_id: DbId,
    pub session_type: SessionType,
    #[serde(default)]
    pub student_id: Option<DbId>,
    #[serde(default)]
    pub group_id: Option<DbId>,
    /// Inclusive local calendar date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Inclusive local calendar date, `YYYY-MM-DD`.
    pub end_date: String,
    /// ISO weekdays, Monday=1 .. Sunday=7.
    pub weekdays: Vec<u8>,
    /// Local wall-clock `HH:mm`.
    pub start_time: String,
    /// Local wall-clock `HH:mm`, same calendar day, strictly after `start_time`.
    pub end_time: String,
    /// IANA timezone name.
    pub timezone: String,
    #[serde(default)]
    #[validate(url(message = "zoomLink must be an absolute URL"))]
    pub zoom_link: Option<String>,
}

impl GenerateSessionsRequest {
    /// Enforce the exactly-one-of `studentId`/`groupId` invariant for the
    /// chosen session type.
    pub fn validate_participant(&self) -> Result<(), CoreError> {
        match self.session_type {
            SessionType::OneOnOne => match (self.student_id, self.group_id) {
                (Some(_), None) => Ok(()),
                (None, _) => Err(CoreError::Validation(
                    "studentId is required for ONE_ON_ONE sessions".to_string(),
                )),
                (Some(_), Some(_)) => Err(CoreError::Validation(
                    "groupId must not be set for ONE_ON_ONE sessions".to_string(),
                )),
            },
            SessionType::Group | SessionType::Class => match (self.student_id, self.group_id) {
                (None, Some(_)) => Ok(()),
                (_, None) => Err(CoreError::Validation(format!(
                    "groupId is required for {} sessions",
                    self.session_type.as_str()
                ))),
                (Some(_), Some(_)) => Err(CoreError::Validation(format!(
                    "studentId must not be set for {} sessions",
                    self.session_type.as_str()
                ))),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Generation responses
// ---------------------------------------------------------------------------

/// Count plus a bounded, display-only sample of one skip bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    pub count: usize,
    pub sample: Vec<SampleEntry>,
}

/// Response body for the preview endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub range: Option<UtcRange>,
    pub would_create_count: usize,
    pub would_skip_duplicate_count: usize,
    pub would_conflict_count: usize,
    pub duplicates_summary: BucketSummary,
    pub conflicts_summary: BucketSummary,
    pub zoom_link_applied: bool,
}

/// Response body for the commit endpoint. `created_count` and
/// `skipped_duplicate_count` are post-insert truth, not plan estimates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub created_count: u64,
    pub skipped_duplicate_count: u64,
    pub conflict_count: usize,
    pub range: Option<UtcRange>,
}
