//! Handlers for recurring session generation.
//!
//! Routes:
//! - `POST /sessions/generate/preview` — dry-run plan, persists nothing
//! - `POST /sessions/generate`         — plan, persist the CREATE bucket,
//!   report post-insert counts
//!
//! Both endpoints run the identical [`plan_request`] path (enumerate →
//! snapshot → plan). Preview must never diverge from what commit would do,
//! so the only difference between them is the insert step.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use centerops_core::classify::{self, GenerationPlan, SessionType};
use centerops_core::recurrence;
use centerops_core::timezone;
use centerops_core::types::{DbId, Timestamp};
use centerops_db::models::session::{
    BucketSummary, CommitResponse, GenerateSessionsRequest, NewSession, PreviewResponse,
};
use centerops_db::repositories::SessionRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::router::TENANT_HEADER;
use crate::state::AppState;

/// POST /api/v1/sessions/generate/preview
///
/// Read-only: classifies every occurrence the rule would produce and
/// reports counts, bounded samples, and the resolved UTC range.
pub async fn preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<GenerateSessionsRequest>,
) -> AppResult<impl IntoResponse> {
    let tenant_id = tenant_id(&headers)?;
    let plan = plan_request(&state, tenant_id, &input).await?;

    Ok(Json(DataResponse {
        data: PreviewResponse {
            range: plan.range,
            would_create_count: plan.create.len(),
            would_skip_duplicate_count: plan.duplicate_count,
            would_conflict_count: plan.conflict_count,
            duplicates_summary: BucketSummary {
                count: plan.duplicate_count,
                sample: plan.duplicates_sample,
            },
            conflicts_summary: BucketSummary {
                count: plan.conflict_count,
                sample: plan.conflicts_sample,
            },
            zoom_link_applied: input.zoom_link.is_some(),
        },
    }))
}

/// POST /api/v1/sessions/generate
///
/// Runs the same plan as preview, then persists the CREATE bucket with a
/// skip-on-conflict bulk insert. Reported counts are reconciled against
/// what the insert actually did: a row another committer claimed between
/// planning and insertion shows up as a duplicate-skip, not an error.
pub async fn commit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<GenerateSessionsRequest>,
) -> AppResult<impl IntoResponse> {
    let tenant_id = tenant_id(&headers)?;
    let plan = plan_request(&state, tenant_id, &input).await?;

    let rows: Vec<NewSession> = plan
        .create
        .iter()
        .map(|occurrence| NewSession {
            tenant_id,
            center_id: input.center_id,
            tutor_id: input.tutor_id,
            session_type: input.session_type,
            student_id: input.student_id,
            group_id: input.group_id,
            start_at: occurrence.start_at,
            end_at: occurrence.end_at,
            timezone: input.timezone.clone(),
            zoom_link: input.zoom_link.clone(),
        })
        .collect();

    let attempted = rows.len() as u64;
    let created_count = SessionRepo::insert_ignore_duplicates(&state.pool, &rows).await?;
    let race_skipped = attempted - created_count;
    let skipped_duplicate_count = plan.duplicate_count as u64 + race_skipped;

    tracing::info!(
        tenant_id,
        center_id = input.center_id,
        tutor_id = input.tutor_id,
        created = created_count,
        skipped_duplicates = skipped_duplicate_count,
        conflicts = plan.conflict_count,
        "Committed recurring session batch"
    );

    Ok(Json(DataResponse {
        data: CommitResponse {
            created_count,
            skipped_duplicate_count,
            conflict_count: plan.conflict_count,
            range: plan.range,
        },
    }))
}

// ---------------------------------------------------------------------------
// Shared planning path
// ---------------------------------------------------------------------------

/// Validate the request, enumerate occurrences, snapshot existing sessions,
/// and classify. The one classification path shared by preview and commit.
async fn plan_request(
    state: &AppState,
    tenant_id: DbId,
    input: &GenerateSessionsRequest,
) -> AppResult<GenerationPlan> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(flatten_validation_errors(&e)))?;
    input.validate_participant()?;

    let tz = timezone::parse_zone(&input.timezone)?;
    let start_date = timezone::parse_date(&input.start_date)?;
    let end_date = timezone::parse_date(&input.end_date)?;
    let start_time = timezone::parse_hhmm(&input.start_time)?;
    let end_time = timezone::parse_hhmm(&input.end_time)?;

    let occurrences = recurrence::enumerate(
        start_date,
        end_date,
        &input.weekdays,
        start_time,
        end_time,
        tz,
    )?;

    // Group/class requests carry no target student, so the snapshot skips
    // the student query entirely for them.
    let snapshot_student = match input.session_type {
        SessionType::OneOnOne => input.student_id,
        SessionType::Group | SessionType::Class => None,
    };

    let starts: Vec<Timestamp> = occurrences.iter().map(|o| o.start_at).collect();
    let snapshot = SessionRepo::load_snapshot(
        &state.pool,
        tenant_id,
        input.center_id,
        input.tutor_id,
        snapshot_student,
        &starts,
    )
    .await?;

    Ok(classify::plan(&occurrences, input.session_type, &snapshot))
}

/// Extract the tenant from the `x-tenant-id` header set by the upstream
/// tenant-resolution middleware.
fn tenant_id(headers: &HeaderMap) -> Result<DbId, AppError> {
    let value = headers
        .get(TENANT_HEADER)
        .ok_or_else(|| AppError::BadRequest(format!("{TENANT_HEADER} header is required")))?;
    value
        .to_str()
        .ok()
        .and_then(|s| s.parse::<DbId>().ok())
        .ok_or_else(|| AppError::BadRequest(format!("{TENANT_HEADER} must be a numeric id")))
}

/// Flatten `validator` errors into one field-level message line.
fn flatten_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let detail = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            parts.push(format!("{field}: {detail}"));
        }
    }
    parts.sort();
    parts.join("; ")
}
