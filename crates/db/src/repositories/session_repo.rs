//! Repository for the `sessions` table.
//!
//! Two halves of the generation engine live here: the Existing-Session
//! Index (snapshot queries the classifier consumes) and the Commit
//! Executor's skip-on-conflict bulk insert.

use sqlx::PgPool;

use centerops_core::classify::ScheduleSnapshot;
use centerops_core::types::{DbId, Timestamp};

use crate::models::session::{NewSession, Session};

const SESSION_COLUMNS: &str = "\
    id, tenant_id, center_id, tutor_id, session_type, student_id, group_id, \
    start_at, end_at, timezone, zoom_link, created_at";

/// Read and write operations for generated sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Find the session occupying one generator slot, if any.
    pub async fn find_by_slot(
        pool: &PgPool,
        tenant_id: DbId,
        center_id: DbId,
        tutor_id: DbId,
        start_at: Timestamp,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions \
             WHERE tenant_id = $1 AND center_id = $2 AND tutor_id = $3 AND start_at = $4"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(tenant_id)
            .bind(center_id)
            .bind(tutor_id)
            .bind(start_at)
            .fetch_optional(pool)
            .await
    }

    /// Materialize the Existing-Session Index for one batch of candidate
    /// start instants.
    ///
    /// Queried fresh on every preview and every commit so classification
    /// reflects the state at that moment. Scopes:
    /// - duplicates: tenant + center + tutor (the `uq_sessions_slot` key)
    /// - tutor busy: tenant + tutor, across centers
    /// - student busy: tenant + student, across centers (skipped when the
    ///   request has no target student)
    pub async fn load_snapshot(
        pool: &PgPool,
        tenant_id: DbId,
        center_id: DbId,
        tutor_id: DbId,
        student_id: Option<DbId>,
        starts: &[Timestamp],
    ) -> Result<ScheduleSnapshot, sqlx::Error> {
        if starts.is_empty() {
            return Ok(ScheduleSnapshot::default());
        }

        let duplicate_starts: Vec<Timestamp> = sqlx::query_scalar(
            "SELECT start_at FROM sessions \
             WHERE tenant_id = $1 AND center_id = $2 AND tutor_id = $3 \
               AND start_at = ANY($4)",
        )
        .bind(tenant_id)
        .bind(center_id)
        .bind(tutor_id)
        .bind(starts)
        .fetch_all(pool)
        .await?;

        let tutor_busy_starts: Vec<Timestamp> = sqlx::query_scalar(
            "SELECT start_at FROM sessions \
             WHERE tenant_id = $1 AND tutor_id = $2 \
               AND start_at = ANY($3)",
        )
        .bind(tenant_id)
        .bind(tutor_id)
        .bind(starts)
        .fetch_all(pool)
        .await?;

        let student_busy_starts: Vec<Timestamp> = match student_id {
            Some(student_id) => {
                sqlx::query_scalar(
                    "SELECT start_at FROM sessions \
                     WHERE tenant_id = $1 AND student_id = $2 \
                       AND start_at = ANY($3)",
                )
                .bind(tenant_id)
                .bind(student_id)
                .bind(starts)
                .fetch_all(pool)
                .await?
            }
            None => Vec::new(),
        };

        Ok(ScheduleSnapshot::new(
            duplicate_starts,
            tutor_busy_starts,
            student_busy_starts,
        ))
    }

    /// Bulk-insert generated sessions, silently skipping rows whose
    /// `(tenant_id, center_id, tutor_id, start_at)` slot is already taken.
    ///
    /// A single statement, so the batch is atomic: either every row is
    /// attempted or none is. Returns the number of rows actually inserted;
    /// the caller reconciles skips from the difference against the attempt
    /// count.
    pub async fn insert_ignore_duplicates(
        pool: &PgPool,
        sessions: &[NewSession],
    ) -> Result<u64, sqlx::Error> {
        if sessions.is_empty() {
            return Ok(0);
        }

        let mut tenant_ids = Vec::with_capacity(sessions.len());
        let mut center_ids = Vec::with_capacity(sessions.len());
        let mut tutor_ids = Vec::with_capacity(sessions.len());
        let mut session_types = Vec::with_capacity(sessions.len());
        let mut student_ids = Vec::with_capacity(sessions.len());
        let mut group_ids = Vec::with_capacity(sessions.len());
        let mut start_ats = Vec::with_capacity(sessions.len());
        let mut end_ats = Vec::with_capacity(sessions.len());
        let mut timezones = Vec::with_capacity(sessions.len());
        let mut zoom_links = Vec::with_capacity(sessions.len());

        for s in sessions {
            tenant_ids.push(s.tenant_id);
            center_ids.push(s.center_id);
            tutor_ids.push(s.tutor_id);
            session_types.push(s.session_type.as_str());
            student_ids.push(s.student_id);
            group_ids.push(s.group_id);
            start_ats.push(s.start_at);
            end_ats.push(s.end_at);
            timezones.push(s.timezone.as_str());
            zoom_links.push(s.zoom_link.as_deref());
        }

        let result = sqlx::query(
            "INSERT INTO sessions \
                 (tenant_id, center_id, tutor_id, session_type, student_id, \
                  group_id, start_at, end_at, timezone, zoom_link) \
             SELECT * FROM UNNEST( \
                 $1::BIGINT[], $2::BIGINT[], $3::BIGINT[], $4::TEXT[], \
                 $5::BIGINT[], $6::BIGINT[], $7::TIMESTAMPTZ[], \
                 $8::TIMESTAMPTZ[], $9::TEXT[], $10::TEXT[]) \
             ON CONFLICT ON CONSTRAINT uq_sessions_slot DO NOTHING",
        )
        .bind(&tenant_ids)
        .bind(&center_ids)
        .bind(&tutor_ids)
        .bind(&session_types)
        .bind(&student_ids)
        .bind(&group_ids)
        .bind(&start_ats)
        .bind(&end_ats)
        .bind(&timezones)
        .bind(&zoom_links)
        .execute(pool)
        .await?;

        let inserted = result.rows_affected();
        tracing::debug!(
            attempted = sessions.len(),
            inserted,
            "Bulk session insert completed"
        );
        Ok(inserted)
    }

    /// Count sessions for a tutor within a tenant (reporting/test helper).
    pub async fn count_for_tutor(
        pool: &PgPool,
        tenant_id: DbId,
        tutor_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE tenant_id = $1 AND tutor_id = $2",
        )
        .bind(tenant_id)
        .bind(tutor_id)
        .fetch_one(pool)
        .await
    }
}
