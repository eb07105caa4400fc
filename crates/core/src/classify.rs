//! Candidate classification and batch planning.
//!
//! `classify` and `plan` are pure functions over a [`ScheduleSnapshot`];
//! the database layer materializes the snapshot, and both the preview and
//! commit endpoints run the exact same `plan` over it. Keeping a single
//! planning implementation is what guarantees an operator is never shown
//! a preview that commit would contradict.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::recurrence::Occurrence;
use crate::types::Timestamp;

/// Maximum entries reported per non-create sample bucket. Truncation is
/// display-only and never affects counts.
pub const SAMPLE_LIMIT: usize = 5;

pub const REASON_DUPLICATE: &str = "DUPLICATE_SESSION_EXISTS";
pub const REASON_TUTOR_CONFLICT: &str = "TUTOR_START_COLLISION";
pub const REASON_STUDENT_CONFLICT: &str = "STUDENT_START_COLLISION";

/// Session delivery format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    OneOnOne,
    Group,
    Class,
}

impl SessionType {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::OneOnOne => "ONE_ON_ONE",
            SessionType::Group => "GROUP",
            SessionType::Class => "CLASS",
        }
    }
}

/// Read-only view of already-persisted sessions, reduced to the start
/// instants the classifier needs.
///
/// Scopes differ deliberately:
/// - `duplicate_starts`: same tenant + center + tutor — the generator's
///   own idempotency key.
/// - `tutor_busy_starts`: same tenant + tutor, across centers. A tutor
///   cannot teach at two centers at the same instant.
/// - `student_busy_starts`: same tenant + student, across centers.
#[derive(Debug, Default, Clone)]
pub struct ScheduleSnapshot {
    duplicate_starts: HashSet<Timestamp>,
    tutor_busy_starts: HashSet<Timestamp>,
    student_busy_starts: HashSet<Timestamp>,
}

impl ScheduleSnapshot {
    pub fn new(
        duplicate_starts: impl IntoIterator<Item = Timestamp>,
        tutor_busy_starts: impl IntoIterator<Item = Timestamp>,
        student_busy_starts: impl IntoIterator<Item = Timestamp>,
    ) -> Self {
        Self {
            duplicate_starts: duplicate_starts.into_iter().collect(),
            tutor_busy_starts: tutor_busy_starts.into_iter().collect(),
            student_busy_starts: student_busy_starts.into_iter().collect(),
        }
    }

    pub fn has_duplicate(&self, start_at: Timestamp) -> bool {
        self.duplicate_starts.contains(&start_at)
    }

    pub fn has_tutor_conflict(&self, start_at: Timestamp) -> bool {
        self.tutor_busy_starts.contains(&start_at)
    }

    pub fn has_student_conflict(&self, start_at: Timestamp) -> bool {
        self.student_busy_starts.contains(&start_at)
    }
}

/// Outcome category for one candidate occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceAction {
    Create,
    Duplicate,
    TutorConflict,
    StudentConflict,
}

impl OccurrenceAction {
    /// Machine-readable reason code, `None` for creatable occurrences.
    pub fn reason(self) -> Option<&'static str> {
        match self {
            OccurrenceAction::Create => None,
            OccurrenceAction::Duplicate => Some(REASON_DUPLICATE),
            OccurrenceAction::TutorConflict => Some(REASON_TUTOR_CONFLICT),
            OccurrenceAction::StudentConflict => Some(REASON_STUDENT_CONFLICT),
        }
    }
}

/// Classify one candidate against the snapshot.
///
/// Tie-break order is load-bearing and identical for preview and commit:
/// 1. Duplicate — the same intended occurrence already exists. Checked
///    first because a duplicate key is trivially also a tutor collision,
///    and the benign category must win.
/// 2. Tutor conflict — the tutor is booked elsewhere at this instant.
/// 3. Student conflict — ONE_ON_ONE only; group/class requests do not
///    schedule individual students at generation time.
/// 4. Create.
pub fn classify(
    occurrence: &Occurrence,
    session_type: SessionType,
    snapshot: &ScheduleSnapshot,
) -> OccurrenceAction {
    if snapshot.has_duplicate(occurrence.start_at) {
        OccurrenceAction::Duplicate
    } else if snapshot.has_tutor_conflict(occurrence.start_at) {
        OccurrenceAction::TutorConflict
    } else if session_type == SessionType::OneOnOne
        && snapshot.has_student_conflict(occurrence.start_at)
    {
        OccurrenceAction::StudentConflict
    } else {
        OccurrenceAction::Create
    }
}

/// One sample row shown to the operator for a skipped occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleEntry {
    pub date: Timestamp,
    pub reason: &'static str,
}

/// UTC span covered by the generated occurrences, first `start_at` to
/// last `end_at`, independent of how each occurrence classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UtcRange {
    pub from: Timestamp,
    pub to: Timestamp,
}

/// Result of planning one batch: the creatable occurrences plus the
/// aggregate numbers and bounded samples both endpoints report.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    /// Occurrences classified CREATE, ascending by start instant.
    pub create: Vec<Occurrence>,
    pub duplicate_count: usize,
    pub conflict_count: usize,
    pub duplicates_sample: Vec<SampleEntry>,
    pub conflicts_sample: Vec<SampleEntry>,
    pub range: Option<UtcRange>,
}

/// Run the classifier over every occurrence and aggregate the outcome.
///
/// `occurrences` must already be ascending by `start_at` (the enumerator
/// guarantees this), so samples are naturally first-N-by-date.
pub fn plan(
    occurrences: &[Occurrence],
    session_type: SessionType,
    snapshot: &ScheduleSnapshot,
) -> GenerationPlan {
    let mut create = Vec::new();
    let mut duplicate_count = 0;
    let mut conflict_count = 0;
    let mut duplicates_sample = Vec::new();
    let mut conflicts_sample = Vec::new();

    for occurrence in occurrences {
        let action = classify(occurrence, session_type, snapshot);
        match action {
            OccurrenceAction::Create => create.push(occurrence.clone()),
            OccurrenceAction::Duplicate => {
                duplicate_count += 1;
                if duplicates_sample.len() < SAMPLE_LIMIT {
                    duplicates_sample.push(SampleEntry {
                        date: occurrence.start_at,
                        reason: REASON_DUPLICATE,
                    });
                }
            }
            OccurrenceAction::TutorConflict | OccurrenceAction::StudentConflict => {
                conflict_count += 1;
                if conflicts_sample.len() < SAMPLE_LIMIT {
                    conflicts_sample.push(SampleEntry {
                        date: occurrence.start_at,
                        reason: action.reason().unwrap_or(REASON_TUTOR_CONFLICT),
                    });
                }
            }
        }
    }

    let range = match (occurrences.first(), occurrences.last()) {
        (Some(first), Some(last)) => Some(UtcRange {
            from: first.start_at,
            to: last.end_at,
        }),
        _ => None,
    };

    GenerationPlan {
        create,
        duplicate_count,
        conflict_count,
        duplicates_sample,
        conflicts_sample,
        range,
    }
}
