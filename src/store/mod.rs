//! Persistence seams consumed by the engine. The service binds them to MySQL
//! (`MySqlStore`); tests bind them to an in-memory store.

#[cfg(test)]
pub mod memory;
pub mod mysql;

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::error::EngineError;
use crate::model::adjustment::{
    NewAdjustmentItem, NewAdjustmentRequest, TimeAdjustmentItem, TimeAdjustmentRequest,
    TimeAdjustmentStatus,
};
use crate::model::enrollment::EmployeeEnrollment;
use crate::model::ledger::{BankHoursLedgerEntry, NewLedgerEntry};
use crate::model::policy::{
    EnrollmentPolicyAssignment, NewAssignment, ResolvedPolicy, WorkPolicyTemplate,
};
use crate::model::punch::{NewPunch, PunchMutation, PunchType, TimePunch};
use crate::model::summary::{DailyAttendanceSummary, NewSummary};

/// Subject registry reads: the enrollment row and the cross-subject
/// same-day conflict check.
pub trait SubjectStore {
    async fn find_enrollment(
        &self,
        subject_id: u64,
    ) -> Result<Option<EmployeeEnrollment>, EngineError>;

    /// Sibling enrollments of the same employee that already hold a punch on
    /// the date, excluding the given subject.
    async fn other_subjects_with_punch_on_date(
        &self,
        tenant_id: u64,
        employee_id: u64,
        work_date: NaiveDate,
        exclude_subject: u64,
    ) -> Result<Vec<u64>, EngineError>;
}

pub trait PolicyStore {
    /// The (at most one, by the no-overlap invariant) assignment whose range
    /// contains the date, joined with its template.
    async fn find_current_assignment(
        &self,
        subject_id: u64,
        date: NaiveDate,
    ) -> Result<Option<ResolvedPolicy>, EngineError>;

    async fn find_template(
        &self,
        template_id: u64,
    ) -> Result<Option<WorkPolicyTemplate>, EngineError>;

    /// Assignments whose range intersects [from, to]; open-ended counts as
    /// infinite on either side.
    async fn find_overlapping_assignments(
        &self,
        subject_id: u64,
        effective_from: NaiveDate,
        effective_to: Option<NaiveDate>,
    ) -> Result<Vec<EnrollmentPolicyAssignment>, EngineError>;

    async fn create_assignment(
        &self,
        assignment: NewAssignment,
    ) -> Result<EnrollmentPolicyAssignment, EngineError>;
}

pub trait PunchStore {
    async fn create_punch(&self, punch: NewPunch) -> Result<TimePunch, EngineError>;

    async fn delete_punch(&self, punch_id: u64) -> Result<(), EngineError>;

    async fn find_punch(&self, punch_id: u64) -> Result<Option<TimePunch>, EngineError>;

    async fn find_punches_for_day(
        &self,
        subject_id: u64,
        work_date: NaiveDate,
    ) -> Result<Vec<TimePunch>, EngineError>;

    async fn find_duplicate_punch(
        &self,
        subject_id: u64,
        punched_at: NaiveDateTime,
        punch_type: PunchType,
    ) -> Result<Option<TimePunch>, EngineError>;
}

pub trait SummaryStore {
    /// Create-or-overwrite keyed on (subject_id, work_date); only derived
    /// fields change on overwrite.
    async fn upsert_summary(
        &self,
        summary: NewSummary,
    ) -> Result<DailyAttendanceSummary, EngineError>;

    async fn find_summary(
        &self,
        subject_id: u64,
        work_date: NaiveDate,
    ) -> Result<Option<DailyAttendanceSummary>, EngineError>;
}

pub trait LedgerStore {
    async fn create_ledger_entry(
        &self,
        entry: NewLedgerEntry,
    ) -> Result<BankHoursLedgerEntry, EngineError>;

    /// Atomic replace of the day's DAILY_APURATION entry: delete whatever
    /// exists, then insert `entry` when given, as one unit. Entries from
    /// other sources are never touched.
    async fn replace_auto_generated(
        &self,
        subject_id: u64,
        event_date: NaiveDate,
        entry: Option<NewLedgerEntry>,
    ) -> Result<(), EngineError>;

    /// Signed minute balance: sum of deltas with event_date <= until.
    async fn balance_until(&self, subject_id: u64, until: NaiveDate)
    -> Result<i64, EngineError>;
}

pub trait AdjustmentStore {
    async fn create_request(
        &self,
        request: NewAdjustmentRequest,
        items: Vec<NewAdjustmentItem>,
    ) -> Result<TimeAdjustmentRequest, EngineError>;

    async fn find_request(
        &self,
        request_id: u64,
    ) -> Result<Option<TimeAdjustmentRequest>, EngineError>;

    async fn items_for_request(
        &self,
        request_id: u64,
    ) -> Result<Vec<TimeAdjustmentItem>, EngineError>;

    async fn record_decision(
        &self,
        request_id: u64,
        status: TimeAdjustmentStatus,
        decided_at: NaiveDateTime,
        decided_by_user_id: u64,
        decision_reason: Option<String>,
    ) -> Result<TimeAdjustmentRequest, EngineError>;

    /// Executes the punch mutations and flips the request to APPLIED as one
    /// atomic unit; on any failure nothing is written.
    async fn apply_mutations(
        &self,
        request_id: u64,
        mutations: Vec<PunchMutation>,
    ) -> Result<TimeAdjustmentRequest, EngineError>;

    /// Whether a PENDING request targets (subject, date).
    async fn has_pending_on(&self, subject_id: u64, date: NaiveDate)
    -> Result<bool, EngineError>;
}

pub trait HolidayLookup {
    async fn is_holiday(&self, subject_id: u64, date: NaiveDate) -> Result<bool, EngineError>;
}
