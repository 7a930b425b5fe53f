//! MySQL bindings for the store traits, using the runtime sqlx query API.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::MySqlPool;

use crate::core::error::EngineError;
use crate::model::adjustment::{
    NewAdjustmentItem, NewAdjustmentRequest, TimeAdjustmentItem, TimeAdjustmentRequest,
    TimeAdjustmentStatus,
};
use crate::model::enrollment::EmployeeEnrollment;
use crate::model::ledger::{BankHoursLedgerEntry, BankHoursSource, NewLedgerEntry};
use crate::model::policy::{
    EnrollmentPolicyAssignment, NewAssignment, ResolvedPolicy, WorkDayPolicy, WorkPolicyTemplate,
};
use crate::model::punch::{NewPunch, PunchMutation, PunchType, TimePunch};
use crate::model::summary::{DailyAttendanceSummary, NewSummary};
use crate::store::{
    AdjustmentStore, HolidayLookup, LedgerStore, PolicyStore, PunchStore, SubjectStore,
    SummaryStore,
};

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn load_template(
        &self,
        template_id: u64,
    ) -> Result<Option<WorkPolicyTemplate>, EngineError> {
        #[derive(sqlx::FromRow)]
        struct TemplateRow {
            id: u64,
            tenant_id: u64,
            name: String,
        }

        let row = sqlx::query_as::<_, TemplateRow>(
            "SELECT id, tenant_id, name FROM work_policy_templates WHERE id = ?",
        )
        .bind(template_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let days = sqlx::query_as::<_, WorkDayPolicy>(
            "SELECT id, template_id, week_day, daily_work_minutes, break_minutes \
             FROM work_day_policies WHERE template_id = ? ORDER BY week_day",
        )
        .bind(template_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(WorkPolicyTemplate {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            days,
        }))
    }
}

impl SubjectStore for MySqlStore {
    async fn find_enrollment(
        &self,
        subject_id: u64,
    ) -> Result<Option<EmployeeEnrollment>, EngineError> {
        let enrollment = sqlx::query_as::<_, EmployeeEnrollment>(
            "SELECT id, tenant_id, employee_id, matricula, active_from, active_to, is_active \
             FROM employee_enrollments WHERE id = ?",
        )
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(enrollment)
    }

    async fn other_subjects_with_punch_on_date(
        &self,
        tenant_id: u64,
        employee_id: u64,
        work_date: NaiveDate,
        exclude_subject: u64,
    ) -> Result<Vec<u64>, EngineError> {
        let ids = sqlx::query_scalar::<_, u64>(
            "SELECT DISTINCT e.id FROM employee_enrollments e \
             JOIN time_punches p ON p.subject_id = e.id \
             WHERE e.tenant_id = ? AND e.employee_id = ? AND e.id <> ? \
               AND DATE(p.punched_at) = ?",
        )
        .bind(tenant_id)
        .bind(employee_id)
        .bind(exclude_subject)
        .bind(work_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}

impl PolicyStore for MySqlStore {
    async fn find_current_assignment(
        &self,
        subject_id: u64,
        date: NaiveDate,
    ) -> Result<Option<ResolvedPolicy>, EngineError> {
        let assignment = sqlx::query_as::<_, EnrollmentPolicyAssignment>(
            "SELECT id, tenant_id, subject_id, template_id, effective_from, effective_to \
             FROM enrollment_policy_assignments \
             WHERE subject_id = ? AND effective_from <= ? \
               AND (effective_to IS NULL OR effective_to >= ?)",
        )
        .bind(subject_id)
        .bind(date)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        let Some(assignment) = assignment else {
            return Ok(None);
        };
        let template = self
            .load_template(assignment.template_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("work policy template not found".into()))?;
        Ok(Some(ResolvedPolicy {
            assignment,
            template,
        }))
    }

    async fn find_template(
        &self,
        template_id: u64,
    ) -> Result<Option<WorkPolicyTemplate>, EngineError> {
        self.load_template(template_id).await
    }

    async fn find_overlapping_assignments(
        &self,
        subject_id: u64,
        effective_from: NaiveDate,
        effective_to: Option<NaiveDate>,
    ) -> Result<Vec<EnrollmentPolicyAssignment>, EngineError> {
        let assignments = sqlx::query_as::<_, EnrollmentPolicyAssignment>(
            "SELECT id, tenant_id, subject_id, template_id, effective_from, effective_to \
             FROM enrollment_policy_assignments \
             WHERE subject_id = ? \
               AND effective_from <= IFNULL(?, '9999-12-31') \
               AND IFNULL(effective_to, '9999-12-31') >= ?",
        )
        .bind(subject_id)
        .bind(effective_to)
        .bind(effective_from)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    async fn create_assignment(
        &self,
        assignment: NewAssignment,
    ) -> Result<EnrollmentPolicyAssignment, EngineError> {
        let result = sqlx::query(
            "INSERT INTO enrollment_policy_assignments \
             (tenant_id, subject_id, template_id, effective_from, effective_to) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(assignment.tenant_id)
        .bind(assignment.subject_id)
        .bind(assignment.template_id)
        .bind(assignment.effective_from)
        .bind(assignment.effective_to)
        .execute(&self.pool)
        .await?;

        Ok(EnrollmentPolicyAssignment {
            id: result.last_insert_id(),
            tenant_id: assignment.tenant_id,
            subject_id: assignment.subject_id,
            template_id: assignment.template_id,
            effective_from: assignment.effective_from,
            effective_to: assignment.effective_to,
        })
    }
}

impl PunchStore for MySqlStore {
    async fn create_punch(&self, punch: NewPunch) -> Result<TimePunch, EngineError> {
        let result = sqlx::query(
            "INSERT INTO time_punches (tenant_id, subject_id, punched_at, punch_type, source, note) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(punch.tenant_id)
        .bind(punch.subject_id)
        .bind(punch.punched_at)
        .bind(punch.punch_type)
        .bind(&punch.source)
        .bind(&punch.note)
        .execute(&self.pool)
        .await?;

        Ok(TimePunch {
            id: result.last_insert_id(),
            tenant_id: punch.tenant_id,
            subject_id: punch.subject_id,
            punched_at: punch.punched_at,
            punch_type: punch.punch_type,
            source: punch.source,
            note: punch.note,
        })
    }

    async fn delete_punch(&self, punch_id: u64) -> Result<(), EngineError> {
        sqlx::query("DELETE FROM time_punches WHERE id = ?")
            .bind(punch_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_punch(&self, punch_id: u64) -> Result<Option<TimePunch>, EngineError> {
        let punch = sqlx::query_as::<_, TimePunch>(
            "SELECT id, tenant_id, subject_id, punched_at, punch_type, source, note \
             FROM time_punches WHERE id = ?",
        )
        .bind(punch_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(punch)
    }

    async fn find_punches_for_day(
        &self,
        subject_id: u64,
        work_date: NaiveDate,
    ) -> Result<Vec<TimePunch>, EngineError> {
        let punches = sqlx::query_as::<_, TimePunch>(
            "SELECT id, tenant_id, subject_id, punched_at, punch_type, source, note \
             FROM time_punches WHERE subject_id = ? AND DATE(punched_at) = ? \
             ORDER BY punched_at",
        )
        .bind(subject_id)
        .bind(work_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(punches)
    }

    async fn find_duplicate_punch(
        &self,
        subject_id: u64,
        punched_at: NaiveDateTime,
        punch_type: PunchType,
    ) -> Result<Option<TimePunch>, EngineError> {
        let punch = sqlx::query_as::<_, TimePunch>(
            "SELECT id, tenant_id, subject_id, punched_at, punch_type, source, note \
             FROM time_punches WHERE subject_id = ? AND punched_at = ? AND punch_type = ?",
        )
        .bind(subject_id)
        .bind(punched_at)
        .bind(punch_type)
        .fetch_optional(&self.pool)
        .await?;
        Ok(punch)
    }
}

impl SummaryStore for MySqlStore {
    async fn upsert_summary(
        &self,
        summary: NewSummary,
    ) -> Result<DailyAttendanceSummary, EngineError> {
        // Keyed on the (subject_id, work_date) unique index; the row id stays
        // stable across recomputes.
        sqlx::query(
            "INSERT INTO daily_attendance_summaries \
             (tenant_id, subject_id, work_date, expected_minutes, worked_minutes, \
              break_minutes, overtime_minutes, deficit_minutes, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE \
               expected_minutes = ?, worked_minutes = ?, break_minutes = ?, \
               overtime_minutes = ?, deficit_minutes = ?, status = ?",
        )
        .bind(summary.tenant_id)
        .bind(summary.subject_id)
        .bind(summary.work_date)
        .bind(summary.expected_minutes)
        .bind(summary.worked_minutes)
        .bind(summary.break_minutes)
        .bind(summary.overtime_minutes)
        .bind(summary.deficit_minutes)
        .bind(summary.status)
        .bind(summary.expected_minutes)
        .bind(summary.worked_minutes)
        .bind(summary.break_minutes)
        .bind(summary.overtime_minutes)
        .bind(summary.deficit_minutes)
        .bind(summary.status)
        .execute(&self.pool)
        .await?;

        let row = self
            .find_summary(summary.subject_id, summary.work_date)
            .await?
            .ok_or_else(|| EngineError::NotFound("summary row missing after upsert".into()))?;
        Ok(row)
    }

    async fn find_summary(
        &self,
        subject_id: u64,
        work_date: NaiveDate,
    ) -> Result<Option<DailyAttendanceSummary>, EngineError> {
        let summary = sqlx::query_as::<_, DailyAttendanceSummary>(
            "SELECT id, tenant_id, subject_id, work_date, expected_minutes, worked_minutes, \
                    break_minutes, overtime_minutes, deficit_minutes, status \
             FROM daily_attendance_summaries WHERE subject_id = ? AND work_date = ?",
        )
        .bind(subject_id)
        .bind(work_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(summary)
    }
}

impl LedgerStore for MySqlStore {
    async fn create_ledger_entry(
        &self,
        entry: NewLedgerEntry,
    ) -> Result<BankHoursLedgerEntry, EngineError> {
        let result = sqlx::query(
            "INSERT INTO bank_hours_ledger \
             (tenant_id, subject_id, event_date, minutes_delta, source, reference_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.tenant_id)
        .bind(entry.subject_id)
        .bind(entry.event_date)
        .bind(entry.minutes_delta)
        .bind(entry.source)
        .bind(entry.reference_id)
        .execute(&self.pool)
        .await?;

        Ok(BankHoursLedgerEntry {
            id: result.last_insert_id(),
            tenant_id: entry.tenant_id,
            subject_id: entry.subject_id,
            event_date: entry.event_date,
            minutes_delta: entry.minutes_delta,
            source: entry.source,
            reference_id: entry.reference_id,
        })
    }

    async fn replace_auto_generated(
        &self,
        subject_id: u64,
        event_date: NaiveDate,
        entry: Option<NewLedgerEntry>,
    ) -> Result<(), EngineError> {
        // One transaction so no reader observes the day without its entry.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM bank_hours_ledger \
             WHERE subject_id = ? AND event_date = ? AND source = ?",
        )
        .bind(subject_id)
        .bind(event_date)
        .bind(BankHoursSource::DailyApuration)
        .execute(&mut *tx)
        .await?;

        if let Some(entry) = entry {
            sqlx::query(
                "INSERT INTO bank_hours_ledger \
                 (tenant_id, subject_id, event_date, minutes_delta, source, reference_id) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(entry.tenant_id)
            .bind(entry.subject_id)
            .bind(entry.event_date)
            .bind(entry.minutes_delta)
            .bind(entry.source)
            .bind(entry.reference_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn balance_until(
        &self,
        subject_id: u64,
        until: NaiveDate,
    ) -> Result<i64, EngineError> {
        let balance = sqlx::query_scalar::<_, i64>(
            "SELECT CAST(COALESCE(SUM(minutes_delta), 0) AS SIGNED) \
             FROM bank_hours_ledger WHERE subject_id = ? AND event_date <= ?",
        )
        .bind(subject_id)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;
        Ok(balance)
    }
}

impl AdjustmentStore for MySqlStore {
    async fn create_request(
        &self,
        request: NewAdjustmentRequest,
        items: Vec<NewAdjustmentItem>,
    ) -> Result<TimeAdjustmentRequest, EngineError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO time_adjustment_requests \
             (tenant_id, subject_id, request_date, request_type, status, reason, requester_user_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.tenant_id)
        .bind(request.subject_id)
        .bind(request.request_date)
        .bind(request.request_type)
        .bind(TimeAdjustmentStatus::Pending)
        .bind(&request.reason)
        .bind(request.requester_user_id)
        .execute(&mut *tx)
        .await?;
        let request_id = result.last_insert_id();

        for item in &items {
            sqlx::query(
                "INSERT INTO time_adjustment_items \
                 (tenant_id, request_id, proposed_punch_type, proposed_punched_at, \
                  original_punch_id, note) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(request.tenant_id)
            .bind(request_id)
            .bind(item.proposed_punch_type)
            .bind(item.proposed_punched_at)
            .bind(item.original_punch_id)
            .bind(&item.note)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(TimeAdjustmentRequest {
            id: request_id,
            tenant_id: request.tenant_id,
            subject_id: request.subject_id,
            request_date: request.request_date,
            request_type: request.request_type,
            status: TimeAdjustmentStatus::Pending,
            reason: request.reason,
            requester_user_id: request.requester_user_id,
            decided_at: None,
            decided_by_user_id: None,
            decision_reason: None,
        })
    }

    async fn find_request(
        &self,
        request_id: u64,
    ) -> Result<Option<TimeAdjustmentRequest>, EngineError> {
        let request = sqlx::query_as::<_, TimeAdjustmentRequest>(
            "SELECT id, tenant_id, subject_id, request_date, request_type, status, reason, \
                    requester_user_id, decided_at, decided_by_user_id, decision_reason \
             FROM time_adjustment_requests WHERE id = ?",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn items_for_request(
        &self,
        request_id: u64,
    ) -> Result<Vec<TimeAdjustmentItem>, EngineError> {
        let items = sqlx::query_as::<_, TimeAdjustmentItem>(
            "SELECT id, tenant_id, request_id, proposed_punch_type, proposed_punched_at, \
                    original_punch_id, note \
             FROM time_adjustment_items WHERE request_id = ? ORDER BY id",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn record_decision(
        &self,
        request_id: u64,
        status: TimeAdjustmentStatus,
        decided_at: NaiveDateTime,
        decided_by_user_id: u64,
        decision_reason: Option<String>,
    ) -> Result<TimeAdjustmentRequest, EngineError> {
        sqlx::query(
            "UPDATE time_adjustment_requests \
             SET status = ?, decided_at = ?, decided_by_user_id = ?, decision_reason = ? \
             WHERE id = ?",
        )
        .bind(status)
        .bind(decided_at)
        .bind(decided_by_user_id)
        .bind(decision_reason)
        .bind(request_id)
        .execute(&self.pool)
        .await?;

        self.find_request(request_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("adjustment request not found".into()))
    }

    async fn apply_mutations(
        &self,
        request_id: u64,
        mutations: Vec<PunchMutation>,
    ) -> Result<TimeAdjustmentRequest, EngineError> {
        // One transaction for the whole batch and the status flip; an error
        // mid-batch rolls everything back and the request stays APPROVED.
        let mut tx = self.pool.begin().await?;

        for mutation in mutations {
            match mutation {
                PunchMutation::Create(punch) => {
                    sqlx::query(
                        "INSERT INTO time_punches \
                         (tenant_id, subject_id, punched_at, punch_type, source, note) \
                         VALUES (?, ?, ?, ?, ?, ?)",
                    )
                    .bind(punch.tenant_id)
                    .bind(punch.subject_id)
                    .bind(punch.punched_at)
                    .bind(punch.punch_type)
                    .bind(&punch.source)
                    .bind(&punch.note)
                    .execute(&mut *tx)
                    .await?;
                }
                PunchMutation::Update {
                    punch_id,
                    punched_at,
                    punch_type,
                    note,
                } => {
                    let result = sqlx::query(
                        "UPDATE time_punches SET punched_at = ?, punch_type = ?, note = ? \
                         WHERE id = ?",
                    )
                    .bind(punched_at)
                    .bind(punch_type)
                    .bind(note)
                    .bind(punch_id)
                    .execute(&mut *tx)
                    .await?;
                    if result.rows_affected() == 0 {
                        return Err(EngineError::NotFound("punch not found".into()));
                    }
                }
                PunchMutation::Delete { punch_id } => {
                    let result = sqlx::query("DELETE FROM time_punches WHERE id = ?")
                        .bind(punch_id)
                        .execute(&mut *tx)
                        .await?;
                    if result.rows_affected() == 0 {
                        return Err(EngineError::NotFound("punch not found".into()));
                    }
                }
            }
        }

        sqlx::query("UPDATE time_adjustment_requests SET status = ? WHERE id = ?")
            .bind(TimeAdjustmentStatus::Applied)
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_request(request_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("adjustment request not found".into()))
    }

    async fn has_pending_on(
        &self,
        subject_id: u64,
        date: NaiveDate,
    ) -> Result<bool, EngineError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM time_adjustment_requests \
             WHERE subject_id = ? AND request_date = ? AND status = ?",
        )
        .bind(subject_id)
        .bind(date)
        .bind(TimeAdjustmentStatus::Pending)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}

impl HolidayLookup for MySqlStore {
    async fn is_holiday(&self, subject_id: u64, date: NaiveDate) -> Result<bool, EngineError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM holiday_calendar_assignments a \
             JOIN holidays h ON h.calendar_id = a.calendar_id \
             WHERE a.subject_id = ? AND h.holiday_date = ?",
        )
        .bind(subject_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}
