//! In-memory store used by the engine tests. Mirrors the MySQL store's
//! semantics, including the keyed summary upsert and the atomic ledger
//! replace.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};

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

#[derive(Default)]
struct Inner {
    next_id: u64,
    enrollments: Vec<EmployeeEnrollment>,
    templates: Vec<WorkPolicyTemplate>,
    assignments: Vec<EnrollmentPolicyAssignment>,
    punches: Vec<TimePunch>,
    summaries: Vec<DailyAttendanceSummary>,
    ledger: Vec<BankHoursLedgerEntry>,
    requests: Vec<TimeAdjustmentRequest>,
    items: Vec<TimeAdjustmentItem>,
    holidays: HashSet<(u64, NaiveDate)>,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

fn ranges_overlap(
    a_from: NaiveDate,
    a_to: Option<NaiveDate>,
    b_from: NaiveDate,
    b_to: Option<NaiveDate>,
) -> bool {
    let starts_before_b_ends = match b_to {
        Some(b_to) => a_from <= b_to,
        None => true,
    };
    let b_starts_before_a_ends = match a_to {
        Some(a_to) => b_from <= a_to,
        None => true,
    };
    starts_before_b_ends && b_starts_before_a_ends
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Test fixture: an active enrollment. Dates are `%Y-%m-%d` literals.
    pub fn seed_enrollment(
        &self,
        tenant_id: u64,
        employee_id: u64,
        matricula: &str,
        active_from: &str,
        active_to: Option<&str>,
    ) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.enrollments.push(EmployeeEnrollment {
            id,
            tenant_id,
            employee_id,
            matricula: matricula.to_owned(),
            active_from: parse_date(active_from),
            active_to: active_to.map(parse_date),
            is_active: true,
        });
        id
    }

    /// Test fixture: a template expecting the same minutes every weekday.
    pub fn seed_template(&self, tenant_id: u64, name: &str, daily_work_minutes: u32) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        let template_id = inner.next_id();
        let days = (0..7u8)
            .map(|week_day| {
                let id = template_id * 100 + week_day as u64;
                WorkDayPolicy {
                    id,
                    template_id,
                    week_day,
                    daily_work_minutes,
                    break_minutes: 60,
                }
            })
            .collect();
        inner.templates.push(WorkPolicyTemplate {
            id: template_id,
            tenant_id,
            name: name.to_owned(),
            days,
        });
        template_id
    }

    pub fn seed_assignment(
        &self,
        tenant_id: u64,
        subject_id: u64,
        template_id: u64,
        effective_from: &str,
        effective_to: Option<&str>,
    ) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.assignments.push(EnrollmentPolicyAssignment {
            id,
            tenant_id,
            subject_id,
            template_id,
            effective_from: parse_date(effective_from),
            effective_to: effective_to.map(parse_date),
        });
        id
    }

    pub fn seed_holiday(&self, subject_id: u64, date: NaiveDate) {
        self.inner
            .lock()
            .unwrap()
            .holidays
            .insert((subject_id, date));
    }

    /// The day's DAILY_APURATION entries, for test assertions.
    pub fn auto_entries_for(&self, subject_id: u64, event_date: NaiveDate) -> Vec<BankHoursLedgerEntry> {
        self.inner
            .lock()
            .unwrap()
            .ledger
            .iter()
            .filter(|entry| {
                entry.subject_id == subject_id
                    && entry.event_date == event_date
                    && entry.source == BankHoursSource::DailyApuration
            })
            .cloned()
            .collect()
    }
}

fn parse_date(literal: &str) -> NaiveDate {
    NaiveDate::parse_from_str(literal, "%Y-%m-%d").expect("date literal")
}

impl SubjectStore for MemoryStore {
    async fn find_enrollment(
        &self,
        subject_id: u64,
    ) -> Result<Option<EmployeeEnrollment>, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .enrollments
            .iter()
            .find(|enrollment| enrollment.id == subject_id)
            .cloned())
    }

    async fn other_subjects_with_punch_on_date(
        &self,
        tenant_id: u64,
        employee_id: u64,
        work_date: NaiveDate,
        exclude_subject: u64,
    ) -> Result<Vec<u64>, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .enrollments
            .iter()
            .filter(|enrollment| {
                enrollment.tenant_id == tenant_id
                    && enrollment.employee_id == employee_id
                    && enrollment.id != exclude_subject
            })
            .filter(|enrollment| {
                inner.punches.iter().any(|punch| {
                    punch.subject_id == enrollment.id && punch.punched_at.date() == work_date
                })
            })
            .map(|enrollment| enrollment.id)
            .collect())
    }
}

impl PolicyStore for MemoryStore {
    async fn find_current_assignment(
        &self,
        subject_id: u64,
        date: NaiveDate,
    ) -> Result<Option<ResolvedPolicy>, EngineError> {
        let inner = self.inner.lock().unwrap();
        let assignment = inner.assignments.iter().find(|assignment| {
            assignment.subject_id == subject_id
                && assignment.effective_from <= date
                && assignment.effective_to.map_or(true, |to| date <= to)
        });
        Ok(assignment.and_then(|assignment| {
            inner
                .templates
                .iter()
                .find(|template| template.id == assignment.template_id)
                .map(|template| ResolvedPolicy {
                    assignment: assignment.clone(),
                    template: template.clone(),
                })
        }))
    }

    async fn find_template(
        &self,
        template_id: u64,
    ) -> Result<Option<WorkPolicyTemplate>, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .templates
            .iter()
            .find(|template| template.id == template_id)
            .cloned())
    }

    async fn find_overlapping_assignments(
        &self,
        subject_id: u64,
        effective_from: NaiveDate,
        effective_to: Option<NaiveDate>,
    ) -> Result<Vec<EnrollmentPolicyAssignment>, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .assignments
            .iter()
            .filter(|assignment| {
                assignment.subject_id == subject_id
                    && ranges_overlap(
                        effective_from,
                        effective_to,
                        assignment.effective_from,
                        assignment.effective_to,
                    )
            })
            .cloned()
            .collect())
    }

    async fn create_assignment(
        &self,
        assignment: NewAssignment,
    ) -> Result<EnrollmentPolicyAssignment, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let row = EnrollmentPolicyAssignment {
            id,
            tenant_id: assignment.tenant_id,
            subject_id: assignment.subject_id,
            template_id: assignment.template_id,
            effective_from: assignment.effective_from,
            effective_to: assignment.effective_to,
        };
        inner.assignments.push(row.clone());
        Ok(row)
    }
}

impl PunchStore for MemoryStore {
    async fn create_punch(&self, punch: NewPunch) -> Result<TimePunch, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let row = TimePunch {
            id,
            tenant_id: punch.tenant_id,
            subject_id: punch.subject_id,
            punched_at: punch.punched_at,
            punch_type: punch.punch_type,
            source: punch.source,
            note: punch.note,
        };
        inner.punches.push(row.clone());
        Ok(row)
    }

    async fn delete_punch(&self, punch_id: u64) -> Result<(), EngineError> {
        let mut inner = self.inner.lock().unwrap();
        inner.punches.retain(|punch| punch.id != punch_id);
        Ok(())
    }

    async fn find_punch(&self, punch_id: u64) -> Result<Option<TimePunch>, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .punches
            .iter()
            .find(|punch| punch.id == punch_id)
            .cloned())
    }

    async fn find_punches_for_day(
        &self,
        subject_id: u64,
        work_date: NaiveDate,
    ) -> Result<Vec<TimePunch>, EngineError> {
        let inner = self.inner.lock().unwrap();
        let mut punches: Vec<TimePunch> = inner
            .punches
            .iter()
            .filter(|punch| {
                punch.subject_id == subject_id && punch.punched_at.date() == work_date
            })
            .cloned()
            .collect();
        punches.sort_by_key(|punch| punch.punched_at);
        Ok(punches)
    }

    async fn find_duplicate_punch(
        &self,
        subject_id: u64,
        punched_at: NaiveDateTime,
        punch_type: PunchType,
    ) -> Result<Option<TimePunch>, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .punches
            .iter()
            .find(|punch| {
                punch.subject_id == subject_id
                    && punch.punched_at == punched_at
                    && punch.punch_type == punch_type
            })
            .cloned())
    }
}

impl SummaryStore for MemoryStore {
    async fn upsert_summary(
        &self,
        summary: NewSummary,
    ) -> Result<DailyAttendanceSummary, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.summaries.iter_mut().find(|row| {
            row.subject_id == summary.subject_id && row.work_date == summary.work_date
        }) {
            existing.expected_minutes = summary.expected_minutes;
            existing.worked_minutes = summary.worked_minutes;
            existing.break_minutes = summary.break_minutes;
            existing.overtime_minutes = summary.overtime_minutes;
            existing.deficit_minutes = summary.deficit_minutes;
            existing.status = summary.status;
            return Ok(existing.clone());
        }
        let id = inner.next_id();
        let row = DailyAttendanceSummary {
            id,
            tenant_id: summary.tenant_id,
            subject_id: summary.subject_id,
            work_date: summary.work_date,
            expected_minutes: summary.expected_minutes,
            worked_minutes: summary.worked_minutes,
            break_minutes: summary.break_minutes,
            overtime_minutes: summary.overtime_minutes,
            deficit_minutes: summary.deficit_minutes,
            status: summary.status,
        };
        inner.summaries.push(row.clone());
        Ok(row)
    }

    async fn find_summary(
        &self,
        subject_id: u64,
        work_date: NaiveDate,
    ) -> Result<Option<DailyAttendanceSummary>, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .summaries
            .iter()
            .find(|row| row.subject_id == subject_id && row.work_date == work_date)
            .cloned())
    }
}

impl LedgerStore for MemoryStore {
    async fn create_ledger_entry(
        &self,
        entry: NewLedgerEntry,
    ) -> Result<BankHoursLedgerEntry, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let row = BankHoursLedgerEntry {
            id,
            tenant_id: entry.tenant_id,
            subject_id: entry.subject_id,
            event_date: entry.event_date,
            minutes_delta: entry.minutes_delta,
            source: entry.source,
            reference_id: entry.reference_id,
        };
        inner.ledger.push(row.clone());
        Ok(row)
    }

    async fn replace_auto_generated(
        &self,
        subject_id: u64,
        event_date: NaiveDate,
        entry: Option<NewLedgerEntry>,
    ) -> Result<(), EngineError> {
        let mut inner = self.inner.lock().unwrap();
        inner.ledger.retain(|row| {
            !(row.subject_id == subject_id
                && row.event_date == event_date
                && row.source == BankHoursSource::DailyApuration)
        });
        if let Some(entry) = entry {
            let id = inner.next_id();
            inner.ledger.push(BankHoursLedgerEntry {
                id,
                tenant_id: entry.tenant_id,
                subject_id: entry.subject_id,
                event_date: entry.event_date,
                minutes_delta: entry.minutes_delta,
                source: entry.source,
                reference_id: entry.reference_id,
            });
        }
        Ok(())
    }

    async fn balance_until(
        &self,
        subject_id: u64,
        until: NaiveDate,
    ) -> Result<i64, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .ledger
            .iter()
            .filter(|row| row.subject_id == subject_id && row.event_date <= until)
            .map(|row| row.minutes_delta as i64)
            .sum())
    }
}

impl AdjustmentStore for MemoryStore {
    async fn create_request(
        &self,
        request: NewAdjustmentRequest,
        items: Vec<NewAdjustmentItem>,
    ) -> Result<TimeAdjustmentRequest, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        let request_id = inner.next_id();
        let row = TimeAdjustmentRequest {
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
        };
        let tenant_id = row.tenant_id;
        inner.requests.push(row.clone());
        for item in items {
            let id = inner.next_id();
            inner.items.push(TimeAdjustmentItem {
                id,
                tenant_id,
                request_id,
                proposed_punch_type: item.proposed_punch_type,
                proposed_punched_at: item.proposed_punched_at,
                original_punch_id: item.original_punch_id,
                note: item.note,
            });
        }
        Ok(row)
    }

    async fn find_request(
        &self,
        request_id: u64,
    ) -> Result<Option<TimeAdjustmentRequest>, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .requests
            .iter()
            .find(|request| request.id == request_id)
            .cloned())
    }

    async fn items_for_request(
        &self,
        request_id: u64,
    ) -> Result<Vec<TimeAdjustmentItem>, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .items
            .iter()
            .filter(|item| item.request_id == request_id)
            .cloned()
            .collect())
    }

    async fn record_decision(
        &self,
        request_id: u64,
        status: TimeAdjustmentStatus,
        decided_at: NaiveDateTime,
        decided_by_user_id: u64,
        decision_reason: Option<String>,
    ) -> Result<TimeAdjustmentRequest, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        let request = inner
            .requests
            .iter_mut()
            .find(|request| request.id == request_id)
            .ok_or_else(|| EngineError::NotFound("adjustment request not found".into()))?;
        request.status = status;
        request.decided_at = Some(decided_at);
        request.decided_by_user_id = Some(decided_by_user_id);
        request.decision_reason = decision_reason;
        Ok(request.clone())
    }

    async fn apply_mutations(
        &self,
        request_id: u64,
        mutations: Vec<PunchMutation>,
    ) -> Result<TimeAdjustmentRequest, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.requests.iter().any(|request| request.id == request_id) {
            return Err(EngineError::NotFound("adjustment request not found".into()));
        }
        // Validate every target before mutating; a failing batch must leave
        // the punch set and the request untouched.
        for mutation in &mutations {
            if let PunchMutation::Update { punch_id, .. } | PunchMutation::Delete { punch_id } =
                mutation
            {
                if !inner.punches.iter().any(|punch| punch.id == *punch_id) {
                    return Err(EngineError::NotFound("punch not found".into()));
                }
            }
        }

        for mutation in mutations {
            match mutation {
                PunchMutation::Create(punch) => {
                    let id = inner.next_id();
                    inner.punches.push(TimePunch {
                        id,
                        tenant_id: punch.tenant_id,
                        subject_id: punch.subject_id,
                        punched_at: punch.punched_at,
                        punch_type: punch.punch_type,
                        source: punch.source,
                        note: punch.note,
                    });
                }
                PunchMutation::Update {
                    punch_id,
                    punched_at,
                    punch_type,
                    note,
                } => {
                    if let Some(punch) =
                        inner.punches.iter_mut().find(|punch| punch.id == punch_id)
                    {
                        punch.punched_at = punched_at;
                        punch.punch_type = punch_type;
                        punch.note = note;
                    }
                }
                PunchMutation::Delete { punch_id } => {
                    inner.punches.retain(|punch| punch.id != punch_id);
                }
            }
        }

        let request = inner
            .requests
            .iter_mut()
            .find(|request| request.id == request_id)
            .expect("request existence checked above");
        request.status = TimeAdjustmentStatus::Applied;
        Ok(request.clone())
    }

    async fn has_pending_on(
        &self,
        subject_id: u64,
        date: NaiveDate,
    ) -> Result<bool, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.requests.iter().any(|request| {
            request.subject_id == subject_id
                && request.request_date == date
                && request.status == TimeAdjustmentStatus::Pending
        }))
    }
}

impl HolidayLookup for MemoryStore {
    async fn is_holiday(&self, subject_id: u64, date: NaiveDate) -> Result<bool, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.holidays.contains(&(subject_id, date)))
    }
}
