use chrono::NaiveDate;
use once_cell::sync::Lazy;

use crate::core::calculator::{self, SummaryInput};
use crate::core::error::EngineError;
use crate::core::{policy, sequence};
use crate::model::ledger::{BankHoursSource, NewLedgerEntry};
use crate::model::summary::{DailyAttendanceStatus, DailyAttendanceSummary, NewSummary};
use crate::store::{
    AdjustmentStore, HolidayLookup, LedgerStore, PolicyStore, PunchStore, SubjectStore,
    SummaryStore,
};
use crate::utils::day_lock::DayLocks;

static DAY_LOCKS: Lazy<DayLocks> = Lazy::new(DayLocks::new);

/// The central idempotent recompute for one subject-day: resolve policy,
/// derive the summary from the day's punches, upsert the summary row and
/// replace the day's auto-generated ledger entry. Safe to call any number of
/// times; same-day calls are serialized on a keyed lock.
pub async fn recalculate_day<S>(
    store: &S,
    tenant_id: u64,
    subject_id: u64,
    work_date: NaiveDate,
) -> Result<DailyAttendanceSummary, EngineError>
where
    S: SubjectStore + PolicyStore + PunchStore + SummaryStore + LedgerStore + AdjustmentStore
        + HolidayLookup,
{
    let enrollment = store
        .find_enrollment(subject_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("enrollment not found".into()))?;
    if enrollment.tenant_id != tenant_id {
        return Err(EngineError::BadRequest(
            "enrollment does not belong to tenant".into(),
        ));
    }

    let lock = DAY_LOCKS.for_day(subject_id, work_date);
    let _guard = lock.lock().await;

    let resolved = policy::resolve_policy(store, subject_id, work_date).await?;
    let policy_minutes = resolved
        .as_ref()
        .map(|policy| policy.template.expected_minutes_on(work_date));

    let punches = store.find_punches_for_day(subject_id, work_date).await?;
    let is_holiday = store.is_holiday(subject_id, work_date).await?;
    let has_pending_adjustment = store.has_pending_on(subject_id, work_date).await?;

    let figures = calculator::compute(SummaryInput {
        events: sequence::events_of(&punches),
        policy_minutes,
        is_holiday,
        has_pending_adjustment,
    });

    let summary = store
        .upsert_summary(NewSummary {
            tenant_id,
            subject_id,
            work_date,
            expected_minutes: figures.expected_minutes,
            worked_minutes: figures.worked_minutes,
            break_minutes: figures.break_minutes,
            overtime_minutes: figures.overtime_minutes,
            deficit_minutes: figures.deficit_minutes,
            status: figures.status,
        })
        .await?;

    // Replace, never patch: the old DAILY_APURATION row is dropped and a
    // fresh one written only when the day settled OK with a non-zero delta.
    let daily_delta = figures.overtime_minutes as i32 - figures.deficit_minutes as i32;
    let entry = (figures.status == DailyAttendanceStatus::Ok && daily_delta != 0).then(|| {
        NewLedgerEntry {
            tenant_id,
            subject_id,
            event_date: work_date,
            minutes_delta: daily_delta,
            source: BankHoursSource::DailyApuration,
            reference_id: Some(summary.id),
        }
    });
    store
        .replace_auto_generated(subject_id, work_date, entry)
        .await?;

    tracing::debug!(
        subject_id,
        %work_date,
        status = %summary.status,
        daily_delta,
        "daily summary recalculated"
    );

    Ok(summary)
}
