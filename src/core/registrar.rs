use crate::core::error::EngineError;
use crate::core::{recalc, sequence};
use crate::model::punch::{NewPunch, TimePunch};
use crate::store::{
    AdjustmentStore, HolidayLookup, LedgerStore, PolicyStore, PunchStore, SubjectStore,
    SummaryStore,
};

/// Validated creation of a single punch. Fail-fast order: active enrollment
/// covering the date, exact duplicate, cross-subject same-day conflict,
/// sequence legality with the candidate included. On success the punch is
/// persisted and the date recomputed; a recompute failure fails the call.
pub async fn register_punch<S>(
    store: &S,
    input: NewPunch,
    allow_multi_subject_per_day: bool,
) -> Result<TimePunch, EngineError>
where
    S: SubjectStore + PolicyStore + PunchStore + SummaryStore + LedgerStore + AdjustmentStore
        + HolidayLookup,
{
    let enrollment = store
        .find_enrollment(input.subject_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("enrollment not found".into()))?;
    if enrollment.tenant_id != input.tenant_id {
        return Err(EngineError::BadRequest(
            "enrollment does not belong to tenant".into(),
        ));
    }

    let work_date = input.punched_at.date();
    if !enrollment.is_active {
        return Err(EngineError::BadRequest(
            "inactive enrollment cannot receive punches".into(),
        ));
    }
    if !enrollment.covers(work_date) {
        return Err(EngineError::BadRequest(
            "punch date is outside the enrollment active period".into(),
        ));
    }

    if store
        .find_duplicate_punch(input.subject_id, input.punched_at, input.punch_type)
        .await?
        .is_some()
    {
        return Err(EngineError::Conflict(
            "there is already a punch with the same date, time and type".into(),
        ));
    }

    if !allow_multi_subject_per_day {
        let siblings = store
            .other_subjects_with_punch_on_date(
                input.tenant_id,
                enrollment.employee_id,
                work_date,
                input.subject_id,
            )
            .await?;
        if !siblings.is_empty() {
            return Err(EngineError::BadRequest(
                "employee cannot register punches in multiple enrollments in the same day".into(),
            ));
        }
    }

    let existing = store
        .find_punches_for_day(input.subject_id, work_date)
        .await?;
    let mut events = sequence::events_of(&existing);
    events.push((input.punched_at, input.punch_type));
    sequence::validate(events)?;

    let created = store.create_punch(input).await?;
    tracing::info!(
        subject_id = created.subject_id,
        punch_id = created.id,
        punch_type = %created.punch_type,
        "punch registered"
    );

    recalc::recalculate_day(store, created.tenant_id, created.subject_id, work_date).await?;

    Ok(created)
}

/// Deletes one punch and recomputes its date, restoring the summary and
/// ledger to what they would have been without it.
pub async fn delete_punch<S>(store: &S, tenant_id: u64, punch_id: u64) -> Result<(), EngineError>
where
    S: SubjectStore + PolicyStore + PunchStore + SummaryStore + LedgerStore + AdjustmentStore
        + HolidayLookup,
{
    let punch = store
        .find_punch(punch_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("punch not found".into()))?;
    if punch.tenant_id != tenant_id {
        return Err(EngineError::BadRequest(
            "punch does not belong to tenant".into(),
        ));
    }

    store.delete_punch(punch_id).await?;
    tracing::info!(subject_id = punch.subject_id, punch_id, "punch deleted");

    recalc::recalculate_day(store, tenant_id, punch.subject_id, punch.punched_at.date()).await?;
    Ok(())
}
