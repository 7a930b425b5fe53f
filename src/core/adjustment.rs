use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime, Utc};

use crate::core::error::EngineError;
use crate::core::{recalc, sequence};
use crate::model::adjustment::{
    AdjustmentChange, NewAdjustmentItem, NewAdjustmentRequest, TimeAdjustmentRequest,
    TimeAdjustmentStatus, TimeAdjustmentType,
};
use crate::model::punch::{NewPunch, PunchMutation, PunchType, TimePunch};
use crate::store::{
    AdjustmentStore, HolidayLookup, LedgerStore, PolicyStore, PunchStore, SubjectStore,
    SummaryStore,
};

/// Creation input: the request header plus its changes in tagged form.
#[derive(Debug, Clone)]
pub struct NewRequestInput {
    pub tenant_id: u64,
    pub subject_id: u64,
    pub request_date: NaiveDate,
    pub request_type: TimeAdjustmentType,
    pub reason: String,
    pub requester_user_id: u64,
    pub changes: Vec<AdjustmentChange>,
}

#[derive(Debug, Clone)]
pub struct Decision {
    pub status: TimeAdjustmentStatus,
    pub decided_by_user_id: u64,
    pub decision_reason: Option<String>,
}

fn change_fingerprint(
    change: &AdjustmentChange,
) -> (Option<PunchType>, Option<NaiveDateTime>, Option<u64>) {
    match change {
        AdjustmentChange::NewPunch {
            punch_type,
            punched_at,
            ..
        } => (Some(*punch_type), Some(*punched_at), None),
        AdjustmentChange::Amend {
            original_punch_id,
            punch_type,
            punched_at,
            ..
        } => (Some(*punch_type), Some(*punched_at), Some(*original_punch_id)),
        AdjustmentChange::Remove {
            original_punch_id, ..
        } => (None, None, Some(*original_punch_id)),
    }
}

fn item_of(change: &AdjustmentChange) -> NewAdjustmentItem {
    match change {
        AdjustmentChange::NewPunch {
            punch_type,
            punched_at,
            note,
        } => NewAdjustmentItem {
            proposed_punch_type: Some(*punch_type),
            proposed_punched_at: Some(*punched_at),
            original_punch_id: None,
            note: note.clone(),
        },
        AdjustmentChange::Amend {
            original_punch_id,
            punch_type,
            punched_at,
            note,
        } => NewAdjustmentItem {
            proposed_punch_type: Some(*punch_type),
            proposed_punched_at: Some(*punched_at),
            original_punch_id: Some(*original_punch_id),
            note: note.clone(),
        },
        AdjustmentChange::Remove {
            original_punch_id,
            note,
        } => NewAdjustmentItem {
            proposed_punch_type: None,
            proposed_punched_at: None,
            original_punch_id: Some(*original_punch_id),
            note: note.clone(),
        },
    }
}

/// Loads a change's original punch and checks its ownership.
async fn original_of<S: PunchStore>(
    store: &S,
    subject_id: u64,
    original_punch_id: u64,
) -> Result<TimePunch, EngineError> {
    let punch = store
        .find_punch(original_punch_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("original punch not found".into()))?;
    if punch.subject_id != subject_id {
        return Err(EngineError::BadRequest(
            "original_punch_id does not belong to subject".into(),
        ));
    }
    Ok(punch)
}

/// Creates a PENDING request after validating the subject, the reason and
/// every item.
pub async fn create_request<S>(
    store: &S,
    input: NewRequestInput,
) -> Result<TimeAdjustmentRequest, EngineError>
where
    S: SubjectStore + PunchStore + AdjustmentStore,
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
    if !enrollment.is_active {
        return Err(EngineError::BadRequest(
            "inactive enrollment cannot receive adjustments".into(),
        ));
    }
    if !enrollment.covers(input.request_date) {
        return Err(EngineError::BadRequest(
            "request_date is outside the enrollment active period".into(),
        ));
    }

    let reason = input.reason.trim().to_owned();
    if reason.is_empty() {
        return Err(EngineError::BadRequest("reason is required".into()));
    }
    if input.changes.is_empty() {
        return Err(EngineError::BadRequest(
            "at least one adjustment item is required".into(),
        ));
    }

    let mut fingerprints = HashSet::new();
    for change in &input.changes {
        let proposed_at = match change {
            AdjustmentChange::NewPunch { punched_at, .. }
            | AdjustmentChange::Amend { punched_at, .. } => Some(*punched_at),
            AdjustmentChange::Remove { .. } => None,
        };
        if let Some(punched_at) = proposed_at {
            if punched_at.date() != input.request_date {
                return Err(EngineError::BadRequest(
                    "all proposed punches must match request_date".into(),
                ));
            }
        }

        if let AdjustmentChange::Amend {
            original_punch_id, ..
        }
        | AdjustmentChange::Remove {
            original_punch_id, ..
        } = change
        {
            original_of(store, input.subject_id, *original_punch_id).await?;
        }

        if !fingerprints.insert(change_fingerprint(change)) {
            return Err(EngineError::Conflict(
                "duplicate adjustment item detected".into(),
            ));
        }
    }

    let items = input.changes.iter().map(item_of).collect();
    let created = store
        .create_request(
            NewAdjustmentRequest {
                tenant_id: input.tenant_id,
                subject_id: input.subject_id,
                request_date: input.request_date,
                request_type: input.request_type,
                reason,
                requester_user_id: input.requester_user_id,
            },
            items,
        )
        .await?;

    tracing::info!(
        request_id = created.id,
        subject_id = created.subject_id,
        "adjustment request created"
    );
    Ok(created)
}

/// PENDING → APPROVED or REJECTED. Rejection requires a reason.
pub async fn decide_request<S>(
    store: &S,
    tenant_id: u64,
    request_id: u64,
    decision: Decision,
) -> Result<TimeAdjustmentRequest, EngineError>
where
    S: AdjustmentStore,
{
    let request = store
        .find_request(request_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("adjustment request not found".into()))?;
    if request.tenant_id != tenant_id {
        return Err(EngineError::BadRequest(
            "request does not belong to tenant".into(),
        ));
    }
    if request.status != TimeAdjustmentStatus::Pending {
        return Err(EngineError::BadRequest(
            "only pending requests can be decided".into(),
        ));
    }
    if !matches!(
        decision.status,
        TimeAdjustmentStatus::Approved | TimeAdjustmentStatus::Rejected
    ) {
        return Err(EngineError::BadRequest(
            "decision status must be APPROVED or REJECTED".into(),
        ));
    }

    let decision_reason = decision
        .decision_reason
        .as_deref()
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .map(str::to_owned);
    if decision.status == TimeAdjustmentStatus::Rejected && decision_reason.is_none() {
        return Err(EngineError::BadRequest(
            "decision_reason is required for rejection".into(),
        ));
    }

    let updated = store
        .record_decision(
            request_id,
            decision.status,
            Utc::now().naive_utc(),
            decision.decided_by_user_id,
            decision_reason,
        )
        .await?;

    tracing::info!(request_id, status = %updated.status, "adjustment request decided");
    Ok(updated)
}

/// APPROVED → APPLIED. Validates every affected day's resulting sequence
/// before mutating anything; re-applying an APPLIED request is a no-op.
pub async fn apply_request<S>(
    store: &S,
    tenant_id: u64,
    request_id: u64,
) -> Result<TimeAdjustmentRequest, EngineError>
where
    S: SubjectStore + PolicyStore + PunchStore + SummaryStore + LedgerStore + AdjustmentStore
        + HolidayLookup,
{
    let request = store
        .find_request(request_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("adjustment request not found".into()))?;
    if request.tenant_id != tenant_id {
        return Err(EngineError::BadRequest(
            "request does not belong to tenant".into(),
        ));
    }
    if request.status == TimeAdjustmentStatus::Applied {
        return Ok(request);
    }
    if request.status != TimeAdjustmentStatus::Approved {
        return Err(EngineError::BadRequest(
            "only approved requests can be applied".into(),
        ));
    }

    let items = store.items_for_request(request_id).await?;
    if items.is_empty() {
        return Err(EngineError::BadRequest(
            "no adjustment items found for request".into(),
        ));
    }
    let changes = items
        .iter()
        .map(|item| {
            item.change()
                .ok_or_else(|| EngineError::BadRequest("invalid adjustment item".into()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Resolve originals and the union of affected calendar dates first.
    let mut originals: HashMap<u64, TimePunch> = HashMap::new();
    let mut affected_dates: BTreeSet<NaiveDate> = BTreeSet::new();
    for change in &changes {
        match change {
            AdjustmentChange::NewPunch { punched_at, .. } => {
                affected_dates.insert(punched_at.date());
            }
            AdjustmentChange::Amend {
                original_punch_id,
                punched_at,
                ..
            } => {
                let original = original_of(store, request.subject_id, *original_punch_id).await?;
                affected_dates.insert(original.punched_at.date());
                affected_dates.insert(punched_at.date());
                originals.insert(*original_punch_id, original);
            }
            AdjustmentChange::Remove {
                original_punch_id, ..
            } => {
                let original = original_of(store, request.subject_id, *original_punch_id).await?;
                affected_dates.insert(original.punched_at.date());
                originals.insert(*original_punch_id, original);
            }
        }
    }

    // Dry-run: build each affected day's resulting punch set and validate it
    // before any mutation happens.
    let mut by_date: HashMap<NaiveDate, Vec<(Option<u64>, sequence::PunchEvent)>> = HashMap::new();
    for &date in &affected_dates {
        let punches = store.find_punches_for_day(request.subject_id, date).await?;
        by_date.insert(
            date,
            punches
                .iter()
                .map(|punch| (Some(punch.id), (punch.punched_at, punch.punch_type)))
                .collect(),
        );
    }
    for change in &changes {
        match change {
            AdjustmentChange::NewPunch {
                punch_type,
                punched_at,
                ..
            } => {
                by_date
                    .entry(punched_at.date())
                    .or_default()
                    .push((None, (*punched_at, *punch_type)));
            }
            AdjustmentChange::Amend {
                original_punch_id,
                punch_type,
                punched_at,
                ..
            } => {
                let original = &originals[original_punch_id];
                if let Some(day) = by_date.get_mut(&original.punched_at.date()) {
                    day.retain(|(id, _)| *id != Some(*original_punch_id));
                }
                by_date
                    .entry(punched_at.date())
                    .or_default()
                    .push((None, (*punched_at, *punch_type)));
            }
            AdjustmentChange::Remove {
                original_punch_id, ..
            } => {
                let original = &originals[original_punch_id];
                if let Some(day) = by_date.get_mut(&original.punched_at.date()) {
                    day.retain(|(id, _)| *id != Some(*original_punch_id));
                }
            }
        }
    }
    for day in by_date.values() {
        sequence::validate(day.iter().map(|(_, event)| *event).collect())?;
    }

    // Commit: the whole batch and the APPLIED flip are one atomic store
    // operation, never a sequence of partial writes.
    let mutations = changes
        .iter()
        .map(|change| match change {
            AdjustmentChange::NewPunch {
                punch_type,
                punched_at,
                note,
            } => PunchMutation::Create(NewPunch {
                tenant_id: request.tenant_id,
                subject_id: request.subject_id,
                punched_at: *punched_at,
                punch_type: *punch_type,
                source: "adjustment".into(),
                note: note.clone(),
            }),
            AdjustmentChange::Amend {
                original_punch_id,
                punch_type,
                punched_at,
                note,
            } => PunchMutation::Update {
                punch_id: *original_punch_id,
                punched_at: *punched_at,
                punch_type: *punch_type,
                note: note.clone(),
            },
            AdjustmentChange::Remove {
                original_punch_id, ..
            } => PunchMutation::Delete {
                punch_id: *original_punch_id,
            },
        })
        .collect();

    let updated = store.apply_mutations(request_id, mutations).await?;
    tracing::info!(
        request_id,
        affected_days = affected_dates.len(),
        "adjustment request applied"
    );

    for &date in &affected_dates {
        recalc::recalculate_day(store, request.tenant_id, request.subject_id, date).await?;
    }

    Ok(updated)
}
