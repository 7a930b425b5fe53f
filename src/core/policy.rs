use chrono::NaiveDate;

use crate::core::error::EngineError;
use crate::model::policy::{EnrollmentPolicyAssignment, NewAssignment, ResolvedPolicy};
use crate::store::{PolicyStore, SubjectStore};

/// The applicable work policy for (subject, date), or `None` when no
/// assignment covers the date.
pub async fn resolve_policy<S: PolicyStore>(
    store: &S,
    subject_id: u64,
    date: NaiveDate,
) -> Result<Option<ResolvedPolicy>, EngineError> {
    store.find_current_assignment(subject_id, date).await
}

/// Creates a policy assignment, enforcing the no-overlap invariant the
/// resolver relies on.
pub async fn create_assignment<S>(
    store: &S,
    input: NewAssignment,
) -> Result<EnrollmentPolicyAssignment, EngineError>
where
    S: PolicyStore + SubjectStore,
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

    let template = store
        .find_template(input.template_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("work policy template not found".into()))?;
    if template.tenant_id != input.tenant_id {
        return Err(EngineError::BadRequest(
            "template does not belong to tenant".into(),
        ));
    }

    if let Some(effective_to) = input.effective_to {
        if effective_to < input.effective_from {
            return Err(EngineError::BadRequest(
                "effective_to must be greater than or equal to effective_from".into(),
            ));
        }
    }

    let overlapping = store
        .find_overlapping_assignments(input.subject_id, input.effective_from, input.effective_to)
        .await?;
    if !overlapping.is_empty() {
        return Err(EngineError::Conflict(
            "assignment period overlaps with an existing assignment".into(),
        ));
    }

    store.create_assignment(input).await
}
