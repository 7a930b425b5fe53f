use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-weekday expectation inside a template. `week_day` is 0 = Monday
/// through 6 = Sunday (chrono's `num_days_from_monday`).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct WorkDayPolicy {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 3)]
    pub template_id: u64,

    #[schema(example = 0, minimum = 0, maximum = 6)]
    pub week_day: u8,

    #[schema(example = 480)]
    pub daily_work_minutes: u32,

    #[schema(example = 60)]
    pub break_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkPolicyTemplate {
    #[schema(example = 3)]
    pub id: u64,

    #[schema(example = 1)]
    pub tenant_id: u64,

    #[schema(example = "Standard 8h")]
    pub name: String,

    pub days: Vec<WorkDayPolicy>,
}

impl WorkPolicyTemplate {
    /// Expected work minutes for the weekday of `date`; 0 when the template
    /// has no entry for that weekday.
    pub fn expected_minutes_on(&self, date: NaiveDate) -> u32 {
        let week_day = date.weekday().num_days_from_monday() as u8;
        self.days
            .iter()
            .find(|day| day.week_day == week_day)
            .map(|day| day.daily_work_minutes)
            .unwrap_or(0)
    }
}

/// Time-bounded link from a subject to a template. Assignments for one
/// subject never overlap; open-ended (`effective_to = NULL`) counts as
/// infinite.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EnrollmentPolicyAssignment {
    #[schema(example = 10)]
    pub id: u64,

    #[schema(example = 1)]
    pub tenant_id: u64,

    #[schema(example = 42)]
    pub subject_id: u64,

    #[schema(example = 3)]
    pub template_id: u64,

    #[schema(example = "2025-01-01", value_type = String, format = "date")]
    pub effective_from: NaiveDate,

    #[schema(example = "2026-12-31", value_type = String, format = "date", nullable = true)]
    pub effective_to: Option<NaiveDate>,
}

/// Assignment plus its template, as returned by the policy resolver.
#[derive(Debug, Clone)]
pub struct ResolvedPolicy {
    pub assignment: EnrollmentPolicyAssignment,
    pub template: WorkPolicyTemplate,
}

/// Insert shape for an assignment; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub tenant_id: u64,
    pub subject_id: u64,
    pub template_id: u64,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}
