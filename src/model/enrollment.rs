use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The subject registry: an employee's active work enrollment. Punches,
/// summaries and ledger entries all hang off the enrollment id (`subject_id`).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeEnrollment {
    #[schema(example = 42)]
    pub id: u64,

    #[schema(example = 1)]
    pub tenant_id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "EMP-0007")]
    pub matricula: String,

    #[schema(example = "2025-01-01", value_type = String, format = "date")]
    pub active_from: NaiveDate,

    #[schema(example = "2026-12-31", value_type = String, format = "date", nullable = true)]
    pub active_to: Option<NaiveDate>,

    #[schema(example = true)]
    pub is_active: bool,
}

impl EmployeeEnrollment {
    /// Whether the enrollment can own activity on the given date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        if !self.is_active {
            return false;
        }
        if date < self.active_from {
            return false;
        }
        match self.active_to {
            Some(active_to) => date <= active_to,
            None => true,
        }
    }
}
