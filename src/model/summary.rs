use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DailyAttendanceStatus {
    Ok,
    Incomplete,
    PendingAdjustment,
    NoPolicy,
}

/// Derived row, regenerated in full by the recalculator. At most one per
/// (subject_id, work_date); never hand-edited.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 5,
        "tenant_id": 1,
        "subject_id": 42,
        "work_date": "2026-01-05",
        "expected_minutes": 480,
        "worked_minutes": 540,
        "break_minutes": 60,
        "overtime_minutes": 60,
        "deficit_minutes": 0,
        "status": "OK"
    })
)]
pub struct DailyAttendanceSummary {
    #[schema(example = 5)]
    pub id: u64,

    #[schema(example = 1)]
    pub tenant_id: u64,

    #[schema(example = 42)]
    pub subject_id: u64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub work_date: NaiveDate,

    #[schema(example = 480)]
    pub expected_minutes: u32,

    #[schema(example = 540)]
    pub worked_minutes: u32,

    #[schema(example = 60)]
    pub break_minutes: u32,

    #[schema(example = 60)]
    pub overtime_minutes: u32,

    #[schema(example = 0)]
    pub deficit_minutes: u32,

    #[schema(example = "OK")]
    pub status: DailyAttendanceStatus,
}

/// Upsert shape: key fields plus the derived figures. The store keeps the
/// row id stable across recomputes.
#[derive(Debug, Clone)]
pub struct NewSummary {
    pub tenant_id: u64,
    pub subject_id: u64,
    pub work_date: NaiveDate,
    pub expected_minutes: u32,
    pub worked_minutes: u32,
    pub break_minutes: u32,
    pub overtime_minutes: u32,
    pub deficit_minutes: u32,
    pub status: DailyAttendanceStatus,
}
