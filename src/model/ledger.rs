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
pub enum BankHoursSource {
    /// Owned exclusively by the recalculator; replaced on every recompute.
    DailyApuration,
    ManualAdjust,
    AdjustmentRequest,
}

/// Append-only ledger row. Balance at a date = sum of `minutes_delta` up to
/// and including that date.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 9,
        "tenant_id": 1,
        "subject_id": 42,
        "event_date": "2026-01-05",
        "minutes_delta": 60,
        "source": "DAILY_APURATION",
        "reference_id": 5
    })
)]
pub struct BankHoursLedgerEntry {
    #[schema(example = 9)]
    pub id: u64,

    #[schema(example = 1)]
    pub tenant_id: u64,

    #[schema(example = 42)]
    pub subject_id: u64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub event_date: NaiveDate,

    /// Signed, never zero.
    #[schema(example = 60)]
    pub minutes_delta: i32,

    #[schema(example = "DAILY_APURATION")]
    pub source: BankHoursSource,

    #[schema(example = 5, nullable = true)]
    pub reference_id: Option<u64>,
}

/// Insert shape for a ledger row; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub tenant_id: u64,
    pub subject_id: u64,
    pub event_date: NaiveDate,
    pub minutes_delta: i32,
    pub source: BankHoursSource,
    pub reference_id: Option<u64>,
}
