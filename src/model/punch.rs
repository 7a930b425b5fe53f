use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Shift grammar event types. Tie-break priority on identical timestamps is
/// IN < BREAK_START < BREAK_END < OUT (see `core::sequence`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
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
pub enum PunchType {
    In,
    Out,
    BreakStart,
    BreakEnd,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "tenant_id": 1,
        "subject_id": 42,
        "punched_at": "2026-01-05T08:00:00",
        "punch_type": "IN",
        "source": "web",
        "note": null
    })
)]
pub struct TimePunch {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub tenant_id: u64,

    /// Punch-owning enrollment id.
    #[schema(example = 42)]
    pub subject_id: u64,

    #[schema(example = "2026-01-05T08:00:00", value_type = String, format = "date-time")]
    pub punched_at: NaiveDateTime,

    #[schema(example = "IN")]
    pub punch_type: PunchType,

    #[schema(example = "web")]
    pub source: String,

    #[schema(example = "forgot badge", nullable = true)]
    pub note: Option<String>,
}

/// Insert shape for a punch; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewPunch {
    pub tenant_id: u64,
    pub subject_id: u64,
    pub punched_at: NaiveDateTime,
    pub punch_type: PunchType,
    pub source: String,
    pub note: Option<String>,
}

/// One punch write inside an adjustment apply. The store executes a batch of
/// these together with the request's status flip as a single atomic unit.
#[derive(Debug, Clone)]
pub enum PunchMutation {
    Create(NewPunch),
    Update {
        punch_id: u64,
        punched_at: NaiveDateTime,
        punch_type: PunchType,
        note: Option<String>,
    },
    Delete {
        punch_id: u64,
    },
}
