use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::punch::PunchType;

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
pub enum TimeAdjustmentType {
    AddPunch,
    EditPunch,
    JustifyAbsence,
    RemovePunch,
}

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
pub enum TimeAdjustmentStatus {
    Pending,
    Approved,
    Rejected,
    Applied,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TimeAdjustmentRequest {
    #[schema(example = 11)]
    pub id: u64,

    #[schema(example = 1)]
    pub tenant_id: u64,

    #[schema(example = 42)]
    pub subject_id: u64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub request_date: NaiveDate,

    #[schema(example = "EDIT_PUNCH")]
    pub request_type: TimeAdjustmentType,

    #[schema(example = "PENDING")]
    pub status: TimeAdjustmentStatus,

    #[schema(example = "badge reader was offline")]
    pub reason: String,

    #[schema(example = 100)]
    pub requester_user_id: u64,

    #[schema(example = "2026-01-06T10:00:00", value_type = String, format = "date-time", nullable = true)]
    pub decided_at: Option<NaiveDateTime>,

    #[schema(example = 101, nullable = true)]
    pub decided_by_user_id: Option<u64>,

    #[schema(example = "confirmed with supervisor", nullable = true)]
    pub decision_reason: Option<String>,
}

/// Flat persisted item row. Nullable columns encode which change variant the
/// item is; use [`TimeAdjustmentItem::change`] to decode.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TimeAdjustmentItem {
    #[schema(example = 21)]
    pub id: u64,

    #[schema(example = 1)]
    pub tenant_id: u64,

    #[schema(example = 11)]
    pub request_id: u64,

    #[schema(example = "IN", nullable = true)]
    pub proposed_punch_type: Option<PunchType>,

    #[schema(example = "2026-01-05T08:00:00", value_type = String, format = "date-time", nullable = true)]
    pub proposed_punched_at: Option<NaiveDateTime>,

    #[schema(example = 1, nullable = true)]
    pub original_punch_id: Option<u64>,

    #[schema(example = "arrived at 08:00", nullable = true)]
    pub note: Option<String>,
}

/// What an item does to the punch set, with the nullable-column ambiguity
/// removed: a proposal without an original creates, an original with a
/// proposal amends, an original without a proposal removes.
#[derive(Debug, Clone, PartialEq)]
pub enum AdjustmentChange {
    NewPunch {
        punch_type: PunchType,
        punched_at: NaiveDateTime,
        note: Option<String>,
    },
    Amend {
        original_punch_id: u64,
        punch_type: PunchType,
        punched_at: NaiveDateTime,
        note: Option<String>,
    },
    Remove {
        original_punch_id: u64,
        note: Option<String>,
    },
}

impl TimeAdjustmentItem {
    pub fn change(&self) -> Option<AdjustmentChange> {
        match (
            self.original_punch_id,
            self.proposed_punch_type,
            self.proposed_punched_at,
        ) {
            (None, Some(punch_type), Some(punched_at)) => Some(AdjustmentChange::NewPunch {
                punch_type,
                punched_at,
                note: self.note.clone(),
            }),
            (Some(original_punch_id), Some(punch_type), Some(punched_at)) => {
                Some(AdjustmentChange::Amend {
                    original_punch_id,
                    punch_type,
                    punched_at,
                    note: self.note.clone(),
                })
            }
            (Some(original_punch_id), None, None) => Some(AdjustmentChange::Remove {
                original_punch_id,
                note: self.note.clone(),
            }),
            _ => None,
        }
    }
}

/// Insert shape for a request; created PENDING, the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAdjustmentRequest {
    pub tenant_id: u64,
    pub subject_id: u64,
    pub request_date: NaiveDate,
    pub request_type: TimeAdjustmentType,
    pub reason: String,
    pub requester_user_id: u64,
}

/// Insert shape for an item; the store assigns id/request linkage.
#[derive(Debug, Clone)]
pub struct NewAdjustmentItem {
    pub proposed_punch_type: Option<PunchType>,
    pub proposed_punched_at: Option<NaiveDateTime>,
    pub original_punch_id: Option<u64>,
    pub note: Option<String>,
}
