use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::adjustment::{self, Decision, NewRequestInput};
use crate::core::error::EngineError;
use crate::model::adjustment::{
    AdjustmentChange, TimeAdjustmentItem, TimeAdjustmentRequest, TimeAdjustmentStatus,
    TimeAdjustmentType,
};
use crate::model::punch::PunchType;
use crate::store::AdjustmentStore;
use crate::store::mysql::MySqlStore;

/// One requested change, in tagged form.
#[derive(Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdjustmentItemRequest {
    /// Create a punch on the request date.
    NewPunch {
        #[schema(example = "IN")]
        punch_type: PunchType,
        #[schema(example = "2026-01-05T08:00:00", value_type = String, format = "date-time")]
        punched_at: NaiveDateTime,
        #[schema(example = "arrived at 08:00", nullable = true)]
        note: Option<String>,
    },
    /// Move or retype an existing punch.
    Amend {
        #[schema(example = 1)]
        original_punch_id: u64,
        #[schema(example = "IN")]
        punch_type: PunchType,
        #[schema(example = "2026-01-05T08:00:00", value_type = String, format = "date-time")]
        punched_at: NaiveDateTime,
        #[schema(nullable = true)]
        note: Option<String>,
    },
    /// Delete an existing punch.
    Remove {
        #[schema(example = 1)]
        original_punch_id: u64,
        #[schema(nullable = true)]
        note: Option<String>,
    },
}

impl From<AdjustmentItemRequest> for AdjustmentChange {
    fn from(item: AdjustmentItemRequest) -> Self {
        match item {
            AdjustmentItemRequest::NewPunch {
                punch_type,
                punched_at,
                note,
            } => AdjustmentChange::NewPunch {
                punch_type,
                punched_at,
                note,
            },
            AdjustmentItemRequest::Amend {
                original_punch_id,
                punch_type,
                punched_at,
                note,
            } => AdjustmentChange::Amend {
                original_punch_id,
                punch_type,
                punched_at,
                note,
            },
            AdjustmentItemRequest::Remove {
                original_punch_id,
                note,
            } => AdjustmentChange::Remove {
                original_punch_id,
                note,
            },
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateAdjustmentRequest {
    #[schema(example = 1)]
    pub tenant_id: u64,
    #[schema(example = 42)]
    pub subject_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub request_date: NaiveDate,
    #[schema(example = "EDIT_PUNCH")]
    pub request_type: TimeAdjustmentType,
    #[schema(example = "badge reader was offline")]
    pub reason: String,
    #[schema(example = 100)]
    pub requester_user_id: u64,
    pub items: Vec<AdjustmentItemRequest>,
}

#[derive(Deserialize, ToSchema)]
pub struct DecideAdjustmentRequest {
    #[schema(example = 1)]
    pub tenant_id: u64,
    /// APPROVED or REJECTED.
    #[schema(example = "APPROVED")]
    pub status: TimeAdjustmentStatus,
    #[schema(example = 101)]
    pub decided_by_user_id: u64,
    #[schema(example = "confirmed with supervisor", nullable = true)]
    pub decision_reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ApplyAdjustmentRequest {
    #[schema(example = 1)]
    pub tenant_id: u64,
}

#[derive(Serialize, ToSchema)]
pub struct AdjustmentDetailResponse {
    pub request: TimeAdjustmentRequest,
    pub items: Vec<TimeAdjustmentItem>,
}

/// Open an adjustment request
#[utoipa::path(
    post,
    path = "/api/v1/adjustments",
    request_body = CreateAdjustmentRequest,
    responses(
        (status = 200, description = "Request created PENDING", body = TimeAdjustmentRequest),
        (status = 400, description = "Missing reason, empty items, off-date proposal or foreign original punch"),
        (status = 404, description = "Enrollment or original punch not found"),
        (status = 409, description = "Duplicate adjustment item", body = Object, example = json!({
            "message": "duplicate adjustment item detected"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Adjustments"
)]
pub async fn create_adjustment(
    store: web::Data<MySqlStore>,
    payload: web::Json<CreateAdjustmentRequest>,
) -> Result<HttpResponse, EngineError> {
    let payload = payload.into_inner();
    let request = adjustment::create_request(
        store.get_ref(),
        NewRequestInput {
            tenant_id: payload.tenant_id,
            subject_id: payload.subject_id,
            request_date: payload.request_date,
            request_type: payload.request_type,
            reason: payload.reason,
            requester_user_id: payload.requester_user_id,
            changes: payload.items.into_iter().map(Into::into).collect(),
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(request))
}

/// Fetch a request with its items
#[utoipa::path(
    get,
    path = "/api/v1/adjustments/{id}",
    params(("id" = u64, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request and items", body = AdjustmentDetailResponse),
        (status = 404, description = "Request not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Adjustments"
)]
pub async fn get_adjustment(
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, EngineError> {
    let request_id = path.into_inner();
    let request = store
        .find_request(request_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("adjustment request not found".into()))?;
    let items = store.items_for_request(request_id).await?;
    Ok(HttpResponse::Ok().json(AdjustmentDetailResponse { request, items }))
}

/// Approve or reject a pending request
#[utoipa::path(
    put,
    path = "/api/v1/adjustments/{id}/decide",
    params(("id" = u64, Path, description = "Request id")),
    request_body = DecideAdjustmentRequest,
    responses(
        (status = 200, description = "Decision recorded", body = TimeAdjustmentRequest),
        (status = 400, description = "Not pending, bad target status or missing rejection reason"),
        (status = 404, description = "Request not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Adjustments"
)]
pub async fn decide_adjustment(
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
    payload: web::Json<DecideAdjustmentRequest>,
) -> Result<HttpResponse, EngineError> {
    let payload = payload.into_inner();
    let request = adjustment::decide_request(
        store.get_ref(),
        payload.tenant_id,
        path.into_inner(),
        Decision {
            status: payload.status,
            decided_by_user_id: payload.decided_by_user_id,
            decision_reason: payload.decision_reason,
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(request))
}

/// Apply an approved request
#[utoipa::path(
    post,
    path = "/api/v1/adjustments/{id}/apply",
    params(("id" = u64, Path, description = "Request id")),
    request_body = ApplyAdjustmentRequest,
    responses(
        (status = 200, description = "Punches mutated, every affected day recomputed; no-op when already APPLIED", body = TimeAdjustmentRequest),
        (status = 400, description = "Request is not approved, or a resulting day would be illegal", body = Object, example = json!({
            "message": "invalid sequence: OUT requires an open shift"
        })),
        (status = 404, description = "Request not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Adjustments"
)]
pub async fn apply_adjustment(
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
    payload: web::Json<ApplyAdjustmentRequest>,
) -> Result<HttpResponse, EngineError> {
    let request =
        adjustment::apply_request(store.get_ref(), payload.tenant_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(request))
}
