use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::core::error::EngineError;
use crate::core::registrar;
use crate::model::punch::{NewPunch, PunchType, TimePunch};
use crate::store::PunchStore;
use crate::store::mysql::MySqlStore;

#[derive(Deserialize, ToSchema)]
pub struct CreatePunchRequest {
    #[schema(example = 1)]
    pub tenant_id: u64,
    #[schema(example = 42)]
    pub subject_id: u64,
    #[schema(example = "2026-01-05T08:00:00", value_type = String, format = "date-time")]
    pub punched_at: NaiveDateTime,
    #[schema(example = "IN")]
    pub punch_type: PunchType,
    /// Defaults to "web".
    #[schema(example = "web", nullable = true)]
    pub source: Option<String>,
    #[schema(example = "forgot badge", nullable = true)]
    pub note: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PunchDayQuery {
    #[param(example = 42)]
    pub subject_id: u64,
    #[param(example = "2026-01-05", value_type = String)]
    pub work_date: NaiveDate,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TenantQuery {
    #[param(example = 1)]
    pub tenant_id: u64,
}

#[derive(Serialize, ToSchema)]
pub struct PunchListResponse {
    pub data: Vec<TimePunch>,
}

/// Register a punch
#[utoipa::path(
    post,
    path = "/api/v1/punches",
    request_body = CreatePunchRequest,
    responses(
        (status = 200, description = "Punch registered and the day recomputed", body = TimePunch),
        (status = 400, description = "Inactive enrollment, out-of-period date, cross-enrollment conflict or illegal sequence", body = Object, example = json!({
            "message": "invalid sequence: OUT requires an open shift"
        })),
        (status = 404, description = "Enrollment not found"),
        (status = 409, description = "Duplicate punch", body = Object, example = json!({
            "message": "there is already a punch with the same date, time and type"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Punches"
)]
pub async fn create_punch(
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
    payload: web::Json<CreatePunchRequest>,
) -> Result<HttpResponse, EngineError> {
    let payload = payload.into_inner();
    let punch = registrar::register_punch(
        store.get_ref(),
        NewPunch {
            tenant_id: payload.tenant_id,
            subject_id: payload.subject_id,
            punched_at: payload.punched_at,
            punch_type: payload.punch_type,
            source: payload.source.unwrap_or_else(|| "web".to_string()),
            note: payload.note,
        },
        config.allow_multi_subject_per_day,
    )
    .await?;
    Ok(HttpResponse::Ok().json(punch))
}

/// Delete a punch
#[utoipa::path(
    delete,
    path = "/api/v1/punches/{id}",
    params(("id" = u64, Path, description = "Punch id"), TenantQuery),
    responses(
        (status = 200, description = "Punch deleted and the day recomputed", body = Object, example = json!({
            "message": "Punch deleted"
        })),
        (status = 400, description = "Punch does not belong to tenant"),
        (status = 404, description = "Punch not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Punches"
)]
pub async fn delete_punch(
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
    query: web::Query<TenantQuery>,
) -> Result<HttpResponse, EngineError> {
    registrar::delete_punch(store.get_ref(), query.tenant_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Punch deleted"
    })))
}

/// List one subject-day's punches
#[utoipa::path(
    get,
    path = "/api/v1/punches/day",
    params(PunchDayQuery),
    responses(
        (status = 200, description = "Punches ordered by time", body = PunchListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Punches"
)]
pub async fn list_punches(
    store: web::Data<MySqlStore>,
    query: web::Query<PunchDayQuery>,
) -> Result<HttpResponse, EngineError> {
    let data = store
        .find_punches_for_day(query.subject_id, query.work_date)
        .await?;
    Ok(HttpResponse::Ok().json(PunchListResponse { data }))
}
