use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::core::error::EngineError;
use crate::core::recalc;
use crate::store::SummaryStore;
use crate::store::mysql::MySqlStore;

#[derive(Deserialize, ToSchema)]
pub struct RecalculateSummaryRequest {
    #[schema(example = 1)]
    pub tenant_id: u64,
    #[schema(example = 42)]
    pub subject_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub work_date: NaiveDate,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    #[param(example = 42)]
    pub subject_id: u64,
    #[param(example = "2026-01-05", value_type = String)]
    pub work_date: NaiveDate,
}

/// Force a recompute of one subject-day
#[utoipa::path(
    post,
    path = "/api/v1/summaries/recalculate",
    request_body = RecalculateSummaryRequest,
    responses(
        (status = 200, description = "Fresh summary for the day", body = crate::model::summary::DailyAttendanceSummary),
        (status = 400, description = "Enrollment does not belong to tenant"),
        (status = 404, description = "Enrollment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Summaries"
)]
pub async fn recalculate_summary(
    store: web::Data<MySqlStore>,
    payload: web::Json<RecalculateSummaryRequest>,
) -> Result<HttpResponse, EngineError> {
    let summary = recalc::recalculate_day(
        store.get_ref(),
        payload.tenant_id,
        payload.subject_id,
        payload.work_date,
    )
    .await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Fetch one subject-day's summary
#[utoipa::path(
    get,
    path = "/api/v1/summaries",
    params(SummaryQuery),
    responses(
        (status = 200, description = "The stored summary", body = crate::model::summary::DailyAttendanceSummary),
        (status = 404, description = "No summary for that subject-day"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Summaries"
)]
pub async fn get_summary(
    store: web::Data<MySqlStore>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse, EngineError> {
    let summary = store
        .find_summary(query.subject_id, query.work_date)
        .await?
        .ok_or_else(|| EngineError::NotFound("no summary for that subject-day".into()))?;
    Ok(HttpResponse::Ok().json(summary))
}
