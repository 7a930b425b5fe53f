use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::core::error::EngineError;
use crate::model::ledger::{BankHoursSource, NewLedgerEntry};
use crate::store::LedgerStore;
use crate::store::mysql::MySqlStore;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BalanceQuery {
    #[param(example = 42)]
    pub subject_id: u64,
    #[param(example = "2026-01-31", value_type = String)]
    pub until: NaiveDate,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 42)]
    pub subject_id: u64,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub until: NaiveDate,
    /// Signed minutes accrued up to and including `until`.
    #[schema(example = 30)]
    pub balance_minutes: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLedgerEntryRequest {
    #[schema(example = 1)]
    pub tenant_id: u64,
    #[schema(example = 42)]
    pub subject_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub event_date: NaiveDate,
    #[schema(example = -30)]
    pub minutes_delta: i32,
    /// MANUAL_ADJUST or ADJUSTMENT_REQUEST; DAILY_APURATION rows are owned
    /// by the recalculator and cannot be written here.
    #[schema(example = "MANUAL_ADJUST")]
    pub source: BankHoursSource,
    #[schema(example = 11, nullable = true)]
    pub reference_id: Option<u64>,
}

/// Bank-hours balance at a date
#[utoipa::path(
    get,
    path = "/api/v1/bank-hours/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Signed minute balance", body = BalanceResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "BankHours"
)]
pub async fn get_balance(
    store: web::Data<MySqlStore>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, EngineError> {
    let balance_minutes = store.balance_until(query.subject_id, query.until).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse {
        subject_id: query.subject_id,
        until: query.until,
        balance_minutes,
    }))
}

/// Append a manual ledger entry
#[utoipa::path(
    post,
    path = "/api/v1/bank-hours",
    request_body = CreateLedgerEntryRequest,
    responses(
        (status = 200, description = "Entry appended", body = crate::model::ledger::BankHoursLedgerEntry),
        (status = 400, description = "Zero delta or reserved source", body = Object, example = json!({
            "message": "DAILY_APURATION entries are written by the recalculator only"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "BankHours"
)]
pub async fn create_entry(
    store: web::Data<MySqlStore>,
    payload: web::Json<CreateLedgerEntryRequest>,
) -> Result<HttpResponse, EngineError> {
    let payload = payload.into_inner();
    if payload.minutes_delta == 0 {
        return Err(EngineError::BadRequest(
            "minutes_delta must be non-zero".into(),
        ));
    }
    if payload.source == BankHoursSource::DailyApuration {
        return Err(EngineError::BadRequest(
            "DAILY_APURATION entries are written by the recalculator only".into(),
        ));
    }

    let entry = store
        .create_ledger_entry(NewLedgerEntry {
            tenant_id: payload.tenant_id,
            subject_id: payload.subject_id,
            event_date: payload.event_date,
            minutes_delta: payload.minutes_delta,
            source: payload.source,
            reference_id: payload.reference_id,
        })
        .await?;
    Ok(HttpResponse::Ok().json(entry))
}
