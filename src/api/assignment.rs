use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::core::error::EngineError;
use crate::core::policy;
use crate::model::policy::NewAssignment;
use crate::store::mysql::MySqlStore;

#[derive(Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    #[schema(example = 1)]
    pub tenant_id: u64,
    #[schema(example = 42)]
    pub subject_id: u64,
    #[schema(example = 3)]
    pub template_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub effective_from: NaiveDate,
    #[schema(example = "2026-12-31", value_type = String, format = "date", nullable = true)]
    pub effective_to: Option<NaiveDate>,
}

/// Assign a work policy to a subject
#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 200, description = "Assignment created", body = crate::model::policy::EnrollmentPolicyAssignment),
        (status = 400, description = "Inverted range or tenant mismatch"),
        (status = 404, description = "Enrollment or template not found"),
        (status = 409, description = "Overlapping assignment", body = Object, example = json!({
            "message": "assignment period overlaps with an existing assignment"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments"
)]
pub async fn create_assignment(
    store: web::Data<MySqlStore>,
    payload: web::Json<CreateAssignmentRequest>,
) -> Result<HttpResponse, EngineError> {
    let payload = payload.into_inner();
    let assignment = policy::create_assignment(
        store.get_ref(),
        NewAssignment {
            tenant_id: payload.tenant_id,
            subject_id: payload.subject_id,
            template_id: payload.template_id,
            effective_from: payload.effective_from,
            effective_to: payload.effective_to,
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(assignment))
}
