use actix_web::{HttpResponse, http::StatusCode};
use derive_more::Display;

use crate::core::sequence::SequenceRule;

/// Engine-wide error taxonomy. Everything is raised synchronously and
/// surfaced to the caller unmodified; the engine never retries or suppresses.
#[derive(Debug, Display)]
pub enum EngineError {
    #[display(fmt = "{}", _0)]
    BadRequest(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// Specialization of BadRequest naming the shift-grammar rule violated.
    #[display(fmt = "invalid sequence: {}", _0)]
    InvalidSequence(SequenceRule),

    #[display(fmt = "internal error")]
    Internal(anyhow::Error),
}

impl std::error::Error for EngineError {}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Internal(err.into())
    }
}

impl actix_web::ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::BadRequest(_) | EngineError::InvalidSequence(_) => {
                StatusCode::BAD_REQUEST
            }
            EngineError::Conflict(_) => StatusCode::CONFLICT,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let EngineError::Internal(err) = self {
            tracing::error!(error = %err, "request failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Internal Server Error"
            }));
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}
