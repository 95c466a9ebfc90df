//! Error taxonomy shared by the core and the HTTP layer.
//!
//! Validation errors carry every violated rule so the author can fix and
//! resubmit. Authorization and not-found errors stay terse on purpose.

use crate::moderation::Violation;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Content failed moderation; lists each violated rule.
    #[error("Content failed validation")]
    Validation(Vec<Violation>),
    /// A submitted field is missing or not one of the accepted values.
    #[error("{0}")]
    InvalidInput(String),
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("Forbidden")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Company not found")]
    CompanyNotFound,
    /// The resource already exists; `existing_id` references it when known.
    #[error("{message}")]
    Conflict {
        message: String,
        existing_id: Option<i32>,
    },
    #[error("Edit window has expired")]
    EditWindowExpired,
    #[error("Invalid vote type: {0}")]
    InvalidVoteType(String),
    #[error("You have already voted on this post")]
    DuplicateVote,
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl Error {
    pub fn conflict(message: impl Into<String>, existing_id: Option<i32>) -> Self {
        Error::Conflict {
            message: message.into(),
            existing_id,
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidInput(_) | Error::InvalidVoteType(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Error::Forbidden | Error::EditWindowExpired => StatusCode::FORBIDDEN,
            Error::NotFound(_) | Error::CompanyNotFound => StatusCode::NOT_FOUND,
            Error::Conflict { .. } | Error::DuplicateVote => StatusCode::CONFLICT,
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Error::Validation(violations) => json!({
                "error": self.to_string(),
                "violations": violations
                    .iter()
                    .map(|v| json!({ "rule": v.rule(), "message": v.to_string() }))
                    .collect::<Vec<_>>(),
            }),
            Error::Conflict {
                message,
                existing_id,
            } => json!({ "error": message, "existing_id": existing_id }),
            Error::EditWindowExpired => json!({
                "error": "Edit window has expired. Posts can only be edited shortly after creation.",
                "code": "edit_window_expired",
            }),
            Error::Database(err) => {
                log::error!("Unexpected store failure: {}", err);
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
