//! Crate-level error taxonomy, rendered as JSON `{"error": …}` bodies.
//!
//! Validation and authorization failures are raised before any mutation.
//! Storage failures carry internal detail for the log only; the client
//! always sees a generic message.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No valid session.
    #[error("Authentication required")]
    Authentication,

    /// Valid session but insufficient role, a banned caller, or a protected
    /// target (the owner can never be banned).
    #[error("{0}")]
    Authorization(String),

    /// Missing or malformed input. `field` names the offending field.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A referenced id does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unexpected data-store or infrastructure failure. The inner detail is
    /// logged, never serialized.
    #[error("Internal server error")]
    Storage(String),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            message: message.into(),
        }
    }

    /// The uniform admin rejection. Non-owner callers all receive this exact
    /// response so it does not reveal which check failed.
    pub fn owner_only() -> Self {
        ApiError::Authorization("Unauthorized - Owner access only".to_string())
    }

    pub fn banned() -> Self {
        ApiError::Authorization("Account is banned".to_string())
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<crate::identity::IdentityError> for ApiError {
    fn from(err: crate::identity::IdentityError) -> Self {
        use crate::identity::IdentityError;

        match err {
            IdentityError::Storage(db_err) => ApiError::from(db_err),
            // Provider and profile-shape failures all mean "no session".
            other => {
                log::warn!("identity resolution failed: {}", other);
                ApiError::Authentication
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Authentication => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Storage(detail) = self {
            log::error!("storage failure: {}", detail);
        }

        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
