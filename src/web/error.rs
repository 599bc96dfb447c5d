//! JSON error responses for every handler.
//!
//! Handlers return `ApiError` at their boundary; the taxonomy maps to
//! status codes and a `{ "error": ... }` body. Database failures are
//! logged server-side and surfaced as a generic message, never as the
//! raw driver error.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;

use crate::ballot::VoteError;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input.
    Validation(String),
    /// Unknown code or id.
    NotFound(String),
    /// Bad or missing admin secret.
    Unauthorized(String),
    /// Allowed to ask, not allowed to do: used code, closed election.
    Forbidden(String),
    /// The request is well-formed but the state refuses it.
    Conflict(String),
    /// Database or other internal failure; detail stays in the log.
    Internal,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg) => f.write_str(msg),
            ApiError::Internal => f.write_str("Internal server error"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

impl From<DbErr> for ApiError {
    fn from(e: DbErr) -> Self {
        log::error!("Database error: {}", e);
        ApiError::Internal
    }
}

impl From<VoteError> for ApiError {
    fn from(e: VoteError) -> Self {
        match e {
            VoteError::ElectionClosed => ApiError::Forbidden(e.to_string()),
            VoteError::CodeNotFound | VoteError::CandidateNotFound => {
                ApiError::NotFound(e.to_string())
            }
            VoteError::AlreadyVoted => ApiError::Conflict(e.to_string()),
            VoteError::Db(e) => {
                log::error!("Database error while casting vote: {}", e);
                ApiError::Internal
            }
        }
    }
}

/// Classify a per-row import failure without leaking driver internals.
pub fn row_error_reason(e: &DbErr) -> &'static str {
    let msg = e.to_string();
    if msg.contains("UNIQUE") || msg.contains("unique") || msg.contains("duplicate") {
        "duplicate access code"
    } else {
        "database error"
    }
}
