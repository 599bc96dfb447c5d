//! Vote-casting endpoint
//!
//! The handler validates presence of both inputs, forwards them to
//! `ballot::cast_vote`, and translates its result. It deliberately does
//! not pre-check `has_voted`; a read-then-write here would reopen the
//! race the ballot transaction exists to close.

use crate::ballot;
use crate::db::get_db_pool;
use crate::web::error::ApiError;
use actix_web::{post, web, HttpResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(cast_vote);
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CastVoteRequest {
    access_code: String,
    candidate_id: String,
}

#[post("/api/cast-vote")]
async fn cast_vote(body: web::Json<CastVoteRequest>) -> Result<HttpResponse, ApiError> {
    let access_code = body.access_code.trim();
    let candidate_id = body.candidate_id.trim();
    if access_code.is_empty() || candidate_id.is_empty() {
        return Err(ApiError::Validation(
            "access_code and candidate_id are required".to_string(),
        ));
    }

    let receipt = ballot::cast_vote(get_db_pool(), access_code, candidate_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Vote recorded",
        "student": receipt.student,
    })))
}
