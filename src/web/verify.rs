//! Access-code verification endpoint

use crate::ballot::VoterIdentity;
use crate::db::get_db_pool;
use crate::orm::students;
use crate::web::error::ApiError;
use actix_web::{post, web, HttpResponse};
use sea_orm::{entity::*, query::*, ColumnTrait, EntityTrait};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(verify_code);
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct VerifyCodeRequest {
    access_code: String,
}

// Codes are `{grade}{course}{list_number:02}`; the 5-digit cap assumes
// grades stay single-digit or list numbers stay below 100. A grade >= 10
// group with a three-digit list number would issue a 6-digit code this
// check refuses.
fn code_is_well_formed(code: &str) -> bool {
    (3..=5).contains(&code.len()) && code.chars().all(|c| c.is_ascii_digit())
}

/// Look up a student by access code and return their display identity.
/// A used code is refused; the response never echoes the code itself or
/// any field beyond name/grade/course.
#[post("/api/verify-code")]
async fn verify_code(body: web::Json<VerifyCodeRequest>) -> Result<HttpResponse, ApiError> {
    let code = body.access_code.trim();
    if !code_is_well_formed(code) {
        return Err(ApiError::Validation("Invalid access code".to_string()));
    }

    let student = students::Entity::find()
        .filter(students::Column::AccessCode.eq(code))
        .one(get_db_pool())
        .await?
        .ok_or_else(|| ApiError::NotFound("Access code not found".to_string()))?;

    if student.has_voted {
        return Err(ApiError::Forbidden(
            "This code has already been used".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "valid": true,
        "student": VoterIdentity::from(&student),
    })))
}
