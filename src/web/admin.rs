//! Admin capability check and election-control endpoints
//!
//! There are no admin sessions or tokens: every privileged request
//! carries the shared secret (header `x-admin-code` or body field
//! `admin_code`) and it is compared against the config row fetched for
//! that request.

use crate::db::{get_config, get_db_pool};
use crate::orm::{candidates, config, students, votes};
use crate::web::error::ApiError;
use actix_web::{post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ActiveValue::Set, DatabaseConnection, EntityTrait,
};
use serde::Deserialize;
use std::collections::HashMap;

/// Exact phrase required to wipe all election data.
pub const CLEAR_DATA_CONFIRMATION: &str = "ELIMINAR TODO";

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(login)
        .service(toggle_election)
        .service(reset_votes)
        .service(clear_data)
        .service(export);
}

/// The admin code as supplied in the request header, if any.
pub fn header_admin_code(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("x-admin-code")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Compare a supplied admin code against the config row.
pub async fn require_admin(
    db: &DatabaseConnection,
    supplied: Option<&str>,
) -> Result<(), ApiError> {
    let config = get_config(db).await?;
    match supplied {
        Some(code) if code == config.admin_code => Ok(()),
        _ => Err(ApiError::Unauthorized("Invalid admin code".to_string())),
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LoginRequest {
    #[serde(default)]
    admin_code: Option<String>,
}

/// Capability check only; nothing is issued or stored.
#[post("/api/admin/login")]
async fn login(req: HttpRequest, body: web::Json<LoginRequest>) -> Result<HttpResponse, ApiError> {
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(get_db_pool(), supplied.as_deref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ElectionRequest {
    #[serde(default)]
    admin_code: Option<String>,
    action: String,
}

/// Open or close the election. No side effects on existing data.
#[post("/api/admin/election")]
async fn toggle_election(
    req: HttpRequest,
    body: web::Json<ElectionRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    let status = match body.action.as_str() {
        "open" => config::STATUS_OPEN,
        "close" => config::STATUS_CLOSED,
        _ => {
            return Err(ApiError::Validation(
                "action must be \"open\" or \"close\"".to_string(),
            ))
        }
    };

    config::ActiveModel {
        id: Set(config::SINGLETON_ID),
        election_status: Set(status.to_string()),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .update(db)
    .await?;

    log::info!("Election status set to {}", status);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": status,
    })))
}

/// Body for admin actions that take no other input.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminBody {
    #[serde(default)]
    pub admin_code: Option<String>,
}

/// Start the election over: delete all votes, clear every student's
/// voted flag, zero the candidate tallies. Students and candidates stay.
#[post("/api/admin/reset-votes")]
async fn reset_votes(
    req: HttpRequest,
    body: web::Json<AdminBody>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    votes::Entity::delete_many().exec(db).await?;

    students::Entity::update_many()
        .col_expr(students::Column::HasVoted, Expr::value(false))
        .col_expr(
            students::Column::VotedAt,
            Expr::value(Option::<chrono::NaiveDateTime>::None),
        )
        .exec(db)
        .await?;

    candidates::Entity::update_many()
        .col_expr(candidates::Column::Votes, Expr::value(0))
        .exec(db)
        .await?;

    log::info!("All votes reset by admin");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ClearDataRequest {
    #[serde(default)]
    admin_code: Option<String>,
    #[serde(default)]
    confirm: Option<String>,
}

/// Irreversibly delete all votes, students, and candidates, and close
/// the election. Guarded by an exact confirmation phrase.
#[post("/api/admin/clear-data")]
async fn clear_data(
    req: HttpRequest,
    body: web::Json<ClearDataRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    if body.confirm.as_deref() != Some(CLEAR_DATA_CONFIRMATION) {
        return Err(ApiError::Validation("Confirmation required".to_string()));
    }

    votes::Entity::delete_many().exec(db).await?;
    students::Entity::delete_many().exec(db).await?;
    candidates::Entity::delete_many().exec(db).await?;

    config::ActiveModel {
        id: Set(config::SINGLETON_ID),
        election_status: Set(config::STATUS_CLOSED.to_string()),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .update(db)
    .await?;

    log::warn!("All election data cleared by admin");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "All data deleted",
    })))
}

/// Snapshot of the whole election: ordered student roll plus vote counts
/// recomputed from the votes table (not the denormalized tallies), so an
/// export doubles as a consistency check.
#[post("/api/admin/export")]
async fn export(
    req: HttpRequest,
    body: web::Json<AdminBody>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    let students = students::Entity::find()
        .order_by_asc(students::Column::Grade)
        .order_by_asc(students::Column::Course)
        .order_by_asc(students::Column::ListNumber)
        .all(db)
        .await?;

    let candidates = candidates::Entity::find()
        .order_by_asc(candidates::Column::Name)
        .all(db)
        .await?;

    let votes = votes::Entity::find().all(db).await?;

    let mut counts: HashMap<&str, i64> = HashMap::new();
    for vote in &votes {
        *counts.entry(vote.candidate_id.as_str()).or_insert(0) += 1;
    }

    let results: Vec<serde_json::Value> = candidates
        .iter()
        .map(|c| {
            serde_json::json!({
                "id": c.id,
                "name": c.name,
                "voteCount": counts.get(c.id.as_str()).copied().unwrap_or(0),
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "exportedAt": Utc::now().to_rfc3339(),
        "students": students,
        "results": results,
    })))
}
