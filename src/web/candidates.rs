//! Public candidate listing and admin candidate CRUD

use crate::db::get_db_pool;
use crate::orm::{candidates, votes};
use crate::web::admin::{header_admin_code, require_admin};
use crate::web::error::ApiError;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, query::*, ActiveValue::Set, ColumnTrait, EntityTrait};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(get_candidates)
        .service(list_candidates)
        .service(create_candidate)
        .service(update_candidate)
        .service(delete_candidate);
}

/// What a voter sees on the ballot; tallies stay out of it.
#[derive(Serialize)]
struct BallotCandidate {
    id: String,
    name: String,
    party: String,
}

#[get("/api/get-candidates")]
async fn get_candidates() -> Result<HttpResponse, ApiError> {
    let candidates = candidates::Entity::find()
        .order_by_asc(candidates::Column::Name)
        .all(get_db_pool())
        .await?;

    let candidates: Vec<BallotCandidate> = candidates
        .into_iter()
        .map(|c| BallotCandidate {
            id: c.id,
            name: c.name,
            party: c.party,
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "candidates": candidates })))
}

/// Admin view: full rows including tallies and photo references.
#[get("/api/admin/candidates")]
async fn list_candidates(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    require_admin(db, header_admin_code(&req).as_deref()).await?;

    let candidates = candidates::Entity::find()
        .order_by_asc(candidates::Column::Name)
        .all(db)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "candidates": candidates })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateCandidateRequest {
    #[serde(default)]
    admin_code: Option<String>,
    name: String,
    #[serde(default)]
    party: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

#[post("/api/admin/candidates")]
async fn create_candidate(
    req: HttpRequest,
    body: web::Json<CreateCandidateRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }

    let candidate = candidates::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        party: Set(body.party.clone().unwrap_or_default().trim().to_string()),
        photo_url: Set(body.photo_url.clone().filter(|p| !p.trim().is_empty())),
        votes: Set(0),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "candidate": candidate })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CandidateUpdates {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    party: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateCandidateRequest {
    #[serde(default)]
    admin_code: Option<String>,
    id: String,
    updates: CandidateUpdates,
}

#[put("/api/admin/candidates")]
async fn update_candidate(
    req: HttpRequest,
    body: web::Json<UpdateCandidateRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    let candidate = candidates::Entity::find_by_id(body.id.clone())
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Candidate not found".to_string()))?;

    let mut row: candidates::ActiveModel = candidate.into();
    if let Some(name) = &body.updates.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Name must not be empty".to_string()));
        }
        row.name = Set(name.to_string());
    }
    if let Some(party) = &body.updates.party {
        row.party = Set(party.trim().to_string());
    }
    if let Some(photo) = &body.updates.photo_url {
        let photo = photo.trim();
        row.photo_url = Set(if photo.is_empty() {
            None
        } else {
            Some(photo.to_string())
        });
    }
    row.update(db).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteRequest {
    #[serde(default)]
    admin_code: Option<String>,
    id: String,
}

/// Delete a candidate. Dependent votes go first; there is no
/// database-level cascade to rely on.
#[delete("/api/admin/candidates")]
async fn delete_candidate(
    req: HttpRequest,
    body: web::Json<DeleteRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    votes::Entity::delete_many()
        .filter(votes::Column::CandidateId.eq(body.id.clone()))
        .exec(db)
        .await?;

    let deleted = candidates::Entity::delete_many()
        .filter(candidates::Column::Id.eq(body.id.clone()))
        .exec(db)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(ApiError::NotFound("Candidate not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
