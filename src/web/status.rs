//! Health, election status, and the public/admin config endpoints

use crate::db::{get_config, get_db_pool};
use crate::orm::config;
use crate::web::admin::{header_admin_code, require_admin};
use crate::web::error::ApiError;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, ActiveValue::Set};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(health)
        .service(check_status)
        .service(view_config)
        .service(update_config);
}

#[get("/api/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

/// Read-only projection of the config row: is voting open?
#[get("/api/check-status")]
async fn check_status() -> Result<HttpResponse, ApiError> {
    let config = get_config(get_db_pool()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "open": config.is_open(),
        "status": config.election_status,
    })))
}

/// Public read of display settings. The admin code is never included.
#[get("/api/config")]
async fn view_config() -> Result<HttpResponse, ApiError> {
    let config = get_config(get_db_pool()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "electionStatus": config.election_status,
        "schoolName": config.school_name,
        "schoolLogo": config.logo_url,
    })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateConfigRequest {
    #[serde(default)]
    admin_code: Option<String>,
    #[serde(default)]
    election_status: Option<String>,
    #[serde(default)]
    school_name: Option<String>,
    /// Empty string clears the logo.
    #[serde(default)]
    logo_url: Option<String>,
}

/// Admin settings-save: school name, logo and election status.
#[post("/api/config")]
async fn update_config(
    req: HttpRequest,
    body: web::Json<UpdateConfigRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let supplied = header_admin_code(&req).or_else(|| body.admin_code.clone());
    require_admin(db, supplied.as_deref()).await?;

    let mut row = config::ActiveModel {
        id: Set(config::SINGLETON_ID),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    if let Some(status) = &body.election_status {
        if status != config::STATUS_OPEN && status != config::STATUS_CLOSED {
            return Err(ApiError::Validation(
                "election_status must be \"open\" or \"closed\"".to_string(),
            ));
        }
        row.election_status = Set(status.clone());
    }
    if let Some(name) = &body.school_name {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("school_name must not be empty".to_string()));
        }
        row.school_name = Set(name.to_string());
    }
    if let Some(logo) = &body.logo_url {
        let logo = logo.trim();
        row.logo_url = Set(if logo.is_empty() {
            None
        } else {
            Some(logo.to_string())
        });
    }

    row.update(db).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
