pub mod admin;
pub mod candidates;
pub mod error;
pub mod stats;
pub mod status;
pub mod students;
pub mod verify;
pub mod vote;

use actix_web::http::{header, Method};
use actix_web::{web, HttpRequest, HttpResponse};

/// Every registered path with its allowed verbs. The handler macros put a
/// method guard on each resource, so a wrong verb on a real endpoint falls
/// through to the default service; this table lets it answer 405 instead
/// of 404.
const ENDPOINTS: &[(&str, &str)] = &[
    ("/api/health", "GET"),
    ("/api/check-status", "GET"),
    ("/api/config", "GET, POST"),
    ("/api/verify-code", "POST"),
    ("/api/cast-vote", "POST"),
    ("/api/get-candidates", "GET"),
    ("/api/stats", "GET"),
    ("/api/admin/login", "POST"),
    ("/api/admin/students", "GET, POST, PUT, DELETE"),
    ("/api/admin/candidates", "GET, POST, PUT, DELETE"),
    ("/api/admin/election", "POST"),
    ("/api/admin/import", "POST"),
    ("/api/admin/generate-codes", "POST"),
    ("/api/admin/reset-codes", "POST"),
    ("/api/admin/reset-votes", "POST"),
    ("/api/admin/clear-data", "POST"),
    ("/api/admin/export", "POST"),
];

/// Configures the web app by adding services from each web file.
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    status::configure(conf);
    verify::configure(conf);
    vote::configure(conf);
    candidates::configure(conf);
    students::configure(conf);
    admin::configure(conf);
    stats::configure(conf);

    conf.default_service(web::route().to(fallback));
}

/// CORS preflights get an empty 200 (the allow headers ride on every
/// response); a known path hit with the wrong verb is a 405 with an
/// `Allow` header; anything else is a JSON 404.
async fn fallback(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        return HttpResponse::Ok().finish();
    }
    if let Some((_, allow)) = ENDPOINTS.iter().find(|(path, _)| *path == req.path()) {
        return HttpResponse::MethodNotAllowed()
            .insert_header((header::ALLOW, *allow))
            .json(serde_json::json!({ "error": "Method not allowed" }));
    }
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Endpoint not found" }))
}
