//! Integration tests for the public HTTP endpoints

mod common;
use serial_test::serial;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use common::{database::*, fixtures::*};
use serde_json::json;

#[actix_rt::test]
#[serial]
async fn health_and_check_status() {
    let db = setup_test_database().await;
    let app = test::init_service(App::new().configure(urna::web::configure)).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ok"], json!(true));

    // Closed by default.
    let req = test::TestRequest::get().uri("/api/check-status").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["open"], json!(false));
    assert_eq!(body["status"], json!("closed"));

    open_election(db).await.unwrap();
    let req = test::TestRequest::get().uri("/api/check-status").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["open"], json!(true));
    assert_eq!(body["status"], json!("open"));
}

#[actix_rt::test]
#[serial]
async fn verify_code_lifecycle() {
    let db = setup_test_database().await;
    create_test_student(db, "Ana Pérez", 6, 1, 1).await.unwrap();
    let app = test::init_service(App::new().configure(urna::web::configure)).await;

    // Malformed code.
    let req = test::TestRequest::post()
        .uri("/api/verify-code")
        .set_json(json!({ "access_code": "61a1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown code.
    let req = test::TestRequest::post()
        .uri("/api/verify-code")
        .set_json(json!({ "access_code": "9999" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Fresh code: identity comes back, the code itself does not.
    let req = test::TestRequest::post()
        .uri("/api/verify-code")
        .set_json(json!({ "access_code": "6101" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["valid"], json!(true));
    assert_eq!(body["student"]["name"], json!("Ana Pérez"));
    assert_eq!(body["student"]["grade"], json!(6));
    assert_eq!(body["student"]["course"], json!(1));
    assert!(body["student"].get("access_code").is_none());
    assert!(body["student"].get("has_voted").is_none());
    assert!(body["student"].get("id").is_none());

    // Spend the code, then verification is forbidden.
    open_election(db).await.unwrap();
    let candidate = create_test_candidate(db, "Lista Azul", "").await.unwrap();
    urna::ballot::cast_vote(db, "6101", &candidate.id).await.unwrap();

    let req = test::TestRequest::post()
        .uri("/api/verify-code")
        .set_json(json!({ "access_code": "6101" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
#[serial]
async fn get_candidates_is_public_and_sorted_by_name() {
    let db = setup_test_database().await;
    create_test_candidate(db, "Zeta", "Z").await.unwrap();
    create_test_candidate(db, "Alfa", "A").await.unwrap();
    let app = test::init_service(App::new().configure(urna::web::configure)).await;

    let req = test::TestRequest::get().uri("/api/get-candidates").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["name"], json!("Alfa"));
    assert_eq!(candidates[1]["name"], json!("Zeta"));
    // The ballot view carries no tallies.
    assert!(candidates[0].get("votes").is_none());
}

#[actix_rt::test]
#[serial]
async fn cast_vote_http_contract() {
    let db = setup_test_database().await;
    create_test_student(db, "Ana", 6, 1, 1).await.unwrap();
    let candidate = create_test_candidate(db, "Lista Azul", "").await.unwrap();
    let app = test::init_service(App::new().configure(urna::web::configure)).await;

    // Missing input.
    let req = test::TestRequest::post()
        .uri("/api/cast-vote")
        .set_json(json!({ "access_code": "", "candidate_id": &candidate.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Election closed.
    let req = test::TestRequest::post()
        .uri("/api/cast-vote")
        .set_json(json!({ "access_code": "6101", "candidate_id": &candidate.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    open_election(db).await.unwrap();

    // Unknown code.
    let req = test::TestRequest::post()
        .uri("/api/cast-vote")
        .set_json(json!({ "access_code": "9999", "candidate_id": &candidate.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Success.
    let req = test::TestRequest::post()
        .uri("/api/cast-vote")
        .set_json(json!({ "access_code": "6101", "candidate_id": &candidate.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["student"]["name"], json!("Ana"));

    // Replay: rejected with the already-voted condition.
    let req = test::TestRequest::post()
        .uri("/api/cast-vote")
        .set_json(json!({ "access_code": "6101", "candidate_id": &candidate.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("already"));
}

#[actix_rt::test]
#[serial]
async fn unknown_endpoint_is_json_404() {
    setup_test_database().await;
    let app = test::init_service(App::new().configure(urna::web::configure)).await;

    let req = test::TestRequest::get().uri("/api/no-such-thing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
#[serial]
async fn wrong_method_on_known_endpoint_is_405() {
    setup_test_database().await;
    let app = test::init_service(App::new().configure(urna::web::configure)).await;

    let req = test::TestRequest::get().uri("/api/cast-vote").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = resp.headers().get(actix_web::http::header::ALLOW).unwrap();
    assert_eq!(allow.to_str().unwrap(), "POST");

    let req = test::TestRequest::delete()
        .uri("/api/check-status")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
