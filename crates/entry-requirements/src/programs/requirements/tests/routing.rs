use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::programs::requirements::router::{program_handler, register_handler};
use crate::programs::requirements::EligibilityService;

fn json_request(method: &str, uri: &str, body: &Value) -> Request<axum::body::Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize body"),
        ))
        .expect("request builds")
}

#[tokio::test]
async fn register_handler_returns_created_with_groups() {
    let (service, _) = build_service();

    let response =
        register_handler::<MemoryCatalog>(State(Arc::new(service)), axum::Json(life_sciences_program()))
            .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["program_id"], json!("life-sciences"));
    assert_eq!(payload["groups"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        payload["groups"][0]["key"],
        json!({ "kind": "or_group", "id": "chem-bio" })
    );
    assert_eq!(payload["groups"][0]["critical"], json!(true));
}

#[tokio::test]
async fn register_handler_returns_internal_error_on_catalog_failure() {
    let service = Arc::new(EligibilityService::new(Arc::new(UnavailableCatalog)));

    let response =
        register_handler::<UnavailableCatalog>(State(service), axum::Json(life_sciences_program()))
            .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn program_handler_returns_not_found() {
    let (service, _) = build_service();

    let response =
        program_handler::<MemoryCatalog>(State(Arc::new(service)), Path("missing".to_string()))
            .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (service, _) = build_service();
    service
        .register(life_sciences_program())
        .expect("registered");
    let router = router_with_service(service);

    let body = serde_json::to_value(life_sciences_program()).expect("serialize program");
    let response = router
        .oneshot(json_request("POST", "/api/v1/programs", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn eligibility_route_returns_verdict() {
    let (service, _) = build_service();
    service
        .register(life_sciences_program())
        .expect("registered");
    let router = router_with_service(service);

    let profile = json!({
        "total_points": 38,
        "subject_grades": {
            "Chemistry": { "level": "SL", "grade": 6 }
        }
    });
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/programs/life-sciences/eligibility",
            &profile,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["verdict"]["eligible"], json!(false));
    assert_eq!(
        payload["verdict"]["failed_critical_groups"],
        json!([{ "kind": "or_group", "id": "chem-bio" }])
    );
}

#[tokio::test]
async fn eligibility_route_rejects_invalid_grades() {
    let (service, _) = build_service();
    service
        .register(life_sciences_program())
        .expect("registered");
    let router = router_with_service(service);

    let profile = json!({
        "total_points": 38,
        "subject_grades": { "Biology": { "level": "HL", "grade": 9 } }
    });
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/programs/life-sciences/eligibility",
            &profile,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn save_requirements_route_validates_payload() {
    let (service, _) = build_service();
    service
        .register(life_sciences_program())
        .expect("registered");
    let router = router_with_service(service);

    let body = json!({
        "min_ib_points": 36,
        "requirements": [
            { "id": "chem", "subject_id": "Chemistry", "required_level": "HL",
              "min_grade": 5, "is_critical": true, "or_group_id": "lonely" }
        ]
    });
    let response = router
        .oneshot(json_request(
            "PUT",
            "/api/v1/programs/life-sciences/requirements",
            &body,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn matches_route_counts_eligible_programs() {
    let (service, _) = build_service();
    service
        .register(life_sciences_program())
        .expect("registered");
    service
        .register(engineering_program())
        .expect("registered");
    let router = router_with_service(service);

    let body = serde_json::to_value(biology_candidate()).expect("serialize profile");
    let response = router
        .oneshot(json_request("POST", "/api/v1/eligibility/matches", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["eligible_programs"], json!(1));
    assert_eq!(payload["matches"][0]["program_id"], json!("life-sciences"));
}
