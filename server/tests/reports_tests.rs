mod common;

use actix_web::{http::StatusCode, test, App};
use server::routes;

#[actix_web::test]
async fn test_create_and_list_reports() {
    let state = common::test_state();
    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let req = test::TestRequest::post()
        .uri("/api/report")
        .set_json(serde_json::json!({
            "id": "ignored",
            "title": "Missing invoices",
            "description": "Q3 invoices were never filed"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let saved: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(saved["status"], "NEW");
    assert_ne!(saved["id"], "ignored");

    let req = test::TestRequest::post()
        .uri("/api/report/init")
        .set_json(serde_json::json!({"title": "Second", "status": "OPEN"}))
        .to_request();
    let saved: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved["status"], "OPEN");
    assert_eq!(saved["description"], "");

    let req = test::TestRequest::get().uri("/api/report").to_request();
    let reports: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(reports.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_report_requires_title() {
    let state = common::test_state();
    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let req = test::TestRequest::post()
        .uri("/api/report")
        .set_json(serde_json::json!({"title": "  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/report")
        .set_json(serde_json::json!({"description": "no title"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
