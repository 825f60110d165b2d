mod common;

use actix_web::{http::StatusCode, test, App};
use bson::oid::ObjectId;
use server::routes;

use common::{bearer, message_body, peer, submit_body, INVESTIGATOR, INVESTIGATOR_PASSWORD, PASSPHRASE};

async fn login_token(state: &server::state::AppState) -> String {
    state
        .auth
        .investigator_login(INVESTIGATOR, INVESTIGATOR_PASSWORD)
        .await
        .unwrap()
        .token
}

#[actix_web::test]
async fn test_login_over_http() {
    let state = common::test_state();
    common::seed_investigator(&state).await;
    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(peer(20))
        .set_json(serde_json::json!({"username": INVESTIGATOR, "password": INVESTIGATOR_PASSWORD}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Dana Investigator");
    assert_eq!(body["expiresInSecs"], 3600);
    assert!(body["token"].as_str().unwrap().contains('.'));

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(peer(20))
        .set_json(serde_json::json!({"username": INVESTIGATOR, "password": "nope-nope-nope"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_case_list_and_details() {
    let state = common::test_state();
    common::seed_investigator(&state).await;
    let first = state
        .whistleblowers
        .submit_new_report(serde_json::from_value(submit_body(PASSPHRASE)).unwrap())
        .await
        .unwrap();
    state
        .whistleblowers
        .submit_new_report(serde_json::from_value(submit_body("second-passphrase")).unwrap())
        .await
        .unwrap();
    let token = login_token(&state).await;

    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let req = test::TestRequest::get()
        .uri("/api/investigator/cases")
        .insert_header(bearer(&token))
        .to_request();
    let cases: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let cases = cases.as_array().unwrap();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0]["status"], "NEW");
    assert_eq!(cases[0]["mlLabel"], "unknown");

    let req = test::TestRequest::get()
        .uri(&format!("/api/investigator/cases/{}", first.case_id))
        .insert_header(bearer(&token))
        .to_request();
    let details: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(details["id"], first.case_id.as_str());
    assert_eq!(details["sessionId"], first.session_id.as_str());
    assert_eq!(details["caseKeyForInvestigator"], "d3JhcHBlZC1jYXNlLWtleQ==");
    assert_eq!(details["thread"][0]["type"], "report");
    assert!(details.get("passphraseHash").is_none());
}

#[actix_web::test]
async fn test_case_list_is_newest_first() {
    let state = common::test_state();
    common::seed_investigator(&state).await;
    let first = state
        .whistleblowers
        .submit_new_report(serde_json::from_value(submit_body(PASSPHRASE)).unwrap())
        .await
        .unwrap();
    let second = state
        .whistleblowers
        .submit_new_report(serde_json::from_value(submit_body("second-passphrase")).unwrap())
        .await
        .unwrap();
    let token = login_token(&state).await;

    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let req = test::TestRequest::get()
        .uri("/api/investigator/cases")
        .insert_header(bearer(&token))
        .to_request();
    let cases: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let cases = cases.as_array().unwrap();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0]["id"], second.case_id.as_str());
    assert_eq!(cases[1]["id"], first.case_id.as_str());
}

#[actix_web::test]
async fn test_status_update_and_filter() {
    let state = common::test_state();
    common::seed_investigator(&state).await;
    let submitted = state
        .whistleblowers
        .submit_new_report(serde_json::from_value(submit_body(PASSPHRASE)).unwrap())
        .await
        .unwrap();
    state
        .whistleblowers
        .submit_new_report(serde_json::from_value(submit_body("second-passphrase")).unwrap())
        .await
        .unwrap();
    let token = login_token(&state).await;

    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/investigator/cases/{}/status?newStatus=IN_REVIEW",
            submitted.case_id
        ))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let summary: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(summary["status"], "IN_REVIEW");

    let req = test::TestRequest::get()
        .uri("/api/investigator/cases?status=IN_REVIEW")
        .insert_header(bearer(&token))
        .to_request();
    let filtered: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["id"], submitted.case_id.as_str());

    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/investigator/cases/{}/status?newStatus=ARCHIVED",
            submitted.case_id
        ))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_unknown_and_malformed_case_ids() {
    let state = common::test_state();
    common::seed_investigator(&state).await;
    let token = login_token(&state).await;

    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    for case_id in [ObjectId::new().to_hex(), "case-001".to_string()] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/investigator/cases/{}", case_id))
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Case not found");
    }
}

#[actix_web::test]
async fn test_classification_update() {
    let state = common::test_state();
    common::seed_investigator(&state).await;
    let submitted = state
        .whistleblowers
        .submit_new_report(serde_json::from_value(submit_body(PASSPHRASE)).unwrap())
        .await
        .unwrap();
    let token = login_token(&state).await;

    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let uri = format!("/api/investigator/cases/{}/classification", submitted.case_id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&token))
        .set_json(serde_json::json!({"label": "ABUSIVE", "score": 0.91}))
        .to_request();
    let summary: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["mlLabel"], "abusive");
    assert_eq!(summary["mlScore"], 0.91);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&token))
        .set_json(serde_json::json!({"label": "abusive", "score": 1.5}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_investigator_reply_reaches_whistleblower() {
    let state = common::test_state();
    common::seed_investigator(&state).await;
    let submitted = state
        .whistleblowers
        .submit_new_report(serde_json::from_value(submit_body(PASSPHRASE)).unwrap())
        .await
        .unwrap();
    let token = login_token(&state).await;

    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let mut attachment = message_body();
    attachment["filename"] = "evidence.pdf".into();

    let req = test::TestRequest::post()
        .uri(&format!("/api/investigator/cases/{}/reply", submitted.case_id))
        .insert_header(bearer(&token))
        .set_json(attachment)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(item["sender"], "INV");
    assert_eq!(item["type"], "attachment");
    assert_eq!(item["filename"], "evidence.pdf");

    let session = state
        .auth
        .followup_login(&submitted.session_id, PASSPHRASE)
        .await
        .unwrap();
    assert_eq!(session.case.thread.len(), 2);
    assert_eq!(
        session.case.thread[1].sender,
        protocol::ThreadItemSender::Investigator
    );
}

#[actix_web::test]
async fn test_dashboard_requires_investigator_token() {
    let state = common::test_state();
    let submitted = state
        .whistleblowers
        .submit_new_report(serde_json::from_value(submit_body(PASSPHRASE)).unwrap())
        .await
        .unwrap();
    let session = state
        .auth
        .followup_login(&submitted.session_id, PASSPHRASE)
        .await
        .unwrap();

    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let req = test::TestRequest::get()
        .uri("/api/investigator/cases")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/investigator/cases")
        .insert_header(bearer(&session.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_logout_and_relogin_revoke_tokens() {
    let state = common::test_state();
    common::seed_investigator(&state).await;
    let first = login_token(&state).await;

    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    // A second login replaces the first session.
    let second = login_token(&state).await;

    let req = test::TestRequest::get()
        .uri("/api/investigator/cases")
        .insert_header(bearer(&first))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(bearer(&second))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);

    let req = test::TestRequest::get()
        .uri("/api/investigator/cases")
        .insert_header(bearer(&second))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
