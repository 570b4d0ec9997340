use actix_web::{http::StatusCode, test, App};
use serde_json::{json, Value};

use super::helpers::{configure, fund, test_db};

#[actix_web::test]
async fn health_check_responds() {
    let db = test_db().await;
    let app = test::init_service(App::new().configure(configure(db))).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
}

#[actix_web::test]
async fn request_for_unknown_requester_is_not_found() {
    let db = test_db().await;
    let app = test::init_service(App::new().configure(configure(db))).await;
    let req = test::TestRequest::post().uri("/request").set_json(json!({"requester_id": "nobody"})).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn underfunded_request_is_payment_required() -> anyhow::Result<()> {
    let db = test_db().await;
    let app = test::init_service(App::new().configure(configure(db.clone()))).await;
    fund(&db, "alice", 50).await?;
    let req = test::TestRequest::post().uri("/request").set_json(json!({"requester_id": "alice"})).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);
    Ok(())
}

#[actix_web::test]
async fn funded_request_opens_and_debits() -> anyhow::Result<()> {
    let db = test_db().await;
    let app = test::init_service(App::new().configure(configure(db.clone()))).await;
    fund(&db, "alice", 500).await?;
    let req = test::TestRequest::post().uri("/request").set_json(json!({"requester_id": "alice"})).to_request();
    let request: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(request["requester_id"], "alice");
    assert_eq!(request["status"], "Waiting");
    let req = test::TestRequest::get().uri("/requester/alice/balance").to_request();
    let account: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(account["balance"], 400);
    // a second request while one is active is a conflict
    let req = test::TestRequest::post().uri("/request").set_json(json!({"requester_id": "alice"})).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[actix_web::test]
async fn unknown_route_is_not_found() {
    let db = test_db().await;
    let app = test::init_service(App::new().configure(configure(db))).await;
    let req = test::TestRequest::get().uri("/no/such/route").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
