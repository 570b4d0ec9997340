use actix_web::{http::StatusCode, test, App};
use serde_json::{json, Value};

use super::helpers::{configure, fund, test_db};

#[actix_web::test]
async fn self_proposal_is_rejected() {
    let db = test_db().await;
    let app = test::init_service(App::new().configure(configure(db))).await;
    let req = test::TestRequest::post()
        .uri("/proposal")
        .set_json(json!({"proposer_id": "amy", "target_id": "amy"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn accepting_unknown_proposal_is_not_found() {
    let db = test_db().await;
    let app = test::init_service(App::new().configure(configure(db))).await;
    let req = test::TestRequest::post().uri("/proposal/prop-doesnotexist/accept").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn accepted_proposal_creates_a_live_pair() -> anyhow::Result<()> {
    let db = test_db().await;
    let app = test::init_service(App::new().configure(configure(db.clone()))).await;
    fund(&db, "amy", 500).await?;
    let req = test::TestRequest::post().uri("/request").set_json(json!({"requester_id": "amy"})).to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
    let req = test::TestRequest::post()
        .uri("/proposal")
        .set_json(json!({"proposer_id": "amy", "target_id": "bea"}))
        .to_request();
    let proposal: Value = test::call_and_read_body_json(&app, req).await;
    let propose_id = proposal["propose_id"].as_str().expect("propose_id").to_string();

    let req = test::TestRequest::post().uri(&format!("/proposal/{propose_id}/accept")).to_request();
    let resolution: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resolution["proposal"]["status"], "Accept");
    assert_eq!(resolution["pair"]["status"], "Matched");
    assert_eq!(resolution["proposer_request"]["status"], "Matched");
    assert_eq!(resolution["target_request"]["status"], "Matched");

    let pair_id = resolution["pair"]["pair_id"].as_str().expect("pair_id").to_string();
    let req = test::TestRequest::get().uri(&format!("/pair/{pair_id}")).to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());

    // the first resolution won; a second accept is a conflict
    let req = test::TestRequest::post().uri(&format!("/proposal/{propose_id}/accept")).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}
