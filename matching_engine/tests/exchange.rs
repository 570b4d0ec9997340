mod support;

use matching_engine::{
    db_types::{PairStatus, RequestId, RequestStatus},
    traits::{MatchingStoreError, RequestManagement},
    ExchangeApi,
    LifecycleError,
    NegotiationApi,
};
use support::{choices, live_pair, new_test_db, ts};

/// Drives a pair all the way to `Confirmed` and returns (pair_id, alice's request id, bob's
/// request id).
async fn confirmed_pair(db: &matching_engine::SqliteDatabase) -> (matching_engine::db_types::PairId, RequestId, RequestId) {
    let now = ts("2025-08-20T09:00:00Z");
    let resolution = live_pair(db, "alice", "bob", now).await;
    let alice = resolution.proposer_request.unwrap();
    let bob = resolution.target_request.unwrap();
    let api = NegotiationApi::new(db.clone(), Default::default());
    api.submit_choices(&alice.request_id, choices(&["2025-09-01"], &["Seoul"]), now).await.unwrap();
    api.submit_choices(&bob.request_id, choices(&["2025-09-01"], &["Seoul"]), now).await.unwrap();
    (resolution.pair.unwrap().pair_id, alice.request_id, bob.request_id)
}

#[tokio::test]
async fn one_vote_is_not_enough() {
    let db = new_test_db().await;
    let (pair_id, ..) = confirmed_pair(&db).await;
    let api = ExchangeApi::new(db.clone());
    let now = ts("2025-09-02T09:00:00Z");
    let outcome = api.vote_meet_again(&pair_id, "alice", true, now).await.unwrap();
    assert!(!outcome.finalized);
    assert_eq!(outcome.pair.a_wants_again.or(outcome.pair.b_wants_again), Some(true));
    assert_eq!(outcome.pair.status, PairStatus::Confirmed);
    assert!(!outcome.pair.contact_shared);
}

#[tokio::test]
async fn mutual_interest_finishes_the_pair() {
    let db = new_test_db().await;
    let (pair_id, alice_req, bob_req) = confirmed_pair(&db).await;
    let api = ExchangeApi::new(db.clone());
    let now = ts("2025-09-02T09:00:00Z");
    api.vote_meet_again(&pair_id, "alice", true, now).await.unwrap();
    let outcome = api.vote_meet_again(&pair_id, "bob", true, now).await.unwrap();
    assert!(outcome.finalized);
    assert_eq!(outcome.pair.status, PairStatus::Finished);
    assert!(outcome.pair.contact_shared);
    assert!(outcome.pair.both_interested);
    for rid in [&alice_req, &bob_req] {
        let req = db.fetch_request(rid).await.unwrap().unwrap();
        assert_eq!(req.status, RequestStatus::Finished);
    }
}

#[tokio::test]
async fn a_no_vote_withholds_contact() {
    let db = new_test_db().await;
    let (pair_id, ..) = confirmed_pair(&db).await;
    let api = ExchangeApi::new(db.clone());
    let now = ts("2025-09-02T09:00:00Z");
    api.vote_meet_again(&pair_id, "alice", true, now).await.unwrap();
    let outcome = api.vote_meet_again(&pair_id, "bob", false, now).await.unwrap();
    assert!(!outcome.finalized);
    assert!(!outcome.pair.contact_shared);
    assert!(!outcome.pair.both_interested);
}

#[tokio::test]
async fn both_contacts_complete_the_exchange() {
    let db = new_test_db().await;
    let (pair_id, alice_req, bob_req) = confirmed_pair(&db).await;
    let api = ExchangeApi::new(db.clone());
    let now = ts("2025-09-02T09:00:00Z");
    api.vote_meet_again(&pair_id, "alice", true, now).await.unwrap();
    api.vote_meet_again(&pair_id, "bob", true, now).await.unwrap();
    let outcome = api.submit_contact(&pair_id, "alice", "@alice_kim", now).await.unwrap();
    assert!(!outcome.finalized);
    let outcome = api.submit_contact(&pair_id, "bob", "010-1234-5678", now).await.unwrap();
    assert!(outcome.finalized);
    assert_eq!(outcome.pair.status, PairStatus::Exchanged);
    for rid in [&alice_req, &bob_req] {
        let req = db.fetch_request(rid).await.unwrap().unwrap();
        assert_eq!(req.status, RequestStatus::Exchanged);
    }
}

#[tokio::test]
async fn outsiders_cannot_touch_the_pair() {
    let db = new_test_db().await;
    let (pair_id, ..) = confirmed_pair(&db).await;
    let api = ExchangeApi::new(db.clone());
    let now = ts("2025-09-02T09:00:00Z");
    let err = api.vote_meet_again(&pair_id, "mallory", true, now).await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreError(MatchingStoreError::NotAPairMember { .. })));
    let err = api.submit_contact(&pair_id, "mallory", "@mallory", now).await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreError(MatchingStoreError::NotAPairMember { .. })));
}

#[tokio::test]
async fn empty_contact_payloads_are_rejected() {
    let db = new_test_db().await;
    let (pair_id, ..) = confirmed_pair(&db).await;
    let api = ExchangeApi::new(db.clone());
    let now = ts("2025-09-02T09:00:00Z");
    let err = api.submit_contact(&pair_id, "alice", "  ", now).await.unwrap_err();
    assert!(matches!(err, LifecycleError::EmptyContact));
}
