mod support;

use matching_engine::{
    db_types::{LedgerEntryType, RequestStatus},
    traits::{MatchingStoreError, RequestManagement},
    IntakeApi,
    LifecycleError,
};
use mm_common::Credits;
use support::{fund, new_test_db};

#[tokio::test]
async fn deposits_accumulate_and_are_ledgered() {
    let db = new_test_db().await;
    let api = IntakeApi::new(db.clone());
    fund(&db, "alice", 300).await;
    fund(&db, "alice", 200).await;
    let account = api.balance("alice").await.unwrap().expect("account should exist");
    assert_eq!(account.balance, Credits::from(500));
    let ledger = api.ledger("alice").await.unwrap();
    assert_eq!(ledger.len(), 2);
    assert!(ledger.iter().all(|e| e.entry_type == LedgerEntryType::Deposit));
}

#[tokio::test]
async fn opening_a_request_debits_the_fixed_cost() {
    let db = new_test_db().await;
    let api = IntakeApi::new(db.clone());
    fund(&db, "alice", 500).await;
    let request = api.open_request("alice").await.unwrap();
    assert_eq!(request.status, RequestStatus::Waiting);
    assert_eq!(request.requester_id, "alice");
    assert!(!request.points_refunded);
    let account = api.balance("alice").await.unwrap().unwrap();
    assert_eq!(account.balance, Credits::from(400));
    let ledger = api.ledger("alice").await.unwrap();
    let spends = ledger.iter().filter(|e| e.entry_type == LedgerEntryType::Spend).count();
    assert_eq!(spends, 1);
}

#[tokio::test]
async fn insufficient_credits_leaves_no_trace() {
    let db = new_test_db().await;
    let api = IntakeApi::new(db.clone());
    fund(&db, "bob", 99).await;
    let err = api.open_request("bob").await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreError(MatchingStoreError::InsufficientCredits(_))));
    // Nothing was debited and no request exists
    let account = api.balance("bob").await.unwrap().unwrap();
    assert_eq!(account.balance, Credits::from(99));
    assert!(api.active_request("bob").await.unwrap().is_none());
    assert!(api.ledger("bob").await.unwrap().iter().all(|e| e.entry_type == LedgerEntryType::Deposit));
}

#[tokio::test]
async fn unknown_requester_cannot_open_a_request() {
    let db = new_test_db().await;
    let api = IntakeApi::new(db.clone());
    let err = api.open_request("nobody").await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreError(MatchingStoreError::RequesterNotFound(_))));
}

#[tokio::test]
async fn one_active_request_per_requester() {
    let db = new_test_db().await;
    let api = IntakeApi::new(db.clone());
    fund(&db, "alice", 500).await;
    let first = api.open_request("alice").await.unwrap();
    let err = api.open_request("alice").await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreError(MatchingStoreError::DuplicateRequest(_))));
    // The failed attempt must not have debited anything
    let account = api.balance("alice").await.unwrap().unwrap();
    assert_eq!(account.balance, Credits::from(400));
    let active = db.fetch_active_request_for_requester("alice").await.unwrap().unwrap();
    assert_eq!(active.request_id, first.request_id);
}
