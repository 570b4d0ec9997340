mod support;

use matching_engine::{
    db_types::{PairStatus, ProposalStatus, RequestStatus},
    traits::{MatchingStoreError, RequestManagement},
    LifecycleError,
    ProposalApi,
};
use support::{live_pair, new_test_db, open_funded_request, ts};

#[tokio::test]
async fn accepting_a_proposal_creates_a_live_pair() {
    let db = new_test_db().await;
    let now = ts("2025-08-01T12:00:00Z");
    let resolution = live_pair(&db, "alice", "bob", now).await;
    assert_eq!(resolution.proposal.status, ProposalStatus::Accept);
    assert_eq!(resolution.proposal.responded_at, Some(now));
    let pair = resolution.pair.expect("pair should exist");
    assert_eq!(pair.status, PairStatus::Matched);
    assert!(pair.confirm_proposed);
    let proposer = resolution.proposer_request.unwrap();
    assert_eq!(proposer.status, RequestStatus::Matched);
    assert_eq!(proposer.partner_id.as_deref(), Some("bob"));
    // The target had no request of their own; acceptance auto-created one
    let target = resolution.target_request.unwrap();
    assert_eq!(target.requester_id, "bob");
    assert_eq!(target.status, RequestStatus::Matched);
    assert_eq!(target.match_pair_id, Some(pair.pair_id));
}

#[tokio::test]
async fn a_proposal_resolves_exactly_once() {
    let db = new_test_db().await;
    let now = ts("2025-08-01T12:00:00Z");
    let api = ProposalApi::new(db.clone(), Default::default());
    open_funded_request(&db, "alice").await;
    let proposal = api.propose("alice", "bob").await.unwrap();
    api.accept(&proposal.propose_id, now).await.unwrap();
    // A second accept and a late refuse both bounce off the resolved proposal
    let err = api.accept(&proposal.propose_id, now).await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreError(MatchingStoreError::AlreadyResolved(_))));
    let err = api.refuse(&proposal.propose_id, now).await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreError(MatchingStoreError::AlreadyResolved(_))));
    let stored = db.fetch_proposal(&proposal.propose_id).await.unwrap().unwrap();
    assert_eq!(stored.status, ProposalStatus::Accept);
}

#[tokio::test]
async fn refusal_releases_the_proposer() {
    let db = new_test_db().await;
    let now = ts("2025-08-01T12:00:00Z");
    let api = ProposalApi::new(db.clone(), Default::default());
    let request = open_funded_request(&db, "alice").await;
    let proposal = api.propose("alice", "bob").await.unwrap();
    let resolution = api.refuse(&proposal.propose_id, now).await.unwrap();
    assert_eq!(resolution.proposal.status, ProposalStatus::Refuse);
    let released = resolution.proposer_request.expect("proposer request should be returned");
    assert_eq!(released.request_id, request.request_id);
    assert_eq!(released.status, RequestStatus::Waiting);
    assert!(released.match_pair_id.is_none());
    // A refused proposer can receive a fresh proposal
    let proposal = api.propose("carol", "alice").await.unwrap();
    open_funded_request(&db, "carol").await;
    let resolution = api.accept(&proposal.propose_id, now).await.unwrap();
    assert!(resolution.pair.is_some());
}

#[tokio::test]
async fn a_repeat_introduction_reuses_the_existing_pair() {
    let db = new_test_db().await;
    let now = ts("2025-08-01T12:00:00Z");
    let first = live_pair(&db, "alice", "bob", now).await.pair.unwrap();
    let api = ProposalApi::new(db.clone(), Default::default());
    let proposal = api.propose("alice", "bob").await.unwrap();
    let later = ts("2025-08-02T12:00:00Z");
    let resolution = api.accept(&proposal.propose_id, later).await.unwrap();
    // same pair row, re-armed rather than duplicated
    let pair = resolution.pair.unwrap();
    assert_eq!(pair.pair_id, first.pair_id);
    assert_eq!(pair.status, PairStatus::Matched);
    assert!(pair.a_wants_again.is_none());
    assert!(pair.confirmed_at.is_none());
    // the response timeout runs from the new introduction, not the original one
    assert_eq!(pair.created_at, later);
}

#[tokio::test]
async fn acceptance_cannot_steal_a_matched_requester() {
    let db = new_test_db().await;
    let now = ts("2025-08-01T12:00:00Z");
    let first = live_pair(&db, "alice", "bob", now).await;
    let api = ProposalApi::new(db.clone(), Default::default());
    open_funded_request(&db, "carol").await;
    let proposal = api.propose("carol", "bob").await.unwrap();
    let err = api.accept(&proposal.propose_id, now).await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreError(MatchingStoreError::InvalidTransition { .. })));
    // bob is still linked to the original pair and the proposal was left open
    let bob = db.fetch_active_request_for_requester("bob").await.unwrap().unwrap();
    assert_eq!(bob.match_pair_id, first.pair.map(|p| p.pair_id));
    let stored = db.fetch_proposal(&proposal.propose_id).await.unwrap().unwrap();
    assert_eq!(stored.status, ProposalStatus::Propose);
}

#[tokio::test]
async fn refusing_a_repeat_introduction_finishes_the_shared_pair() {
    let db = new_test_db().await;
    let now = ts("2025-08-01T12:00:00Z");
    live_pair(&db, "alice", "bob", now).await;
    let api = ProposalApi::new(db.clone(), Default::default());
    let proposal = api.propose("alice", "bob").await.unwrap();
    let resolution = api.refuse(&proposal.propose_id, now).await.unwrap();
    let pair = resolution.pair.expect("the shared pair should be finished");
    assert_eq!(pair.status, PairStatus::Finished);
    assert!(!pair.confirm_proposed);
    // both sides go back into the waiting pool with the linkage cleared
    for req in [resolution.proposer_request.unwrap(), resolution.target_request.unwrap()] {
        assert_eq!(req.status, RequestStatus::Waiting);
        assert!(req.match_pair_id.is_none());
        assert!(req.partner_id.is_none());
    }
}

#[tokio::test]
async fn self_proposals_are_rejected() {
    let db = new_test_db().await;
    let api = ProposalApi::new(db.clone(), Default::default());
    let err = api.propose("alice", "alice").await.unwrap_err();
    assert!(matches!(err, LifecycleError::SelfProposal));
}

#[tokio::test]
async fn acceptance_requires_an_active_proposer_request() {
    let db = new_test_db().await;
    let now = ts("2025-08-01T12:00:00Z");
    let api = ProposalApi::new(db.clone(), Default::default());
    // alice never opened a request
    let proposal = api.propose("alice", "bob").await.unwrap();
    let err = api.accept(&proposal.propose_id, now).await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreError(MatchingStoreError::NoActiveRequest(_))));
}

#[tokio::test]
async fn unknown_proposals_are_not_found() {
    let db = new_test_db().await;
    let now = ts("2025-08-01T12:00:00Z");
    let api = ProposalApi::new(db.clone(), Default::default());
    let err = api.accept(&"prop-doesnotexist".to_string().into(), now).await.unwrap_err();
    assert!(matches!(err, LifecycleError::StoreError(MatchingStoreError::ProposalNotFound(_))));
}

#[tokio::test]
async fn pending_proposals_are_listed_oldest_first() {
    let db = new_test_db().await;
    let api = ProposalApi::new(db.clone(), Default::default());
    let p1 = api.propose("alice", "bob").await.unwrap();
    let p2 = api.propose("carol", "dave").await.unwrap();
    let pending = db.pending_proposals().await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].propose_id, p1.propose_id);
    assert_eq!(pending[1].propose_id, p2.propose_id);
}
