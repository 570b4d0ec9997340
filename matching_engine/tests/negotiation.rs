mod support;

use matching_engine::{
    db_types::{PairStatus, RequestStatus},
    traits::{RequestManagement, SubmissionOutcome},
    LifecycleError,
    NegotiationApi,
};
use support::{choices, date, live_pair, new_test_db, ts};

#[tokio::test]
async fn first_submission_waits_for_the_partner() {
    let db = new_test_db().await;
    let now = ts("2025-08-20T09:00:00Z");
    let resolution = live_pair(&db, "alice", "bob", now).await;
    let alice = resolution.proposer_request.unwrap();
    let api = NegotiationApi::new(db.clone(), Default::default());
    let outcome = api
        .submit_choices(&alice.request_id, choices(&["2025-09-01", "2025-09-03"], &["Seoul Gangnam"]), now)
        .await
        .unwrap();
    let request = match outcome {
        SubmissionOutcome::WaitingForPartner(r) => r,
        other => panic!("Expected WaitingForPartner, got {other:?}"),
    };
    assert_eq!(request.status, RequestStatus::Matched);
    assert!(request.has_submitted_choices());
}

#[tokio::test]
async fn overlapping_choices_confirm_the_pair() {
    let db = new_test_db().await;
    let now = ts("2025-08-20T09:00:00Z");
    let resolution = live_pair(&db, "alice", "bob", now).await;
    let alice = resolution.proposer_request.unwrap();
    let bob = resolution.target_request.unwrap();
    let api = NegotiationApi::new(db.clone(), Default::default());
    api.submit_choices(&alice.request_id, choices(&["2025-09-03", "2025-09-01"], &["Seoul Gangnam", "Incheon"]), now)
        .await
        .unwrap();
    let outcome = api
        .submit_choices(&bob.request_id, choices(&["2025-09-01", "2025-09-05"], &["Seoul"]), now)
        .await
        .unwrap();
    let (request, partner, schedule) = match outcome {
        SubmissionOutcome::Confirmed { request, partner, schedule } => (request, partner, schedule),
        other => panic!("Expected Confirmed, got {other:?}"),
    };
    // Earliest common date wins, and the district tag is the agreed location
    assert_eq!(schedule.final_date, date("2025-09-01"));
    assert_eq!(schedule.final_location(), "Seoul Gangnam");
    assert_eq!(request.request_id, bob.request_id);
    assert_eq!(partner.request_id, alice.request_id);
    for r in [&request, &partner] {
        assert_eq!(r.status, RequestStatus::Confirmed);
        assert_eq!(r.final_date, Some(date("2025-09-01")));
        assert_eq!(r.final_location.as_deref(), Some("Seoul Gangnam"));
        // Photo reveal is 30 minutes before midnight UTC on the meeting day
        assert_eq!(r.photo_visible_at, Some(ts("2025-08-31T23:30:00Z")));
    }
    let pair = db.fetch_pair(&resolution.pair.unwrap().pair_id).await.unwrap().unwrap();
    assert_eq!(pair.status, PairStatus::Confirmed);
    assert_eq!(pair.confirmed_at, Some(now));
}

#[tokio::test]
async fn disjoint_choices_mark_the_submitter_mismatched() {
    let db = new_test_db().await;
    let now = ts("2025-08-20T09:00:00Z");
    let resolution = live_pair(&db, "alice", "bob", now).await;
    let alice = resolution.proposer_request.unwrap();
    let bob = resolution.target_request.unwrap();
    let api = NegotiationApi::new(db.clone(), Default::default());
    api.submit_choices(&alice.request_id, choices(&["2025-09-01"], &["Seoul"]), now).await.unwrap();
    let outcome = api.submit_choices(&bob.request_id, choices(&["2025-09-02"], &["Busan"]), now).await.unwrap();
    let request = match outcome {
        SubmissionOutcome::Mismatched(r) => r,
        other => panic!("Expected Mismatched, got {other:?}"),
    };
    assert_eq!(request.status, RequestStatus::Mismatched);
    // The pair stays open for another attempt
    let pair = db.fetch_pair(&resolution.pair.unwrap().pair_id).await.unwrap().unwrap();
    assert_eq!(pair.status, PairStatus::Matched);
}

#[tokio::test]
async fn a_mismatched_request_can_resubmit_and_confirm() {
    let db = new_test_db().await;
    let now = ts("2025-08-20T09:00:00Z");
    let resolution = live_pair(&db, "alice", "bob", now).await;
    let alice = resolution.proposer_request.unwrap();
    let bob = resolution.target_request.unwrap();
    let api = NegotiationApi::new(db.clone(), Default::default());
    api.submit_choices(&alice.request_id, choices(&["2025-09-01"], &["Seoul"]), now).await.unwrap();
    let outcome = api.submit_choices(&bob.request_id, choices(&["2025-09-02"], &["Busan"]), now).await.unwrap();
    assert!(matches!(outcome, SubmissionOutcome::Mismatched(_)));
    // Second attempt from the mismatched side lines up with alice's stored choices
    let later = ts("2025-08-20T10:00:00Z");
    let outcome = api.submit_choices(&bob.request_id, choices(&["2025-09-01"], &["Seoul"]), later).await.unwrap();
    assert!(matches!(outcome, SubmissionOutcome::Confirmed { .. }));
}

#[tokio::test]
async fn empty_choices_are_rejected() {
    let db = new_test_db().await;
    let now = ts("2025-08-20T09:00:00Z");
    let resolution = live_pair(&db, "alice", "bob", now).await;
    let alice = resolution.proposer_request.unwrap();
    let api = NegotiationApi::new(db.clone(), Default::default());
    let err = api.submit_choices(&alice.request_id, choices(&[], &["Seoul"]), now).await.unwrap_err();
    assert!(matches!(err, LifecycleError::EmptyChoices));
    let err = api.submit_choices(&alice.request_id, choices(&["2025-09-01"], &[]), now).await.unwrap_err();
    assert!(matches!(err, LifecycleError::EmptyChoices));
}

#[tokio::test]
async fn submissions_require_a_negotiating_request() {
    let db = new_test_db().await;
    let now = ts("2025-08-20T09:00:00Z");
    // A waiting request that was never paired cannot submit choices
    let request = support::open_funded_request(&db, "alice").await;
    let api = NegotiationApi::new(db.clone(), Default::default());
    let err = api.submit_choices(&request.request_id, choices(&["2025-09-01"], &["Seoul"]), now).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::StoreError(matching_engine::traits::MatchingStoreError::InvalidTransition { .. })
    ));
}
