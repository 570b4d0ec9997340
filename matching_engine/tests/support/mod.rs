//! Shared fixtures for the integration tests. Every test gets its own in-memory database with
//! the migrations applied; all timestamps flow in from the tests so deadline behaviour is
//! deterministic.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use matching_engine::{
    db_types::{DateChoices, LocationTag, MatchingRequest},
    traits::{MatchingGatewayDatabase, ProposalResolution},
    IntakeApi,
    ProposalApi,
    SqliteDatabase,
};
use mm_common::Credits;

pub async fn new_test_db() -> SqliteDatabase {
    dotenvy::dotenv().ok();
    let _ = env_logger::try_init();
    SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Error creating test database")
}

pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid RFC3339 timestamp")
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid date")
}

pub fn choices(dates: &[&str], locations: &[&str]) -> DateChoices {
    let dates = dates.iter().map(|d| date(d)).collect();
    let locations = locations.iter().map(|l| l.parse::<LocationTag>().expect("valid location tag")).collect();
    DateChoices::new(dates, locations)
}

pub async fn fund(db: &SqliteDatabase, requester_id: &str, amount: i64) {
    db.deposit_credits(requester_id, Credits::from(amount), "test deposit").await.expect("deposit failed");
}

/// Funds the requester with 500 credits and opens a request for them.
pub async fn open_funded_request(db: &SqliteDatabase, requester_id: &str) -> MatchingRequest {
    fund(db, requester_id, 500).await;
    IntakeApi::new(db.clone()).open_request(requester_id).await.expect("open request failed")
}

/// Drives the proposal flow to a live pair: funds and opens a request for the proposer, then
/// proposes to the target and accepts at `now`. The target's request is auto-created by the
/// acceptance.
pub async fn live_pair(db: &SqliteDatabase, proposer: &str, target: &str, now: DateTime<Utc>) -> ProposalResolution {
    open_funded_request(db, proposer).await;
    let api = ProposalApi::new(db.clone(), Default::default());
    let proposal = api.propose(proposer, target).await.expect("propose failed");
    api.accept(&proposal.propose_id, now).await.expect("accept failed")
}
