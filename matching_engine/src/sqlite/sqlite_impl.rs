//! `SqliteDatabase` is a concrete implementation of a matching engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`crate::traits`] module. Every guarded transition is a single conditional
//! `UPDATE ... WHERE <expected state> RETURNING *`, so a concurrent sweep and a live submission
//! can never both claim the same transition.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use mm_common::Credits;
use sqlx::SqlitePool;

use super::db::{db_url, ledger, new_pool, pairs, proposals, requests};
use crate::{
    db_types::{
        CreditAccount,
        DateChoices,
        LedgerEntry,
        LedgerEntryType,
        MatchingRequest,
        MatchPair,
        NewMatchingRequest,
        NewMatchPair,
        NewProposal,
        PairId,
        Proposal,
        ProposalId,
        ProposalStatus,
        RequestId,
        RequestStatus,
        TIMEOUT_NO_MEETING,
        TIMEOUT_NO_RESPONSE,
        RETENTION_WINDOW_ELAPSED,
    },
    helpers::{photo_visible_at, schedule_overlap, ScheduleMatch},
    traits::{
        ExchangeOutcome,
        MatchingGatewayDatabase,
        MatchingStoreError,
        ProposalResolution,
        RequestManagement,
        SubmissionOutcome,
        TimedOutPair,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Confirms both requests and the pair with the agreed schedule, inside the caller's
    /// transaction. Returns the two updated requests, or `None` when any guard failed.
    async fn apply_confirmation(
        pair: &MatchPair,
        schedule: &ScheduleMatch,
        now: DateTime<Utc>,
        tx: &mut sqlx::SqliteConnection,
    ) -> Result<Option<(MatchingRequest, MatchingRequest)>, MatchingStoreError> {
        let location = schedule.final_location();
        let visible_at = photo_visible_at(schedule.final_date);
        let a = requests::confirm(&pair.match_a_id, schedule.final_date, &location, visible_at, now, tx).await?;
        let b = requests::confirm(&pair.match_b_id, schedule.final_date, &location, visible_at, now, tx).await?;
        let pair_row = pairs::confirm(&pair.pair_id, now, tx).await?;
        match (a, b, pair_row) {
            (Some(a), Some(b), Some(_)) => {
                debug!(
                    "🗃️ Pair [{}] confirmed for {} at {location}",
                    pair.pair_id, schedule.final_date
                );
                Ok(Some((a, b)))
            },
            _ => Ok(None),
        }
    }
}

impl MatchingGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_request(
        &self,
        request: NewMatchingRequest,
        cost: Credits,
    ) -> Result<MatchingRequest, MatchingStoreError> {
        let mut tx = self.pool.begin().await?;
        let now = request.created_at;
        let requester_id = request.requester_id.clone();
        if ledger::try_debit(&requester_id, cost, now, &mut tx).await?.is_none() {
            return match ledger::fetch_account(&requester_id, &mut tx).await? {
                Some(_) => Err(MatchingStoreError::InsufficientCredits(requester_id)),
                None => Err(MatchingStoreError::RequesterNotFound(requester_id)),
            };
        }
        let request = requests::insert_request(request, &mut tx).await?;
        let reason = format!("matching request {}", request.request_id);
        ledger::append_entry(&requester_id, LedgerEntryType::Spend, cost, &reason, now, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Request [{}] opened for {requester_id}; {cost} debited", request.request_id);
        Ok(request)
    }

    async fn deposit_credits(
        &self,
        requester_id: &str,
        amount: Credits,
        reason: &str,
    ) -> Result<CreditAccount, MatchingStoreError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let account = ledger::credit(requester_id, amount, now, &mut tx).await?;
        ledger::append_entry(requester_id, LedgerEntryType::Deposit, amount, reason, now, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }

    async fn create_proposal(&self, proposal: NewProposal) -> Result<Proposal, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let proposal = proposals::insert_proposal(proposal, &mut conn).await?;
        Ok(proposal)
    }

    async fn accept_proposal(
        &self,
        propose_id: &ProposalId,
        now: DateTime<Utc>,
    ) -> Result<ProposalResolution, MatchingStoreError> {
        let mut tx = self.pool.begin().await?;
        let proposal = match proposals::resolve(propose_id, ProposalStatus::Accept, now, &mut tx).await? {
            Some(p) => p,
            None => {
                return match proposals::fetch_proposal_by_propose_id(propose_id, &mut tx).await? {
                    Some(_) => Err(MatchingStoreError::AlreadyResolved(propose_id.clone())),
                    None => Err(MatchingStoreError::ProposalNotFound(propose_id.clone())),
                };
            },
        };
        // The proposer must hold an active request; the target gets one auto-created if absent.
        let proposer_req = requests::fetch_active_request_for_requester(&proposal.propose_user_id, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::NoActiveRequest(proposal.propose_user_id.clone()))?;
        let target_req = requests::fetch_active_request_for_requester(&proposal.target_id, &mut tx).await?;
        // A previous introduction may have left these two requests sharing a pair. Only then may
        // a side that is already negotiating be re-paired; acceptance must never pull a request
        // out of a pair it shares with somebody else.
        let shared_pair = proposer_req
            .match_pair_id
            .as_ref()
            .filter(|id| target_req.as_ref().and_then(|t| t.match_pair_id.as_ref()) == Some(*id))
            .cloned();
        let admissible: &[RequestStatus] = if shared_pair.is_some() {
            &[RequestStatus::Matched, RequestStatus::Mismatched]
        } else {
            &[RequestStatus::Waiting]
        };
        let target_req = match target_req {
            Some(req) => requests::transition(&req.request_id, admissible, RequestStatus::Matched, now, &mut tx)
                .await?
                .ok_or(MatchingStoreError::InvalidTransition { request_id: req.request_id, status: req.status })?,
            None => {
                let auto = NewMatchingRequest::new(&proposal.target_id)
                    .with_status(RequestStatus::Matched)
                    .with_created_at(now);
                info!(
                    "🗃️ Target {} had no active request; auto-creating [{}] for proposal {propose_id}",
                    proposal.target_id, auto.request_id
                );
                requests::insert_request(auto, &mut tx).await?
            },
        };
        let proposer_req = requests::transition(&proposer_req.request_id, admissible, RequestStatus::Matched, now, &mut tx)
            .await?
            .ok_or(MatchingStoreError::InvalidTransition {
                request_id: proposer_req.request_id.clone(),
                status: proposer_req.status,
            })?;
        let pair = match &shared_pair {
            Some(pair_id) => {
                let pair = pairs::reactivate(pair_id, now, &mut tx)
                    .await?
                    .ok_or_else(|| MatchingStoreError::PairNotFound(pair_id.clone()))?;
                // a fresh introduction starts scheduling from scratch
                requests::clear_choices(&proposer_req.request_id, now, &mut tx).await?;
                requests::clear_choices(&target_req.request_id, now, &mut tx).await?;
                pair
            },
            None => {
                let new_pair = NewMatchPair::new(proposer_req.request_id.clone(), target_req.request_id.clone())
                    .with_confirm_proposed(true)
                    .with_created_at(now);
                pairs::insert_pair(new_pair, &mut tx).await?
            },
        };
        let proposal = proposals::link_pair(propose_id, &pair.pair_id, now, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::ProposalNotFound(propose_id.clone()))?;
        let proposer_req =
            requests::link_partner(&proposer_req.request_id, &target_req.requester_id, &pair.pair_id, now, &mut tx)
                .await?
                .ok_or(MatchingStoreError::RequestNotFound(proposer_req.request_id))?;
        let target_req =
            requests::link_partner(&target_req.request_id, &proposer_req.requester_id, &pair.pair_id, now, &mut tx)
                .await?
                .ok_or(MatchingStoreError::RequestNotFound(target_req.request_id))?;
        tx.commit().await?;
        debug!("🗃️ Proposal [{propose_id}] accepted; pair [{}] is live", pair.pair_id);
        Ok(ProposalResolution {
            proposal,
            pair: Some(pair),
            proposer_request: Some(proposer_req),
            target_request: Some(target_req),
        })
    }

    async fn refuse_proposal(
        &self,
        propose_id: &ProposalId,
        now: DateTime<Utc>,
    ) -> Result<ProposalResolution, MatchingStoreError> {
        let mut tx = self.pool.begin().await?;
        let proposal = match proposals::resolve(propose_id, ProposalStatus::Refuse, now, &mut tx).await? {
            Some(p) => p,
            None => {
                return match proposals::fetch_proposal_by_propose_id(propose_id, &mut tx).await? {
                    Some(_) => Err(MatchingStoreError::AlreadyResolved(propose_id.clone())),
                    None => Err(MatchingStoreError::ProposalNotFound(propose_id.clone())),
                };
            },
        };
        // When the two requests still share a pending pair (a repeat introduction), refusal
        // finishes that pair and drops both sides back into the waiting pool. Otherwise only a
        // still-waiting proposer is released; a refusal must never unlink a request from a pair
        // created by some other proposal.
        let proposer_req = requests::fetch_active_request_for_requester(&proposal.propose_user_id, &mut tx).await?;
        let target_req = requests::fetch_active_request_for_requester(&proposal.target_id, &mut tx).await?;
        let shared_pair = proposer_req
            .as_ref()
            .and_then(|p| p.match_pair_id.as_ref())
            .filter(|id| target_req.as_ref().and_then(|t| t.match_pair_id.as_ref()) == Some(*id))
            .cloned();
        let pair = match &shared_pair {
            Some(pair_id) => pairs::finish(pair_id, "Matched", false, now, &mut tx).await?,
            None => None,
        };
        let (proposer_req, target_req) = match (&pair, &proposer_req, &target_req) {
            (Some(_), Some(p), Some(t)) => {
                let negotiating: &[RequestStatus] = &[RequestStatus::Matched, RequestStatus::Mismatched];
                let p = requests::release(&p.request_id, negotiating, now, &mut tx).await?;
                let t = requests::release(&t.request_id, negotiating, now, &mut tx).await?;
                (p, t)
            },
            (None, Some(p), _) => {
                (requests::release(&p.request_id, &[RequestStatus::Waiting], now, &mut tx).await?, None)
            },
            _ => (None, None),
        };
        tx.commit().await?;
        debug!("🗃️ Proposal [{propose_id}] refused");
        Ok(ProposalResolution { proposal, pair, proposer_request: proposer_req, target_request: target_req })
    }

    async fn submit_choices(
        &self,
        request_id: &RequestId,
        choices: DateChoices,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, MatchingStoreError> {
        let mut tx = self.pool.begin().await?;
        let request = requests::fetch_request_by_request_id(request_id, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::RequestNotFound(request_id.clone()))?;
        let pair_id = request.match_pair_id.clone().ok_or_else(|| {
            warn!("🗃️ Request [{request_id}] is {} but has no pair linked", request.status);
            MatchingStoreError::InvalidTransition { request_id: request_id.clone(), status: request.status }
        })?;
        let request = requests::store_choices(request_id, &choices, now, &mut tx)
            .await?
            .ok_or(MatchingStoreError::InvalidTransition { request_id: request_id.clone(), status: request.status })?;
        let pair = pairs::fetch_pair_by_pair_id(&pair_id, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::PairNotFound(pair_id.clone()))?;
        let partner_id = pair
            .partner_of(request_id)
            .ok_or_else(|| MatchingStoreError::PairNotFound(pair_id.clone()))?
            .clone();
        let partner = requests::fetch_request_by_request_id(&partner_id, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::RequestNotFound(partner_id.clone()))?;
        let outcome = match partner.choices() {
            None => {
                trace!("🗃️ [{request_id}] submitted choices; waiting on partner [{partner_id}]");
                SubmissionOutcome::WaitingForPartner(request)
            },
            Some(partner_choices) => match schedule_overlap(&choices, partner_choices) {
                Some(schedule) => {
                    let (request, partner) = Self::apply_confirmation(&pair, &schedule, now, &mut tx)
                        .await?
                        .ok_or(MatchingStoreError::InvalidTransition {
                            request_id: request_id.clone(),
                            status: request.status,
                        })?;
                    // Both sides saw the same overlap; return them from the submitter's viewpoint.
                    let (request, partner) =
                        if request.request_id == *request_id { (request, partner) } else { (partner, request) };
                    SubmissionOutcome::Confirmed { request, partner, schedule }
                },
                None => {
                    let request = requests::transition(
                        request_id,
                        &[RequestStatus::Matched],
                        RequestStatus::Mismatched,
                        now,
                        &mut tx,
                    )
                    .await?
                    .ok_or(MatchingStoreError::InvalidTransition {
                        request_id: request_id.clone(),
                        status: request.status,
                    })?;
                    trace!("🗃️ [{request_id}] found no overlap with [{partner_id}]; marked mismatched");
                    SubmissionOutcome::Mismatched(request)
                },
            },
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn record_meet_again(
        &self,
        pair_id: &PairId,
        requester_id: &str,
        wants_again: bool,
        now: DateTime<Utc>,
    ) -> Result<ExchangeOutcome, MatchingStoreError> {
        let mut tx = self.pool.begin().await?;
        let pair = pairs::fetch_pair_by_pair_id(pair_id, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::PairNotFound(pair_id.clone()))?;
        let member = requests::fetch_pair_member(&pair.match_a_id, &pair.match_b_id, requester_id, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::NotAPairMember {
                pair_id: pair_id.clone(),
                requester_id: requester_id.to_string(),
            })?;
        let side = pair.side_of(&member.request_id).ok_or_else(|| MatchingStoreError::NotAPairMember {
            pair_id: pair_id.clone(),
            requester_id: requester_id.to_string(),
        })?;
        let pair = pairs::record_vote(pair_id, side, wants_again, now, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::PairNotFound(pair_id.clone()))?;
        let mut finalized = false;
        let pair = if pair.a_wants_again == Some(true) && pair.b_wants_again == Some(true) {
            match pairs::complete_interest(pair_id, now, &mut tx).await? {
                Some(done) => {
                    for rid in [&done.match_a_id, &done.match_b_id] {
                        requests::transition(rid, &[RequestStatus::Confirmed], RequestStatus::Finished, now, &mut tx)
                            .await?;
                    }
                    finalized = true;
                    debug!("🗃️ Pair [{pair_id}] finished with mutual interest; contact may be shared");
                    done
                },
                // The pair was not (or no longer) in Confirmed; keep the votes, change nothing else.
                None => pair,
            }
        } else {
            pair
        };
        tx.commit().await?;
        Ok(ExchangeOutcome { pair, finalized })
    }

    async fn attach_review_contact(
        &self,
        pair_id: &PairId,
        requester_id: &str,
        contact: &str,
        now: DateTime<Utc>,
    ) -> Result<ExchangeOutcome, MatchingStoreError> {
        let mut tx = self.pool.begin().await?;
        let pair = pairs::fetch_pair_by_pair_id(pair_id, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::PairNotFound(pair_id.clone()))?;
        let member = requests::fetch_pair_member(&pair.match_a_id, &pair.match_b_id, requester_id, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::NotAPairMember {
                pair_id: pair_id.clone(),
                requester_id: requester_id.to_string(),
            })?;
        let side = pair.side_of(&member.request_id).ok_or_else(|| MatchingStoreError::NotAPairMember {
            pair_id: pair_id.clone(),
            requester_id: requester_id.to_string(),
        })?;
        let pair = pairs::set_contact(pair_id, side, contact, now, &mut tx)
            .await?
            .ok_or_else(|| MatchingStoreError::PairNotFound(pair_id.clone()))?;
        let both_present = matches!((&pair.a_contact, &pair.b_contact), (Some(a), Some(b)) if !a.is_empty() && !b.is_empty());
        let mut finalized = false;
        let pair = if both_present {
            match pairs::mark_exchanged(pair_id, now, &mut tx).await? {
                Some(done) => {
                    for rid in [&done.match_a_id, &done.match_b_id] {
                        requests::transition(
                            rid,
                            &[RequestStatus::Confirmed, RequestStatus::Finished],
                            RequestStatus::Exchanged,
                            now,
                            &mut tx,
                        )
                        .await?;
                    }
                    finalized = true;
                    debug!("🗃️ Pair [{pair_id}] exchanged contact details");
                    done
                },
                None => pair,
            }
        } else {
            pair
        };
        tx.commit().await?;
        Ok(ExchangeOutcome { pair, finalized })
    }

    async fn auto_confirm_ready_pairs(&self, now: DateTime<Utc>) -> Result<Vec<MatchPair>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let candidates = pairs::matched_pairs_with_both_choices(&mut conn).await?;
        drop(conn);
        let mut confirmed = Vec::new();
        for pair in candidates {
            let mut tx = self.pool.begin().await?;
            let a = requests::fetch_request_by_request_id(&pair.match_a_id, &mut tx).await?;
            let b = requests::fetch_request_by_request_id(&pair.match_b_id, &mut tx).await?;
            let (a, b) = match (a, b) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            let schedule = match (a.choices(), b.choices()) {
                (Some(ca), Some(cb)) => schedule_overlap(ca, cb),
                _ => None,
            };
            if let Some(schedule) = schedule {
                if Self::apply_confirmation(&pair, &schedule, now, &mut tx).await?.is_some() {
                    tx.commit().await?;
                    if let Some(updated) = self.fetch_pair(&pair.pair_id).await? {
                        info!("🕰️ Pair [{}] auto-confirmed by the sweeper", pair.pair_id);
                        confirmed.push(updated);
                    }
                }
            }
        }
        Ok(confirmed)
    }

    async fn expire_unresponsive_pairs(
        &self,
        cutoff: DateTime<Utc>,
        refund: Credits,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimedOutPair>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let candidates = pairs::matched_pairs_created_before(cutoff, &mut conn).await?;
        drop(conn);
        let mut timed_out = Vec::new();
        for pair in candidates {
            let mut tx = self.pool.begin().await?;
            // The pair transition is the claim; a submission that confirmed the pair in the
            // meantime makes this a no-op.
            let finished = match pairs::finish(&pair.pair_id, "Matched", pair.confirm_proposed, now, &mut tx).await? {
                Some(p) => p,
                None => continue,
            };
            let mut failed_requests = Vec::new();
            let mut refunded = Vec::new();
            for rid in [&finished.match_a_id, &finished.match_b_id] {
                if let Some(req) = requests::fail(
                    rid,
                    &[RequestStatus::Matched, RequestStatus::Mismatched],
                    TIMEOUT_NO_RESPONSE,
                    now,
                    &mut tx,
                )
                .await?
                {
                    failed_requests.push(req);
                }
                // Refund-once: the guard flip decides; the credit only follows a successful flip.
                if let Some(req) = requests::mark_refunded(rid, now, &mut tx).await? {
                    ledger::credit(&req.requester_id, refund, now, &mut tx).await?;
                    let reason = format!("refund for timed out request {rid}");
                    ledger::append_entry(&req.requester_id, LedgerEntryType::Refund, refund, &reason, now, &mut tx)
                        .await?;
                    refunded.push(req.requester_id);
                }
            }
            tx.commit().await?;
            info!(
                "🕰️ Pair [{}] failed: no response within the deadline. {} side(s) refunded",
                finished.pair_id,
                refunded.len()
            );
            timed_out.push(TimedOutPair { pair: finished, failed_requests, refunded_requesters: refunded });
        }
        Ok(timed_out)
    }

    async fn expire_unmet_pairs(
        &self,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimedOutPair>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let candidates = pairs::confirmed_pairs_confirmed_before(cutoff, &mut conn).await?;
        drop(conn);
        let mut expired = Vec::new();
        for pair in candidates {
            let mut tx = self.pool.begin().await?;
            let finished = match pairs::finish(&pair.pair_id, "Confirmed", pair.confirm_proposed, now, &mut tx).await? {
                Some(p) => p,
                None => continue,
            };
            let mut failed_requests = Vec::new();
            for rid in [&finished.match_a_id, &finished.match_b_id] {
                if let Some(req) =
                    requests::fail(rid, &[RequestStatus::Confirmed], TIMEOUT_NO_MEETING, now, &mut tx).await?
                {
                    failed_requests.push(req);
                }
            }
            tx.commit().await?;
            info!("🕰️ Pair [{}] failed: confirmed but never met", finished.pair_id);
            expired.push(TimedOutPair { pair: finished, failed_requests, refunded_requesters: Vec::new() });
        }
        Ok(expired)
    }

    async fn clean_finished_requests(
        &self,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<MatchingRequest>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let cleaned = requests::clean_finished(cutoff, RETENTION_WINDOW_ELAPSED, now, &mut conn).await?;
        if !cleaned.is_empty() {
            info!("🕰️ {} finished request(s) cleaned after the retention window", cleaned.len());
        }
        Ok(cleaned)
    }

    async fn close(&mut self) -> Result<(), MatchingStoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl RequestManagement for SqliteDatabase {
    async fn fetch_request(&self, request_id: &RequestId) -> Result<Option<MatchingRequest>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let request = requests::fetch_request_by_request_id(request_id, &mut conn).await?;
        Ok(request)
    }

    async fn fetch_active_request_for_requester(
        &self,
        requester_id: &str,
    ) -> Result<Option<MatchingRequest>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let request = requests::fetch_active_request_for_requester(requester_id, &mut conn).await?;
        Ok(request)
    }

    async fn fetch_pair(&self, pair_id: &PairId) -> Result<Option<MatchPair>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let pair = pairs::fetch_pair_by_pair_id(pair_id, &mut conn).await?;
        Ok(pair)
    }

    async fn fetch_proposal(&self, propose_id: &ProposalId) -> Result<Option<Proposal>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let proposal = proposals::fetch_proposal_by_propose_id(propose_id, &mut conn).await?;
        Ok(proposal)
    }

    async fn fetch_credit_account(&self, requester_id: &str) -> Result<Option<CreditAccount>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let account = ledger::fetch_account(requester_id, &mut conn).await?;
        Ok(account)
    }

    async fn fetch_ledger(&self, requester_id: &str) -> Result<Vec<LedgerEntry>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let entries = ledger::entries_for(requester_id, &mut conn).await?;
        Ok(entries)
    }

    async fn pending_proposals(&self) -> Result<Vec<Proposal>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let pending = proposals::pending(&mut conn).await?;
        Ok(pending)
    }

    async fn stuck_pairs(&self, stalled_since: DateTime<Utc>) -> Result<Vec<MatchPair>, MatchingStoreError> {
        let mut conn = self.pool.acquire().await?;
        let pairs = pairs::stuck_pairs(stalled_since, &mut conn).await?;
        Ok(pairs)
    }
}
