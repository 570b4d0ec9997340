//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current
//! thread will cause the current worker to stop processing new requests. Any long, non-cpu-bound
//! operation (e.g. database operations) must therefore be expressed as an async function so that
//! worker threads can handle other requests while it is in flight.
use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use log::*;
use matching_engine::{
    db_types::{PairId, ProposalId, RequestId},
    traits::{RequestManagement, SubmissionOutcome},
    ExchangeApi,
    IntakeApi,
    NegotiationApi,
    ProposalApi,
    SqliteDatabase,
    SweeperApi,
};
use mm_common::Credits;
use serde_json::json;

use crate::{
    config::ServerConfig,
    data_objects::{
        ChoicesParams,
        ContactParams,
        DepositParams,
        JsonResponse,
        NewRequestParams,
        ProposalParams,
        StuckPairsQuery,
        VoteParams,
    },
    errors::ServerError,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Intake  ----------------------------------------------------
/// Opens a new matching request, debiting the fixed credit cost.
#[post("/request")]
pub async fn new_request(
    body: web::Json<NewRequestParams>,
    api: web::Data<IntakeApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💻️ POST new request for {}", params.requester_id);
    let request = api.open_request(&params.requester_id).await?;
    Ok(HttpResponse::Ok().json(request))
}

#[get("/request/{request_id}")]
pub async fn request_by_id(
    path: web::Path<String>,
    db: web::Data<SqliteDatabase>,
) -> Result<HttpResponse, ServerError> {
    let request_id = RequestId(path.into_inner());
    debug!("💻️ GET request {request_id}");
    let request = db
        .fetch_request(&request_id)
        .await
        .map_err(|e| ServerError::BackendError(e.to_string()))?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Request {request_id}")))?;
    Ok(HttpResponse::Ok().json(request))
}

/// The requester's current active request, if any.
#[get("/requester/{requester_id}/request")]
pub async fn active_request(
    path: web::Path<String>,
    api: web::Data<IntakeApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let requester_id = path.into_inner();
    debug!("💻️ GET active request for {requester_id}");
    let request = api
        .active_request(&requester_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No active request for {requester_id}")))?;
    Ok(HttpResponse::Ok().json(request))
}

#[get("/requester/{requester_id}/balance")]
pub async fn balance(
    path: web::Path<String>,
    api: web::Data<IntakeApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let requester_id = path.into_inner();
    debug!("💻️ GET balance for {requester_id}");
    let account = api
        .balance(&requester_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No credit account for {requester_id}")))?;
    Ok(HttpResponse::Ok().json(account))
}

#[get("/requester/{requester_id}/ledger")]
pub async fn ledger(
    path: web::Path<String>,
    api: web::Data<IntakeApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let requester_id = path.into_inner();
    debug!("💻️ GET ledger for {requester_id}");
    let entries = api.ledger(&requester_id).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// Operator endpoint. Credits a requester's account.
#[post("/credits")]
pub async fn deposit(
    body: web::Json<DepositParams>,
    api: web::Data<IntakeApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💻️ POST deposit of {} for {}", params.amount, params.requester_id);
    let account = api.deposit(&params.requester_id, Credits::from(params.amount), &params.reason).await?;
    Ok(HttpResponse::Ok().json(account))
}

//----------------------------------------------   Proposals  ----------------------------------------------------
/// Operator endpoint. Records a directed introduction offer.
#[post("/proposal")]
pub async fn new_proposal(
    body: web::Json<ProposalParams>,
    api: web::Data<ProposalApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💻️ POST proposal {} → {}", params.proposer_id, params.target_id);
    let proposal = api.propose(&params.proposer_id, &params.target_id).await?;
    Ok(HttpResponse::Ok().json(proposal))
}

#[post("/proposal/{propose_id}/accept")]
pub async fn accept_proposal(
    path: web::Path<String>,
    api: web::Data<ProposalApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let propose_id = ProposalId(path.into_inner());
    debug!("💻️ POST accept proposal {propose_id}");
    let resolution = api.accept(&propose_id, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "proposal": resolution.proposal,
        "pair": resolution.pair,
        "proposer_request": resolution.proposer_request,
        "target_request": resolution.target_request,
    })))
}

#[post("/proposal/{propose_id}/refuse")]
pub async fn refuse_proposal(
    path: web::Path<String>,
    api: web::Data<ProposalApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let propose_id = ProposalId(path.into_inner());
    debug!("💻️ POST refuse proposal {propose_id}");
    let resolution = api.refuse(&propose_id, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "proposal": resolution.proposal,
        "proposer_request": resolution.proposer_request,
    })))
}

/// Operator endpoint. Proposals still awaiting a response, oldest first.
#[get("/proposals/pending")]
pub async fn pending_proposals(db: web::Data<SqliteDatabase>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET pending proposals");
    let pending = db.pending_proposals().await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    Ok(HttpResponse::Ok().json(pending))
}

//----------------------------------------------   Negotiation  ----------------------------------------------------
/// Submits one side's schedule choices and reports the outcome of the negotiation step.
#[post("/request/{request_id}/choices")]
pub async fn submit_choices(
    path: web::Path<String>,
    body: web::Json<ChoicesParams>,
    api: web::Data<NegotiationApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let request_id = RequestId(path.into_inner());
    debug!("💻️ POST choices for request {request_id}");
    let choices = body.into_inner().into_choices()?;
    let outcome = api.submit_choices(&request_id, choices, Utc::now()).await?;
    let response = match outcome {
        SubmissionOutcome::WaitingForPartner(request) => json!({
            "outcome": "waiting_for_partner",
            "request": request,
        }),
        SubmissionOutcome::Confirmed { request, partner, schedule } => json!({
            "outcome": "confirmed",
            "request": request,
            "partner": partner,
            "final_date": schedule.final_date,
            "final_location": schedule.final_location(),
        }),
        SubmissionOutcome::Mismatched(request) => json!({
            "outcome": "mismatched",
            "request": request,
        }),
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Pairs & exchange  ---------------------------------------------
#[get("/pair/{pair_id}")]
pub async fn pair_by_id(path: web::Path<String>, db: web::Data<SqliteDatabase>) -> Result<HttpResponse, ServerError> {
    let pair_id = PairId(path.into_inner());
    debug!("💻️ GET pair {pair_id}");
    let pair = db
        .fetch_pair(&pair_id)
        .await
        .map_err(|e| ServerError::BackendError(e.to_string()))?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Pair {pair_id}")))?;
    Ok(HttpResponse::Ok().json(pair))
}

/// Records a meet-again vote for one side of the pair.
#[post("/pair/{pair_id}/meet-again")]
pub async fn meet_again(
    path: web::Path<String>,
    body: web::Json<VoteParams>,
    api: web::Data<ExchangeApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let pair_id = PairId(path.into_inner());
    let params = body.into_inner();
    debug!("💻️ POST meet-again vote from {} on pair {pair_id}", params.requester_id);
    let outcome = api.vote_meet_again(&pair_id, &params.requester_id, params.wants_again, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(json!({ "pair": outcome.pair, "finalized": outcome.finalized })))
}

/// Attaches the contact payload from one side's review.
#[post("/pair/{pair_id}/contact")]
pub async fn submit_contact(
    path: web::Path<String>,
    body: web::Json<ContactParams>,
    api: web::Data<ExchangeApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let pair_id = PairId(path.into_inner());
    let params = body.into_inner();
    debug!("💻️ POST contact from {} on pair {pair_id}", params.requester_id);
    let outcome = api.submit_contact(&pair_id, &params.requester_id, &params.contact, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(json!({ "pair": outcome.pair, "finalized": outcome.finalized })))
}

//----------------------------------------------   Operator  ----------------------------------------------------
/// Operator endpoint. Non-terminal pairs that have not progressed recently.
#[get("/pairs/stuck")]
pub async fn stuck_pairs(
    query: web::Query<StuckPairsQuery>,
    db: web::Data<SqliteDatabase>,
) -> Result<HttpResponse, ServerError> {
    let stalled_since = Utc::now() - Duration::hours(query.stalled_hours);
    debug!("💻️ GET stuck pairs (stalled for {}h or more)", query.stalled_hours);
    let pairs = db.stuck_pairs(stalled_since).await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    Ok(HttpResponse::Ok().json(pairs))
}

/// Operator endpoint. Runs one sweep pass immediately instead of waiting for the worker.
#[post("/sweep")]
pub async fn force_sweep(
    api: web::Data<SweeperApi<SqliteDatabase>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    info!("💻️ POST forced sweep pass");
    let result = api.sweep(Utc::now(), config.sweep_deadlines()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "auto_confirmed": result.auto_confirmed.len(),
        "response_timeouts": result.timed_out.len(),
        "completion_timeouts": result.unmet.len(),
        "cleaned": result.cleaned.len(),
    })))
}

/// A friendly 404 for anything else.
pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(JsonResponse { success: false, message: "Not found".into() })
}
