use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use matching_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    ExchangeApi,
    IntakeApi,
    NegotiationApi,
    ProposalApi,
    SqliteDatabase,
    SweeperApi,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        accept_proposal,
        active_request,
        balance,
        deposit,
        force_sweep,
        health,
        ledger,
        meet_again,
        new_proposal,
        new_request,
        not_found,
        pair_by_id,
        pending_proposals,
        refuse_proposal,
        request_by_id,
        stuck_pairs,
        submit_choices,
        submit_contact,
    },
    sweep_worker::start_sweep_worker,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(50, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    if config.run_sweeper {
        start_sweep_worker(db.clone(), producers.clone(), config.clone());
    } else {
        warn!("🪛️ MMS_RUN_SWEEPER is off. Lifecycle deadlines are only enforced via the forced-sweep endpoint.");
    }
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let app_config = config.clone();
    let srv = HttpServer::new(move || {
        let intake_api = IntakeApi::new(db.clone());
        let proposal_api = ProposalApi::new(db.clone(), producers.clone());
        let negotiation_api = NegotiationApi::new(db.clone(), producers.clone());
        let exchange_api = ExchangeApi::new(db.clone());
        let sweeper_api = SweeperApi::new(db.clone(), producers.clone());
        let api_scope = web::scope("/api")
            .service(new_request)
            .service(request_by_id)
            .service(active_request)
            .service(balance)
            .service(ledger)
            .service(deposit)
            .service(new_proposal)
            .service(accept_proposal)
            .service(refuse_proposal)
            .service(pending_proposals)
            .service(submit_choices)
            .service(pair_by_id)
            .service(meet_again)
            .service(submit_contact)
            .service(stuck_pairs)
            .service(force_sweep);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mms::access_log"))
            .app_data(web::Data::new(intake_api))
            .app_data(web::Data::new(proposal_api))
            .app_data(web::Data::new(negotiation_api))
            .app_data(web::Data::new(exchange_api))
            .app_data(web::Data::new(sweeper_api))
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .service(health)
            .service(api_scope)
            .default_service(web::route().to(not_found))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Default event subscribers: every lifecycle event is at least logged. Notification senders and
/// the like subscribe here as well.
fn logging_hooks() -> EventHooks {
    type BoxedHook = Pin<Box<dyn Future<Output = ()> + Send>>;
    let mut hooks = EventHooks::default();
    hooks
        .on_request_matched(|ev| {
            Box::pin(async move {
                info!("📬️ Pair [{}] is live: {} / {}", ev.pair.pair_id, ev.pair.match_a_id, ev.pair.match_b_id);
            }) as BoxedHook
        })
        .on_pair_confirmed(|ev| {
            Box::pin(async move {
                let date = ev.pair_request.final_date.map(|d| d.to_string()).unwrap_or_else(|| "?".into());
                info!("📬️ Request [{}] confirmed a meeting on {date}", ev.pair_request.request_id);
            }) as BoxedHook
        })
        .on_request_failed(|ev| {
            Box::pin(async move {
                let reason = ev.request.failure_reason.as_deref().unwrap_or("unknown");
                info!("📬️ Request [{}] failed: {reason}", ev.request.request_id);
            }) as BoxedHook
        });
    hooks
}
