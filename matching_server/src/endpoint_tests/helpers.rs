use actix_web::{
    web,
    web::ServiceConfig,
};
use matching_engine::{
    events::EventProducers,
    ExchangeApi,
    IntakeApi,
    NegotiationApi,
    ProposalApi,
    SqliteDatabase,
    SweeperApi,
};
use mm_common::Credits;

use crate::{
    config::ServerConfig,
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
        pair_by_id,
        pending_proposals,
        refuse_proposal,
        request_by_id,
        stuck_pairs,
        submit_choices,
        submit_contact,
    },
};

pub async fn test_db() -> SqliteDatabase {
    let _ = env_logger::try_init().ok();
    SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("in-memory test database")
}

/// Funds a requester's credit account directly through the engine API.
pub async fn fund(db: &SqliteDatabase, requester_id: &str, amount: i64) -> anyhow::Result<()> {
    IntakeApi::new(db.clone()).deposit(requester_id, Credits::from(amount), "test deposit").await?;
    Ok(())
}

/// Registers the full route surface against `db`, mirroring the production wiring without the
/// `/api` scope prefix.
pub fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let producers = EventProducers::default();
        cfg.service(health)
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
            .service(force_sweep)
            .app_data(web::Data::new(IntakeApi::new(db.clone())))
            .app_data(web::Data::new(ProposalApi::new(db.clone(), producers.clone())))
            .app_data(web::Data::new(NegotiationApi::new(db.clone(), producers.clone())))
            .app_data(web::Data::new(ExchangeApi::new(db.clone())))
            .app_data(web::Data::new(SweeperApi::new(db.clone(), producers)))
            .app_data(web::Data::new(db))
            .app_data(web::Data::new(ServerConfig::default()));
    }
}
