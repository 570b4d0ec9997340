use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewProposal, PairId, Proposal, ProposalId, ProposalStatus};

pub async fn insert_proposal(proposal: NewProposal, conn: &mut SqliteConnection) -> Result<Proposal, sqlx::Error> {
    let proposal: Proposal = sqlx::query_as(
        r#"
            INSERT INTO proposals (propose_id, propose_user_id, target_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, 'Propose', $4, $4)
            RETURNING *;
        "#,
    )
    .bind(proposal.propose_id)
    .bind(proposal.propose_user_id)
    .bind(proposal.target_id)
    .bind(proposal.created_at)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Proposal [{}] from {} to {}", proposal.propose_id, proposal.propose_user_id, proposal.target_id);
    Ok(proposal)
}

pub async fn fetch_proposal_by_propose_id(
    propose_id: &ProposalId,
    conn: &mut SqliteConnection,
) -> Result<Option<Proposal>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM proposals WHERE propose_id = $1")
        .bind(propose_id.as_str())
        .fetch_optional(conn)
        .await
}

/// The resolve-once guard. Flips the proposal out of `Propose` and stamps `responded_at`; the
/// guard and the write are one statement, so a second resolution attempt matches no row.
pub async fn resolve(
    propose_id: &ProposalId,
    to: ProposalStatus,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Proposal>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE proposals SET status = $1, responded_at = $2, updated_at = $2 \
         WHERE propose_id = $3 AND status = 'Propose' RETURNING *",
    )
    .bind(to.to_string())
    .bind(now)
    .bind(propose_id.as_str())
    .fetch_optional(conn)
    .await
}

pub async fn link_pair(
    propose_id: &ProposalId,
    pair_id: &PairId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Proposal>, sqlx::Error> {
    sqlx::query_as("UPDATE proposals SET match_pair_id = $1, updated_at = $2 WHERE propose_id = $3 RETURNING *")
        .bind(pair_id.as_str())
        .bind(now)
        .bind(propose_id.as_str())
        .fetch_optional(conn)
        .await
}

/// Proposals still awaiting a response, oldest first.
pub async fn pending(conn: &mut SqliteConnection) -> Result<Vec<Proposal>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM proposals WHERE status = 'Propose' ORDER BY created_at ASC").fetch_all(conn).await
}
