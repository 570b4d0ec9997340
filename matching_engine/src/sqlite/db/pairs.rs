use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{MatchPair, NewMatchPair, PairId, PairSide};

pub async fn insert_pair(pair: NewMatchPair, conn: &mut SqliteConnection) -> Result<MatchPair, sqlx::Error> {
    let pair: MatchPair = sqlx::query_as(
        r#"
            INSERT INTO match_pairs (pair_id, match_a_id, match_b_id, status, confirm_proposed, created_at, updated_at)
            VALUES ($1, $2, $3, 'Matched', $4, $5, $5)
            RETURNING *;
        "#,
    )
    .bind(pair.pair_id)
    .bind(pair.match_a_id)
    .bind(pair.match_b_id)
    .bind(pair.confirm_proposed)
    .bind(pair.created_at)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Pair [{}] links {} and {}", pair.pair_id, pair.match_a_id, pair.match_b_id);
    Ok(pair)
}

pub async fn fetch_pair_by_pair_id(
    pair_id: &PairId,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchPair>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM match_pairs WHERE pair_id = $1").bind(pair_id.as_str()).fetch_optional(conn).await
}

/// Re-arms a pair whose two requesters are introduced again, resetting the negotiation and
/// exchange state back to a fresh `Matched`. `created_at` is restamped as well, so the response
/// timeout is measured from the new introduction rather than the original one.
pub async fn reactivate(
    pair_id: &PairId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchPair>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE match_pairs SET status = 'Matched', confirm_proposed = 1, contact_shared = 0, \
         both_interested = 0, a_wants_again = NULL, b_wants_again = NULL, a_contact = NULL, b_contact = NULL, \
         confirmed_at = NULL, created_at = $1, updated_at = $1 WHERE pair_id = $2 RETURNING *",
    )
    .bind(now)
    .bind(pair_id.as_str())
    .fetch_optional(conn)
    .await
}

/// Terminates a pair, guarded on its current status so a sweep and a live submission cannot both
/// claim the transition.
pub async fn finish(
    pair_id: &PairId,
    expected: &str,
    confirm_proposed: bool,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchPair>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE match_pairs SET status = 'Finished', confirm_proposed = $1, updated_at = $2 \
         WHERE pair_id = $3 AND status = $4 RETURNING *",
    )
    .bind(confirm_proposed)
    .bind(now)
    .bind(pair_id.as_str())
    .bind(expected)
    .fetch_optional(conn)
    .await
}

/// Promotes a matched pair to `Confirmed`, stamping the confirmation time the completion
/// timeout is measured from.
pub async fn confirm(
    pair_id: &PairId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchPair>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE match_pairs SET status = 'Confirmed', confirmed_at = $1, updated_at = $1 \
         WHERE pair_id = $2 AND status = 'Matched' RETURNING *",
    )
    .bind(now)
    .bind(pair_id.as_str())
    .fetch_optional(conn)
    .await
}

fn vote_column(side: PairSide) -> &'static str {
    match side {
        PairSide::A => "a_wants_again",
        PairSide::B => "b_wants_again",
    }
}

fn contact_column(side: PairSide) -> &'static str {
    match side {
        PairSide::A => "a_contact",
        PairSide::B => "b_contact",
    }
}

pub async fn record_vote(
    pair_id: &PairId,
    side: PairSide,
    wants_again: bool,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchPair>, sqlx::Error> {
    let sql = format!(
        "UPDATE match_pairs SET {} = $1, updated_at = $2 WHERE pair_id = $3 RETURNING *",
        vote_column(side)
    );
    sqlx::query_as(&sql).bind(wants_again).bind(now).bind(pair_id.as_str()).fetch_optional(conn).await
}

/// Completes the mutual-interest gate: contact may be shared, the pair is finished.
pub async fn complete_interest(
    pair_id: &PairId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchPair>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE match_pairs SET contact_shared = 1, both_interested = 1, status = 'Finished', updated_at = $1 \
         WHERE pair_id = $2 AND status = 'Confirmed' RETURNING *",
    )
    .bind(now)
    .bind(pair_id.as_str())
    .fetch_optional(conn)
    .await
}

pub async fn set_contact(
    pair_id: &PairId,
    side: PairSide,
    contact: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchPair>, sqlx::Error> {
    let sql = format!(
        "UPDATE match_pairs SET {} = $1, updated_at = $2 WHERE pair_id = $3 RETURNING *",
        contact_column(side)
    );
    sqlx::query_as(&sql).bind(contact).bind(now).bind(pair_id.as_str()).fetch_optional(conn).await
}

/// Flips the pair to `Exchanged` once both sides' reviews carry contact payloads.
pub async fn mark_exchanged(
    pair_id: &PairId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchPair>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE match_pairs SET status = 'Exchanged', updated_at = $1 \
         WHERE pair_id = $2 AND status IN ('Confirmed', 'Finished') RETURNING *",
    )
    .bind(now)
    .bind(pair_id.as_str())
    .fetch_optional(conn)
    .await
}

/// Matched pairs created strictly before `cutoff` — candidates for the response timeout.
pub async fn matched_pairs_created_before(
    cutoff: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<MatchPair>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM match_pairs WHERE status = 'Matched' AND created_at < $1 ORDER BY created_at ASC")
        .bind(cutoff)
        .fetch_all(conn)
        .await
}

/// Confirmed pairs whose confirmation is strictly older than `cutoff` — candidates for the
/// completion timeout.
pub async fn confirmed_pairs_confirmed_before(
    cutoff: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<MatchPair>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM match_pairs WHERE status = 'Confirmed' AND confirmed_at IS NOT NULL AND confirmed_at < $1 \
         ORDER BY confirmed_at ASC",
    )
    .bind(cutoff)
    .fetch_all(conn)
    .await
}

/// Matched pairs where both sides have already submitted choices — candidates for asynchronous
/// auto-confirmation.
pub async fn matched_pairs_with_both_choices(conn: &mut SqliteConnection) -> Result<Vec<MatchPair>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT p.* FROM match_pairs p
        JOIN matching_requests a ON p.match_a_id = a.request_id
        JOIN matching_requests b ON p.match_b_id = b.request_id
        WHERE p.status = 'Matched'
          AND a.choices_submitted_at IS NOT NULL AND a.date_choices IS NOT NULL
          AND b.choices_submitted_at IS NOT NULL AND b.date_choices IS NOT NULL
        ORDER BY p.created_at ASC
        "#,
    )
    .fetch_all(conn)
    .await
}

/// Non-terminal pairs untouched since before `stalled_since` — the operator's "stuck pairs" view.
pub async fn stuck_pairs(
    stalled_since: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<MatchPair>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM match_pairs WHERE status IN ('Matched', 'Confirmed') AND updated_at < $1 \
         ORDER BY updated_at ASC",
    )
    .bind(stalled_since)
    .fetch_all(conn)
    .await
}
