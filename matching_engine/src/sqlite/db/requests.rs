use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{DateChoices, MatchingRequest, NewMatchingRequest, PairId, RequestId, RequestStatus},
    traits::MatchingStoreError,
};

/// Inserts a new matching request. The partial unique index over active statuses rejects a
/// second active request for the same requester; that violation surfaces as `DuplicateRequest`.
pub async fn insert_request(
    request: NewMatchingRequest,
    conn: &mut SqliteConnection,
) -> Result<MatchingRequest, MatchingStoreError> {
    let requester_id = request.requester_id.clone();
    let result: Result<MatchingRequest, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO matching_requests (request_id, requester_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *;
        "#,
    )
    .bind(request.request_id)
    .bind(request.requester_id)
    .bind(request.status.to_string())
    .bind(request.created_at)
    .fetch_one(conn)
    .await;
    match result {
        Ok(request) => {
            debug!("🗃️ Request [{}] created for requester {requester_id}", request.request_id);
            Ok(request)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(MatchingStoreError::DuplicateRequest(requester_id))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_request_by_request_id(
    request_id: &RequestId,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM matching_requests WHERE request_id = $1")
        .bind(request_id.as_str())
        .fetch_optional(conn)
        .await
}

/// The requester's active request, if any. The partial unique index guarantees at most one.
pub async fn fetch_active_request_for_requester(
    requester_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM matching_requests WHERE requester_id = $1 AND \
         status IN ('Waiting', 'Matched', 'Confirmed', 'Mismatched', 'Scheduled')",
    )
    .bind(requester_id)
    .fetch_optional(conn)
    .await
}

/// Resolves the request belonging to `requester_id` on the given pair, in O(1) by the pair's two
/// request ids.
pub async fn fetch_pair_member(
    a: &RequestId,
    b: &RequestId,
    requester_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM matching_requests WHERE request_id IN ($1, $2) AND requester_id = $3")
        .bind(a.as_str())
        .bind(b.as_str())
        .bind(requester_id)
        .fetch_optional(conn)
        .await
}

fn status_list(statuses: &[RequestStatus]) -> String {
    statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(", ")
}

/// Guarded status transition: moves the request to `to` only if it is currently in one of the
/// `from` states. Returns `None` when the guard does not hold (someone else got there first).
pub async fn transition(
    request_id: &RequestId,
    from: &[RequestStatus],
    to: RequestStatus,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, sqlx::Error> {
    let sql = format!(
        "UPDATE matching_requests SET status = $1, updated_at = $2 WHERE request_id = $3 AND status IN ({}) \
         RETURNING *",
        status_list(from)
    );
    sqlx::query_as(&sql).bind(to.to_string()).bind(now).bind(request_id.as_str()).fetch_optional(conn).await
}

/// Persists one side's schedule choices. The same guarded write re-enters a `Mismatched` request
/// as a fresh `Matched` attempt.
pub async fn store_choices(
    request_id: &RequestId,
    choices: &DateChoices,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, MatchingStoreError> {
    let request = sqlx::query_as(
        "UPDATE matching_requests SET date_choices = $1, choices_submitted_at = $2, status = 'Matched', \
         updated_at = $2 WHERE request_id = $3 AND status IN ('Matched', 'Mismatched') RETURNING *",
    )
    .bind(sqlx::types::Json(choices))
    .bind(now)
    .bind(request_id.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(request)
}

/// Wipes a request's negotiation state so a re-introduced pair starts scheduling from scratch.
pub async fn clear_choices(
    request_id: &RequestId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE matching_requests SET date_choices = NULL, choices_submitted_at = NULL, final_date = NULL, \
         final_location = NULL, photo_visible_at = NULL, updated_at = $1 WHERE request_id = $2 RETURNING *",
    )
    .bind(now)
    .bind(request_id.as_str())
    .fetch_optional(conn)
    .await
}

/// Promotes a request to `Confirmed` with the agreed schedule, guarded on it still negotiating.
pub async fn confirm(
    request_id: &RequestId,
    final_date: NaiveDate,
    final_location: &str,
    photo_visible_at: DateTime<Utc>,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE matching_requests SET status = 'Confirmed', final_date = $1, final_location = $2, \
         photo_visible_at = $3, updated_at = $4 WHERE request_id = $5 AND status IN ('Matched', 'Mismatched') \
         RETURNING *",
    )
    .bind(final_date)
    .bind(final_location)
    .bind(photo_visible_at)
    .bind(now)
    .bind(request_id.as_str())
    .fetch_optional(conn)
    .await
}

/// Force-fails a request with the given reason, guarded on the states the timeout rules cover.
pub async fn fail(
    request_id: &RequestId,
    from: &[RequestStatus],
    reason: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, sqlx::Error> {
    let sql = format!(
        "UPDATE matching_requests SET status = 'Failed', failure_reason = $1, updated_at = $2 \
         WHERE request_id = $3 AND status IN ({}) RETURNING *",
        status_list(from)
    );
    sqlx::query_as(&sql).bind(reason).bind(now).bind(request_id.as_str()).fetch_optional(conn).await
}

/// Cross-links a request with its partner and the owning pair.
pub async fn link_partner(
    request_id: &RequestId,
    partner_requester_id: &str,
    pair_id: &PairId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE matching_requests SET partner_id = $1, match_pair_id = $2, updated_at = $3 WHERE request_id = $4 \
         RETURNING *",
    )
    .bind(partner_requester_id)
    .bind(pair_id.as_str())
    .bind(now)
    .bind(request_id.as_str())
    .fetch_optional(conn)
    .await
}

/// Returns a request to `Waiting` after a refusal, clearing its pair linkage. The caller names
/// the states the refusal may release from, so a refusal of one proposal cannot unlink a request
/// that a different proposal has since matched.
pub async fn release(
    request_id: &RequestId,
    from: &[RequestStatus],
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, sqlx::Error> {
    let sql = format!(
        "UPDATE matching_requests SET status = 'Waiting', partner_id = NULL, match_pair_id = NULL, \
         updated_at = $1 WHERE request_id = $2 AND status IN ({}) RETURNING *",
        status_list(from)
    );
    sqlx::query_as(&sql).bind(now).bind(request_id.as_str()).fetch_optional(conn).await
}

/// The refund-once guard. Flips `points_refunded` 0→1 and returns the request only when this
/// call performed the flip; a second sweep sees the guard already set and gets `None`.
pub async fn mark_refunded(
    request_id: &RequestId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingRequest>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE matching_requests SET points_refunded = 1, updated_at = $1 WHERE request_id = $2 AND \
         points_refunded = 0 RETURNING *",
    )
    .bind(now)
    .bind(request_id.as_str())
    .fetch_optional(conn)
    .await
}

/// Marks every `Finished` request untouched since before `cutoff` as `Cleaned`. Strictly before:
/// a request exactly at the boundary is left alone.
pub async fn clean_finished(
    cutoff: DateTime<Utc>,
    reason: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<MatchingRequest>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE matching_requests SET status = 'Cleaned', cleanup_reason = $1, updated_at = $2 \
         WHERE status = 'Finished' AND updated_at < $3 RETURNING *",
    )
    .bind(reason)
    .bind(now)
    .bind(cutoff)
    .fetch_all(conn)
    .await
}
