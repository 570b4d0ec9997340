use chrono::{DateTime, Utc};
use log::trace;
use mm_common::Credits;
use sqlx::SqliteConnection;

use crate::db_types::{CreditAccount, LedgerEntry, LedgerEntryType};

pub async fn fetch_account(
    requester_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<CreditAccount>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM credit_accounts WHERE requester_id = $1")
        .bind(requester_id)
        .fetch_optional(conn)
        .await
}

/// The debit is the guard: the balance check and the subtraction are one conditional update.
/// Returns `None` when the balance cannot cover the amount (or no account exists).
pub async fn try_debit(
    requester_id: &str,
    amount: Credits,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<CreditAccount>, sqlx::Error> {
    let account: Option<CreditAccount> = sqlx::query_as(
        "UPDATE credit_accounts SET balance = balance - $1, updated_at = $2 \
         WHERE requester_id = $3 AND balance >= $1 RETURNING *",
    )
    .bind(amount)
    .bind(now)
    .bind(requester_id)
    .fetch_optional(conn)
    .await?;
    if let Some(acc) = &account {
        trace!("🗃️ Debited {amount} from {requester_id}; balance is now {}", acc.balance);
    }
    Ok(account)
}

/// Credits the account, creating it when absent (upsert).
pub async fn credit(
    requester_id: &str,
    amount: Credits,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<CreditAccount, sqlx::Error> {
    let account: CreditAccount = sqlx::query_as(
        r#"
            INSERT INTO credit_accounts (requester_id, balance, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (requester_id) DO UPDATE SET balance = balance + $2, updated_at = $3
            RETURNING *;
        "#,
    )
    .bind(requester_id)
    .bind(amount)
    .bind(now)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Credited {amount} to {requester_id}; balance is now {}", account.balance);
    Ok(account)
}

/// Appends one entry to the append-only audit trail.
pub async fn append_entry(
    requester_id: &str,
    entry_type: LedgerEntryType,
    amount: Credits,
    reason: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO ledger_entries (requester_id, entry_type, amount, reason, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(requester_id)
    .bind(entry_type.to_string())
    .bind(amount)
    .bind(reason)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn entries_for(requester_id: &str, conn: &mut SqliteConnection) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM ledger_entries WHERE requester_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(requester_id)
        .fetch_all(conn)
        .await
}
