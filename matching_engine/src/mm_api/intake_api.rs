use std::fmt::Debug;

use log::*;
use mm_common::Credits;

use crate::{
    db_types::{CreditAccount, LedgerEntry, MatchingRequest, NewMatchingRequest},
    mm_api::LifecycleError,
    traits::{MatchingGatewayDatabase, RequestManagement},
};

/// `IntakeApi` handles the front door of the lifecycle: opening a matching request (which debits
/// the fixed credit cost) and managing credit balances.
pub struct IntakeApi<B> {
    db: B,
}

impl<B> Debug for IntakeApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IntakeApi")
    }
}

impl<B> IntakeApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> IntakeApi<B>
where B: MatchingGatewayDatabase
{
    /// Opens a new matching request for the requester, debiting the fixed cost atomically.
    ///
    /// The request enters in `Waiting` status. The debit, the request row, and the `Spend`
    /// ledger entry land in one transaction; an insufficient balance or an already-active
    /// request leaves no trace.
    pub async fn open_request(&self, requester_id: &str) -> Result<MatchingRequest, LifecycleError> {
        let cost = Credits::request_cost();
        let request = self.db.create_request(NewMatchingRequest::new(requester_id), cost).await?;
        info!("📥️ Request [{}] opened for {requester_id} at a cost of {cost}", request.request_id);
        Ok(request)
    }

    /// Credits a requester's account, creating it if it does not exist yet.
    pub async fn deposit(
        &self,
        requester_id: &str,
        amount: Credits,
        reason: &str,
    ) -> Result<CreditAccount, LifecycleError> {
        let account = self.db.deposit_credits(requester_id, amount, reason).await?;
        info!("📥️ Deposited {amount} for {requester_id}. New balance: {}", account.balance);
        Ok(account)
    }
}

impl<B> IntakeApi<B>
where B: RequestManagement
{
    pub async fn balance(&self, requester_id: &str) -> Result<Option<CreditAccount>, LifecycleError> {
        Ok(self.db.fetch_credit_account(requester_id).await?)
    }

    pub async fn ledger(&self, requester_id: &str) -> Result<Vec<LedgerEntry>, LifecycleError> {
        Ok(self.db.fetch_ledger(requester_id).await?)
    }

    pub async fn active_request(&self, requester_id: &str) -> Result<Option<MatchingRequest>, LifecycleError> {
        Ok(self.db.fetch_active_request_for_requester(requester_id).await?)
    }
}
