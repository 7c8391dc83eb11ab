//! Defines the endpoints for reading accounts.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error, SharedLedger,
    account::{Account, AccountSummary},
    database_id::AccountId,
};

/// A route handler for listing all accounts.
pub async fn get_accounts_endpoint(
    State(ledger): State<SharedLedger>,
) -> Result<Json<Vec<Account>>, Error> {
    ledger.lock()?.store().accounts().map(Json)
}

/// A route handler for getting a single account.
pub async fn get_account_endpoint(
    State(ledger): State<SharedLedger>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Account>, Error> {
    ledger.lock()?.store().account(account_id).map(Json)
}

/// A route handler for the combined balance of all accounts.
pub async fn get_account_summary_endpoint(
    State(ledger): State<SharedLedger>,
) -> Result<Json<AccountSummary>, Error> {
    ledger.lock()?.store().account_summary().map(Json)
}
