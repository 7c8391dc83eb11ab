//! Defines the endpoint for updating an account.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error, SharedLedger,
    account::{Account, AccountPatch},
    database_id::AccountId,
};

/// A route handler for updating an account with the fields set in the body.
///
/// Setting `balance` overwrites the cached balance, e.g. to correct it after
/// a bank reconciliation.
pub async fn edit_account_endpoint(
    State(ledger): State<SharedLedger>,
    Path(account_id): Path<AccountId>,
    Json(patch): Json<AccountPatch>,
) -> Result<Json<Account>, Error> {
    ledger
        .lock()?
        .update_account(account_id, &patch)
        .map(Json)
        .inspect_err(|error| tracing::warn!("Could not update account {account_id}: {error}"))
}
