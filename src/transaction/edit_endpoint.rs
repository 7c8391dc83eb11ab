//! Defines the endpoints for editing a transaction.
//!
//! A transaction can be edited at its own URL or by putting its ID in the body
//! of a request to the transactions URL.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error, SharedLedger,
    database_id::TransactionId,
    transaction::{Transaction, TransactionPatch},
};

/// A [TransactionPatch] that carries the ID of the transaction to edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatchWithId {
    /// The transaction to edit.
    pub id: TransactionId,
    /// The fields to change.
    #[serde(flatten)]
    pub patch: TransactionPatch,
}

/// A route handler for editing the transaction in the URL.
///
/// The old amount is taken off the old account's balance and the new amount
/// is added to the new account's balance.
pub async fn edit_transaction_endpoint(
    State(ledger): State<SharedLedger>,
    Path(transaction_id): Path<TransactionId>,
    Json(patch): Json<TransactionPatch>,
) -> Result<Json<Transaction>, Error> {
    update_transaction(&ledger, transaction_id, &patch)
}

/// A route handler for editing the transaction with the ID in the body.
pub async fn edit_transaction_by_body_endpoint(
    State(ledger): State<SharedLedger>,
    Json(body): Json<TransactionPatchWithId>,
) -> Result<Json<Transaction>, Error> {
    update_transaction(&ledger, body.id, &body.patch)
}

fn update_transaction(
    ledger: &SharedLedger,
    transaction_id: TransactionId,
    patch: &TransactionPatch,
) -> Result<Json<Transaction>, Error> {
    ledger
        .lock()?
        .update(transaction_id, patch)
        .map(|outcome| Json(outcome.transaction))
        .inspect_err(|error| {
            tracing::warn!("Could not update transaction {transaction_id}: {error}")
        })
}
