//! Defines the endpoints for deleting a transaction.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error, SharedLedger,
    database_id::TransactionId,
    ledger::{AlwaysConfirm, DeleteOutcome},
};

/// The ID of the transaction to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTransactionBody {
    /// The transaction to delete.
    pub id: TransactionId,
}

/// The response body for a delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTransactionResponse {
    /// What happened.
    pub message: String,
}

/// A route handler for deleting the transaction in the URL.
///
/// The request is the user's confirmation, the amount is taken off the
/// account's balance straight away.
pub async fn delete_transaction_endpoint(
    State(ledger): State<SharedLedger>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<DeleteTransactionResponse>, Error> {
    delete_transaction(&ledger, transaction_id)
}

/// A route handler for deleting the transaction with the ID in the body.
pub async fn delete_transaction_by_body_endpoint(
    State(ledger): State<SharedLedger>,
    Json(body): Json<DeleteTransactionBody>,
) -> Result<Json<DeleteTransactionResponse>, Error> {
    delete_transaction(&ledger, body.id)
}

fn delete_transaction(
    ledger: &SharedLedger,
    transaction_id: TransactionId,
) -> Result<Json<DeleteTransactionResponse>, Error> {
    let outcome = ledger
        .lock()?
        .delete(transaction_id, &mut AlwaysConfirm)
        .inspect_err(|error| {
            tracing::warn!("Could not delete transaction {transaction_id}: {error}")
        })?;

    let message = match outcome {
        DeleteOutcome::Deleted { .. } => "Transaction deleted",
        DeleteOutcome::Cancelled => "Transaction not deleted",
    };

    Ok(Json(DeleteTransactionResponse {
        message: message.to_owned(),
    }))
}
