//! Defines the endpoint for creating a new transaction.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};

use crate::{
    Error, SharedLedger,
    endpoints::{self, format_endpoint},
    transaction::NewTransaction,
};

/// A route handler for creating a new transaction.
///
/// The amount is added to the account's balance. Responds with the new
/// transaction and `201 Created`.
pub async fn create_transaction_endpoint(
    State(ledger): State<SharedLedger>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<Response, Error> {
    let outcome = ledger
        .lock()?
        .create(new_transaction.clone())
        .inspect_err(|error| {
            tracing::warn!("Could not create transaction with {new_transaction:?}: {error}")
        })?;

    let transaction = outcome.transaction;

    Ok((
        StatusCode::CREATED,
        [(
            LOCATION,
            format_endpoint(endpoints::TRANSACTION, transaction.id),
        )],
        Json(transaction),
    )
        .into_response())
}
