//! Finance Tracker is a service for tracking personal finances.
//!
//! Accounts (cash, bank or credit) hold a cached balance, categories label
//! money as income or expense, and transactions move money in or out of an
//! account. Every transaction that is created, edited or deleted through the
//! [TransactionCoordinator] keeps the owning account's cached balance in
//! step with its transactions.
//!
//! This library provides a JSON REST API over a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod account;
mod app_state;
mod category;
mod database_id;
mod db;
mod endpoints;
mod ledger;
mod logging;
mod money;
mod not_found;
mod reconcile;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use account::{Account, AccountPatch, AccountSummary, AccountType, NewAccount};
pub use app_state::{AppState, SharedLedger};
pub use category::{Category, CategoryKind, CategoryPatch, NewCategory};
pub use database_id::{AccountId, CategoryId, DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use ledger::{
    AlwaysConfirm, Confirmation, DeleteOutcome, IntegrityWarning, IntentOutcome, LedgerSnapshot,
    LedgerState, LedgerStore, LedgerWrite, SQLiteLedgerStore, TransactionChange,
    TransactionCoordinator, TransactionIntent, UpdateOutcome,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Money;
pub use reconcile::{BalanceLookup, BalancePlan, BalanceUpdate, Posting, apply, reverse};
pub use routing::build_router;
pub use transaction::{
    NewTransaction, Transaction, TransactionDetails, TransactionKind, TransactionPatch,
    TransactionQuery,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A transaction was given an empty description.
    #[error("transaction description cannot be empty")]
    EmptyDescription,

    /// An account or category was given an empty name.
    #[error("name cannot be empty")]
    EmptyName,

    /// A transaction referenced an account that does not exist.
    #[error("the account ID {0} does not refer to a valid account")]
    InvalidAccount(AccountId),

    /// A transaction referenced a category that does not exist.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// A stored or user-provided value is not one of the known account,
    /// category or transaction types.
    #[error("\"{0}\" is not a valid type")]
    InvalidType(String),

    /// An amount or balance is too large to add up without losing exactness.
    #[error("the amount is too large, the account balance would be out of range")]
    AmountOutOfRange,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the ledger lock
    #[error("could not acquire the ledger lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingAccount
            | Error::DeleteMissingAccount
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory => StatusCode::NOT_FOUND,
            Error::EmptyDescription
            | Error::EmptyName
            | Error::InvalidAccount(_)
            | Error::InvalidCategory(_)
            | Error::InvalidType(_)
            | Error::AmountOutOfRange => StatusCode::BAD_REQUEST,
            Error::SqlError(_) | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            // Details of server errors are for the server logs only.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn missing_rows_are_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(
            Error::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::DeleteMissingTransaction.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::InvalidAccount(3).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::AmountOutOfRange.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::DatabaseLockError.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
