//! Defines the endpoint for deleting an account.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{Error, SharedLedger, database_id::AccountId};

/// The response body for a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
    /// Always `true`.
    pub success: bool,
}

/// A route handler for deleting an account.
///
/// Transactions that reference the account are not deleted.
pub async fn delete_account_endpoint(
    State(ledger): State<SharedLedger>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<DeleteAccountResponse>, Error> {
    ledger
        .lock()?
        .delete_account(account_id)
        .inspect_err(|error| tracing::warn!("Could not delete account {account_id}: {error}"))?;

    Ok(Json(DeleteAccountResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};

    use crate::{
        CategoryKind, Error,
        account::delete_account_endpoint,
        test_utils::{
            must_create_account, must_create_category, must_create_test_ledger,
            must_create_transaction,
        },
    };

    #[tokio::test]
    async fn test_deletes_account() {
        let ledger = must_create_test_ledger();
        let account = must_create_account(&ledger, "foo", 420);

        let response = delete_account_endpoint(State(ledger.clone()), Path(account.id))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(
            ledger.lock().unwrap().store().account(account.id),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn keeps_transactions_of_deleted_account() {
        let ledger = must_create_test_ledger();
        let account = must_create_account(&ledger, "foo", 0);
        let category = must_create_category(&ledger, "bar", CategoryKind::Expense);
        let transaction = must_create_transaction(&ledger, &account, &category, -5);

        delete_account_endpoint(State(ledger.clone()), Path(account.id))
            .await
            .unwrap();

        let detail = ledger
            .lock()
            .unwrap()
            .store()
            .transaction_detail(transaction.id)
            .unwrap();
        assert_eq!(detail.transaction, transaction);
        assert_eq!(detail.account, None);
    }

    #[tokio::test]
    async fn delete_missing_account_fails() {
        let ledger = must_create_test_ledger();

        let result = delete_account_endpoint(State(ledger), Path(7)).await;

        assert_eq!(result.err(), Some(Error::DeleteMissingAccount));
    }
}
