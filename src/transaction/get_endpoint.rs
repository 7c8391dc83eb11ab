//! Defines the endpoints for reading transactions.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    Error, SharedLedger,
    database_id::TransactionId,
    transaction::{TransactionDetails, TransactionQuery},
};

/// A route handler for listing transactions with their account and category,
/// newest first.
///
/// The list can be filtered with the `accountId` and `categoryId` query
/// parameters.
pub async fn get_transactions_endpoint(
    State(ledger): State<SharedLedger>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<TransactionDetails>>, Error> {
    ledger.lock()?.store().transaction_details(&query).map(Json)
}

/// A route handler for getting a single transaction with its account and
/// category.
pub async fn get_transaction_endpoint(
    State(ledger): State<SharedLedger>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<TransactionDetails>, Error> {
    ledger
        .lock()?
        .store()
        .transaction_detail(transaction_id)
        .map(Json)
}

#[cfg(test)]
mod tests {
    use axum::{
        Json,
        extract::{Path, Query, State},
    };

    use crate::{
        CategoryKind, Error, Money,
        test_utils::{
            must_create_account, must_create_category, must_create_test_ledger,
            must_create_transaction,
        },
        transaction::{TransactionQuery, get_transaction_endpoint, get_transactions_endpoint},
    };

    #[tokio::test]
    async fn lists_transactions_for_account() {
        let ledger = must_create_test_ledger();
        let everyday = must_create_account(&ledger, "Everyday", 0);
        let savings = must_create_account(&ledger, "Savings", 0);
        let category = must_create_category(&ledger, "Misc", CategoryKind::Expense);
        let wanted = must_create_transaction(&ledger, &everyday, &category, -1);
        must_create_transaction(&ledger, &savings, &category, -2);

        let everyday = ledger
            .lock()
            .unwrap()
            .state()
            .account(everyday.id)
            .cloned()
            .unwrap();

        let Json(details) = get_transactions_endpoint(
            State(ledger),
            Query(TransactionQuery {
                account_id: Some(everyday.id),
                category_id: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].transaction, wanted);
        assert_eq!(details[0].account, Some(everyday));
        assert_eq!(details[0].account.as_ref().unwrap().balance, Money::from(-1));
        assert_eq!(details[0].category, Some(category));
    }

    #[tokio::test]
    async fn get_missing_transaction_is_not_found() {
        let ledger = must_create_test_ledger();

        let result = get_transaction_endpoint(State(ledger), Path(999)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
