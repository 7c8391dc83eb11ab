//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, edit_account_endpoint,
        get_account_endpoint, get_account_summary_endpoint, get_accounts_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, edit_category_endpoint,
        get_categories_endpoint,
    },
    endpoints,
    logging::logging_middleware,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_by_body_endpoint,
        delete_transaction_endpoint, edit_transaction_by_body_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::ACCOUNTS,
            get(get_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNTS_SUMMARY,
            get(get_account_summary_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            get(get_account_endpoint)
                .put(edit_account_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            put(edit_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint)
                .post(create_transaction_endpoint)
                .put(edit_transaction_by_body_endpoint)
                .delete(delete_transaction_by_body_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        Account, AccountSummary, Category, Money, Transaction, TransactionDetails,
        endpoints::{self, format_endpoint},
        routing::build_router,
        test_utils::must_create_test_state,
    };

    fn get_test_server() -> TestServer {
        TestServer::new(build_router(must_create_test_state()))
            .expect("Could not create test server.")
    }

    async fn must_post_account(server: &TestServer, balance: i64) -> Account {
        let response = server
            .post(endpoints::ACCOUNTS)
            .json(&json!({"name": "Everyday", "type": "bank", "balance": balance}))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json::<Account>()
    }

    async fn must_post_category(server: &TestServer) -> Category {
        let response = server
            .post(endpoints::CATEGORIES)
            .json(&json!({"name": "Groceries", "color": "#ef4444", "type": "EXPENSE"}))
            .await;
        response.assert_status_ok();

        response.json::<Category>()
    }

    async fn get_balance(server: &TestServer, account: &Account) -> Money {
        server
            .get(&format_endpoint(endpoints::ACCOUNT, account.id))
            .await
            .json::<Account>()
            .balance
    }

    #[tokio::test]
    async fn reconciles_balance_through_create_update_delete() {
        let server = get_test_server();
        let account = must_post_account(&server, 100).await;
        let category = must_post_category(&server).await;

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "accountId": account.id,
                "categoryId": category.id,
                "amount": -30,
                "description": "Groceries",
                "date": "2025-01-15",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<Transaction>();
        assert_eq!(get_balance(&server, &account).await, Money::from(70));

        server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .json(&json!({"amount": "-50"}))
            .await
            .assert_status_ok();
        assert_eq!(get_balance(&server, &account).await, Money::from(50));

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({"message": "Transaction deleted"}));
        assert_eq!(get_balance(&server, &account).await, Money::from(100));
    }

    #[tokio::test]
    async fn body_routes_edit_and_delete_transactions() {
        let server = get_test_server();
        let account = must_post_account(&server, 0).await;
        let category = must_post_category(&server).await;
        let transaction = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "accountId": account.id,
                "categoryId": category.id,
                "amount": 20,
                "type": "expense",
                "description": "Lunch",
                "date": "2025-01-15",
            }))
            .await
            .json::<Transaction>();
        assert_eq!(transaction.amount, Money::from(-20));

        let response = server
            .put(endpoints::TRANSACTIONS)
            .json(&json!({"id": transaction.id, "description": "Dinner"}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Transaction>().description, "Dinner");

        server
            .delete(endpoints::TRANSACTIONS)
            .json(&json!({"id": transaction.id}))
            .await
            .assert_status_ok();
        assert_eq!(get_balance(&server, &account).await, Money::ZERO);
    }

    #[tokio::test]
    async fn lists_transactions_newest_first_with_type() {
        let server = get_test_server();
        let account = must_post_account(&server, 0).await;
        let category = must_post_category(&server).await;
        for (amount, date) in [(-1, "2025-01-01"), (2, "2025-03-01"), (-3, "2025-02-01")] {
            server
                .post(endpoints::TRANSACTIONS)
                .json(&json!({
                    "accountId": account.id,
                    "categoryId": category.id,
                    "amount": amount,
                    "description": "Something",
                    "date": date,
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server.get(endpoints::TRANSACTIONS).await;

        response.assert_status_ok();
        let listed = response.json::<Vec<Value>>();
        let dates: Vec<_> = listed.iter().map(|item| item["date"].clone()).collect();
        assert_eq!(dates, vec!["2025-03-01", "2025-02-01", "2025-01-01"]);
        assert_eq!(listed[0]["type"], "income");
        assert_eq!(listed[1]["type"], "expense");
        assert_eq!(listed[0]["account"]["name"], "Everyday");
        let details = response.json::<Vec<TransactionDetails>>();
        assert_eq!(details[2].transaction.amount, Money::from(-1));
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let server = get_test_server();

        let response = server.get("/transactions/999").await;

        response.assert_status_not_found();
        let body = response.json::<Value>();
        assert!(body["error"].is_string(), "got body {body}");
    }

    #[tokio::test]
    async fn delete_account_reports_success() {
        let server = get_test_server();
        let account = must_post_account(&server, 5).await;

        let response = server
            .delete(&format_endpoint(endpoints::ACCOUNT, account.id))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"success": true}));
        server
            .get(&format_endpoint(endpoints::ACCOUNT, account.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn summary_totals_accounts() {
        let server = get_test_server();
        must_post_account(&server, 100).await;
        must_post_account(&server, -25).await;

        let response = server.get(endpoints::ACCOUNTS_SUMMARY).await;

        response.assert_status_ok();
        let summary = response.json::<AccountSummary>();
        assert_eq!(summary.total_balance, Money::from(75));
        assert_eq!(summary.account_count, 2);
    }

    #[tokio::test]
    async fn invalid_transaction_is_bad_request() {
        let server = get_test_server();
        let category = must_post_category(&server).await;

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "accountId": 77,
                "categoryId": category.id,
                "amount": 1,
                "description": "Nowhere",
                "date": "2025-01-15",
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn out_of_range_amount_is_rejected_and_server_keeps_working() {
        let server = get_test_server();
        let category = must_post_category(&server).await;
        let response = server
            .post(endpoints::ACCOUNTS)
            .json(&json!({
                "name": "Everyday",
                "type": "bank",
                "balance": "79228162514264337593543950335",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let account = response.json::<Account>();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "accountId": account.id,
                "categoryId": category.id,
                "amount": "1",
                "description": "One too many",
                "date": "2025-01-15",
            }))
            .await;

        response.assert_status_bad_request();
        assert!(response.json::<Value>()["error"].is_string());
        server.get(endpoints::ACCOUNTS).await.assert_status_ok();
        assert_eq!(get_balance(&server, &account).await, account.balance);
        server
            .get(endpoints::TRANSACTIONS)
            .await
            .assert_json(&json!([]));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/budgets").await;

        response.assert_status_not_found();
        assert!(response.json::<Value>()["error"].is_string());
    }
}
