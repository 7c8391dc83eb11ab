//! Defines the endpoint for creating a new account.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};

use crate::{
    Error, SharedLedger,
    account::NewAccount,
    endpoints::{self, format_endpoint},
};

/// A route handler for creating a new account.
///
/// Responds with the new account and `201 Created`.
pub async fn create_account_endpoint(
    State(ledger): State<SharedLedger>,
    Json(new_account): Json<NewAccount>,
) -> Result<Response, Error> {
    let account = ledger
        .lock()?
        .create_account(&new_account)
        .inspect_err(|error| {
            tracing::warn!("Could not create account with {new_account:?}: {error}")
        })?;

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format_endpoint(endpoints::ACCOUNT, account.id))],
        Json(account),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::{Json, extract::State, http::StatusCode, http::header::LOCATION};

    use crate::{
        Error, Money,
        account::{Account, AccountType, NewAccount, create_account_endpoint},
        test_utils::{must_create_test_ledger, parse_json_body},
    };

    #[tokio::test]
    async fn can_create_account() {
        let ledger = must_create_test_ledger();
        let new_account = NewAccount {
            name: "Wallet".to_owned(),
            account_type: AccountType::Cash,
            balance: Money::new(12345, 2),
        };

        let response = create_account_endpoint(State(ledger.clone()), Json(new_account))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/accounts/1");
        let got: Account = parse_json_body(response).await;
        let want = Account {
            id: 1,
            name: "Wallet".to_owned(),
            account_type: AccountType::Cash,
            balance: Money::new(12345, 2),
        };
        assert_eq!(got, want);
        assert_eq!(ledger.lock().unwrap().store().account(1), Ok(want));
    }

    #[tokio::test]
    async fn rejects_empty_name() {
        let ledger = must_create_test_ledger();
        let new_account = NewAccount {
            name: " ".to_owned(),
            account_type: AccountType::Bank,
            balance: Money::ZERO,
        };

        let result = create_account_endpoint(State(ledger), Json(new_account)).await;

        assert_eq!(result.err(), Some(Error::EmptyName));
    }
}
