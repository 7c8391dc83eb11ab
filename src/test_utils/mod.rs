#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use axum::{body::Body, http::Response};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use time::macros::date;
use tracing::{Event, Level, Subscriber, subscriber::DefaultGuard};
use tracing_subscriber::{
    Layer,
    layer::{Context, SubscriberExt},
};

use crate::{
    Account, AccountType, AppState, Category, CategoryKind, Money, NewAccount, NewCategory,
    SharedLedger, Transaction,
};

#[track_caller]
pub(crate) fn must_create_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");

    AppState::new(connection).expect("could not create app state")
}

#[track_caller]
pub(crate) fn must_create_test_ledger() -> SharedLedger {
    must_create_test_state().ledger
}

#[track_caller]
pub(crate) fn must_create_account(ledger: &SharedLedger, name: &str, balance: i64) -> Account {
    ledger
        .lock()
        .unwrap()
        .create_account(&NewAccount {
            name: name.to_owned(),
            account_type: AccountType::Bank,
            balance: Money::from(balance),
        })
        .expect("could not create test account")
}

#[track_caller]
pub(crate) fn must_create_category(
    ledger: &SharedLedger,
    name: &str,
    kind: CategoryKind,
) -> Category {
    ledger
        .lock()
        .unwrap()
        .create_category(&NewCategory {
            name: name.to_owned(),
            color: "#64748b".to_owned(),
            kind,
        })
        .expect("could not create test category")
}

#[track_caller]
pub(crate) fn must_create_transaction(
    ledger: &SharedLedger,
    account: &Account,
    category: &Category,
    amount: i64,
) -> Transaction {
    ledger
        .lock()
        .unwrap()
        .create(Transaction::build(
            account.id,
            category.id,
            Money::from(amount),
            date!(2025 - 05 - 20),
            "Test transaction",
        ))
        .expect("could not create test transaction")
        .transaction
}

#[track_caller]
pub(crate) fn must_get_balance(ledger: &SharedLedger, account: &Account) -> Money {
    ledger
        .lock()
        .unwrap()
        .store()
        .account(account.id)
        .expect("could not get test account")
        .balance
}

pub(crate) async fn parse_json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("could not read response body");

    serde_json::from_slice(&body).expect("response body should be valid JSON")
}

/// Records the level of every event logged on this thread while installed.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogLevels(Arc<Mutex<Vec<Level>>>);

impl LogLevels {
    pub(crate) fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub(crate) fn levels(&self) -> Vec<Level> {
        self.0.lock().unwrap().clone()
    }
}

impl<S: Subscriber> Layer<S> for LogLevels {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.0.lock().unwrap().push(*event.metadata().level());
    }
}
