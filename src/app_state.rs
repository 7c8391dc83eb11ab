//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    ledger::{SQLiteLedgerStore, TransactionCoordinator},
};

/// The transaction coordinator the server uses.
pub type Ledger = TransactionCoordinator<SQLiteLedgerStore>;

/// The ledger shared between request handlers.
///
/// Handlers hold the lock for the whole of one mutation, so mutations never
/// interleave.
#[derive(Debug, Clone)]
pub struct SharedLedger(Arc<Mutex<Ledger>>);

impl SharedLedger {
    /// Share `ledger` between request handlers.
    pub fn new(ledger: Ledger) -> Self {
        Self(Arc::new(Mutex::new(ledger)))
    }

    /// Get exclusive access to the ledger.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if another handler panicked while
    /// holding the lock.
    pub fn lock(&self) -> Result<MutexGuard<'_, Ledger>, Error> {
        self.0.lock().map_err(|error| {
            tracing::error!("Could not acquire ledger lock: {error}");
            Error::DatabaseLockError
        })
    }
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The accounts, categories and transactions.
    pub ledger: SharedLedger,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models
    /// and load the ledger into memory.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or read.
    pub fn new(db_connection: Connection) -> Result<Self, Error> {
        let store = SQLiteLedgerStore::new(db_connection)?;
        let ledger = TransactionCoordinator::new(store)?;

        Ok(Self {
            ledger: SharedLedger::new(ledger),
        })
    }
}

impl FromRef<AppState> for SharedLedger {
    fn from_ref(state: &AppState) -> Self {
        state.ledger.clone()
    }
}
