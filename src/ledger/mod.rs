//! The ledger: where accounts, categories and transactions are stored, and
//! the coordinator that keeps account balances in step with transactions.

mod coordinator;
mod sqlite;
mod state;
mod store;

pub use coordinator::{
    AlwaysConfirm, Confirmation, DeleteOutcome, IntegrityWarning, IntentOutcome,
    TransactionCoordinator, TransactionIntent, UpdateOutcome,
};
pub use sqlite::SQLiteLedgerStore;
pub use state::LedgerState;
pub use store::{LedgerSnapshot, LedgerStore, LedgerWrite, TransactionChange};
