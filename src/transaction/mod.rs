//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for creating transactions
//! - Database functions for storing and querying transactions
//! - The JSON endpoints, which make all changes through the
//!   [TransactionCoordinator](crate::TransactionCoordinator)

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;

pub use core::{
    NewTransaction, Transaction, TransactionDetails, TransactionKind, TransactionPatch,
    TransactionQuery, create_transaction, create_transaction_table, delete_transaction,
    get_all_transactions, get_transaction, get_transaction_details, query_transaction_details,
    update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::{delete_transaction_by_body_endpoint, delete_transaction_endpoint};
pub use edit_endpoint::{edit_transaction_by_body_endpoint, edit_transaction_endpoint};
pub use get_endpoint::{get_transaction_endpoint, get_transactions_endpoint};
