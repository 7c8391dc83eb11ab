//! Database setup.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, category::create_category_table,
    transaction::create_transaction_table,
};

/// Create the account, category and transaction tables if they do not exist.
///
/// Transactions only reference accounts and categories by ID, there are no
/// foreign key constraints.
///
/// # Errors
/// Returns an error if any of the tables cannot be created, in which case
/// none of them are.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_account_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
