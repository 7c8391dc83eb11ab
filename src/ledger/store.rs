//! Defines the ledger store trait.

use crate::{
    Error,
    account::{Account, NewAccount},
    category::{Category, NewCategory},
    database_id::{AccountId, CategoryId, TransactionId},
    reconcile::BalanceUpdate,
    transaction::{NewTransaction, Transaction},
};

/// Everything in a ledger store, used to fill the in-memory mirror.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    /// All accounts.
    pub accounts: Vec<Account>,
    /// All categories.
    pub categories: Vec<Category>,
    /// All transactions.
    pub transactions: Vec<Transaction>,
}

/// A change to one transaction record.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionChange {
    /// Insert a new transaction, the store assigns its ID.
    Insert(NewTransaction),
    /// Overwrite the stored transaction with the same ID.
    Update(Transaction),
    /// Remove the transaction.
    Delete(Transaction),
}

/// A transaction change together with the account balances it results in.
///
/// A [LedgerStore] must write all of it or none of it.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerWrite {
    /// The change to the transaction record.
    pub change: TransactionChange,
    /// The new cached balances of the affected accounts.
    pub balances: Vec<BalanceUpdate>,
}

/// Durable storage for accounts, categories and transactions.
///
/// Account and category methods are plain pass-through CRUD. Transactions are
/// only changed through [LedgerStore::commit], which writes the transaction
/// and the account balances it affects in one atomic step.
pub trait LedgerStore {
    /// Read everything in the store.
    fn load(&self) -> Result<LedgerSnapshot, Error>;

    /// Create a new account, the store assigns its ID.
    fn create_account(&mut self, account: &NewAccount) -> Result<Account, Error>;

    /// Overwrite the stored account with the same ID.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingAccount] if there is no such account.
    fn update_account(&mut self, account: &Account) -> Result<(), Error>;

    /// Delete an account. Transactions that reference it are left in place.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingAccount] if there is no such account.
    fn delete_account(&mut self, id: AccountId) -> Result<(), Error>;

    /// Create a new category, the store assigns its ID.
    fn create_category(&mut self, category: &NewCategory) -> Result<Category, Error>;

    /// Overwrite the stored category with the same ID.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingCategory] if there is no such category.
    fn update_category(&mut self, category: &Category) -> Result<(), Error>;

    /// Delete a category. Transactions that reference it are left in place.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingCategory] if there is no such category.
    fn delete_category(&mut self, id: CategoryId) -> Result<(), Error>;

    /// Read a single transaction.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no such transaction.
    fn get_transaction(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Atomically apply `write` and return the transaction as stored (for
    /// deletes, the transaction as it was before it was removed).
    ///
    /// # Errors
    /// Nothing is written if an error is returned. In particular:
    /// - [Error::UpdateMissingTransaction] or [Error::DeleteMissingTransaction]
    ///   if the transaction to change does not exist,
    /// - [Error::UpdateMissingAccount] if a balance is for a missing account.
    fn commit(&mut self, write: &LedgerWrite) -> Result<Transaction, Error>;
}
