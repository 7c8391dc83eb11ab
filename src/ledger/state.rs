//! The in-memory mirror of the ledger.

use std::collections::BTreeMap;

use crate::{
    account::Account,
    category::Category,
    database_id::{AccountId, CategoryId, TransactionId},
    ledger::store::LedgerSnapshot,
    money::Money,
    reconcile::{BalanceLookup, BalanceUpdate},
    transaction::Transaction,
};

/// A change to the mirror, applied after the store has accepted it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StateChange {
    PutAccount(Account),
    RemoveAccount(AccountId),
    PutCategory(Category),
    RemoveCategory(CategoryId),
    PutTransaction(Transaction),
    RemoveTransaction(TransactionId),
    SetBalance(BalanceUpdate),
}

/// An owned, versioned copy of the accounts, categories and transactions in
/// a ledger store.
///
/// The state can only be changed by the
/// [TransactionCoordinator](crate::TransactionCoordinator) that owns it, and
/// only after the store has accepted the change. The version goes up by one
/// for every change that succeeds, so a reader can tell whether what it saw
/// earlier is stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    version: u64,
    accounts: BTreeMap<AccountId, Account>,
    categories: BTreeMap<CategoryId, Category>,
    transactions: BTreeMap<TransactionId, Transaction>,
}

impl LedgerState {
    pub(crate) fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            version: 0,
            accounts: snapshot
                .accounts
                .into_iter()
                .map(|account| (account.id, account))
                .collect(),
            categories: snapshot
                .categories
                .into_iter()
                .map(|category| (category.id, category))
                .collect(),
            transactions: snapshot
                .transactions
                .into_iter()
                .map(|transaction| (transaction.id, transaction))
                .collect(),
        }
    }

    /// How many changes have been applied since the state was loaded.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// All accounts ordered by ID.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// The account with `id`, if it exists.
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// All categories ordered by ID.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// The category with `id`, if it exists.
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// All transactions ordered by ID.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    /// The transaction with `id`, if it exists.
    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(&id)
    }

    /// Apply `changes` as one mutation.
    pub(crate) fn apply(&mut self, changes: impl IntoIterator<Item = StateChange>) {
        for change in changes {
            match change {
                StateChange::PutAccount(account) => {
                    self.accounts.insert(account.id, account);
                }
                StateChange::RemoveAccount(id) => {
                    self.accounts.remove(&id);
                }
                StateChange::PutCategory(category) => {
                    self.categories.insert(category.id, category);
                }
                StateChange::RemoveCategory(id) => {
                    self.categories.remove(&id);
                }
                StateChange::PutTransaction(transaction) => {
                    self.transactions.insert(transaction.id, transaction);
                }
                StateChange::RemoveTransaction(id) => {
                    self.transactions.remove(&id);
                }
                StateChange::SetBalance(update) => {
                    if let Some(account) = self.accounts.get_mut(&update.account_id) {
                        account.balance = update.balance;
                    }
                }
            }
        }

        self.version += 1;
    }
}

impl BalanceLookup for LedgerState {
    fn balance(&self, account_id: AccountId) -> Option<Money> {
        self.account(account_id).map(|account| account.balance)
    }
}
