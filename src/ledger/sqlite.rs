//! Implements a SQLite backed ledger store.

use rusqlite::Connection;

use crate::{
    Error,
    account::{self, Account, AccountSummary, NewAccount},
    category::{self, Category, NewCategory},
    database_id::{AccountId, CategoryId, TransactionId},
    db::initialize,
    ledger::store::{LedgerSnapshot, LedgerStore, LedgerWrite, TransactionChange},
    transaction::{self, Transaction, TransactionDetails, TransactionQuery},
};

/// Stores accounts, categories and transactions in a SQLite database.
#[derive(Debug)]
pub struct SQLiteLedgerStore {
    connection: Connection,
}

impl SQLiteLedgerStore {
    /// Create a new store from the SQLite `connection`, creating the tables if
    /// they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if the tables cannot be created.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self { connection })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }

    /// All accounts ordered by ID.
    pub fn accounts(&self) -> Result<Vec<Account>, Error> {
        account::get_all_accounts(&self.connection)
    }

    /// The account with `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no such account.
    pub fn account(&self, id: AccountId) -> Result<Account, Error> {
        account::get_account(id, &self.connection)
    }

    /// The combined balance of all accounts.
    pub fn account_summary(&self) -> Result<AccountSummary, Error> {
        AccountSummary::from_accounts(&self.accounts()?)
    }

    /// All categories ordered by ID.
    pub fn categories(&self) -> Result<Vec<Category>, Error> {
        category::get_all_categories(&self.connection)
    }

    /// # Errors
    /// Returns [Error::NotFound] if there is no such category.
    pub fn category(&self, id: CategoryId) -> Result<Category, Error> {
        category::get_category(id, &self.connection)
    }

    /// Transactions matching `query` with their account and category, newest
    /// first.
    pub fn transaction_details(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetails>, Error> {
        transaction::query_transaction_details(query, &self.connection)
    }

    /// A single transaction with its account and category.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no such transaction.
    pub fn transaction_detail(&self, id: TransactionId) -> Result<TransactionDetails, Error> {
        transaction::get_transaction_details(id, &self.connection)
    }
}

impl LedgerStore for SQLiteLedgerStore {
    fn load(&self) -> Result<LedgerSnapshot, Error> {
        Ok(LedgerSnapshot {
            accounts: account::get_all_accounts(&self.connection)?,
            categories: category::get_all_categories(&self.connection)?,
            transactions: transaction::get_all_transactions(&self.connection)?,
        })
    }

    fn create_account(&mut self, new_account: &NewAccount) -> Result<Account, Error> {
        account::create_account(new_account, &self.connection)
    }

    fn update_account(&mut self, updated: &Account) -> Result<(), Error> {
        match account::update_account(updated, &self.connection)? {
            0 => Err(Error::UpdateMissingAccount),
            _ => Ok(()),
        }
    }

    fn delete_account(&mut self, id: AccountId) -> Result<(), Error> {
        match account::delete_account(id, &self.connection)? {
            0 => Err(Error::DeleteMissingAccount),
            _ => Ok(()),
        }
    }

    fn create_category(&mut self, new_category: &NewCategory) -> Result<Category, Error> {
        category::create_category(new_category, &self.connection)
    }

    fn update_category(&mut self, updated: &Category) -> Result<(), Error> {
        match category::update_category(updated, &self.connection)? {
            0 => Err(Error::UpdateMissingCategory),
            _ => Ok(()),
        }
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<(), Error> {
        match category::delete_category(id, &self.connection)? {
            0 => Err(Error::DeleteMissingCategory),
            _ => Ok(()),
        }
    }

    fn get_transaction(&self, id: TransactionId) -> Result<Transaction, Error> {
        transaction::get_transaction(id, &self.connection)
    }

    fn commit(&mut self, write: &LedgerWrite) -> Result<Transaction, Error> {
        // Dropping `sql_transaction` without committing rolls everything back.
        let sql_transaction = self.connection.transaction()?;

        let stored = match &write.change {
            TransactionChange::Insert(new_transaction) => {
                transaction::create_transaction(new_transaction, &sql_transaction)?
            }
            TransactionChange::Update(edited) => {
                match transaction::update_transaction(edited, &sql_transaction)? {
                    0 => return Err(Error::UpdateMissingTransaction),
                    _ => edited.clone(),
                }
            }
            TransactionChange::Delete(deleted) => {
                match transaction::delete_transaction(deleted.id, &sql_transaction)? {
                    0 => return Err(Error::DeleteMissingTransaction),
                    _ => deleted.clone(),
                }
            }
        };

        for update in &write.balances {
            let rows_affected =
                account::set_account_balance(update.account_id, update.balance, &sql_transaction)?;

            if rows_affected == 0 {
                return Err(Error::UpdateMissingAccount);
            }
        }

        sql_transaction.commit()?;

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        account::{AccountType, NewAccount},
        ledger::{
            sqlite::SQLiteLedgerStore,
            store::{LedgerStore, LedgerWrite, TransactionChange},
        },
        money::Money,
        reconcile::BalanceUpdate,
        transaction::{Transaction, TransactionQuery},
    };

    fn get_test_store() -> SQLiteLedgerStore {
        SQLiteLedgerStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn new_account(balance: i64) -> NewAccount {
        NewAccount {
            name: "Everyday".to_owned(),
            account_type: AccountType::Bank,
            balance: Money::from(balance),
        }
    }

    #[test]
    fn commit_writes_transaction_and_balance() {
        let mut store = get_test_store();
        let account = store.create_account(&new_account(100)).unwrap();

        let transaction = store
            .commit(&LedgerWrite {
                change: TransactionChange::Insert(Transaction::build(
                    account.id,
                    1,
                    Money::from(-30),
                    date!(2025 - 06 - 01),
                    "Groceries",
                )),
                balances: vec![BalanceUpdate {
                    account_id: account.id,
                    balance: Money::from(70),
                }],
            })
            .unwrap();

        assert_eq!(store.get_transaction(transaction.id), Ok(transaction));
        assert_eq!(store.account(account.id).unwrap().balance, Money::from(70));
    }

    #[test]
    fn commit_rolls_back_when_balance_account_is_missing() {
        let mut store = get_test_store();

        let result = store.commit(&LedgerWrite {
            change: TransactionChange::Insert(Transaction::build(
                1,
                1,
                Money::from(-30),
                date!(2025 - 06 - 01),
                "Groceries",
            )),
            balances: vec![BalanceUpdate {
                account_id: 1,
                balance: Money::from(70),
            }],
        });

        assert_eq!(result, Err(Error::UpdateMissingAccount));
        assert_eq!(
            store.transaction_details(&TransactionQuery::default()),
            Ok(vec![])
        );
    }

    #[test]
    fn commit_update_of_missing_transaction_fails() {
        let mut store = get_test_store();
        let missing =
            Transaction::build(1, 1, Money::from(1), date!(2025 - 06 - 01), "Gone").into_transaction(5);

        let result = store.commit(&LedgerWrite {
            change: TransactionChange::Update(missing.clone()),
            balances: vec![],
        });
        assert_eq!(result, Err(Error::UpdateMissingTransaction));

        let result = store.commit(&LedgerWrite {
            change: TransactionChange::Delete(missing),
            balances: vec![],
        });
        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn missing_accounts_and_categories_are_reported() {
        let mut store = get_test_store();

        assert_eq!(store.delete_account(3), Err(Error::DeleteMissingAccount));
        assert_eq!(store.delete_category(3), Err(Error::DeleteMissingCategory));
    }

    #[test]
    fn load_reads_everything() {
        let mut store = get_test_store();
        let account = store.create_account(&new_account(5)).unwrap();

        let snapshot = store.load().unwrap();

        assert_eq!(snapshot.accounts, vec![account]);
        assert!(snapshot.categories.is_empty());
        assert!(snapshot.transactions.is_empty());
    }

    #[test]
    fn committed_writes_survive_reopening_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ledger.db");

        let mut store = SQLiteLedgerStore::new(Connection::open(&db_path).unwrap()).unwrap();
        let account = store.create_account(&new_account(100)).unwrap();
        let transaction = store
            .commit(&LedgerWrite {
                change: TransactionChange::Insert(Transaction::build(
                    account.id,
                    1,
                    Money::new(-1250, 2),
                    date!(2025 - 06 - 01),
                    "Haircut",
                )),
                balances: vec![BalanceUpdate {
                    account_id: account.id,
                    balance: Money::new(8750, 2),
                }],
            })
            .unwrap();
        drop(store);

        let store = SQLiteLedgerStore::new(Connection::open(&db_path).unwrap()).unwrap();
        let snapshot = store.load().unwrap();

        assert_eq!(snapshot.transactions, vec![transaction]);
        assert_eq!(snapshot.accounts[0].balance, Money::new(8750, 2));
    }
}
