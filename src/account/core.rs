//! Defines the account model and its database queries.

use std::{fmt, str::FromStr};

use rusqlite::{
    Connection, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::AccountId, money::Money};

/// A named store of money with a cached balance, e.g. a wallet, a bank
/// account or a credit card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The display name of the account.
    pub name: String,
    /// What kind of account this is.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// The cached balance.
    ///
    /// This is the opening balance plus the amounts of all the transactions
    /// that reference the account. It is kept up to date by the
    /// [TransactionCoordinator](crate::TransactionCoordinator).
    pub balance: Money,
}

/// The kinds of account a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Physical money.
    Cash,
    /// A bank account.
    Bank,
    /// A credit card or line of credit.
    Credit,
}

impl AccountType {
    /// The lowercase name used in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Cash => "cash",
            AccountType::Bank => "bank",
            AccountType::Credit => "credit",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(AccountType::Cash),
            "bank" => Ok(AccountType::Bank),
            "credit" => Ok(AccountType::Credit),
            _ => Err(Error::InvalidType(s.to_owned())),
        }
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// The data for creating an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    /// The display name of the account.
    pub name: String,
    /// What kind of account this is.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// The opening balance, zero if not given.
    #[serde(default)]
    pub balance: Money,
}

/// A partial update for an account. Fields that are `None` are left as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    /// The new display name.
    pub name: Option<String>,
    /// The new account type.
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    /// Overwrite the cached balance.
    pub balance: Option<Money>,
}

impl Account {
    /// Return a copy of the account with `patch` applied.
    pub fn with_patch(&self, patch: &AccountPatch) -> Account {
        Account {
            id: self.id,
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            account_type: patch.account_type.unwrap_or(self.account_type),
            balance: patch.balance.unwrap_or(self.balance),
        }
    }
}

/// The combined balance of all accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    /// The sum of the balances of all accounts.
    pub total_balance: Money,
    /// How many accounts there are.
    pub account_count: usize,
}

impl AccountSummary {
    /// Summarise `accounts`.
    ///
    /// # Errors
    /// Returns [Error::AmountOutOfRange] if the total cannot be represented.
    pub fn from_accounts<'a>(
        accounts: impl IntoIterator<Item = &'a Account>,
    ) -> Result<Self, Error> {
        let mut total_balance = Money::ZERO;
        let mut account_count = 0;

        for account in accounts {
            total_balance = total_balance
                .checked_add(account.balance)
                .ok_or(Error::AmountOutOfRange)?;
            account_count += 1;
        }

        Ok(Self {
            total_balance,
            account_count,
        })
    }
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            balance TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    map_row_to_account_with_offset(row, 0)
}

/// Map the columns starting at `offset` to an account.
///
/// Used for queries that join the account table onto another table.
pub fn map_row_to_account_with_offset(
    row: &Row,
    offset: usize,
) -> Result<Account, rusqlite::Error> {
    let id = row.get(offset)?;
    let name = row.get(offset + 1)?;
    let account_type = row.get(offset + 2)?;
    let balance = row.get(offset + 3)?;

    Ok(Account {
        id,
        name,
        account_type,
        balance,
    })
}

/// Insert a new account into the database.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn create_account(account: &NewAccount, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(
            "INSERT INTO account (name, type, balance) VALUES (?1, ?2, ?3)
             RETURNING id, name, type, balance",
        )?
        .query_row(
            params![account.name, account.account_type, account.balance],
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Retrieve an account by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no account with `id`, or
/// [Error::SqlError] if the SQL query fails.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .query_row(
            "SELECT id, name, type, balance FROM account WHERE id = ?1",
            params![id],
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Retrieve all accounts ordered by ID.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare("SELECT id, name, type, balance FROM account ORDER BY id")?
        .query_map([], map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

pub type RowsAffected = usize;

/// Overwrite the stored account that has the same ID as `account`.
pub fn update_account(account: &Account, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE account SET name = ?1, type = ?2, balance = ?3 WHERE id = ?4",
            params![account.name, account.account_type, account.balance, account.id],
        )
        .map_err(Error::from)
}

/// Set the cached balance of the account `id`.
pub fn set_account_balance(
    id: AccountId,
    balance: Money,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE account SET balance = ?1 WHERE id = ?2",
            params![balance, id],
        )
        .map_err(Error::from)
}

pub fn delete_account(id: AccountId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM account WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        account::{
            Account, AccountPatch, AccountType, NewAccount,
            core::{
                create_account, delete_account, get_account, get_all_accounts,
                set_account_balance, update_account,
            },
        },
        db::initialize,
        money::Money,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_account(name: &str, balance: Money) -> NewAccount {
        NewAccount {
            name: name.to_owned(),
            account_type: AccountType::Bank,
            balance,
        }
    }

    #[test]
    fn create_then_get_account() {
        let conn = get_test_connection();

        let created = create_account(&new_account("Everyday", Money::new(10050, 2)), &conn)
            .expect("could not create account");

        assert_eq!(created.id, 1);
        assert_eq!(get_account(created.id, &conn), Ok(created));
    }

    #[test]
    fn get_missing_account_is_not_found() {
        let conn = get_test_connection();

        assert_eq!(get_account(42, &conn), Err(Error::NotFound));
    }

    #[test]
    fn balances_may_be_negative() {
        let conn = get_test_connection();

        let created = create_account(&new_account("Visa", Money::new(-20000, 2)), &conn).unwrap();

        assert_eq!(
            get_account(created.id, &conn).unwrap().balance,
            Money::new(-200, 0)
        );
    }

    #[test]
    fn update_overwrites_all_fields() {
        let conn = get_test_connection();
        let account = create_account(&new_account("Everyday", Money::ZERO), &conn).unwrap();
        let want = account.with_patch(&AccountPatch {
            name: Some("Savings".to_owned()),
            account_type: Some(AccountType::Cash),
            balance: Some(Money::from(5)),
        });

        let rows_affected = update_account(&want, &conn).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(get_account(account.id, &conn), Ok(want));
    }

    #[test]
    fn set_balance_only_touches_balance() {
        let conn = get_test_connection();
        let account = create_account(&new_account("Everyday", Money::ZERO), &conn).unwrap();

        set_account_balance(account.id, Money::new(-75, 1), &conn).unwrap();

        assert_eq!(
            get_account(account.id, &conn),
            Ok(Account {
                balance: Money::new(-75, 1),
                ..account
            })
        );
    }

    #[test]
    fn delete_removes_account() {
        let conn = get_test_connection();
        let account = create_account(&new_account("Everyday", Money::ZERO), &conn).unwrap();

        assert_eq!(delete_account(account.id, &conn), Ok(1));
        assert_eq!(delete_account(account.id, &conn), Ok(0));
        assert_eq!(get_all_accounts(&conn), Ok(vec![]));
    }

    #[test]
    fn parses_account_types_case_insensitively() {
        assert_eq!("Credit".parse(), Ok(AccountType::Credit));
        assert_eq!(
            "loan".parse::<AccountType>(),
            Err(Error::InvalidType("loan".to_owned()))
        );
    }
}

#[cfg(test)]
mod summary_tests {
    use rust_decimal::Decimal;

    use crate::{
        Error,
        account::{Account, AccountSummary, AccountType},
        money::Money,
    };

    fn account(id: i64, balance: Money) -> Account {
        Account {
            id,
            name: format!("Account {id}"),
            account_type: AccountType::Bank,
            balance,
        }
    }

    #[test]
    fn returns_sum_of_all_accounts() {
        let accounts = [
            account(1, Money::new(10050, 2)),
            account(2, Money::new(25075, 2)),
            account(3, Money::new(-5025, 2)),
        ];

        let summary = AccountSummary::from_accounts(&accounts).unwrap();

        assert_eq!(summary.total_balance, Money::from(301));
        assert_eq!(summary.account_count, 3);
    }

    #[test]
    fn returns_zero_for_no_accounts() {
        let summary = AccountSummary::from_accounts(&Vec::<Account>::new()).unwrap();

        assert_eq!(summary.total_balance, Money::ZERO);
        assert_eq!(summary.account_count, 0);
    }

    #[test]
    fn total_out_of_range_is_an_error() {
        let accounts = [
            account(1, Money::from(Decimal::MAX)),
            account(2, Money::from(Decimal::MAX)),
        ];

        assert_eq!(
            AccountSummary::from_accounts(&accounts),
            Err(Error::AmountOutOfRange)
        );
    }
}
