//! Defines the core data models and database queries for transactions.

use std::{fmt, str::FromStr};

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeStruct};
use time::Date;

use crate::{
    Error,
    account::{Account, map_row_to_account_with_offset},
    category::{Category, map_category_row_with_offset},
    database_id::{AccountId, CategoryId, TransactionId},
    money::Money,
    reconcile::Posting,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
///
/// The transaction type (income or expense) is not stored, it is derived
/// from the sign of `amount` by [Transaction::kind]. It is included as
/// `"type"` when the transaction is serialized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// The amount of money spent (negative) or earned (positive).
    pub amount: Money,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// Free-form notes.
    pub notes: Option<String>,
    /// A URL to an image of the receipt.
    pub receipt: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(
        account_id: AccountId,
        category_id: CategoryId,
        amount: Money,
        date: Date,
        description: &str,
    ) -> NewTransaction {
        NewTransaction {
            account_id,
            category_id,
            amount,
            description: description.to_owned(),
            date,
            notes: None,
            receipt: None,
            kind: None,
        }
    }

    /// Whether the transaction is income or an expense.
    pub fn kind(&self) -> TransactionKind {
        TransactionKind::of(self.amount)
    }

    /// The account and amount this transaction adds to a balance.
    pub fn posting(&self) -> Posting {
        Posting {
            account_id: self.account_id,
            amount: self.amount,
        }
    }

    /// Open the transaction for editing.
    ///
    /// The returned patch holds every field of the transaction, change the
    /// fields that should be edited and submit it as an update. Dropping the
    /// patch abandons the edit.
    pub fn edit(&self) -> TransactionPatch {
        TransactionPatch {
            account_id: Some(self.account_id),
            category_id: Some(self.category_id),
            amount: Some(self.amount),
            description: Some(self.description.clone()),
            date: Some(self.date),
            notes: Some(self.notes.clone()),
            receipt: Some(self.receipt.clone()),
            kind: None,
        }
    }

    /// Return a copy of the transaction with `patch` applied.
    ///
    /// If the patch sets a type, the amount is signed to match it.
    pub fn with_patch(&self, patch: &TransactionPatch) -> Transaction {
        let amount = patch.amount.unwrap_or(self.amount);
        let amount = match patch.kind {
            Some(kind) => kind.signed(amount),
            None => amount,
        };

        Transaction {
            id: self.id,
            account_id: patch.account_id.unwrap_or(self.account_id),
            category_id: patch.category_id.unwrap_or(self.category_id),
            amount,
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            date: patch.date.unwrap_or(self.date),
            notes: patched_text(&patch.notes, &self.notes),
            receipt: patched_text(&patch.receipt, &self.receipt),
        }
    }
}

impl Serialize for Transaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Transaction", 9)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("accountId", &self.account_id)?;
        state.serialize_field("categoryId", &self.category_id)?;
        state.serialize_field("amount", &self.amount)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("notes", &self.notes)?;
        state.serialize_field("receipt", &self.receipt)?;
        state.serialize_field("type", &self.kind())?;
        state.end()
    }
}

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money was earned, the amount is zero or positive.
    #[serde(alias = "INCOME")]
    Income,
    /// Money was spent, the amount is negative.
    #[serde(alias = "EXPENSE")]
    Expense,
}

impl TransactionKind {
    /// The kind of a transaction with `amount`.
    pub fn of(amount: Money) -> Self {
        if amount.is_negative() {
            TransactionKind::Expense
        } else {
            TransactionKind::Income
        }
    }

    /// Give `amount` the sign of this kind.
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            TransactionKind::Income => amount.abs(),
            TransactionKind::Expense => -amount.abs(),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => f.write_str("income"),
            TransactionKind::Expense => f.write_str("expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(Error::InvalidType(s.to_owned())),
        }
    }
}

/// A transaction that has not been saved yet.
///
/// Create one with [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// The amount of money.
    ///
    /// Positive values represent income, negative values represent expenses.
    /// If `kind` is set, only the magnitude is used and the sign comes from
    /// `kind`.
    pub amount: Money,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// A URL to an image of the receipt.
    #[serde(default)]
    pub receipt: Option<String>,
    /// Whether the amount should be recorded as income or an expense.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
}

impl NewTransaction {
    /// Set the notes for the transaction.
    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_owned());
        self
    }

    /// Set the receipt URL for the transaction.
    pub fn receipt(mut self, receipt: &str) -> Self {
        self.receipt = Some(receipt.to_owned());
        self
    }

    /// Record the amount as income or an expense regardless of its sign.
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Resolve the amount's sign from `kind` and drop empty optional text.
    pub fn normalized(self) -> Self {
        let amount = match self.kind {
            Some(kind) => kind.signed(self.amount),
            None => self.amount,
        };

        Self {
            amount,
            kind: None,
            notes: non_empty(self.notes),
            receipt: non_empty(self.receipt),
            ..self
        }
    }

    /// Give the transaction an ID, e.g. the one assigned by the store.
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        let new = self.normalized();

        Transaction {
            id,
            account_id: new.account_id,
            category_id: new.category_id,
            amount: new.amount,
            description: new.description,
            date: new.date,
            notes: new.notes,
            receipt: new.receipt,
        }
    }

    /// The account and signed amount this transaction will add to a balance.
    pub fn posting(&self) -> Posting {
        let amount = match self.kind {
            Some(kind) => kind.signed(self.amount),
            None => self.amount,
        };

        Posting {
            account_id: self.account_id,
            amount,
        }
    }
}

/// A partial update for a transaction. Fields that are `None` are left as is.
///
/// In JSON, a missing `notes` or `receipt` leaves the field as is, while
/// `null` or `""` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    /// Move the transaction to another account.
    pub account_id: Option<AccountId>,
    /// Move the transaction to another category.
    pub category_id: Option<CategoryId>,
    /// The new amount.
    pub amount: Option<Money>,
    /// The new description.
    pub description: Option<String>,
    /// The new date.
    pub date: Option<Date>,
    /// The new notes. `Some(None)` or an empty string clears them.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
    /// The new receipt URL. `Some(None)` or an empty string clears it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub receipt: Option<Option<String>>,
    /// Sign the amount as income or an expense.
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
}

/// A transaction together with the account and category it references.
///
/// The account or category is `None` if it has been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The account the transaction belongs to.
    pub account: Option<Account>,
    /// The category the transaction belongs to.
    pub category: Option<Category>,
}

/// Filters for listing transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    /// Only include transactions in this account.
    pub account_id: Option<AccountId>,
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.trim().is_empty())
}

fn patched_text(patch: &Option<Option<String>>, current: &Option<String>) -> Option<String> {
    match patch {
        Some(text) => non_empty(text.clone()),
        None => current.clone(),
    }
}

/// Deserialize a field that is present, including an explicit `null`, as
/// `Some`. Together with `#[serde(default)]` a missing field stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, account_id, category_id, amount, description, date, notes, receipt";

/// Insert a new transaction into the database.
///
/// The amount is signed according to the transaction's `kind` if it has one.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = transaction.clone().normalized();

    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
             (account_id, category_id, amount, description, date, notes, receipt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                transaction.account_id,
                transaction.category_id,
                transaction.amount,
                transaction.description,
                transaction.date,
                transaction.notes,
                transaction.receipt,
            ],
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve every transaction ordered by ID.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" ORDER BY id"
        ))?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

type RowsAffected = usize;

/// Overwrite the stored transaction that has the same ID as `transaction`.
pub fn update_transaction(
    transaction: &Transaction,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE \"transaction\"
        SET \
            account_id = ?1, \
            category_id = ?2, \
            amount = ?3, \
            description = ?4, \
            date = ?5, \
            notes = ?6, \
            receipt = ?7 \
        WHERE id = ?8;",
            params![
                transaction.account_id,
                transaction.category_id,
                transaction.amount,
                transaction.description,
                transaction.date,
                transaction.notes,
                transaction.receipt,
                transaction.id,
            ],
        )
        .map_err(Error::from)
}

pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id",
            &[(":id", &id)],
        )
        .map_err(Error::from)
}

const DETAILS_QUERY: &str = "SELECT \
        t.id, t.account_id, t.category_id, t.amount, t.description, t.date, t.notes, t.receipt, \
        a.id, a.name, a.type, a.balance, \
        c.id, c.name, c.color, c.type \
    FROM \"transaction\" t \
    LEFT JOIN account a ON a.id = t.account_id \
    LEFT JOIN category c ON c.id = t.category_id";

/// Get transactions joined with their accounts and categories, newest first.
///
/// Transactions on the same date are ordered by descending ID.
pub fn query_transaction_details(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<TransactionDetails>, Error> {
    connection
        .prepare(&format!(
            "{DETAILS_QUERY} \
            WHERE (?1 IS NULL OR t.account_id = ?1) AND (?2 IS NULL OR t.category_id = ?2) \
            ORDER BY t.date DESC, t.id DESC"
        ))?
        .query_map(
            params![query.account_id, query.category_id],
            map_transaction_details_row,
        )?
        .map(|maybe_details| maybe_details.map_err(Error::from))
        .collect()
}

/// Get a single transaction joined with its account and category.
///
/// # Errors
/// Returns [Error::NotFound] if there is no transaction with `id`.
pub fn get_transaction_details(
    id: TransactionId,
    connection: &Connection,
) -> Result<TransactionDetails, Error> {
    connection
        .prepare(&format!("{DETAILS_QUERY} WHERE t.id = ?1"))?
        .query_one(params![id], map_transaction_details_row)
        .map_err(Error::from)
}

/// Create the transaction table in the database.
///
/// Account and category IDs are not foreign keys: deleting an account or a
/// category leaves its transactions in place.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                notes TEXT,
                receipt TEXT
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_account ON \"transaction\"(account_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let account_id = row.get(1)?;
    let category_id = row.get(2)?;
    let amount = row.get(3)?;
    let description = row.get(4)?;
    let date = row.get(5)?;
    let notes = row.get(6)?;
    let receipt = row.get(7)?;

    Ok(Transaction {
        id,
        account_id,
        category_id,
        amount,
        description,
        date,
        notes,
        receipt,
    })
}

fn map_transaction_details_row(row: &Row) -> Result<TransactionDetails, rusqlite::Error> {
    let transaction = map_transaction_row(row)?;

    // The joined columns are NULL when the account or category was deleted.
    let account = match row.get::<_, Option<AccountId>>(8)? {
        Some(_) => Some(map_row_to_account_with_offset(row, 8)?),
        None => None,
    };
    let category = match row.get::<_, Option<CategoryId>>(12)? {
        Some(_) => Some(map_category_row_with_offset(row, 12)?),
        None => None,
    };

    Ok(TransactionDetails {
        transaction,
        account,
        category,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use time::macros::date;

    use crate::{
        money::Money,
        transaction::{Transaction, TransactionKind, TransactionPatch},
    };

    fn coffee() -> Transaction {
        Transaction::build(1, 2, Money::new(-450, 2), date!(2025 - 01 - 15), "Coffee")
            .notes("flat white")
            .normalized()
            .into_transaction(7)
    }

    #[test]
    fn kind_is_derived_from_sign() {
        assert_eq!(coffee().kind(), TransactionKind::Expense);
        assert_eq!(TransactionKind::of(Money::ZERO), TransactionKind::Income);
        assert_eq!(TransactionKind::of(Money::from(3)), TransactionKind::Income);
    }

    #[test]
    fn kind_signs_unsigned_amounts() {
        let new = Transaction::build(1, 2, Money::from(30), date!(2025 - 01 - 15), "Groceries")
            .kind(TransactionKind::Expense)
            .normalized();

        assert_eq!(new.amount, Money::from(-30));
        assert_eq!(new.kind, None);
    }

    #[test]
    fn serializes_derived_type() {
        let json = serde_json::to_value(coffee()).unwrap();

        assert_eq!(json["type"], "expense");
        assert_eq!(json["accountId"], 1);
        assert_eq!(json["amount"], "-4.50");
        assert_eq!(json["date"], "2025-01-15");
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let transaction = coffee();

        let patched = transaction.with_patch(&TransactionPatch {
            amount: Some(Money::from(-5)),
            ..Default::default()
        });

        assert_eq!(
            patched,
            Transaction {
                amount: Money::from(-5),
                ..transaction
            }
        );
    }

    #[test]
    fn patch_type_resigns_amount() {
        let patched = coffee().with_patch(&TransactionPatch {
            kind: Some(TransactionKind::Income),
            ..Default::default()
        });

        assert_eq!(patched.amount, Money::new(450, 2));
    }

    #[test]
    fn patch_with_empty_notes_clears_them() {
        let patched = coffee().with_patch(&TransactionPatch {
            notes: Some(Some(String::new())),
            ..Default::default()
        });

        assert_eq!(patched.notes, None);
    }

    #[test]
    fn json_null_clears_notes_and_missing_keeps_them() {
        let cleared: TransactionPatch =
            serde_json::from_str(r#"{"notes": null, "receipt": null}"#).unwrap();
        let untouched: TransactionPatch = serde_json::from_str(r#"{"amount": "-5"}"#).unwrap();

        assert_eq!(cleared.notes, Some(None));
        assert_eq!(coffee().with_patch(&cleared).notes, None);
        assert_eq!(untouched.notes, None);
        assert_eq!(
            coffee().with_patch(&untouched).notes,
            Some("flat white".to_owned())
        );
    }

    #[test]
    fn unchanged_edit_is_identity() {
        let transaction = coffee();

        assert_eq!(transaction.with_patch(&transaction.edit()), transaction);
    }
}
