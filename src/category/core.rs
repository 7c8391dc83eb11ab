//! Core category types and database queries.

use std::{fmt, str::FromStr};

use rusqlite::{
    Connection, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId, money::Money};

/// A label for transactions (e.g., 'Groceries', 'Salary') with a direction:
/// money either comes in (income) or goes out (expense).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The id for the category.
    pub id: CategoryId,
    /// The display name.
    pub name: String,
    /// The display colour, e.g. "#22c55e".
    pub color: String,
    /// Whether the category is for income or expenses.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

/// The direction of money for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Money coming in.
    #[serde(alias = "INCOME")]
    Income,
    /// Money going out.
    #[serde(alias = "EXPENSE")]
    Expense,
}

impl CategoryKind {
    /// The lowercase name used in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }

    /// Whether a transaction of `amount` has the direction of this kind.
    ///
    /// Zero counts as income.
    pub fn matches(&self, amount: Money) -> bool {
        match self {
            CategoryKind::Income => !amount.is_negative(),
            CategoryKind::Expense => amount.is_negative(),
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            _ => Err(Error::InvalidType(s.to_owned())),
        }
    }
}

impl ToSql for CategoryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// The data for creating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    /// The display name.
    pub name: String,
    /// The display colour.
    pub color: String,
    /// Whether the category is for income or expenses.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

/// A partial update for a category. Fields that are `None` are left as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    /// The new display name.
    pub name: Option<String>,
    /// The new display colour.
    pub color: Option<String>,
    /// The new direction.
    #[serde(rename = "type")]
    pub kind: Option<CategoryKind>,
}

impl Category {
    /// Return a copy of the category with `patch` applied.
    pub fn with_patch(&self, patch: &CategoryPatch) -> Category {
        Category {
            id: self.id,
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            color: patch.color.clone().unwrap_or_else(|| self.color.clone()),
            kind: patch.kind.unwrap_or(self.kind),
        }
    }
}

pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            type TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    map_category_row_with_offset(row, 0)
}

/// Map the columns starting at `offset` to a category.
pub fn map_category_row_with_offset(
    row: &Row,
    offset: usize,
) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        color: row.get(offset + 2)?,
        kind: row.get(offset + 3)?,
    })
}

/// Insert a new category into the database.
pub fn create_category(category: &NewCategory, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(
            "INSERT INTO category (name, color, type) VALUES (?1, ?2, ?3)
             RETURNING id, name, color, type",
        )?
        .query_row(
            params![category.name, category.color, category.kind],
            map_category_row,
        )
        .map_err(Error::from)
}

/// Retrieve a category by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no category with `id`.
pub fn get_category(id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .query_row(
            "SELECT id, name, color, type FROM category WHERE id = ?1",
            params![id],
            map_category_row,
        )
        .map_err(Error::from)
}

/// Retrieve all categories ordered by ID.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, color, type FROM category ORDER BY id")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

type RowsAffected = usize;

/// Overwrite the stored category that has the same ID as `category`.
pub fn update_category(
    category: &Category,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE category SET name = ?1, color = ?2, type = ?3 WHERE id = ?4",
            params![category.name, category.color, category.kind, category.id],
        )
        .map_err(Error::from)
}

pub fn delete_category(id: CategoryId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM category WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}
