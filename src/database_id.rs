//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of an [Account](crate::Account).
pub type AccountId = DatabaseId;
/// The ID of a [Category](crate::Category).
pub type CategoryId = DatabaseId;
/// The ID of a [Transaction](crate::Transaction).
pub type TransactionId = DatabaseId;
