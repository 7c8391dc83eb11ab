//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/accounts/{account_id}', use [format_endpoint].

/// The route to list and create accounts.
pub const ACCOUNTS: &str = "/accounts";
/// The route for the combined balance of all accounts.
pub const ACCOUNTS_SUMMARY: &str = "/accounts/summary";
/// The route to access a single account.
pub const ACCOUNT: &str = "/accounts/{account_id}";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/categories";
/// The route to access a single category.
pub const CATEGORY: &str = "/categories/{category_id}";
/// The route to list and create transactions.
///
/// Transactions can also be edited and deleted here by putting the ID in the
/// request body.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}";

/// Replace the first `{parameter}` in `endpoint_path` with `id`.
///
/// `format_endpoint(ACCOUNT, 3)` gives `/accounts/3`. Paths without a
/// parameter are returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };
    let end = endpoint_path[start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| start + offset + 1);

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}
