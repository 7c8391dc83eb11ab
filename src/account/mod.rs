//! Accounts: named stores of money with a cached balance.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;

pub use core::{
    Account, AccountPatch, AccountSummary, AccountType, NewAccount, create_account,
    create_account_table, delete_account, get_account, get_all_accounts,
    map_row_to_account_with_offset, set_account_balance, update_account,
};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use edit_endpoint::edit_account_endpoint;
pub use get_endpoint::{get_account_endpoint, get_account_summary_endpoint, get_accounts_endpoint};
