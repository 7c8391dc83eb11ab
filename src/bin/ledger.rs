use std::error::Error;

use clap::{Parser, Subcommand};
use dialoguer::{Confirm, theme::ColorfulTheme};
use rusqlite::Connection;
use time::{Date, macros::format_description};
use tracing_subscriber::EnvFilter;

use finance_tracker::{
    AccountType, CategoryKind, DeleteOutcome, Money, NewAccount, NewCategory, SQLiteLedgerStore,
    Transaction, TransactionCoordinator, TransactionDetails, TransactionKind, TransactionPatch,
    TransactionQuery,
};

/// Manage accounts, categories and transactions in a finance_tracker database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List accounts and their balances.
    Accounts,
    /// List categories.
    Categories,
    /// List transactions, newest first.
    Transactions {
        /// Only list transactions in this account.
        #[arg(long)]
        account_id: Option<i64>,
        /// Only list transactions in this category.
        #[arg(long)]
        category_id: Option<i64>,
    },
    /// Create an account.
    AddAccount {
        #[arg(long)]
        name: String,
        /// cash, bank or credit.
        #[arg(long = "type")]
        account_type: AccountType,
        /// The opening balance.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        balance: Money,
    },
    /// Create a category.
    AddCategory {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "#64748b")]
        color: String,
        /// income or expense.
        #[arg(long = "type")]
        kind: CategoryKind,
    },
    /// Record a transaction and update its account's balance.
    Add {
        #[arg(long)]
        account_id: i64,
        #[arg(long)]
        category_id: i64,
        /// Negative for expenses, positive for income, unless --type is given.
        #[arg(long, allow_hyphen_values = true)]
        amount: Money,
        #[arg(long)]
        description: String,
        /// The date in the format YYYY-MM-DD.
        #[arg(long, value_parser = parse_date)]
        date: Date,
        #[arg(long)]
        notes: Option<String>,
        /// A link to a photo of the receipt.
        #[arg(long)]
        receipt: Option<String>,
        /// income or expense, sets the sign of the amount.
        #[arg(long = "type")]
        kind: Option<TransactionKind>,
    },
    /// Edit a transaction and update the affected balances.
    Edit {
        id: i64,
        #[arg(long)]
        account_id: Option<i64>,
        #[arg(long)]
        category_id: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<Money>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
        /// An empty string clears the notes.
        #[arg(long)]
        notes: Option<String>,
        /// An empty string clears the receipt link.
        #[arg(long)]
        receipt: Option<String>,
        /// income or expense, sets the sign of the amount.
        #[arg(long = "type")]
        kind: Option<TransactionKind>,
    },
    /// Delete a transaction and reverse it from its account's balance.
    Delete {
        id: i64,
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
}

fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let conn = Connection::open(&args.db_path)?;
    let mut ledger = TransactionCoordinator::new(SQLiteLedgerStore::new(conn)?)?;

    match args.command {
        Command::Accounts => {
            for account in ledger.state().accounts() {
                println!(
                    "{:>4}  {:<24} {:<7} {:>12}",
                    account.id, account.name, account.account_type, account.balance
                );
            }
        }
        Command::Categories => {
            for category in ledger.state().categories() {
                println!(
                    "{:>4}  {:<24} {:<8} {}",
                    category.id, category.name, category.kind, category.color
                );
            }
        }
        Command::Transactions {
            account_id,
            category_id,
        } => {
            let query = TransactionQuery {
                account_id,
                category_id,
            };

            for details in ledger.store().transaction_details(&query)? {
                print_transaction(&details);
            }
        }
        Command::AddAccount {
            name,
            account_type,
            balance,
        } => {
            let account = ledger.create_account(&NewAccount {
                name,
                account_type,
                balance,
            })?;
            println!("Created account {}", account.id);
        }
        Command::AddCategory { name, color, kind } => {
            let category = ledger.create_category(&NewCategory { name, color, kind })?;
            println!("Created category {}", category.id);
        }
        Command::Add {
            account_id,
            category_id,
            amount,
            description,
            date,
            notes,
            receipt,
            kind,
        } => {
            let mut new_transaction =
                Transaction::build(account_id, category_id, amount, date, &description);
            new_transaction.notes = notes;
            new_transaction.receipt = receipt;
            new_transaction.kind = kind;

            let outcome = ledger.create(new_transaction)?;
            println!("Created transaction {}", outcome.transaction.id);
            print_balance(&ledger, outcome.transaction.account_id);
        }
        Command::Edit {
            id,
            account_id,
            category_id,
            amount,
            description,
            date,
            notes,
            receipt,
            kind,
        } => {
            let patch = TransactionPatch {
                account_id,
                category_id,
                amount,
                description,
                date,
                notes: notes.map(Some),
                receipt: receipt.map(Some),
                kind,
            };

            let outcome = ledger.update(id, &patch)?;
            for warning in &outcome.warnings {
                eprintln!("Warning: {warning:?}");
            }
            println!("Updated transaction {id}");
            print_balance(&ledger, outcome.transaction.account_id);
        }
        Command::Delete { id, yes } => {
            let theme = ColorfulTheme::default();
            let mut confirm = |transaction: &Transaction| {
                if yes {
                    return true;
                }

                Confirm::with_theme(&theme)
                    .with_prompt(format!(
                        "Delete \"{}\" ({}) on {}?",
                        transaction.description, transaction.amount, transaction.date
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or_else(|error| {
                        eprintln!("Could not read the answer: {error}");
                        false
                    })
            };

            match ledger.delete(id, &mut confirm)? {
                DeleteOutcome::Cancelled => println!("Nothing was deleted."),
                DeleteOutcome::Deleted { transaction, .. } => {
                    println!("Deleted transaction {id}");
                    print_balance(&ledger, transaction.account_id);
                }
            }
        }
    }

    Ok(())
}

fn print_transaction(details: &TransactionDetails) {
    let transaction = &details.transaction;
    let account = details
        .account
        .as_ref()
        .map_or("(deleted account)", |account| account.name.as_str());
    let category = details
        .category
        .as_ref()
        .map_or("(deleted category)", |category| category.name.as_str());

    println!(
        "{:>4}  {}  {:>12}  {:<8} {:<20} {:<20} {}",
        transaction.id,
        transaction.date,
        transaction.amount,
        transaction.kind(),
        account,
        category,
        transaction.description
    );
}

fn print_balance(ledger: &TransactionCoordinator<SQLiteLedgerStore>, account_id: i64) {
    if let Some(account) = ledger.state().account(account_id) {
        println!("{} balance: {}", account.name, account.balance);
    }
}
