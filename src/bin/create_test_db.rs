use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use finance_tracker::{
    AccountType, CategoryKind, Money, NewAccount, NewCategory, SQLiteLedgerStore, Transaction,
    TransactionCoordinator,
};

/// A utility for creating a test database for the REST API server of finance_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;
    let mut ledger = TransactionCoordinator::new(SQLiteLedgerStore::new(conn)?)?;

    println!("Creating test accounts...");
    let everyday = ledger.create_account(&NewAccount {
        name: "Everyday".to_owned(),
        account_type: AccountType::Bank,
        balance: Money::new(150000, 2),
    })?;
    let wallet = ledger.create_account(&NewAccount {
        name: "Wallet".to_owned(),
        account_type: AccountType::Cash,
        balance: Money::from(80),
    })?;
    let visa = ledger.create_account(&NewAccount {
        name: "Visa".to_owned(),
        account_type: AccountType::Credit,
        balance: Money::ZERO,
    })?;

    println!("Creating test categories...");
    let salary = ledger.create_category(&NewCategory {
        name: "Salary".to_owned(),
        color: "#22c55e".to_owned(),
        kind: CategoryKind::Income,
    })?;
    let groceries = ledger.create_category(&NewCategory {
        name: "Groceries".to_owned(),
        color: "#ef4444".to_owned(),
        kind: CategoryKind::Expense,
    })?;
    let transport = ledger.create_category(&NewCategory {
        name: "Transport".to_owned(),
        color: "#3b82f6".to_owned(),
        kind: CategoryKind::Expense,
    })?;

    println!("Creating test transactions...");
    let transactions = [
        Transaction::build(
            everyday.id,
            salary.id,
            Money::new(320000, 2),
            date!(2025 - 01 - 01),
            "Pay day",
        ),
        Transaction::build(
            everyday.id,
            groceries.id,
            Money::new(-12745, 2),
            date!(2025 - 01 - 03),
            "Weekly shop",
        )
        .notes("Includes party supplies"),
        Transaction::build(
            wallet.id,
            transport.id,
            Money::new(-450, 2),
            date!(2025 - 01 - 04),
            "Bus fare",
        ),
        Transaction::build(
            visa.id,
            groceries.id,
            Money::new(-3899, 2),
            date!(2025 - 01 - 06),
            "Corner store",
        )
        .receipt("https://example.com/receipts/corner-store.jpg"),
    ];

    for transaction in transactions {
        ledger.create(transaction)?;
    }

    for account in ledger.state().accounts() {
        println!("{}: {}", account.name, account.balance);
    }

    println!("Success!");

    Ok(())
}
