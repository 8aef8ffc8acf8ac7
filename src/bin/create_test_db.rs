use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use pocket_ledger::{
    Category, DEFAULT_DOCUMENT_NAME, DocumentRepository, LocalStorage, SessionController,
    Transaction, TransactionType, initialize_db,
};

/// A utility for creating a test database for the JSON API server of pocket_ledger.
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

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let storage = LocalStorage::new(Arc::new(Mutex::new(conn)));
    let mut session = SessionController::new(DocumentRepository::new(storage.clone()), storage);

    println!("Creating \"Holiday 2025\"...");
    session.open_new("Holiday 2025")?;
    for (amount, description, category, date) in [
        (420.0, "Flights", Category::Transport, date!(2025 - 07 - 01)),
        (185.5, "Hotel", Category::Bills, date!(2025 - 07 - 02)),
        (64.25, "Dinner", Category::Food, date!(2025 - 07 - 02)),
    ] {
        session.add_transaction(
            Transaction::build(TransactionType::Expense, amount, description, date)
                .category(category),
        )?;
    }

    println!("Creating \"{DEFAULT_DOCUMENT_NAME}\"...");
    session.open_new(DEFAULT_DOCUMENT_NAME)?;
    for (transaction_type, amount, description, category, date) in [
        (
            TransactionType::Income,
            4200.0,
            "Salary",
            Category::Salary,
            date!(2025 - 06 - 01),
        ),
        (
            TransactionType::Expense,
            1500.0,
            "Rent",
            Category::Bills,
            date!(2025 - 06 - 02),
        ),
        (
            TransactionType::Expense,
            120.75,
            "Groceries",
            Category::Food,
            date!(2025 - 06 - 05),
        ),
        (
            TransactionType::Expense,
            45.0,
            "Cinema",
            Category::Entertainment,
            date!(2025 - 06 - 14),
        ),
        (
            TransactionType::Income,
            4200.0,
            "Salary",
            Category::Salary,
            date!(2025 - 07 - 01),
        ),
        (
            TransactionType::Expense,
            89.99,
            "Shoes",
            Category::Shopping,
            date!(2025 - 07 - 09),
        ),
    ] {
        session.add_transaction(
            Transaction::build(transaction_type, amount, description, date).category(category),
        )?;
    }

    println!("Success!");

    Ok(())
}
