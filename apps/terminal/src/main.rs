//! # Tally Terminal Entry Point
//!
//! Headless terminal: opens the shop's database and prints one day's
//! ledger with its running cash balance.
//!
//! ## Usage
//! ```bash
//! # Today's ledger
//! cargo run -p tally-terminal
//!
//! # A given day, as JSON
//! cargo run -p tally-terminal -- --date 2025-03-09 --json
//!
//! # Against the seeded development database
//! TALLY_DB_PATH=./tally_dev.db cargo run -p tally-terminal
//! ```

use std::env;
use std::process::ExitCode;

use chrono::NaiveDate;
use tally_terminal::RunOptions;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let mut options = RunOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--date" | "-d" => {
                if i + 1 < args.len() {
                    match NaiveDate::parse_from_str(&args[i + 1], "%Y-%m-%d") {
                        Ok(date) => options.date = Some(date),
                        Err(_) => {
                            eprintln!("Invalid date '{}', expected YYYY-MM-DD", args[i + 1]);
                            return ExitCode::FAILURE;
                        }
                    }
                    i += 1;
                }
            }
            "--json" => options.json = true,
            "--help" | "-h" => {
                println!("Tally POS Terminal");
                println!();
                println!("Usage: tally-terminal [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --date <YYYY-MM-DD>  Day to print (default: today)");
                println!("      --json               Print the day summary as JSON");
                println!("  -h, --help               Show this help message");
                println!();
                println!("Environment: TALLY_SHOP_ID, TALLY_SHOP_NAME, TALLY_UTC_OFFSET_MINUTES,");
                println!("             TALLY_CURRENCY_SYMBOL, TALLY_DB_PATH, RUST_LOG");
                return ExitCode::SUCCESS;
            }
            _ => {}
        }
        i += 1;
    }

    match tally_terminal::run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
