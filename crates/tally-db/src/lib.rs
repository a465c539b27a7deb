//! # tally-db: Database Layer for Tally POS
//!
//! SQLite storage for the catalog, the transaction ledger and the daily
//! document counters, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  Terminal command (complete_sale)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ ItemRepository     │  │            │  │   │
//! │  │   │ SqlitePool    │◄───│ TransactionRepo    │  │ 001_init   │  │   │
//! │  │   │               │    │ CounterRepository  │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Item, transaction and counter repositories
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use tally_db::{Database, DbConfig};
//!
//! # async fn run() -> Result<(), tally_db::DbError> {
//! let db = Database::new(DbConfig::new("tally.db")).await?;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
//! let number = db.counters().next_daily_number("shop", today).await?;
//! let ledger = db.transactions().load("shop").await?;
//! # let _ = (number, ledger);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::counter::CounterRepository;
pub use repository::item::ItemRepository;
pub use repository::transaction::TransactionRepository;
