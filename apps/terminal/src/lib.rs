//! # Tally Terminal Library
//!
//! Operator-terminal layer of Tally POS: session state, configuration and
//! the commands a front end calls.
//!
//! ## Module Organization
//! ```text
//! tally_terminal/
//! ├── lib.rs          ◄─── You are here (startup, logging, Terminal)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database + id generator
//! │   ├── session.rs  ◄─── Current sale
//! │   ├── catalog.rs  ◄─── Loaded catalog
//! │   ├── ledger.rs   ◄─── Loaded transaction set
//! │   └── config.rs   ◄─── Configuration
//! ├── commands/       ◄─── Operator actions and views
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod state;

use chrono::{NaiveDate, Utc};
use tally_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::{ApiError, ApiResult};
use crate::state::{CatalogState, ConfigState, DbState, LedgerState, SessionState};

/// Every piece of terminal state, opened and loaded.
///
/// Commands still take the individual states; this only bundles them for
/// the binary and for tests.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub db: DbState,
    pub session: SessionState,
    pub catalog: CatalogState,
    pub ledger: LedgerState,
    pub config: ConfigState,
}

impl Terminal {
    /// Connects to the configured database and loads catalog and ledger.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  1. Resolve database path (TALLY_DB_PATH or platform data dir)     │
    /// │  2. Connect, WAL mode, run pending migrations                      │
    /// │  3. Create state objects                                           │
    /// │  4. Load catalog and transactions for the shop                     │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    pub async fn open(config: ConfigState) -> ApiResult<Self> {
        let db_path = config
            .database_path()
            .map_err(|e| ApiError::internal(format!("Could not prepare data directory: {}", e)))?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        Terminal::with_database(config, db).await
    }

    /// Builds the state around an already connected database.
    pub async fn with_database(config: ConfigState, db: Database) -> ApiResult<Self> {
        let terminal = Terminal {
            db: DbState::new(db),
            session: SessionState::new(),
            catalog: CatalogState::new(),
            ledger: LedgerState::new(),
            config,
        };

        commands::item::load_catalog(&terminal.db, &terminal.catalog, &terminal.config).await?;
        commands::ledger::refresh_ledger(&terminal.db, &terminal.ledger, &terminal.config).await?;

        info!(
            shop_id = %terminal.config.shop_id,
            items = terminal.catalog.len(),
            transactions = terminal.ledger.len(),
            "Terminal state initialized"
        );
        Ok(terminal)
    }
}

/// Options for the headless binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Day to print; defaults to the shop's today.
    pub date: Option<NaiveDate>,
    /// Print the day summary as JSON instead of a table.
    pub json: bool,
}

/// Opens the terminal and prints one day's ledger.
pub async fn run(options: RunOptions) -> ApiResult<()> {
    init_tracing();
    info!("Starting Tally POS terminal");

    let config = ConfigState::from_env();
    let terminal = Terminal::open(config).await?;

    let date = options
        .date
        .unwrap_or_else(|| terminal.config.today(Utc::now()));
    let summary = commands::ledger::day_summary(&terminal.ledger, &terminal.config, date);

    if options.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| ApiError::internal(format!("Could not encode summary: {}", e)))?;
        println!("{}", json);
    } else {
        print!("{}", commands::ledger::format_day(&summary, &terminal.config));
    }

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally=trace` - Show trace for tally crates only
/// - Default: `info,tally=debug,sqlx=warn`
///
/// Logs go to stderr so the printed ledger stays clean. Safe to call more
/// than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
