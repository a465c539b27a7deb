//! # State Module
//!
//! Application state for the operator terminal, one type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │   DbState    │ │ SessionState │ │ CatalogState │ │ LedgerState  │   │
//! │  │              │ │              │ │              │ │              │   │
//! │  │  Database    │ │  Arc<Mutex<  │ │  Arc<Mutex<  │ │  Arc<Mutex<  │   │
//! │  │  IdGenerator │ │   Session>>  │ │   Vec<Item>>>│ │   Vec<Tx>>>  │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  ┌──────────────────────────────────┐                                   │
//! │  │  ConfigState (read-only)         │                                   │
//! │  │  shop_id, shop_name, utc offset  │                                   │
//! │  └──────────────────────────────────┘                                   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • DbState: the pool is shareable                                       │
//! │  • Session / Catalog / Ledger: Arc<Mutex<T>>, never held across .await  │
//! │  • ConfigState: read-only after initialization                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod catalog;
mod config;
mod db;
mod ledger;
mod session;

pub use catalog::CatalogState;
pub use config::{ConfigState, DATABASE_FILE};
pub use db::DbState;
pub use ledger::LedgerState;
pub use session::{Session, SessionLine, SessionState, SessionTotals};
