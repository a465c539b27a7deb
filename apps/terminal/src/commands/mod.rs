//! # Commands Module
//!
//! Every operator action the terminal exposes.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── item.rs         ◄─── Catalog add/delete (optimistic, with rollback)
//! ├── session.rs      ◄─── Current sale: add, quantity, quick item, method
//! ├── sale.rs         ◄─── complete_sale
//! ├── cash.rs         ◄─── record_cash_movement
//! ├── transaction.rs  ◄─── edit_transaction, cancel_transaction
//! └── ledger.rs       ◄─── refresh and every derived view
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs, plus `now` where time
//! matters, so tests can pin the clock:
//! ```rust,ignore
//! // Only needs the session
//! fn set_line_quantity(session: &SessionState, line_id: &str, quantity: i64)
//!
//! // Storage, session, ledger and config
//! async fn complete_sale(db: &DbState, session: &SessionState,
//!                        ledger: &LedgerState, config: &ConfigState,
//!                        now: DateTime<Utc>)
//! ```

pub mod cash;
pub mod item;
pub mod ledger;
pub mod sale;
pub mod session;
pub mod transaction;
