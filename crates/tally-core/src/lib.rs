//! # tally-core: Pure Business Logic for Tally POS
//!
//! Everything that decides what the cash drawer ledger looks like lives here,
//! as plain functions over plain records. Storage, the clock and the UI are
//! all on the outside.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Operator Terminal (apps/terminal)              │   │
//! │  │   complete_sale, record_cash_movement, edit/cancel, day views  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  ledger  │ │numbering │ │  audit   │ │ types / money /  │  │   │
//! │  │   │ rows +   │ │YYMMDDNNNN│ │ edit     │ │ validation / ids │  │   │
//! │  │   │ balance  │ │          │ │ records  │ │ calendar         │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Database Layer)                    │   │
//! │  │        items, transactions, daily_counters (SQLite)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Item, Transaction, LineItem, EditRecord)
//! - [`money`] - Integer-cent Money type
//! - [`ledger`] - Ledger reconstruction with running cash balance
//! - [`numbering`] - Daily document numbers (`YYMMDDNNNN`)
//! - [`audit`] - Edit diff and audit record builder
//! - [`calendar`] - Day filters, day summaries, month activity, document views
//! - [`ids`] - Client-side identifier generation
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use tally_core::ledger::reconstruct;
//! use tally_core::{LineItem, Money, PaymentMethod, Transaction};
//!
//! let sale = Transaction::sale(
//!     "tx_1",
//!     "shop",
//!     Utc.with_ymd_and_hms(2025, 3, 9, 9, 0, 0).unwrap(),
//!     None,
//!     vec![LineItem::new("Coffee", Money::from_cents(350), 2)],
//!     PaymentMethod::Cash,
//!     "2503090001",
//! );
//!
//! let ledger = reconstruct(&[sale]);
//! assert_eq!(ledger.rows[0].running_balance, Some(Money::from_cents(700)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod calendar;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod numbering;
pub mod types;
pub mod validation;

mod lenient;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use numbering::DocumentNumber;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default shop ID used when the terminal is not configured with one.
pub const DEFAULT_SHOP_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Category assigned to catalog items created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Category assigned to ad-hoc lines keyed in at the register.
pub const QUICK_SALE_CATEGORY: &str = "Quick Sale";

/// Name of the synthetic row shown for a transaction that has no items.
pub const NO_ITEMS_PLACEHOLDER: &str = "(no items)";

/// Maximum lines allowed in the current sale.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Guards against typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;
