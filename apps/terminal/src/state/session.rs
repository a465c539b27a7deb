//! # Session State
//!
//! The operator's current sale: lines, chosen payment method and customer.
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  Operator Action         Command                  Session Change        │
//! │  ───────────────         ───────                  ──────────────        │
//! │                                                                         │
//! │  Tap catalog item ──────► add_to_sale() ────────► qty + 1 or new line  │
//! │                                                                         │
//! │  Type a quick item ─────► add_quick_item() ─────► new "Quick Sale" line│
//! │                                                                         │
//! │  Change quantity ───────► set_line_quantity() ──► qty = n (≤ 0 removes)│
//! │                                                                         │
//! │  Pick cash / credit ────► set_payment_method() ─► payment_method       │
//! │                                                                         │
//! │  Complete sale ─────────► complete_sale() ──────► reset()              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is never read by tally-core. Commands copy its lines into
//! plain `LineItem`s before calling the core.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tally_core::validation::{validate_cart_size, validate_quantity};
use tally_core::{Item, LineItem, Money, PaymentMethod, QUICK_SALE_CATEGORY};

/// A line in the current sale.
///
/// Catalog lines use the catalog item id as `line_id`; quick items get a
/// freshly generated id. Name and price are frozen when the line is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLine {
    pub line_id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub category: String,
}

impl SessionLine {
    /// `price × quantity`.
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }

    /// Copies the line by value for a transaction.
    pub fn to_line_item(&self) -> LineItem {
        LineItem::new(self.name.clone(), Money::from_cents(self.price_cents), self.quantity)
    }
}

/// The current sale.
///
/// ## Invariants
/// - Catalog items appear at most once (adding again increments)
/// - Every quantity is between 1 and 999
/// - At most 100 lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub lines: Vec<SessionLine>,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Adds one of a catalog item, or increments its existing line.
    pub fn add_catalog_item(&mut self, item: &Item) -> Result<(), String> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.line_id == item.id) {
            validate_quantity(line.quantity + 1).map_err(|e| e.to_string())?;
            line.quantity += 1;
            return Ok(());
        }

        self.ensure_room()?;
        self.lines.push(SessionLine {
            line_id: item.id.clone(),
            name: item.name.clone(),
            price_cents: item.price_cents,
            quantity: 1,
            category: item.category.clone(),
        });
        Ok(())
    }

    /// Adds an ad-hoc line. Quantity is clamped to at least 1.
    ///
    /// Name and price are expected to be validated by the caller.
    pub fn add_quick_item(
        &mut self,
        line_id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        quantity: i64,
    ) -> Result<(), String> {
        let quantity = quantity.max(1);
        validate_quantity(quantity).map_err(|e| e.to_string())?;

        self.ensure_room()?;
        self.lines.push(SessionLine {
            line_id: line_id.into(),
            name: name.into(),
            price_cents: price.cents(),
            quantity,
            category: QUICK_SALE_CATEGORY.to_string(),
        });
        Ok(())
    }

    /// Sets a line's quantity. Zero or less removes the line.
    pub fn set_quantity(&mut self, line_id: &str, quantity: i64) -> Result<(), String> {
        if quantity <= 0 {
            return self.remove_line(line_id);
        }

        validate_quantity(quantity).map_err(|e| e.to_string())?;

        match self.lines.iter_mut().find(|l| l.line_id == line_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(format!("Line {} not in sale", line_id)),
        }
    }

    pub fn remove_line(&mut self, line_id: &str) -> Result<(), String> {
        let before = self.lines.len();
        self.lines.retain(|l| l.line_id != line_id);

        if self.lines.len() == before {
            Err(format!("Line {} not in sale", line_id))
        } else {
            Ok(())
        }
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub fn set_customer_name(&mut self, name: Option<String>) {
        self.customer_name = name;
    }

    /// Sum of `price × quantity` over all lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(SessionLine::subtotal).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines copied by value, in the order they were added.
    pub fn line_items(&self) -> Vec<LineItem> {
        self.lines.iter().map(SessionLine::to_line_item).collect()
    }

    /// Clears lines, goes back to cash and forgets the customer.
    pub fn reset(&mut self) {
        *self = Session::default();
    }

    fn ensure_room(&self) -> Result<(), String> {
        validate_cart_size(self.lines.len()).map_err(|e| e.to_string())
    }
}

/// Session totals for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub total_cents: i64,
}

impl From<&Session> for SessionTotals {
    fn from(session: &Session) -> Self {
        SessionTotals {
            line_count: session.lines.len(),
            total_quantity: session.lines.iter().map(|l| l.quantity).sum(),
            total_cents: session.total().cents(),
        }
    }
}

/// Shared handle to the current sale.
///
/// Locks are held only inside the closures and never across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session: Arc<Mutex<Session>>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    /// Runs `f` with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Session) -> R,
    {
        let session = self.session.lock().expect("Session mutex poisoned");
        f(&session)
    }

    /// Runs `f` with write access to the session.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut session = self.session.lock().expect("Session mutex poisoned");
        f(&mut session)
    }

    pub fn snapshot(&self) -> Session {
        self.with_session(Session::clone)
    }
}
