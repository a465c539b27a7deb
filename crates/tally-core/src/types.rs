//! # Domain Types
//!
//! Core domain records used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────┐   │
//! │  │      Item       │   │    Transaction      │   │   EditRecord    │   │
//! │  │  ─────────────  │   │  ─────────────────  │   │  ─────────────  │   │
//! │  │  id             │   │  id                 │   │  timestamp      │   │
//! │  │  name           │   │  timestamp          │   │  changes[]      │   │
//! │  │  price_cents    │   │  items[] (LineItem) │   │  old_total      │   │
//! │  │  category       │   │  total_cents        │   │  new_total      │   │
//! │  └─────────────────┘   │  payment_method     │   └─────────────────┘   │
//! │          │             │  document_type      │                          │
//! │          │ copied by   │  receipt / invoice  │                          │
//! │          └──value────► │  cancelled          │                          │
//! │                        │  edit_history[]     │                          │
//! │                        └─────────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A sale copies name and price out of the catalog into its line items, so
//! editing or deleting a catalog item never rewrites history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::lenient;
use crate::money::Money;

// =============================================================================
// Item
// =============================================================================

/// A sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    /// Unique identifier within the shop.
    pub id: String,

    /// Shop this item belongs to.
    pub shop_id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Price in cents (smallest currency unit), never negative.
    pub price_cents: i64,

    /// Grouping for the catalog grid. Defaults to "General".
    pub category: String,

    /// Optional display color for the catalog button.
    pub color: Option<String>,

    /// When the item was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a transaction was settled.
///
/// Only cash moves the drawer; credit sales are owed by a named customer.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash into the drawer.
    Cash,
    /// Sold on account to a named customer.
    Credit,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl PaymentMethod {
    /// Lowercase wire name (`cash` / `credit`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Credit => "credit",
        }
    }
}

// =============================================================================
// Document Type
// =============================================================================

/// What kind of ledger entry a transaction is.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    /// A customer purchase.
    Sale,
    /// Money put into the drawer outside of a sale.
    CashIn,
    /// Money taken out of the drawer (owner withdrawal, supplies).
    CashOut,
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Sale
    }
}

impl DocumentType {
    /// Wire name (`sale` / `cash-in` / `cash-out`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Sale => "sale",
            DocumentType::CashIn => "cash-in",
            DocumentType::CashOut => "cash-out",
        }
    }

    /// True for cash-in and cash-out vouchers.
    pub fn is_cash_movement(&self) -> bool {
        matches!(self, DocumentType::CashIn | DocumentType::CashOut)
    }
}

// =============================================================================
// Cash Direction
// =============================================================================

/// Direction of a manual drawer adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CashDirection {
    In,
    Out,
}

impl CashDirection {
    /// Document type recorded for this direction.
    pub fn document_type(&self) -> DocumentType {
        match self {
            CashDirection::In => DocumentType::CashIn,
            CashDirection::Out => DocumentType::CashOut,
        }
    }

    /// Label used in the synthetic line name.
    pub fn label(&self) -> &'static str {
        match self {
            CashDirection::In => "In",
            CashDirection::Out => "Out",
        }
    }

    /// Applies the drawer sign to a positive amount.
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            CashDirection::In => amount,
            CashDirection::Out => -amount,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One line of a transaction, copied by value from the catalog.
///
/// Stored as JSON inside the transaction record. Every numeric field reads
/// leniently: a malformed price or quantity becomes 0 and a malformed
/// subtotal becomes absent (and is then recomputed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Name at time of sale (frozen).
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,

    /// Unit price in cents. Negative for cash-out vouchers.
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub price_cents: i64,

    /// Quantity sold. Always 1 for cash movements.
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub quantity: i64,

    /// Authoritative line amount; recomputed whenever price or quantity change.
    #[serde(default, deserialize_with = "lenient::optional_i64")]
    pub subtotal_cents: Option<i64>,
}

impl LineItem {
    /// Creates a line with its subtotal computed as `price × quantity`.
    pub fn new(name: impl Into<String>, price: Money, quantity: i64) -> Self {
        LineItem {
            name: name.into(),
            price_cents: price.cents(),
            quantity,
            subtotal_cents: Some(price.multiply_quantity(quantity).cents()),
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Line amount: the stored subtotal when present, else `price × quantity`.
    pub fn subtotal(&self) -> Money {
        match self.subtotal_cents {
            Some(cents) => Money::from_cents(cents),
            None => self.price().multiply_quantity(self.quantity),
        }
    }

    /// Copy of this line with the subtotal recomputed from price and quantity.
    pub fn normalized(&self) -> Self {
        LineItem::new(self.name.clone(), self.price(), self.quantity)
    }
}

// =============================================================================
// Edit History
// =============================================================================

/// A single field-level difference recorded by an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldChange {
    /// Human-readable label, e.g. `Item 1 Price`.
    pub field: String,
    pub from: String,
    pub to: String,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        FieldChange {
            field: field.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

/// One append-only audit entry describing an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EditRecord {
    /// When the edit was saved.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// What changed, in display order. May be empty.
    #[serde(default)]
    pub changes: Vec<FieldChange>,

    /// Transaction total before this edit.
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub old_total_cents: i64,

    /// Recomputed total after this edit.
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub new_total_cents: i64,
}

// =============================================================================
// Transaction
// =============================================================================

/// A ledger entry: a sale, a cash-in or a cash-out.
///
/// ## Invariants
/// - `total_cents` equals the sum of line subtotals after any mutation
/// - sales carry exactly one of receipt (cash) or invoice (credit) number
/// - cash movements carry a receipt number and never an invoice number
/// - cancellation only sets a flag; lines and total are kept
/// - `edit_history` only ever grows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    /// Client-generated unique identifier.
    pub id: String,

    /// Shop that owns this transaction.
    pub shop_id: String,

    /// When the transaction happened (editable).
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// Customer name. Required for credit sales.
    pub customer_name: Option<String>,

    /// Lines in original order.
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub items: Vec<LineItem>,

    /// Sum of line subtotals in cents.
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub total_cents: i64,

    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub document_type: DocumentType,

    /// Present iff the payment method is cash.
    pub receipt_number: Option<String>,

    /// Present iff the payment method is credit.
    pub invoice_number: Option<String>,

    /// Tombstone flag. Never cleared once set.
    #[serde(default)]
    pub cancelled: bool,

    /// Append-only audit trail.
    #[serde(default)]
    pub edit_history: Vec<EditRecord>,
}

impl Transaction {
    /// Builds a finalized sale from already-priced lines.
    ///
    /// `number` lands in the receipt slot for cash and the invoice slot for
    /// credit. The total is the sum of the line subtotals.
    pub fn sale(
        id: impl Into<String>,
        shop_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        customer_name: Option<String>,
        items: Vec<LineItem>,
        payment_method: PaymentMethod,
        number: impl Into<String>,
    ) -> Self {
        let number = number.into();
        let total: Money = items.iter().map(LineItem::subtotal).sum();
        let (receipt_number, invoice_number) = match payment_method {
            PaymentMethod::Cash => (Some(number), None),
            PaymentMethod::Credit => (None, Some(number)),
        };

        Transaction {
            id: id.into(),
            shop_id: shop_id.into(),
            timestamp,
            customer_name: customer_name.filter(|n| !n.trim().is_empty()),
            items,
            total_cents: total.cents(),
            payment_method,
            document_type: DocumentType::Sale,
            receipt_number,
            invoice_number,
            cancelled: false,
            edit_history: Vec::new(),
        }
    }

    /// Builds a cash-in / cash-out voucher.
    ///
    /// The voucher has one line named `Cash In: <reason>` or
    /// `Cash Out: <reason>` with quantity 1 and a signed amount.
    pub fn cash_movement(
        id: impl Into<String>,
        shop_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        direction: CashDirection,
        reason: &str,
        amount: Money,
        number: impl Into<String>,
    ) -> Self {
        let signed = direction.signed(amount.abs());
        let line = LineItem::new(
            format!("Cash {}: {}", direction.label(), reason.trim()),
            signed,
            1,
        );

        Transaction {
            id: id.into(),
            shop_id: shop_id.into(),
            timestamp,
            customer_name: None,
            items: vec![line],
            total_cents: signed.cents(),
            payment_method: PaymentMethod::Cash,
            document_type: direction.document_type(),
            receipt_number: Some(number.into()),
            invoice_number: None,
            cancelled: false,
            edit_history: Vec::new(),
        }
    }

    /// Returns the stored total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Sum of line subtotals (stored or recomputed per line).
    pub fn items_total(&self) -> Money {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// True once at least one edit has been saved.
    pub fn is_edited(&self) -> bool {
        !self.edit_history.is_empty()
    }

    /// True when this transaction moves the cash drawer.
    pub fn affects_cash_balance(&self) -> bool {
        !self.cancelled && self.payment_method == PaymentMethod::Cash
    }

    /// The human-facing number: receipt for cash, invoice for credit.
    pub fn document_number(&self) -> Option<&str> {
        match self.payment_method {
            PaymentMethod::Cash => self.receipt_number.as_deref(),
            PaymentMethod::Credit => self.invoice_number.as_deref(),
        }
    }

    /// Customer name, treating blank as absent.
    pub fn customer(&self) -> Option<&str> {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    /// Sets the cancellation tombstone.
    ///
    /// Lines, total and history are left untouched.
    pub fn cancel(&mut self) -> CoreResult<()> {
        if self.cancelled {
            return Err(CoreError::AlreadyCancelled(self.id.clone()));
        }
        self.cancelled = true;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 9, h, 0, 0).unwrap()
    }

    #[test]
    fn test_sale_places_number_by_method() {
        let lines = vec![LineItem::new("Coffee", Money::from_cents(350), 2)];

        let cash = Transaction::sale("a", "s", at(9), None, lines.clone(), PaymentMethod::Cash, "2503090001");
        assert_eq!(cash.receipt_number.as_deref(), Some("2503090001"));
        assert_eq!(cash.invoice_number, None);
        assert_eq!(cash.total_cents, 700);

        let credit = Transaction::sale(
            "b",
            "s",
            at(9),
            Some("Jane".to_string()),
            lines,
            PaymentMethod::Credit,
            "2503090002",
        );
        assert_eq!(credit.receipt_number, None);
        assert_eq!(credit.document_number(), Some("2503090002"));
        assert_eq!(credit.customer(), Some("Jane"));
    }

    #[test]
    fn test_cash_movement_is_signed() {
        let out = Transaction::cash_movement(
            "c",
            "s",
            at(10),
            CashDirection::Out,
            " Supplies ",
            Money::from_cents(2000),
            "2503090003",
        );
        assert_eq!(out.document_type, DocumentType::CashOut);
        assert_eq!(out.items[0].name, "Cash Out: Supplies");
        assert_eq!(out.items[0].subtotal_cents, Some(-2000));
        assert_eq!(out.total_cents, -2000);
        assert_eq!(out.receipt_number.as_deref(), Some("2503090003"));
        assert_eq!(out.invoice_number, None);

        let cash_in = Transaction::cash_movement(
            "d",
            "s",
            at(11),
            CashDirection::In,
            "Float",
            Money::from_cents(5000),
            "2503090004",
        );
        assert_eq!(cash_in.document_type, DocumentType::CashIn);
        assert_eq!(cash_in.total_cents, 5000);
    }

    #[test]
    fn test_cancel_is_a_one_way_tombstone() {
        let mut tx = Transaction::sale(
            "a",
            "s",
            at(9),
            None,
            vec![LineItem::new("Tea", Money::from_cents(200), 1)],
            PaymentMethod::Cash,
            "2503090001",
        );

        tx.cancel().unwrap();
        assert!(tx.cancelled);
        assert_eq!(tx.items.len(), 1);
        assert_eq!(tx.total_cents, 200);
        assert!(!tx.affects_cash_balance());

        assert!(matches!(tx.cancel(), Err(CoreError::AlreadyCancelled(_))));
    }

    #[test]
    fn test_line_subtotal_falls_back_to_price_times_quantity() {
        let line = LineItem {
            name: "Bun".to_string(),
            price_cents: 125,
            quantity: 4,
            subtotal_cents: None,
        };
        assert_eq!(line.subtotal().cents(), 500);
        assert_eq!(line.normalized().subtotal_cents, Some(500));
    }

    #[test]
    fn test_malformed_stored_transaction_still_reads() {
        let json = r#"{
            "id": "tx_9",
            "shop_id": "s",
            "timestamp": "2025-03-09T12:00:00Z",
            "customer_name": null,
            "items": [
                {"name": "Soap", "price_cents": "oops", "quantity": 2},
                {"name": "Rag", "price_cents": 150, "quantity": "3", "subtotal_cents": null}
            ],
            "total_cents": "450",
            "payment_method": "cash",
            "receipt_number": "2503090009",
            "invoice_number": null
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.document_type, DocumentType::Sale);
        assert_eq!(tx.items[0].price_cents, 0);
        assert_eq!(tx.items[0].subtotal().cents(), 0);
        assert_eq!(tx.items[1].subtotal().cents(), 450);
        assert_eq!(tx.total_cents, 450);
        assert!(!tx.cancelled);
        assert!(tx.edit_history.is_empty());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&DocumentType::CashOut).unwrap(),
            "\"cash-out\""
        );
        assert_eq!(serde_json::to_string(&PaymentMethod::Credit).unwrap(), "\"credit\"");
        assert_eq!(DocumentType::CashIn.as_str(), "cash-in");
    }
}
