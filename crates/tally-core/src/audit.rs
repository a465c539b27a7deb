//! # Edit Diff / Audit Builder
//!
//! Computes what an operator changed on a past transaction and produces the
//! record appended to its edit history.
//!
//! ## Flow
//! ```text
//! ┌───────────────┐     ┌─────────────────┐     ┌──────────────────────────┐
//! │ stored        │     │ TransactionDraft│     │ build_edit()             │
//! │ Transaction   │────►│ (operator edits │────►│  1. normalize lines      │
//! │ (before)      │     │  time, customer,│     │  2. diff fields          │
//! └───────────────┘     │  lines)         │     │  3. recompute total      │
//!                       └─────────────────┘     │  4. append EditRecord    │
//!                                               └────────────┬─────────────┘
//!                                                            ▼
//!                                               updated Transaction (persist)
//! ```
//!
//! ## Change Labels
//! | Label               | From / To                                   |
//! |---------------------|---------------------------------------------|
//! | `Time`              | localized date-time strings                 |
//! | `Customer Name`     | name, or `(none)` when absent               |
//! | `Item N Name`       | line names                                  |
//! | `Item N Price`      | `$10`, `$12.5` (shortest decimal)           |
//! | `Item N Quantity`   | integers                                    |
//! | `Items Count`       | old and new line counts, when they differ   |
//!
//! Per-line diffs cover only indices present in both lists.
//!
//! Nothing here touches the running balance or the numbering counter. The
//! caller persists the result and re-runs the ledger.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{EditRecord, FieldChange, LineItem, Transaction};

/// Shown in place of an absent customer name.
pub const NO_CUSTOMER: &str = "(none)";

/// Localized timestamp pattern used in diffs and printed documents.
pub const LOCAL_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Formats an instant in the shop's offset, e.g. `3/9/2025, 9:00:00 AM`.
///
/// ```rust
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use tally_core::audit::format_local;
///
/// let ts = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 0).unwrap();
/// let offset = FixedOffset::east_opt(2 * 3600).unwrap();
/// assert_eq!(format_local(ts, offset), "3/9/2025, 4:05:00 PM");
/// ```
pub fn format_local(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    timestamp
        .with_timezone(&offset)
        .format(LOCAL_TIME_FORMAT)
        .to_string()
}

// =============================================================================
// Draft
// =============================================================================

/// The editable fields of a transaction, as the operator left them.
///
/// Payment method, document type, numbers and the cancellation flag are not
/// editable and are carried over from the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionDraft {
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl TransactionDraft {
    /// Starts a draft from the stored state.
    pub fn from_transaction(tx: &Transaction) -> Self {
        TransactionDraft {
            timestamp: tx.timestamp,
            customer_name: tx.customer_name.clone(),
            items: tx.items.clone(),
        }
    }

    /// Removes the line at `index`, if present.
    pub fn remove_line(&mut self, index: usize) -> Option<LineItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }
}

/// Result of [`build_edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// The record that was appended.
    pub record: EditRecord,
    /// The transaction to persist.
    pub transaction: Transaction,
}

// =============================================================================
// Builder
// =============================================================================

/// Normalizes a line for editing: quantity floored at 0 and the subtotal
/// recomputed as `price × quantity`.
///
/// A stored subtotal is ignored here; during an edit it is derived only.
pub fn normalize_line(line: &LineItem) -> LineItem {
    LineItem::new(line.name.clone(), line.price(), line.quantity.max(0))
}

/// Field-level differences between the stored state and a draft.
///
/// Both sides are compared after normalization.
pub fn diff(original: &Transaction, draft: &TransactionDraft, offset: FixedOffset) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if original.timestamp != draft.timestamp {
        changes.push(FieldChange::new(
            "Time",
            format_local(original.timestamp, offset),
            format_local(draft.timestamp, offset),
        ));
    }

    let old_customer = original.customer();
    let new_customer = trimmed(draft.customer_name.as_deref());
    if old_customer != new_customer {
        changes.push(FieldChange::new(
            "Customer Name",
            old_customer.unwrap_or(NO_CUSTOMER),
            new_customer.unwrap_or(NO_CUSTOMER),
        ));
    }

    let old_items: Vec<LineItem> = original.items.iter().map(normalize_line).collect();
    let new_items: Vec<LineItem> = draft.items.iter().map(normalize_line).collect();

    for (idx, (old, new)) in old_items.iter().zip(&new_items).enumerate() {
        let n = idx + 1;
        if old.name != new.name {
            changes.push(FieldChange::new(
                format!("Item {n} Name"),
                old.name.as_str(),
                new.name.as_str(),
            ));
        }
        if old.price_cents != new.price_cents {
            changes.push(FieldChange::new(
                format!("Item {n} Price"),
                format!("${}", old.price().plain()),
                format!("${}", new.price().plain()),
            ));
        }
        if old.quantity != new.quantity {
            changes.push(FieldChange::new(
                format!("Item {n} Quantity"),
                old.quantity.to_string(),
                new.quantity.to_string(),
            ));
        }
    }

    if old_items.len() != new_items.len() {
        changes.push(FieldChange::new(
            "Items Count",
            old_items.len().to_string(),
            new_items.len().to_string(),
        ));
    }

    changes
}

/// Applies a draft to a stored transaction and appends one edit record.
///
/// The returned transaction has normalized lines, `total == Σ subtotal`,
/// and the previous history plus the new record. Cancellation, payment
/// method and document numbers are unchanged.
///
/// ```rust
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use tally_core::audit::{build_edit, TransactionDraft};
/// use tally_core::{LineItem, Money, PaymentMethod, Transaction};
///
/// let ts = Utc.with_ymd_and_hms(2025, 3, 9, 9, 0, 0).unwrap();
/// let tx = Transaction::sale(
///     "tx_1", "shop", ts, None,
///     vec![LineItem::new("Widget", Money::from_cents(1000), 2)],
///     PaymentMethod::Cash, "2503090001",
/// );
///
/// let mut draft = TransactionDraft::from_transaction(&tx);
/// draft.items[0].price_cents = 1250;
///
/// let edit = build_edit(&tx, draft, ts, FixedOffset::east_opt(0).unwrap());
/// assert_eq!(edit.record.changes[0].field, "Item 1 Price");
/// assert_eq!(edit.record.changes[0].from, "$10");
/// assert_eq!(edit.record.changes[0].to, "$12.5");
/// assert_eq!(edit.transaction.total_cents, 2500);
/// ```
pub fn build_edit(
    original: &Transaction,
    draft: TransactionDraft,
    edited_at: DateTime<Utc>,
    offset: FixedOffset,
) -> EditOutcome {
    let changes = diff(original, &draft, offset);

    let items: Vec<LineItem> = draft.items.iter().map(normalize_line).collect();
    let new_total: Money = items.iter().map(LineItem::subtotal).sum();

    let record = EditRecord {
        timestamp: edited_at,
        changes,
        old_total_cents: original.total_cents,
        new_total_cents: new_total.cents(),
    };

    let mut transaction = original.clone();
    transaction.timestamp = draft.timestamp;
    transaction.customer_name = trimmed(draft.customer_name.as_deref()).map(str::to_string);
    transaction.items = items;
    transaction.total_cents = new_total.cents();
    transaction.edit_history.push(record.clone());

    EditOutcome {
        record,
        transaction,
    }
}

fn trimmed(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 9, h, m, 0).unwrap()
    }

    fn widget_sale() -> Transaction {
        Transaction::sale(
            "tx_1",
            "shop",
            at(9, 0),
            None,
            vec![
                LineItem::new("Widget", Money::from_cents(1000), 2),
                LineItem::new("Gadget", Money::from_cents(500), 1),
            ],
            PaymentMethod::Cash,
            "2503090001",
        )
    }

    #[test]
    fn test_price_change_records_plain_amounts_and_new_total() {
        let tx = widget_sale();
        let mut draft = TransactionDraft::from_transaction(&tx);
        draft.items[0].price_cents = 1250;

        let edit = build_edit(&tx, draft, at(12, 0), utc());

        assert_eq!(
            edit.record.changes,
            vec![FieldChange::new("Item 1 Price", "$10", "$12.5")]
        );
        assert_eq!(edit.record.old_total_cents, 2500);
        assert_eq!(edit.record.new_total_cents, 3000);
        assert_eq!(edit.transaction.items[0].subtotal_cents, Some(2500));
        assert_eq!(edit.transaction.total_cents, 3000);
    }

    #[test]
    fn test_subtotal_is_always_recomputed() {
        let tx = widget_sale();
        let mut draft = TransactionDraft::from_transaction(&tx);
        draft.items[1].quantity = 3;
        // Stale value the operator screen left behind.
        draft.items[1].subtotal_cents = Some(500);

        let edit = build_edit(&tx, draft, at(12, 0), utc());

        for line in &edit.transaction.items {
            assert_eq!(line.subtotal_cents, Some(line.price_cents * line.quantity));
        }
        assert_eq!(edit.transaction.total_cents, edit.transaction.items_total().cents());
        assert_eq!(edit.transaction.total_cents, 3500);
        assert_eq!(
            edit.record.changes,
            vec![FieldChange::new("Item 2 Quantity", "1", "3")]
        );
    }

    #[test]
    fn test_time_and_customer_labels() {
        let tx = widget_sale();
        let mut draft = TransactionDraft::from_transaction(&tx);
        draft.timestamp = at(8, 30);
        draft.customer_name = Some("  Jane ".to_string());

        let edit = build_edit(&tx, draft, at(12, 0), utc());

        assert_eq!(
            edit.record.changes,
            vec![
                FieldChange::new("Time", "3/9/2025, 9:00:00 AM", "3/9/2025, 8:30:00 AM"),
                FieldChange::new("Customer Name", NO_CUSTOMER, "Jane"),
            ]
        );
        assert_eq!(edit.transaction.customer_name.as_deref(), Some("Jane"));
        assert_eq!(edit.transaction.timestamp, at(8, 30));
    }

    #[test]
    fn test_removed_line_reports_count_only() {
        let tx = widget_sale();
        let mut draft = TransactionDraft::from_transaction(&tx);
        assert!(draft.remove_line(1).is_some());
        assert!(draft.remove_line(5).is_none());

        let edit = build_edit(&tx, draft, at(12, 0), utc());

        assert_eq!(
            edit.record.changes,
            vec![FieldChange::new("Items Count", "2", "1")]
        );
        assert_eq!(edit.transaction.total_cents, 2000);
    }

    #[test]
    fn test_added_line_is_not_diffed_per_field() {
        let tx = widget_sale();
        let mut draft = TransactionDraft::from_transaction(&tx);
        draft.items.push(LineItem::new("Extra", Money::from_cents(100), 1));

        let changes = diff(&tx, &draft, utc());
        assert_eq!(changes, vec![FieldChange::new("Items Count", "2", "3")]);
    }

    #[test]
    fn test_history_is_append_only() {
        let tx = widget_sale();

        let mut first = TransactionDraft::from_transaction(&tx);
        first.items[0].name = "Big Widget".to_string();
        let once = build_edit(&tx, first, at(12, 0), utc()).transaction;

        let second = TransactionDraft::from_transaction(&once);
        let twice = build_edit(&once, second, at(13, 0), utc()).transaction;

        assert_eq!(twice.edit_history.len(), 2);
        assert_eq!(twice.edit_history[0], once.edit_history[0]);
        assert_eq!(
            twice.edit_history[0].changes,
            vec![FieldChange::new("Item 1 Name", "Widget", "Big Widget")]
        );
        // A no-op save still leaves an (empty) record.
        assert!(twice.edit_history[1].changes.is_empty());
        assert_eq!(twice.edit_history[1].timestamp, at(13, 0));
    }

    #[test]
    fn test_cancelled_flag_and_numbers_survive_edits() {
        let mut tx = widget_sale();
        tx.cancel().unwrap();

        let edit = build_edit(&tx, TransactionDraft::from_transaction(&tx), at(12, 0), utc());

        assert!(edit.transaction.cancelled);
        assert_eq!(edit.transaction.receipt_number.as_deref(), Some("2503090001"));
        assert_eq!(edit.transaction.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn test_negative_quantity_normalizes_to_zero() {
        let line = LineItem {
            name: "Oops".to_string(),
            price_cents: 300,
            quantity: -2,
            subtotal_cents: Some(-600),
        };
        let normalized = normalize_line(&line);
        assert_eq!(normalized.quantity, 0);
        assert_eq!(normalized.subtotal_cents, Some(0));
    }

    #[test]
    fn test_format_local_applies_offset() {
        let west = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(format_local(at(3, 7), west), "3/8/2025, 10:07:00 PM");
    }
}
