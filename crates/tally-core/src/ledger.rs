//! # Ledger Reconstruction
//!
//! Turns an unordered set of transactions into the cash drawer ledger:
//! one row per line item, in time order, with a running cash balance.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      reconstruct(&transactions)                         │
//! │                                                                         │
//! │  [tx C 11:00] [tx A 09:00] [tx B 10:00]      (any order from storage)   │
//! │       │                                                                 │
//! │       ▼  sort by (timestamp, id), stable                                │
//! │  [tx A 09:00] [tx B 10:00] [tx C 11:00]                                 │
//! │       │                                                                 │
//! │       ▼  per line item, balance += subtotal if cash and not cancelled   │
//! │  row A#0  Coffee ×2      7.00   balance   7.00                          │
//! │  row B#0  Cash Out     -20.00   balance -13.00                          │
//! │  row C#0  Invoice       15.00   balance      -   (credit)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no stored balance anywhere. The ledger is rebuilt from the
//! transaction set on every refresh, so a cancel or an edit (including a
//! moved timestamp) shows up as soon as the caller re-runs this.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DocumentType, LineItem, PaymentMethod, Transaction};
use crate::NO_ITEMS_PLACEHOLDER;

/// One display row: a single line item of a single transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerRow {
    /// Parent transaction id.
    pub tx_id: String,

    /// Parent transaction timestamp.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// The line with defaults applied and its subtotal filled in.
    pub item: LineItem,

    /// Position of this line within its transaction.
    pub item_index: usize,

    /// Number of rows emitted for the parent transaction.
    pub total_items: usize,

    pub payment_method: PaymentMethod,
    pub cancelled: bool,

    /// True when the parent has at least one edit record.
    pub edited: bool,

    pub document_type: DocumentType,

    /// Drawer balance after this row, or `None` when the row does not move
    /// the drawer (credit or cancelled).
    pub running_balance: Option<Money>,
}

impl LedgerRow {
    /// True for the first row of a transaction (where receipts are labelled).
    pub fn is_first_of_transaction(&self) -> bool {
        self.item_index == 0
    }
}

/// Result of a reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ledger {
    /// Input transactions in ledger order.
    pub transactions: Vec<Transaction>,

    /// Flat rows in ledger order.
    pub rows: Vec<LedgerRow>,
}

impl Ledger {
    /// Balance after the last cash-affecting row (zero if none).
    pub fn closing_balance(&self) -> Money {
        self.rows
            .iter()
            .rev()
            .find_map(|r| r.running_balance)
            .unwrap_or_default()
    }

    /// Looks up a transaction by id.
    pub fn transaction(&self, tx_id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == tx_id)
    }

    /// Rows belonging to one transaction.
    pub fn rows_for<'a>(&'a self, tx_id: &'a str) -> impl Iterator<Item = &'a LedgerRow> + 'a {
        self.rows.iter().filter(move |r| r.tx_id == tx_id)
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Sorts transactions into ledger order.
///
/// Timestamp ascending; equal timestamps fall back to transaction id, and
/// the sort is stable so identical keys keep input order.
pub fn sort_chronologically(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted
}

/// Rebuilds the ledger from scratch.
///
/// Pure: same input, same rows, same balances.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use tally_core::ledger::reconstruct;
/// use tally_core::{CashDirection, Money, Transaction};
///
/// let out = Transaction::cash_movement(
///     "tx_1", "shop",
///     Utc.with_ymd_and_hms(2025, 3, 9, 10, 0, 0).unwrap(),
///     CashDirection::Out, "Supplies", Money::from_cents(2000), "2503090001",
/// );
/// let ledger = reconstruct(&[out]);
/// assert_eq!(ledger.closing_balance(), Money::from_cents(-2000));
/// ```
pub fn reconstruct(transactions: &[Transaction]) -> Ledger {
    let sorted = sort_chronologically(transactions);

    let mut balance = Money::zero();
    let mut rows = Vec::new();

    for tx in &sorted {
        let moves_drawer = tx.affects_cash_balance();
        let edited = tx.is_edited();
        let lines = display_lines(tx);
        let total_items = lines.len();

        for (item_index, item) in lines.into_iter().enumerate() {
            let running_balance = if moves_drawer {
                balance += item.subtotal();
                Some(balance)
            } else {
                None
            };

            rows.push(LedgerRow {
                tx_id: tx.id.clone(),
                timestamp: tx.timestamp,
                item,
                item_index,
                total_items,
                payment_method: tx.payment_method,
                cancelled: tx.cancelled,
                edited,
                document_type: tx.document_type,
                running_balance,
            });
        }
    }

    Ledger {
        transactions: sorted,
        rows,
    }
}

/// Lines to display for a transaction, with subtotals filled in.
///
/// A transaction without lines is malformed but must stay visible, so it
/// gets a single placeholder line carrying its stored total.
fn display_lines(tx: &Transaction) -> Vec<LineItem> {
    if tx.items.is_empty() {
        return vec![LineItem {
            name: NO_ITEMS_PLACEHOLDER.to_string(),
            price_cents: 0,
            quantity: 0,
            subtotal_cents: Some(tx.total_cents),
        }];
    }

    tx.items
        .iter()
        .map(|line| LineItem {
            subtotal_cents: Some(line.subtotal().cents()),
            ..line.clone()
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CashDirection, EditRecord};
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 9, h, m, 0).unwrap()
    }

    fn cash_sale(id: &str, ts: DateTime<Utc>, lines: Vec<LineItem>) -> Transaction {
        Transaction::sale(id, "shop", ts, None, lines, PaymentMethod::Cash, "2503090001")
    }

    fn scenario() -> Vec<Transaction> {
        let coffee = cash_sale(
            "tx_coffee",
            at(9, 0),
            vec![LineItem::new("Coffee", Money::from_cents(350), 2)],
        );
        let supplies = Transaction::cash_movement(
            "tx_supplies",
            "shop",
            at(10, 0),
            CashDirection::Out,
            "Supplies",
            Money::from_cents(2000),
            "2503090002",
        );
        let jane = Transaction::sale(
            "tx_jane",
            "shop",
            at(11, 0),
            Some("Jane".to_string()),
            vec![LineItem::new("Invoice", Money::from_cents(1500), 1)],
            PaymentMethod::Credit,
            "2503090003",
        );
        // Deliberately out of order.
        vec![jane, coffee, supplies]
    }

    #[test]
    fn test_coffee_supplies_jane_scenario() {
        let ledger = reconstruct(&scenario());

        let balances: Vec<Option<i64>> = ledger
            .rows
            .iter()
            .map(|r| r.running_balance.map(|m| m.cents()))
            .collect();
        assert_eq!(balances, vec![Some(700), Some(-1300), None]);

        let ids: Vec<&str> = ledger.rows.iter().map(|r| r.tx_id.as_str()).collect();
        assert_eq!(ids, vec!["tx_coffee", "tx_supplies", "tx_jane"]);
        assert_eq!(ledger.rows[1].document_type, DocumentType::CashOut);
        assert_eq!(ledger.closing_balance().cents(), -1300);
    }

    #[test]
    fn test_reconstruction_is_idempotent() {
        let input = scenario();
        assert_eq!(reconstruct(&input), reconstruct(&input));
    }

    #[test]
    fn test_running_balance_is_prefix_sum() {
        let subtotals = [120_i64, 455, 999, 1, 10_000];
        let txs: Vec<Transaction> = subtotals
            .iter()
            .enumerate()
            .map(|(i, cents)| {
                cash_sale(
                    &format!("tx_{i}"),
                    at(8 + i as u32, 0),
                    vec![LineItem::new("Thing", Money::from_cents(*cents), 1)],
                )
            })
            .rev()
            .collect();

        let ledger = reconstruct(&txs);
        let mut expected = 0;
        for (row, cents) in ledger.rows.iter().zip(subtotals) {
            expected += cents;
            assert_eq!(row.running_balance, Some(Money::from_cents(expected)));
        }
    }

    #[test]
    fn test_multi_line_transaction_accumulates_per_line() {
        let tx = cash_sale(
            "tx_1",
            at(9, 0),
            vec![
                LineItem::new("Bread", Money::from_cents(300), 1),
                LineItem::new("Milk", Money::from_cents(150), 2),
            ],
        );
        let ledger = reconstruct(&[tx]);

        assert_eq!(ledger.rows.len(), 2);
        assert_eq!(ledger.rows[0].running_balance, Some(Money::from_cents(300)));
        assert_eq!(ledger.rows[1].running_balance, Some(Money::from_cents(600)));
        assert_eq!(ledger.rows[1].item_index, 1);
        assert_eq!(ledger.rows[1].total_items, 2);
        assert!(ledger.rows[0].is_first_of_transaction());
    }

    #[test]
    fn test_cancelled_rows_keep_their_lines_but_not_the_drawer() {
        let mut txs = scenario();
        let coffee = txs.iter_mut().find(|t| t.id == "tx_coffee").unwrap();
        coffee.cancel().unwrap();

        let ledger = reconstruct(&txs);
        let coffee_row = ledger.rows_for("tx_coffee").next().unwrap();

        assert!(coffee_row.cancelled);
        assert_eq!(coffee_row.running_balance, None);
        assert_eq!(coffee_row.item.subtotal_cents, Some(700));
        assert_eq!(ledger.transactions.len(), 3);
        assert_eq!(ledger.closing_balance().cents(), -2000);
    }

    #[test]
    fn test_empty_items_yield_one_placeholder_row() {
        let mut tx = cash_sale("tx_empty", at(9, 0), Vec::new());
        tx.total_cents = 1234;

        let ledger = reconstruct(&[tx]);

        assert_eq!(ledger.rows.len(), 1);
        let row = &ledger.rows[0];
        assert_eq!(row.item.name, NO_ITEMS_PLACEHOLDER);
        assert_eq!(row.item.quantity, 0);
        assert_eq!(row.item.price_cents, 0);
        assert_eq!(row.item.subtotal_cents, Some(1234));
        assert_eq!(row.total_items, 1);
        assert_eq!(row.running_balance, Some(Money::from_cents(1234)));
    }

    #[test]
    fn test_missing_subtotal_is_recomputed() {
        let tx = cash_sale(
            "tx_1",
            at(9, 0),
            vec![LineItem {
                name: "Loose".to_string(),
                price_cents: 250,
                quantity: 3,
                subtotal_cents: None,
            }],
        );
        let ledger = reconstruct(&[tx]);
        assert_eq!(ledger.rows[0].item.subtotal_cents, Some(750));
        assert_eq!(ledger.rows[0].running_balance, Some(Money::from_cents(750)));
    }

    #[test]
    fn test_moving_a_timestamp_reorders_the_balance() {
        let mut txs = scenario();
        let supplies = txs.iter_mut().find(|t| t.id == "tx_supplies").unwrap();
        supplies.timestamp = at(8, 0);

        let ledger = reconstruct(&txs);
        assert_eq!(ledger.rows[0].tx_id, "tx_supplies");
        assert_eq!(ledger.rows[0].running_balance, Some(Money::from_cents(-2000)));
        assert_eq!(ledger.rows[1].running_balance, Some(Money::from_cents(-1300)));
    }

    #[test]
    fn test_equal_timestamps_break_ties_by_id() {
        let b = cash_sale("tx_b", at(9, 0), vec![LineItem::new("B", Money::from_cents(100), 1)]);
        let a = cash_sale("tx_a", at(9, 0), vec![LineItem::new("A", Money::from_cents(200), 1)]);

        let ledger = reconstruct(&[b, a]);
        assert_eq!(ledger.rows[0].tx_id, "tx_a");
        assert_eq!(ledger.rows[1].tx_id, "tx_b");
    }

    #[test]
    fn test_edited_flag_follows_history() {
        let mut tx = cash_sale("tx_1", at(9, 0), vec![LineItem::new("A", Money::from_cents(100), 1)]);
        tx.edit_history.push(EditRecord {
            timestamp: at(12, 0),
            changes: Vec::new(),
            old_total_cents: 100,
            new_total_cents: 100,
        });

        let ledger = reconstruct(&[tx]);
        assert!(ledger.rows[0].edited);
    }

    #[test]
    fn test_out_of_range_stored_price_does_not_panic() {
        let json = r#"{
            "id": "tx_huge",
            "shop_id": "shop",
            "timestamp": "2025-03-09T09:00:00Z",
            "customer_name": null,
            "items": [{"name": "Typo", "price_cents": 1e30, "quantity": 2}],
            "total_cents": 1e30,
            "payment_method": "cash",
            "receipt_number": "2503090001",
            "invoice_number": null
        }"#;
        let huge: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(huge.items[0].price_cents, i64::MAX);

        let later = cash_sale("tx_later", at(10, 0), vec![LineItem::new("A", Money::from_cents(100), 1)]);

        let ledger = reconstruct(&[huge, later]);
        assert_eq!(ledger.rows.len(), 2);
        assert_eq!(ledger.rows[0].item.subtotal_cents, Some(i64::MAX));
        assert_eq!(ledger.rows[1].running_balance, Some(Money::from_cents(i64::MAX)));
    }

    #[test]
    fn test_empty_input() {
        let ledger = reconstruct(&[]);
        assert!(ledger.is_empty());
        assert!(ledger.rows.is_empty());
        assert_eq!(ledger.closing_balance(), Money::zero());
    }
}
