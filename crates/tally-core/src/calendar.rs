//! # Day, Month and Document Views
//!
//! Read-only projections of the transaction set used by the operator
//! screens: today's ledger, day totals, the receipts and invoices lists,
//! the month calendar and printable documents.
//!
//! Calendar days are computed in the shop's fixed UTC offset. "Today" is
//! always passed in by the caller.

use std::fmt::Write as _;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::audit::format_local;
use crate::ledger::{self, Ledger};
use crate::money::Money;
use crate::types::{DocumentType, LineItem, PaymentMethod, Transaction};

/// Calendar day of an instant in the shop's offset.
pub fn local_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}

/// Transactions that fall on `date`, in input order.
pub fn on_day(transactions: &[Transaction], date: NaiveDate, offset: FixedOffset) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| local_date(tx.timestamp, offset) == date)
        .cloned()
        .collect()
}

// =============================================================================
// Day Summary
// =============================================================================

/// Totals and ledger for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DaySummary {
    #[ts(as = "String")]
    pub date: NaiveDate,

    /// Sum of totals of non-cancelled cash transactions (movements included).
    pub cash_sales: Money,

    /// Sum of totals of non-cancelled credit transactions.
    pub credit_sales: Money,

    pub ledger: Ledger,
}

impl DaySummary {
    pub fn transaction_count(&self) -> usize {
        self.ledger.transactions.len()
    }

    /// Drawer balance at the end of the day.
    pub fn closing_balance(&self) -> Money {
        self.ledger.closing_balance()
    }
}

/// Builds the summary for `date`.
pub fn summarize_day(transactions: &[Transaction], date: NaiveDate, offset: FixedOffset) -> DaySummary {
    let day = on_day(transactions, date, offset);

    let total_for = |method: PaymentMethod| -> Money {
        day.iter()
            .filter(|tx| !tx.cancelled && tx.payment_method == method)
            .map(Transaction::total)
            .sum()
    };

    DaySummary {
        date,
        cash_sales: total_for(PaymentMethod::Cash),
        credit_sales: total_for(PaymentMethod::Credit),
        ledger: ledger::reconstruct(&day),
    }
}

// =============================================================================
// Receipts / Invoices Lists
// =============================================================================

/// One row of the receipts or invoices list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentLine {
    pub tx_id: String,
    pub document_number: Option<String>,
    pub customer_name: Option<String>,
    pub item: LineItem,
    pub cancelled: bool,
}

fn document_lines(transactions: &[Transaction], method: PaymentMethod) -> Vec<DocumentLine> {
    transactions
        .iter()
        .filter(|tx| tx.payment_method == method)
        .flat_map(|tx| {
            tx.items.iter().map(move |item| DocumentLine {
                tx_id: tx.id.clone(),
                document_number: tx.document_number().map(str::to_string),
                customer_name: tx.customer().map(str::to_string),
                item: LineItem {
                    subtotal_cents: Some(item.subtotal().cents()),
                    ..item.clone()
                },
                cancelled: tx.cancelled,
            })
        })
        .collect()
}

/// Every line of every cash transaction, with its receipt number.
pub fn receipt_lines(transactions: &[Transaction]) -> Vec<DocumentLine> {
    document_lines(transactions, PaymentMethod::Cash)
}

/// Every line of every credit transaction, with its invoice number.
pub fn invoice_lines(transactions: &[Transaction]) -> Vec<DocumentLine> {
    document_lines(transactions, PaymentMethod::Credit)
}

// =============================================================================
// Month Calendar
// =============================================================================

/// One day cell of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalendarDay {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub day: u32,
    pub transaction_count: usize,
    pub is_today: bool,
}

/// Month grid with Sunday-first weeks.
///
/// `slots` starts with one `None` per weekday before the 1st, followed by
/// every day of the month. Returns `None` for an invalid month.
///
/// ```rust
/// use chrono::{FixedOffset, NaiveDate};
/// use tally_core::calendar::month_activity;
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
/// let utc = FixedOffset::east_opt(0).unwrap();
/// let slots = month_activity(&[], 2025, 3, today, utc).unwrap();
///
/// // March 1st 2025 is a Saturday.
/// assert!(slots[..6].iter().all(Option::is_none));
/// assert_eq!(slots.len(), 6 + 31);
/// ```
pub fn month_activity(
    transactions: &[Transaction],
    year: i32,
    month: u32,
    today: NaiveDate,
    offset: FixedOffset,
) -> Option<Vec<Option<CalendarDay>>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let leading = first.weekday().num_days_from_sunday() as usize;

    let mut slots: Vec<Option<CalendarDay>> = vec![None; leading];
    let days = first
        .iter_days()
        .take_while(|d| d.month() == month && d.year() == year);

    for date in days {
        let transaction_count = transactions
            .iter()
            .filter(|tx| local_date(tx.timestamp, offset) == date)
            .count();
        slots.push(Some(CalendarDay {
            date,
            day: date.day(),
            transaction_count,
            is_today: date == today,
        }));
    }

    Some(slots)
}

// =============================================================================
// Printable Document
// =============================================================================

/// Settings for [`render_document`].
#[derive(Debug, Clone)]
pub struct DocumentStyle<'a> {
    pub shop_name: &'a str,
    pub currency_symbol: &'a str,
    pub offset: FixedOffset,
}

/// Renders a receipt, invoice or cash voucher as plain text.
pub fn render_document(tx: &Transaction, style: &DocumentStyle<'_>) -> String {
    let money = |m: Money| m.format_with(style.currency_symbol);

    let (title, number_label, total_label) = match (tx.document_type, tx.payment_method) {
        (DocumentType::CashIn, _) => ("CASH IN VOUCHER", "Voucher #", "Amount"),
        (DocumentType::CashOut, _) => ("CASH OUT VOUCHER", "Voucher #", "Amount"),
        (DocumentType::Sale, PaymentMethod::Cash) => ("RECEIPT", "Receipt #", "Total"),
        (DocumentType::Sale, PaymentMethod::Credit) => ("INVOICE", "Invoice #", "Amount Due"),
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", style.shop_name);
    let _ = writeln!(out, "{}", title);
    if let Some(number) = tx.document_number() {
        let _ = writeln!(out, "{}: {}", number_label, number);
    }
    let _ = writeln!(out, "{}", format_local(tx.timestamp, style.offset));
    if let Some(customer) = tx.customer() {
        let _ = writeln!(out, "Customer: {}", customer);
    }
    if tx.cancelled {
        let _ = writeln!(out, "*** CANCELLED ***");
    }
    if tx.is_edited() {
        let _ = writeln!(out, "EDITED ({})", tx.edit_history.len());
    }
    let _ = writeln!(out, "----------------------------------------");
    for item in &tx.items {
        let _ = writeln!(
            out,
            "{} x{}  {}",
            item.name,
            item.quantity,
            money(item.subtotal())
        );
    }
    let _ = writeln!(out, "----------------------------------------");
    let _ = writeln!(out, "{}: {}", total_label, money(tx.total()));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CashDirection;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn sale(id: &str, d: u32, h: u32, cents: i64, method: PaymentMethod) -> Transaction {
        let customer = (method == PaymentMethod::Credit).then(|| "Jane".to_string());
        Transaction::sale(
            id,
            "shop",
            Utc.with_ymd_and_hms(2025, 3, d, h, 0, 0).unwrap(),
            customer,
            vec![LineItem::new("Thing", Money::from_cents(cents), 1)],
            method,
            format!("2503{:02}0001", d),
        )
    }

    #[test]
    fn test_on_day_respects_offset() {
        let late = sale("late", 9, 23, 100, PaymentMethod::Cash);
        let txs = vec![late];

        assert_eq!(on_day(&txs, day(9), utc()).len(), 1);

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert!(on_day(&txs, day(9), plus_two).is_empty());
        assert_eq!(on_day(&txs, day(10), plus_two).len(), 1);
    }

    #[test]
    fn test_summarize_day() {
        let mut cancelled = sale("c", 9, 12, 9_900, PaymentMethod::Cash);
        cancelled.cancel().unwrap();
        let out = Transaction::cash_movement(
            "out",
            "shop",
            Utc.with_ymd_and_hms(2025, 3, 9, 10, 0, 0).unwrap(),
            CashDirection::Out,
            "Supplies",
            Money::from_cents(2000),
            "2503090002",
        );
        let txs = vec![
            sale("a", 9, 9, 700, PaymentMethod::Cash),
            out,
            sale("b", 9, 11, 1500, PaymentMethod::Credit),
            cancelled,
            sale("other_day", 8, 9, 5000, PaymentMethod::Cash),
        ];

        let summary = summarize_day(&txs, day(9), utc());

        assert_eq!(summary.transaction_count(), 4);
        assert_eq!(summary.cash_sales.cents(), -1300);
        assert_eq!(summary.credit_sales.cents(), 1500);
        assert_eq!(summary.closing_balance().cents(), -1300);
    }

    #[test]
    fn test_receipt_and_invoice_lines() {
        let txs = vec![
            sale("a", 9, 9, 700, PaymentMethod::Cash),
            sale("b", 9, 11, 1500, PaymentMethod::Credit),
        ];

        let receipts = receipt_lines(&txs);
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].document_number.as_deref(), Some("2503090001"));
        assert_eq!(receipts[0].customer_name, None);

        let invoices = invoice_lines(&txs);
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].tx_id, "b");
        assert_eq!(invoices[0].customer_name.as_deref(), Some("Jane"));
        assert_eq!(invoices[0].item.subtotal_cents, Some(1500));
    }

    #[test]
    fn test_month_activity_counts_and_today() {
        let txs = vec![
            sale("a", 9, 9, 700, PaymentMethod::Cash),
            sale("b", 9, 11, 1500, PaymentMethod::Credit),
            sale("c", 1, 11, 100, PaymentMethod::Cash),
        ];

        let slots = month_activity(&txs, 2025, 3, day(9), utc()).unwrap();
        let days: Vec<&CalendarDay> = slots.iter().flatten().collect();

        assert_eq!(days.len(), 31);
        assert_eq!(days[0].transaction_count, 1);
        assert_eq!(days[8].transaction_count, 2);
        assert!(days[8].is_today);
        assert_eq!(days.iter().filter(|d| d.is_today).count(), 1);

        assert!(month_activity(&txs, 2025, 13, day(9), utc()).is_none());
    }

    #[test]
    fn test_month_starting_on_sunday_has_no_leading_slots() {
        // June 1st 2025 is a Sunday.
        let slots = month_activity(&[], 2025, 6, day(9), utc()).unwrap();
        assert!(slots[0].is_some());
        assert_eq!(slots.len(), 30);
    }

    #[test]
    fn test_render_document_markers() {
        let mut tx = sale("b", 9, 11, 1500, PaymentMethod::Credit);
        tx.cancel().unwrap();

        let style = DocumentStyle {
            shop_name: "Corner Shop",
            currency_symbol: "$",
            offset: utc(),
        };
        let text = render_document(&tx, &style);

        assert!(text.starts_with("Corner Shop\nINVOICE\n"));
        assert!(text.contains("Invoice #: 2503090001"));
        assert!(text.contains("3/9/2025, 11:00:00 AM"));
        assert!(text.contains("Customer: Jane"));
        assert!(text.contains("*** CANCELLED ***"));
        assert!(!text.contains("EDITED"));
        assert!(text.contains("Thing x1  $15.00"));
        assert!(text.ends_with("Amount Due: $15.00\n"));
    }
}
