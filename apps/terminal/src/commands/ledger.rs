//! # Ledger Commands
//!
//! Loading the transaction set and every view derived from it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  storage ──load──► LedgerState (raw records)                            │
//! │                         │                                               │
//! │                         ├──► day_ledger / day_summary   (reconstruct)   │
//! │                         ├──► receipts / invoices                        │
//! │                         ├──► month_calendar                             │
//! │                         └──► render_transaction                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Views never cache their results. Each call reconstructs from the loaded
//! records, so an edit or cancellation shows up everywhere after one
//! refresh.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DbState, LedgerState};
use tally_core::calendar::{self, CalendarDay, DaySummary, DocumentLine};
use tally_core::ledger::{reconstruct, sort_chronologically, Ledger};
use tally_core::{DocumentType, PaymentMethod, Transaction};

/// Reloads every transaction of the shop into the ledger state.
pub async fn refresh_ledger(db: &DbState, ledger: &LedgerState, config: &ConfigState) -> ApiResult<usize> {
    let transactions = db.inner().transactions().load(&config.shop_id).await?;
    let count = transactions.len();
    ledger.replace(transactions);

    debug!(shop_id = %config.shop_id, count, "Ledger refreshed");
    Ok(count)
}

/// Refresh after a write that has already been committed.
///
/// The write stands even if the reload fails, so a failed reload only
/// patches the written record into the loaded set.
pub(crate) async fn refresh_after_write(
    db: &DbState,
    ledger: &LedgerState,
    config: &ConfigState,
    written: &Transaction,
) {
    if let Err(e) = refresh_ledger(db, ledger, config).await {
        warn!(tx_id = %written.id, error = %e, "Ledger reload failed after write; patching locally");
        ledger.upsert(written.clone());
    }
}

/// Every loaded transaction in ledger order.
pub fn all_transactions(ledger: &LedgerState) -> Ledger {
    ledger.with_transactions(reconstruct)
}

/// The reconstructed ledger for one calendar day.
pub fn day_ledger(ledger: &LedgerState, config: &ConfigState, date: NaiveDate) -> Ledger {
    ledger.with_transactions(|txs| reconstruct(&calendar::on_day(txs, date, config.offset())))
}

pub fn day_summary(ledger: &LedgerState, config: &ConfigState, date: NaiveDate) -> DaySummary {
    ledger.with_transactions(|txs| calendar::summarize_day(txs, date, config.offset()))
}

/// Summary for the shop's current day.
pub fn today_summary(ledger: &LedgerState, config: &ConfigState, now: DateTime<Utc>) -> DaySummary {
    day_summary(ledger, config, config.today(now))
}

/// Receipt lines (cash transactions), optionally limited to one day.
pub fn receipts(ledger: &LedgerState, config: &ConfigState, date: Option<NaiveDate>) -> Vec<DocumentLine> {
    calendar::receipt_lines(&in_scope(ledger, config, date))
}

/// Invoice lines (credit transactions), optionally limited to one day.
pub fn invoices(ledger: &LedgerState, config: &ConfigState, date: Option<NaiveDate>) -> Vec<DocumentLine> {
    calendar::invoice_lines(&in_scope(ledger, config, date))
}

fn in_scope(ledger: &LedgerState, config: &ConfigState, date: Option<NaiveDate>) -> Vec<Transaction> {
    ledger.with_transactions(|txs| {
        let selected = match date {
            Some(date) => calendar::on_day(txs, date, config.offset()),
            None => txs.to_vec(),
        };
        sort_chronologically(&selected)
    })
}

/// Month grid with transaction counts per day.
pub fn month_calendar(
    ledger: &LedgerState,
    config: &ConfigState,
    year: i32,
    month: u32,
    now: DateTime<Utc>,
) -> ApiResult<Vec<Option<CalendarDay>>> {
    let today = config.today(now);
    ledger
        .with_transactions(|txs| calendar::month_activity(txs, year, month, today, config.offset()))
        .ok_or_else(|| ApiError::validation(format!("Invalid month: {}-{:02}", year, month)))
}

/// Plain-text receipt, invoice or voucher for a loaded transaction.
pub fn render_transaction(ledger: &LedgerState, config: &ConfigState, id: &str) -> ApiResult<String> {
    let tx = ledger
        .find(id)
        .ok_or_else(|| ApiError::not_found("Transaction", id))?;
    Ok(calendar::render_document(&tx, &config.document_style()))
}

/// Text table of a day: one row per line item with the running balance.
pub fn format_day(summary: &DaySummary, config: &ConfigState) -> String {
    let money = |cents: i64| config.format_currency(cents);
    let ledger = &summary.ledger;
    let mut out = String::new();

    let _ = writeln!(out, "{} ledger for {}", config.shop_name, summary.date);
    let _ = writeln!(
        out,
        "{:<6} {:<11} {:<28} {:>4} {:>11} {:>11}  {}",
        "TIME", "NUMBER", "ITEM", "QTY", "SUBTOTAL", "BALANCE", "NOTE"
    );

    for row in &ledger.rows {
        let tx = ledger.transaction(&row.tx_id);
        let (time, number) = if row.is_first_of_transaction() {
            let time = row
                .timestamp
                .with_timezone(&config.offset())
                .format("%H:%M")
                .to_string();
            let number = tx.and_then(Transaction::document_number).unwrap_or("-");
            (time, number.to_string())
        } else {
            (String::new(), String::new())
        };

        let mut notes = Vec::new();
        match (row.document_type, row.payment_method) {
            (DocumentType::CashIn, _) => notes.push("cash in"),
            (DocumentType::CashOut, _) => notes.push("cash out"),
            (DocumentType::Sale, PaymentMethod::Credit) => notes.push("credit"),
            (DocumentType::Sale, PaymentMethod::Cash) => {}
        }
        if row.cancelled {
            notes.push("CANCELLED");
        }
        if row.edited && row.is_first_of_transaction() {
            notes.push("edited");
        }

        let balance = row
            .running_balance
            .map(|b| money(b.cents()))
            .unwrap_or_else(|| "-".to_string());

        let _ = writeln!(
            out,
            "{:<6} {:<11} {:<28} {:>4} {:>11} {:>11}  {}",
            time,
            number,
            row.item.name,
            row.item.quantity,
            money(row.item.subtotal().cents()),
            balance,
            notes.join(", ")
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Transactions:    {}", summary.transaction_count());
    let _ = writeln!(out, "Cash sales:      {}", money(summary.cash_sales.cents()));
    let _ = writeln!(out, "Credit sales:    {}", money(summary.credit_sales.cents()));
    let _ = writeln!(out, "Closing balance: {}", money(summary.closing_balance().cents()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tally_core::{CashDirection, LineItem, Money};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 9, h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    fn scenario() -> LedgerState {
        let state = LedgerState::new();
        state.replace(vec![
            Transaction::sale(
                "tx_c",
                "shop",
                at(11, 0),
                Some("Jane".into()),
                vec![LineItem::new("Cake", Money::from_cents(1500), 1)],
                PaymentMethod::Credit,
                "2503090003",
            ),
            Transaction::sale(
                "tx_a",
                "shop",
                at(9, 0),
                None,
                vec![LineItem::new("Coffee", Money::from_cents(350), 2)],
                PaymentMethod::Cash,
                "2503090001",
            ),
            Transaction::cash_movement(
                "tx_b",
                "shop",
                at(10, 0),
                CashDirection::Out,
                "Supplies",
                Money::from_cents(2000),
                "2503090002",
            ),
        ]);
        state
    }

    #[test]
    fn test_day_ledger_balances() {
        let ledger = day_ledger(&scenario(), &ConfigState::default(), day());

        let balances: Vec<Option<i64>> = ledger
            .rows
            .iter()
            .map(|r| r.running_balance.map(|m| m.cents()))
            .collect();
        assert_eq!(balances, vec![Some(700), Some(-1300), None]);
    }

    #[test]
    fn test_receipts_and_invoices_split_by_method() {
        let state = scenario();
        let config = ConfigState::default();

        let cash_lines = receipts(&state, &config, Some(day()));
        assert_eq!(cash_lines.len(), 2);
        assert_eq!(cash_lines[0].document_number.as_deref(), Some("2503090001"));

        let credit_lines = invoices(&state, &config, None);
        assert_eq!(credit_lines.len(), 1);
        assert_eq!(credit_lines[0].customer_name.as_deref(), Some("Jane"));

        let other_day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert!(receipts(&state, &config, Some(other_day)).is_empty());
    }

    #[test]
    fn test_month_calendar_rejects_bad_month() {
        let err = month_calendar(&scenario(), &ConfigState::default(), 2025, 13, at(12, 0)).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);

        let slots = month_calendar(&scenario(), &ConfigState::default(), 2025, 3, at(12, 0)).unwrap();
        let ninth = slots.iter().flatten().find(|d| d.day == 9).unwrap();
        assert_eq!(ninth.transaction_count, 3);
        assert!(ninth.is_today);
    }

    #[test]
    fn test_format_day_lists_rows_and_totals() {
        let config = ConfigState::default();
        let summary = day_summary(&scenario(), &config, day());
        let text = format_day(&summary, &config);

        assert!(text.contains("2503090001"));
        assert!(text.contains("Cash Out: Supplies"));
        assert!(text.contains("-$13.00"));
        assert!(text.contains("Credit sales:    $15.00"));
        assert!(text.contains("Closing balance: -$13.00"));
    }

    #[test]
    fn test_render_unknown_transaction_is_not_found() {
        let err = render_transaction(&scenario(), &ConfigState::default(), "tx_missing").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }
}
