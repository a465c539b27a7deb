//! # Validation Module
//!
//! Input and record validation for Tally POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Operator input (THIS MODULE)                                 │
//! │  ├── item name / price, quick-sale lines                               │
//! │  ├── cash movement reason / amount                                     │
//! │  └── customer name for credit                                          │
//! │           │  runs before any storage call                               │
//! │           ▼                                                             │
//! │  Layer 2: Record invariants (THIS MODULE)                              │
//! │  ├── receipt XOR invoice number per payment method                     │
//! │  └── total == Σ line subtotals                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── PRIMARY KEY (duplicate transaction ids)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failure here means nothing was written.
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{parse_cash_amount, validate_cash_reason};
//!
//! assert_eq!(validate_cash_reason("  Supplies ").unwrap(), "Supplies");
//! assert_eq!(parse_cash_amount("20").unwrap().cents(), 2000);
//! assert!(parse_cash_amount("0").is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentMethod, Transaction};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_REASON_LEN: usize = 200;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

fn parse_amount(field: &str, input: &str) -> ValidationResult<Money> {
    if input.trim().is_empty() {
        return Err(required(field));
    }

    Money::parse_decimal(input).ok_or_else(|| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a number with at most two decimals".to_string(),
    })
}

// =============================================================================
// Catalog and Cart
// =============================================================================

/// Validates an item name and returns it trimmed.
///
/// ```rust
/// use tally_core::validation::validate_item_name;
///
/// assert_eq!(validate_item_name(" Coffee ").unwrap(), "Coffee");
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<String> {
    required_text("name", name, MAX_NAME_LEN)
}

/// Validates a price in cents.
///
/// Zero is allowed (free items); negatives are only produced internally by
/// cash-out vouchers.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Parses an operator-entered item price such as `"3.50"`.
pub fn parse_item_price(input: &str) -> ValidationResult<Money> {
    let price = parse_amount("price", input)?;
    validate_price_cents(price.cents())?;
    Ok(price)
}

/// Validates a cart quantity (1..=999).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that one more line fits in the current sale.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Cash Movements
// =============================================================================

/// Validates a cash-in/cash-out reason and returns it trimmed.
pub fn validate_cash_reason(reason: &str) -> ValidationResult<String> {
    required_text("reason", reason, MAX_REASON_LEN)
}

/// Parses a cash movement amount. Must be strictly positive; the direction
/// supplies the sign.
pub fn parse_cash_amount(input: &str) -> ValidationResult<Money> {
    let amount = parse_amount("amount", input)?;

    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(amount)
}

// =============================================================================
// Sales
// =============================================================================

/// Checks the customer rule for a payment method.
///
/// Returns the trimmed name, or `None` when it is blank and not required.
///
/// ```rust
/// use tally_core::validation::validate_customer;
/// use tally_core::{CoreError, PaymentMethod};
///
/// assert_eq!(validate_customer(PaymentMethod::Cash, Some("  ")).unwrap(), None);
/// assert!(matches!(
///     validate_customer(PaymentMethod::Credit, None),
///     Err(CoreError::CustomerRequired)
/// ));
/// ```
pub fn validate_customer(method: PaymentMethod, name: Option<&str>) -> CoreResult<Option<String>> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());

    match (method, name) {
        (PaymentMethod::Credit, None) => Err(CoreError::CustomerRequired),
        (_, name) => Ok(name.map(str::to_string)),
    }
}

/// Checks the stored-record invariants of a transaction.
///
/// - sales: receipt number for cash, invoice number for credit, never both
/// - cash-in/cash-out: receipt number and cash method, no invoice number
/// - `total_cents` equals the sum of line subtotals
pub fn validate_transaction(tx: &Transaction) -> CoreResult<()> {
    let mismatch = |reason: &str| CoreError::DocumentNumberMismatch {
        id: tx.id.clone(),
        reason: reason.to_string(),
    };

    let has_receipt = tx.receipt_number.as_deref().is_some_and(|n| !n.is_empty());
    let has_invoice = tx.invoice_number.as_deref().is_some_and(|n| !n.is_empty());

    if tx.document_type.is_cash_movement() {
        if tx.payment_method != PaymentMethod::Cash {
            return Err(mismatch("cash movements must use the cash method"));
        }
        if !has_receipt || has_invoice {
            return Err(mismatch("cash movements carry a receipt number only"));
        }
    } else {
        match tx.payment_method {
            PaymentMethod::Cash if !has_receipt || has_invoice => {
                return Err(mismatch("cash sales carry a receipt number only"));
            }
            PaymentMethod::Credit if !has_invoice || has_receipt => {
                return Err(mismatch("credit sales carry an invoice number only"));
            }
            _ => {}
        }
    }

    let expected = tx.items_total();
    if tx.total() != expected {
        return Err(CoreError::TotalMismatch {
            id: tx.id.clone(),
            total: tx.total_cents,
            expected: expected.cents(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CashDirection, LineItem};
    use chrono::{TimeZone, Utc};

    fn sale(method: PaymentMethod) -> Transaction {
        Transaction::sale(
            "tx_1",
            "shop",
            Utc.with_ymd_and_hms(2025, 3, 9, 9, 0, 0).unwrap(),
            Some("Jane".to_string()),
            vec![LineItem::new("Coffee", Money::from_cents(350), 2)],
            method,
            "2503090001",
        )
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Coffee").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_parse_item_price() {
        assert_eq!(parse_item_price("3.50").unwrap().cents(), 350);
        assert_eq!(parse_item_price("0").unwrap().cents(), 0);
        assert!(matches!(
            parse_item_price(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_item_price("abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_item_price("-1"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }

    #[test]
    fn test_cash_inputs() {
        assert!(validate_cash_reason("").is_err());
        assert_eq!(parse_cash_amount("12.5").unwrap().cents(), 1250);
        assert!(matches!(
            parse_cash_amount("-5"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            parse_cash_amount("  "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_customer() {
        assert_eq!(
            validate_customer(PaymentMethod::Credit, Some(" Jane ")).unwrap(),
            Some("Jane".to_string())
        );
        assert!(validate_customer(PaymentMethod::Credit, Some("   ")).is_err());
        assert_eq!(validate_customer(PaymentMethod::Cash, None).unwrap(), None);
    }

    #[test]
    fn test_validate_transaction_document_numbers() {
        assert!(validate_transaction(&sale(PaymentMethod::Cash)).is_ok());
        assert!(validate_transaction(&sale(PaymentMethod::Credit)).is_ok());

        let mut both = sale(PaymentMethod::Cash);
        both.invoice_number = Some("2503090002".to_string());
        assert!(matches!(
            validate_transaction(&both),
            Err(CoreError::DocumentNumberMismatch { .. })
        ));

        let mut credit_without_invoice = sale(PaymentMethod::Credit);
        credit_without_invoice.invoice_number = None;
        assert!(validate_transaction(&credit_without_invoice).is_err());

        let out = Transaction::cash_movement(
            "tx_2",
            "shop",
            Utc.with_ymd_and_hms(2025, 3, 9, 10, 0, 0).unwrap(),
            CashDirection::Out,
            "Supplies",
            Money::from_cents(2000),
            "2503090002",
        );
        assert!(validate_transaction(&out).is_ok());

        let mut credit_voucher = out.clone();
        credit_voucher.payment_method = PaymentMethod::Credit;
        assert!(validate_transaction(&credit_voucher).is_err());
    }

    #[test]
    fn test_validate_transaction_total() {
        let mut tx = sale(PaymentMethod::Cash);
        tx.total_cents = 650;
        match validate_transaction(&tx) {
            Err(CoreError::TotalMismatch { total, expected, .. }) => {
                assert_eq!(total, 650);
                assert_eq!(expected, 700);
            }
            other => panic!("expected TotalMismatch, got {:?}", other),
        }
    }
}
