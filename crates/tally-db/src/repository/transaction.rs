//! # Transaction Repository
//!
//! Ledger storage: one row per transaction, with its line items and edit
//! history as JSON columns.
//!
//! ## Reading Is Forgiving
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stored row                        Loaded Transaction                   │
//! │  ──────────                        ──────────────────                   │
//! │  items = '[{"price":"x"}]'    ──►  price 0, subtotal recomputed         │
//! │  items = 'not json'           ──►  items = []  (ledger shows a          │
//! │                                               placeholder row)          │
//! │  edit_history = NULL          ──►  []                                   │
//! │  total_cents = 'abc'          ──►  0                                    │
//! │  cancelled = 'yes'            ──►  false                                │
//! │  payment_method = 'bogus'     ──►  cash                                 │
//! │  timestamp = 'garbage'        ──►  1970-01-01T00:00:00Z                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Every coercion is logged at `warn`. A historical record never stops the
//! ledger from loading.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use tally_core::{DocumentType, PaymentMethod, Transaction};

// The tables are not STRICT, so any column can hold any storage class.
// Every column is cast to the type the row decodes; the integer columns
// also report their stored type for the coercion warning.
const SELECT_COLUMNS: &str = r#"
    SELECT id, shop_id,
           CAST(timestamp AS TEXT) AS timestamp,
           CAST(customer_name AS TEXT) AS customer_name,
           CAST(payment_method AS TEXT) AS payment_method,
           CAST(type AS TEXT) AS type,
           CAST(receipt_number AS TEXT) AS receipt_number,
           CAST(invoice_number AS TEXT) AS invoice_number,
           CAST(total_cents AS INTEGER) AS total_cents, typeof(total_cents) AS total_cents_type,
           CAST(items AS TEXT) AS items,
           CAST(edit_history AS TEXT) AS edit_history,
           CAST(cancelled AS INTEGER) AS cancelled, typeof(cancelled) AS cancelled_type
    FROM transactions
"#;

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    shop_id: String,
    timestamp: String,
    customer_name: Option<String>,
    // Written through the enums' `sqlx::Type` impls; read as text so an
    // unknown value falls back instead of failing the row.
    payment_method: String,
    #[sqlx(rename = "type")]
    document_type: String,
    receipt_number: Option<String>,
    invoice_number: Option<String>,
    total_cents: Option<i64>,
    total_cents_type: String,
    items: Option<String>,
    edit_history: Option<String>,
    cancelled: Option<i64>,
    cancelled_type: String,
}

impl TransactionRow {
    fn into_transaction(self) -> Transaction {
        let id = self.id;

        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or_else(|_| {
                warn!(id = %id, value = %self.timestamp, "Unreadable timestamp, using epoch");
                DateTime::<Utc>::default()
            });

        let payment_method = match self.payment_method.as_str() {
            "cash" => PaymentMethod::Cash,
            "credit" => PaymentMethod::Credit,
            other => {
                warn!(id = %id, value = %other, "Unknown payment method, using cash");
                PaymentMethod::Cash
            }
        };

        let document_type = match self.document_type.as_str() {
            "sale" => DocumentType::Sale,
            "cash-in" => DocumentType::CashIn,
            "cash-out" => DocumentType::CashOut,
            other => {
                warn!(id = %id, value = %other, "Unknown document type, using sale");
                DocumentType::Sale
            }
        };

        if !matches!(self.total_cents_type.as_str(), "integer" | "null") {
            warn!(id = %id, stored = %self.total_cents_type, value = ?self.total_cents, "Non-integer total, coerced");
        }
        if !matches!(self.cancelled_type.as_str(), "integer" | "null") {
            warn!(id = %id, stored = %self.cancelled_type, "Non-integer cancelled flag, coerced");
        }

        Transaction {
            items: json_list(&id, "items", self.items.as_deref()),
            edit_history: json_list(&id, "edit_history", self.edit_history.as_deref()),
            shop_id: self.shop_id,
            timestamp,
            customer_name: self.customer_name,
            total_cents: self.total_cents.unwrap_or(0),
            payment_method,
            document_type,
            receipt_number: self.receipt_number,
            invoice_number: self.invoice_number,
            cancelled: self.cancelled.is_some_and(|flag| flag != 0),
            id,
        }
    }
}

/// Parses a JSON array column element by element, dropping what can't be read.
fn json_list<T: DeserializeOwned>(id: &str, column: &str, raw: Option<&str>) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => {
            let total = values.len();
            let parsed: Vec<T> = values
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect();
            if parsed.len() != total {
                warn!(id = %id, column, dropped = total - parsed.len(), "Dropped unreadable entries");
            }
            parsed
        }
        _ => {
            warn!(id = %id, column, "Column is not a JSON array, using empty list");
            Vec::new()
        }
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Repository for ledger transactions.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Loads every transaction of a shop.
    ///
    /// Rows come back in storage order; callers sort through the ledger.
    pub async fn load(&self, shop_id: &str) -> DbResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE shop_id = ?1"))
                .bind(shop_id)
                .fetch_all(&self.pool)
                .await?;

        debug!(shop_id = %shop_id, count = rows.len(), "Loaded transactions");

        Ok(rows.into_iter().map(TransactionRow::into_transaction).collect())
    }

    /// Gets one transaction by id.
    pub async fn get_by_id(&self, shop_id: &str, id: &str) -> DbResult<Option<Transaction>> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE shop_id = ?1 AND id = ?2"))
                .bind(shop_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(TransactionRow::into_transaction))
    }

    /// Inserts a new transaction.
    ///
    /// Fails with [`DbError::UniqueViolation`] if the id already exists.
    pub async fn insert(&self, shop_id: &str, tx: &Transaction) -> DbResult<()> {
        debug!(
            id = %tx.id,
            kind = tx.document_type.as_str(),
            number = tx.document_number().unwrap_or("-"),
            total = tx.total_cents,
            "Inserting transaction"
        );

        let items = serde_json::to_string(&tx.items)?;
        let edit_history = serde_json::to_string(&tx.edit_history)?;

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, shop_id, timestamp, customer_name, payment_method, type,
                receipt_number, invoice_number, total_cents, items, edit_history, cancelled
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&tx.id)
        .bind(shop_id)
        .bind(format_timestamp(tx.timestamp))
        .bind(&tx.customer_name)
        .bind(tx.payment_method)
        .bind(tx.document_type)
        .bind(&tx.receipt_number)
        .bind(&tx.invoice_number)
        .bind(tx.total_cents)
        .bind(items)
        .bind(edit_history)
        .bind(tx.cancelled)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("transaction id", &tx.id),
            other => other,
        })?;

        Ok(())
    }

    /// Replaces a stored transaction by id (last write wins).
    ///
    /// Fails with [`DbError::NotFound`] if the id is absent for this shop.
    pub async fn update(&self, shop_id: &str, tx: &Transaction) -> DbResult<()> {
        debug!(
            id = %tx.id,
            cancelled = tx.cancelled,
            edits = tx.edit_history.len(),
            "Updating transaction"
        );

        let items = serde_json::to_string(&tx.items)?;
        let edit_history = serde_json::to_string(&tx.edit_history)?;

        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                timestamp = ?3,
                customer_name = ?4,
                payment_method = ?5,
                type = ?6,
                receipt_number = ?7,
                invoice_number = ?8,
                total_cents = ?9,
                items = ?10,
                edit_history = ?11,
                cancelled = ?12
            WHERE shop_id = ?1 AND id = ?2
            "#,
        )
        .bind(shop_id)
        .bind(&tx.id)
        .bind(format_timestamp(tx.timestamp))
        .bind(&tx.customer_name)
        .bind(tx.payment_method)
        .bind(tx.document_type)
        .bind(&tx.receipt_number)
        .bind(&tx.invoice_number)
        .bind(tx.total_cents)
        .bind(items)
        .bind(edit_history)
        .bind(tx.cancelled)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", &tx.id));
        }

        Ok(())
    }

    /// Counts the shop's transactions.
    pub async fn count(&self, shop_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE shop_id = ?1")
            .bind(shop_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
