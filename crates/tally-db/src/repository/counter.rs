//! # Daily Counter Repository
//!
//! Issues the per-shop, per-day sequence behind every receipt, invoice and
//! cash voucher number.
//!
//! ## Atomic Increment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  next_daily_number("shop", 2025-03-09)                                  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT INTO daily_counters VALUES ('shop', '250309', 1)              │
//! │    ON CONFLICT (shop_id, yymmdd)                                        │
//! │      DO UPDATE SET last_seq = last_seq + 1                              │
//! │    RETURNING last_seq                     ──► 7                         │
//! │  build "2503090007"   (fails past 9999 → ROLLBACK, counter unchanged)   │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read, increment and write are one statement, so two terminals racing on
//! the same shop and day can never receive the same number. The day comes
//! from the caller and is used both as the counter key and as the number
//! prefix.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tally_core::numbering::{day_key, DocumentNumber};

/// Repository for the daily document counters.
#[derive(Debug, Clone)]
pub struct CounterRepository {
    pool: SqlitePool,
}

impl CounterRepository {
    /// Creates a new CounterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CounterRepository { pool }
    }

    /// Issues the next document number for `shop_id` on `date`.
    ///
    /// The first call of a day returns sequence 1. On any error nothing is
    /// persisted.
    pub async fn next_daily_number(&self, shop_id: &str, date: NaiveDate) -> DbResult<DocumentNumber> {
        let yymmdd = day_key(date);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::Internal(msg) => DbError::TransactionFailed(msg),
                other => other,
            })?;

        let last_seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO daily_counters (shop_id, yymmdd, last_seq)
            VALUES (?1, ?2, 1)
            ON CONFLICT (shop_id, yymmdd)
            DO UPDATE SET last_seq = last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(shop_id)
        .bind(&yymmdd)
        .fetch_one(&mut *tx)
        .await?;

        let sequence = u32::try_from(last_seq)
            .map_err(|_| DbError::Internal(format!("counter out of range: {last_seq}")))?;

        // Dropping `tx` on error rolls the increment back.
        let number = DocumentNumber::new(date, sequence)?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(shop_id = %shop_id, day = %yymmdd, sequence, "Issued document number");
        if sequence == 1 {
            info!(shop_id = %shop_id, day = %yymmdd, "Started daily sequence");
        }

        Ok(number)
    }

    /// Last sequence issued for a day, if any.
    pub async fn current_sequence(&self, shop_id: &str, date: NaiveDate) -> DbResult<Option<u32>> {
        let last_seq: Option<i64> = sqlx::query_scalar(
            "SELECT last_seq FROM daily_counters WHERE shop_id = ?1 AND yymmdd = ?2",
        )
        .bind(shop_id)
        .bind(day_key(date))
        .fetch_optional(&self.pool)
        .await?;

        Ok(last_seq.and_then(|s| u32::try_from(s).ok()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use std::collections::HashSet;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[tokio::test]
    async fn test_sequence_is_monotonic_within_a_day() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let counters = db.counters();

        let mut issued = Vec::new();
        for _ in 0..12 {
            issued.push(counters.next_daily_number("shop", day(9)).await.unwrap());
        }

        let sequences: Vec<u32> = issued.iter().map(DocumentNumber::sequence).collect();
        assert_eq!(sequences, (1..=12).collect::<Vec<u32>>());
        assert!(issued.iter().all(|n| n.day_key() == "250309"));
        assert_eq!(issued[6].to_string(), "2503090007");
        assert_eq!(counters.current_sequence("shop", day(9)).await.unwrap(), Some(12));
    }

    #[tokio::test]
    async fn test_sequence_resets_each_day_and_per_shop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let counters = db.counters();

        counters.next_daily_number("shop", day(9)).await.unwrap();
        counters.next_daily_number("shop", day(9)).await.unwrap();

        let next_day = counters.next_daily_number("shop", day(10)).await.unwrap();
        assert_eq!(next_day.to_string(), "2503100001");

        let other_shop = counters.next_daily_number("other", day(9)).await.unwrap();
        assert_eq!(other_shop.sequence(), 1);

        assert_eq!(counters.current_sequence("shop", day(11)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_callers_get_distinct_numbers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let counters = db.counters();
                tokio::spawn(async move { counters.next_daily_number("shop", day(9)).await })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let number = handle.await.unwrap().unwrap();
            assert!(seen.insert(number.sequence()));
        }
        assert_eq!(seen, (1..=20).collect::<HashSet<u32>>());
    }

    #[tokio::test]
    async fn test_exhausted_day_leaves_counter_untouched() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query("INSERT INTO daily_counters (shop_id, yymmdd, last_seq) VALUES ('shop', '250309', 9999)")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.counters().next_daily_number("shop", day(9)).await.unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));
        assert_eq!(
            db.counters().current_sequence("shop", day(9)).await.unwrap(),
            Some(9999)
        );
    }

    #[tokio::test]
    async fn test_closed_store_reports_failure() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let err = db.counters().next_daily_number("shop", day(9)).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}
