//! # Cash Drawer Commands
//!
//! Manual cash in / cash out. Each movement is a one-line voucher carrying
//! a receipt number from the daily sequence, so it shows up in the running
//! balance like any cash sale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::commands::ledger::refresh_after_write;
use crate::error::ApiResult;
use crate::state::{ConfigState, DbState, LedgerState};
use tally_core::validation::{parse_cash_amount, validate_cash_reason, validate_transaction};
use tally_core::{CashDirection, Transaction};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashMovementRequest {
    pub direction: CashDirection,
    pub reason: String,
    /// Amount as typed; must be positive; the direction sets the sign.
    pub amount: String,
}

pub async fn record_cash_movement(
    db: &DbState,
    ledger: &LedgerState,
    config: &ConfigState,
    request: CashMovementRequest,
    now: DateTime<Utc>,
) -> ApiResult<Transaction> {
    let reason = validate_cash_reason(&request.reason)?;
    let amount = parse_cash_amount(&request.amount)?;

    let number = db
        .inner()
        .counters()
        .next_daily_number(&config.shop_id, config.today(now))
        .await?;

    let tx = Transaction::cash_movement(
        db.ids().transaction_id(now),
        config.shop_id.clone(),
        now,
        request.direction,
        &reason,
        amount,
        number.to_string(),
    );
    validate_transaction(&tx)?;

    db.inner().transactions().insert(&config.shop_id, &tx).await?;
    refresh_after_write(db, ledger, config, &tx).await;

    info!(
        tx_id = %tx.id,
        number = %number,
        direction = request.direction.label(),
        amount = %tx.total(),
        "Cash movement recorded"
    );
    Ok(tx)
}
