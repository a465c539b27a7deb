//! # Sale Commands
//!
//! ## Completing a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  complete_sale                                                          │
//! │                                                                         │
//! │  1. validate       empty sale? credit without customer?                 │
//! │                    (no storage call has happened yet)                   │
//! │  2. number         next_daily_number(shop, today)  ──► "2503090007"     │
//! │  3. build          Transaction::sale (receipt for cash, invoice credit) │
//! │  4. insert         transactions().insert                                │
//! │  5. reset          session back to an empty cash sale                   │
//! │  6. reload         ledger state from storage                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failure in step 2 or 4 leaves the session as it was so the operator can
//! try again. A number issued in step 2 for an insert that then fails is not
//! reused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::ledger::refresh_after_write;
use crate::error::ApiResult;
use crate::state::{ConfigState, DbState, LedgerState, SessionState};
use tally_core::calendar::render_document;
use tally_core::validation::{validate_customer, validate_transaction};
use tally_core::{CoreError, Transaction};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCompleted {
    pub transaction: Transaction,
    /// Printable receipt or invoice.
    pub document: String,
}

pub async fn complete_sale(
    db: &DbState,
    session: &SessionState,
    ledger: &LedgerState,
    config: &ConfigState,
    now: DateTime<Utc>,
) -> ApiResult<SaleCompleted> {
    let current = session.snapshot();
    debug!(lines = current.lines.len(), method = current.payment_method.as_str(), "complete_sale command");

    if current.is_empty() {
        return Err(CoreError::EmptySale.into());
    }
    let customer = validate_customer(current.payment_method, current.customer_name.as_deref())?;

    let number = db
        .inner()
        .counters()
        .next_daily_number(&config.shop_id, config.today(now))
        .await?;

    let tx = Transaction::sale(
        db.ids().transaction_id(now),
        config.shop_id.clone(),
        now,
        customer,
        current.line_items(),
        current.payment_method,
        number.to_string(),
    );
    validate_transaction(&tx)?;

    db.inner().transactions().insert(&config.shop_id, &tx).await?;

    session.with_session_mut(|s| s.reset());
    refresh_after_write(db, ledger, config, &tx).await;

    info!(
        tx_id = %tx.id,
        number = %number,
        method = tx.payment_method.as_str(),
        total = %tx.total(),
        items = tx.items.len(),
        "Sale completed"
    );

    let document = render_document(&tx, &config.document_style());
    Ok(SaleCompleted {
        transaction: tx,
        document,
    })
}
