//! # Transaction Commands
//!
//! Editing and cancelling stored transactions.
//!
//! Both read the record from storage rather than from the loaded ledger, so
//! they always start from the last committed state. Concurrent edits from
//! two terminals are last-write-wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::ledger::refresh_after_write;
use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DbState, LedgerState};
use tally_core::audit::{build_edit, TransactionDraft};
use tally_core::validation::{validate_customer, validate_transaction};
use tally_core::{EditRecord, Transaction};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub transaction: Transaction,
    /// The audit record that was appended.
    pub record: EditRecord,
}

/// Fetches a transaction straight from storage.
pub async fn get_transaction(db: &DbState, config: &ConfigState, id: &str) -> ApiResult<Transaction> {
    db.inner()
        .transactions()
        .get_by_id(&config.shop_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Transaction", id))
}

/// Applies an operator's edit and appends one audit record.
///
/// Cancelled transactions can still be edited; the tombstone stays set.
/// A stored record whose document numbers don't match its payment method
/// is rejected before anything is written.
pub async fn edit_transaction(
    db: &DbState,
    ledger: &LedgerState,
    config: &ConfigState,
    id: &str,
    draft: TransactionDraft,
    now: DateTime<Utc>,
) -> ApiResult<EditResponse> {
    let original = get_transaction(db, config, id).await?;
    validate_customer(original.payment_method, draft.customer_name.as_deref())?;

    let outcome = build_edit(&original, draft, now, config.offset());
    debug!(tx_id = %id, changes = outcome.record.changes.len(), "Edit built");
    validate_transaction(&outcome.transaction)?;

    db.inner()
        .transactions()
        .update(&config.shop_id, &outcome.transaction)
        .await?;
    refresh_after_write(db, ledger, config, &outcome.transaction).await;

    info!(
        tx_id = %id,
        changes = outcome.record.changes.len(),
        old_total = outcome.record.old_total_cents,
        new_total = outcome.record.new_total_cents,
        edits = outcome.transaction.edit_history.len(),
        "Transaction edited"
    );

    Ok(EditResponse {
        transaction: outcome.transaction,
        record: outcome.record,
    })
}

/// Sets the cancellation tombstone. Cannot be undone.
pub async fn cancel_transaction(
    db: &DbState,
    ledger: &LedgerState,
    config: &ConfigState,
    id: &str,
) -> ApiResult<Transaction> {
    let mut tx = get_transaction(db, config, id).await?;
    tx.cancel()?;
    validate_transaction(&tx)?;

    db.inner().transactions().update(&config.shop_id, &tx).await?;
    refresh_after_write(db, ledger, config, &tx).await;

    info!(tx_id = %id, total = %tx.total(), "Transaction cancelled");
    Ok(tx)
}
