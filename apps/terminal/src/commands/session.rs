//! # Current-Sale Commands
//!
//! Building up the sale on screen. Nothing here touches storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::{CatalogState, Session, SessionState, SessionTotals};
use tally_core::ids::IdGenerator;
use tally_core::validation::{parse_item_price, validate_item_name};
use tally_core::PaymentMethod;

/// The current sale with its totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session: Session,
    pub totals: SessionTotals,
}

/// Operator input for an item that is not in the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickItemRequest {
    pub name: String,
    /// Price as typed, e.g. `"1.25"`.
    pub price: String,
    /// Missing or below 1 counts as 1.
    pub quantity: Option<i64>,
}

pub fn get_session(session: &SessionState) -> SessionView {
    session.with_session(|s| SessionView {
        session: s.clone(),
        totals: SessionTotals::from(s),
    })
}

/// Adds one of a catalog item to the current sale.
pub fn add_to_sale(catalog: &CatalogState, session: &SessionState, item_id: &str) -> ApiResult<SessionTotals> {
    let item = catalog
        .find(item_id)
        .ok_or_else(|| ApiError::not_found("Item", item_id))?;

    session.with_session_mut(|s| {
        s.add_catalog_item(&item).map_err(ApiError::cart)?;
        debug!(item_id = %item.id, "Added to sale");
        Ok(SessionTotals::from(&*s))
    })
}

/// Adds an ad-hoc line with a generated id.
pub fn add_quick_item(
    ids: &IdGenerator,
    session: &SessionState,
    request: QuickItemRequest,
    now: DateTime<Utc>,
) -> ApiResult<SessionTotals> {
    let name = validate_item_name(&request.name)?;
    let price = parse_item_price(&request.price)?;
    let line_id = ids.item_id(now);

    session.with_session_mut(|s| {
        s.add_quick_item(line_id, name, price, request.quantity.unwrap_or(1))
            .map_err(ApiError::cart)?;
        Ok(SessionTotals::from(&*s))
    })
}

/// Sets a line's quantity; zero or less removes it.
pub fn set_line_quantity(session: &SessionState, line_id: &str, quantity: i64) -> ApiResult<SessionTotals> {
    session.with_session_mut(|s| {
        s.set_quantity(line_id, quantity).map_err(ApiError::cart)?;
        Ok(SessionTotals::from(&*s))
    })
}

pub fn set_payment_method(session: &SessionState, method: PaymentMethod) {
    session.with_session_mut(|s| s.set_payment_method(method));
}

pub fn set_customer_name(session: &SessionState, name: Option<String>) {
    session.with_session_mut(|s| s.set_customer_name(name));
}

pub fn clear_session(session: &SessionState) {
    session.with_session_mut(Session::reset);
}
