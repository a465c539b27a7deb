//! # Catalog Commands
//!
//! Adding and deleting catalog items.
//!
//! ## Optimistic Update with Rollback
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item / delete_item                                                 │
//! │                                                                         │
//! │  1. validate input                 (nothing touched on failure)         │
//! │  2. snapshot = catalog.snapshot()                                       │
//! │  3. apply change to CatalogState   (the screen updates immediately)     │
//! │  4. replace_items(shop, catalog)   (one database transaction)           │
//! │       ├── Ok  ──► done                                                  │
//! │       └── Err ──► catalog.restore(snapshot), return the error           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{ApiError, ApiResult};
use crate::state::{CatalogState, ConfigState, DbState};
use tally_core::validation::{parse_item_price, validate_item_name};
use tally_core::{Item, DEFAULT_CATEGORY};

/// Operator input for a new catalog item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub name: String,
    /// Price as typed, e.g. `"3.50"`.
    pub price: String,
    pub category: Option<String>,
    pub color: Option<String>,
}

/// Loads the shop's catalog into the catalog state.
pub async fn load_catalog(db: &DbState, catalog: &CatalogState, config: &ConfigState) -> ApiResult<Vec<Item>> {
    let items = db.inner().items().load_items(&config.shop_id).await?;
    catalog.restore(items.clone());

    debug!(shop_id = %config.shop_id, count = items.len(), "Catalog loaded");
    Ok(items)
}

pub async fn add_item(
    db: &DbState,
    catalog: &CatalogState,
    config: &ConfigState,
    request: AddItemRequest,
    now: DateTime<Utc>,
) -> ApiResult<Item> {
    let name = validate_item_name(&request.name)?;
    let price = parse_item_price(&request.price)?;

    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();
    let color = request
        .color
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let item = Item {
        id: db.ids().item_id(now),
        shop_id: config.shop_id.clone(),
        name,
        price_cents: price.cents(),
        category,
        color,
        created_at: now,
    };

    let snapshot = catalog.snapshot();
    catalog.with_items_mut(|items| items.push(item.clone()));
    persist_or_rollback(db, catalog, config, snapshot).await?;

    info!(item_id = %item.id, name = %item.name, price = %item.price(), "Catalog item added");
    Ok(item)
}

pub async fn delete_item(
    db: &DbState,
    catalog: &CatalogState,
    config: &ConfigState,
    item_id: &str,
) -> ApiResult<()> {
    let snapshot = catalog.snapshot();
    if !snapshot.iter().any(|i| i.id == item_id) {
        return Err(ApiError::not_found("Item", item_id));
    }

    catalog.with_items_mut(|items| items.retain(|i| i.id != item_id));
    persist_or_rollback(db, catalog, config, snapshot).await?;

    info!(item_id = %item_id, "Catalog item deleted");
    Ok(())
}

/// Writes the current catalog, restoring `snapshot` if the write fails.
async fn persist_or_rollback(
    db: &DbState,
    catalog: &CatalogState,
    config: &ConfigState,
    snapshot: Vec<Item>,
) -> ApiResult<()> {
    let items = catalog.snapshot();

    if let Err(e) = db.inner().items().replace_items(&config.shop_id, &items).await {
        error!(shop_id = %config.shop_id, error = %e, "Catalog write failed; restoring previous catalog");
        catalog.restore(snapshot);
        return Err(e.into());
    }

    info!(shop_id = %config.shop_id, count = items.len(), "Catalog replaced");
    Ok(())
}
