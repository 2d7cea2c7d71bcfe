//! Item quantity store - the materialized `quantity` the ledger keeps consistent.
//!
//! Reads are public. Writes to `quantity` are crate-private: outside this crate the only
//! way to change an item's quantity is to record or delete a movement through the ledger.
//! `create_item` is the catalog-side constructor; the quantity it is given is the baseline
//! that exists before the item's first movement.

use crate::{
    entities::{Item, item},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, warn};

/// Unit label used when an item has none.
pub const DEFAULT_UNIT: &str = "piece";

/// Catalog input for a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Display name, must not be blank
    pub name: String,
    /// Quantity on hand before any movement is recorded
    pub initial_quantity: i64,
    /// Reorder threshold, must not be negative
    pub min_quantity: i64,
    /// Display unit; blank or absent falls back to [`DEFAULT_UNIT`]
    pub unit: Option<String>,
}

/// Returns the trimmed unit, or [`DEFAULT_UNIT`] when it is absent or blank.
#[must_use]
pub fn unit_or_default(unit: Option<&str>) -> &str {
    unit.map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_UNIT)
}

/// Creates a catalog item with its starting quantity.
pub async fn create_item<C>(db: &C, new_item: NewItem) -> Result<item::Model>
where
    C: ConnectionTrait,
{
    if new_item.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Item name cannot be empty".to_string(),
        });
    }

    if new_item.initial_quantity < 0 {
        return Err(Error::InvalidQuantity {
            quantity: new_item.initial_quantity.to_string(),
        });
    }

    if new_item.min_quantity < 0 {
        return Err(Error::Validation {
            message: format!(
                "Minimum quantity cannot be negative (got {})",
                new_item.min_quantity
            ),
        });
    }

    let now = Utc::now();
    let item = item::ActiveModel {
        name: Set(new_item.name.trim().to_string()),
        quantity: Set(new_item.initial_quantity),
        min_quantity: Set(new_item.min_quantity),
        unit: Set(unit_or_default(new_item.unit.as_deref()).to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    item.insert(db).await.map_err(Into::into)
}

/// Finds an item by id.
pub async fn get_item<C>(db: &C, item_id: i64) -> Result<Option<item::Model>>
where
    C: ConnectionTrait,
{
    Item::find_by_id(item_id).one(db).await.map_err(Into::into)
}

/// Reads an item's current quantity.
///
/// # Errors
/// Returns `Error::ItemNotFound` if the item does not exist.
pub async fn get_quantity<C>(db: &C, item_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    get_item(db, item_id)
        .await?
        .map(|item| item.quantity)
        .ok_or(Error::ItemNotFound { id: item_id })
}

/// Reads an item with a row lock held until the enclosing transaction ends.
///
/// On `PostgreSQL` this is `SELECT ... FOR UPDATE`, serializing concurrent ledger operations
/// on the same item. `SQLite` has no row locks; its write transactions are already exclusive.
pub(crate) async fn lock_item<C>(db: &C, item_id: i64) -> Result<item::Model>
where
    C: ConnectionTrait,
{
    Item::find_by_id(item_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(Error::ItemNotFound { id: item_id })
}

/// Overwrites an item's quantity and bumps `updated_at`.
///
/// # Errors
/// Returns `Error::ItemNotFound` if no row was updated.
pub(crate) async fn set_quantity<C>(db: &C, item_id: i64, quantity: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Item::update_many()
        .col_expr(item::Column::Quantity, Expr::value(quantity))
        .col_expr(item::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(item::Column::Id.eq(item_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ItemNotFound { id: item_id });
    }
    debug!("Set quantity of item {} to {}", item_id, quantity);
    Ok(())
}

/// Updates an item's unit label on a best-effort basis.
///
/// Runs inside a savepoint so a failure rolls back only the label change; the caller's
/// transaction stays usable. Returns whether the label was written.
pub(crate) async fn set_unit<C>(db: &C, item_id: i64, unit: &str) -> bool
where
    C: ConnectionTrait + TransactionTrait,
{
    let result: std::result::Result<(), DbErr> = async {
        let savepoint = db.begin().await?;
        Item::update_many()
            .col_expr(item::Column::Unit, Expr::value(unit.trim()))
            .filter(item::Column::Id.eq(item_id))
            .exec(&savepoint)
            .await?;
        savepoint.commit().await
    }
    .await;

    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("Ignoring failed unit update for item {}: {}", item_id, e);
            false
        }
    }
}

/// Lists items whose quantity has fallen below their reorder threshold, ordered by id.
pub async fn list_low_stock_items<C>(db: &C) -> Result<Vec<item::Model>>
where
    C: ConnectionTrait,
{
    Item::find()
        .filter(Expr::col(item::Column::Quantity).lt(Expr::col(item::Column::MinQuantity)))
        .order_by_asc(item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
