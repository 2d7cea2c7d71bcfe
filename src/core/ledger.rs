//! Ledger service - the entry point the HTTP layer and the binary talk to.
//!
//! `LedgerService` owns the connection and the runtime settings, and forwards each
//! operation to the store functions in `core::item`, `core::movement`, and
//! `core::movement_type`.

use crate::{
    core::{item, movement, movement_type},
    entities::{ItemModel, MovementTypeModel, inventory_movement},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::str::FromStr;

pub use crate::core::movement::{
    MovementFilter, MovementView, QuantityAudit, RecordMovement, RecordedMovement,
};

/// Default cap on rows returned by a movement listing.
pub const DEFAULT_MAX_LIST_LIMIT: u64 = 500;

/// What to do when a movement would take an item below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeStockPolicy {
    /// Store the negative quantity.
    #[default]
    Allow,
    /// Refuse the movement with `Error::NegativeStock`.
    Reject,
}

impl NegativeStockPolicy {
    /// Checks a computed quantity against the policy and passes it through if allowed.
    ///
    /// # Errors
    /// Returns `Error::NegativeStock` when the policy is `Reject` and `next` is below zero.
    pub fn check(self, item_id: i64, previous: i64, quantity: i64, next: i64) -> Result<i64> {
        match self {
            Self::Reject if next < 0 => Err(Error::NegativeStock {
                item_id,
                previous,
                quantity,
            }),
            _ => Ok(next),
        }
    }
}

impl FromStr for NegativeStockPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "reject" => Ok(Self::Reject),
            other => Err(Error::Config {
                message: format!(
                    "Unknown negative stock policy '{other}' (expected 'allow' or 'reject')"
                ),
            }),
        }
    }
}

/// Runtime knobs for the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Negative stock handling for recorded movements
    pub negative_stock: NegativeStockPolicy,
    /// Upper bound on `limit` for movement listings
    pub max_list_limit: u64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            negative_stock: NegativeStockPolicy::Allow,
            max_list_limit: DEFAULT_MAX_LIST_LIMIT,
        }
    }
}

/// Stock ledger bound to one database. Shared across handlers behind an `Arc`.
#[derive(Debug)]
pub struct LedgerService {
    db: DatabaseConnection,
    settings: LedgerSettings,
}

impl LedgerService {
    /// Creates a ledger over an open connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self { db, settings }
    }

    /// Settings the ledger was created with.
    #[must_use]
    pub const fn settings(&self) -> LedgerSettings {
        self.settings
    }

    /// Underlying connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Records a movement under the configured negative stock policy.
    pub async fn record_movement(&self, request: RecordMovement) -> Result<RecordedMovement> {
        movement::record_movement(&self.db, request, self.settings.negative_stock).await
    }

    /// Lists movements, newest first, capped at the configured maximum.
    pub async fn list_movements(&self, filter: MovementFilter) -> Result<Vec<MovementView>> {
        movement::list_movements(&self.db, filter, self.settings.max_list_limit).await
    }

    /// Deletes a movement and returns its item with the replayed quantity.
    pub async fn delete_movement(&self, movement_id: i64) -> Result<ItemModel> {
        movement::delete_movement(&self.db, movement_id).await
    }

    /// Retrieves a single movement.
    pub async fn get_movement(&self, movement_id: i64) -> Result<Option<inventory_movement::Model>> {
        movement::get_movement(&self.db, movement_id).await
    }

    /// Active movement types, for selection lists.
    pub async fn list_active_types(&self) -> Result<Vec<MovementTypeModel>> {
        movement_type::list_active_types(&self.db).await
    }

    /// Finds an item by id.
    pub async fn get_item(&self, item_id: i64) -> Result<Option<ItemModel>> {
        item::get_item(&self.db, item_id).await
    }

    /// Items below their reorder threshold.
    pub async fn list_low_stock_items(&self) -> Result<Vec<ItemModel>> {
        item::list_low_stock_items(&self.db).await
    }

    /// Compares an item's stored quantity with a replay of its history.
    pub async fn audit_item(&self, item_id: i64) -> Result<QuantityAudit> {
        movement::audit_item(&self.db, item_id).await
    }
}
