//! Item entity - The stock-keeping record whose `quantity` the ledger maintains.
//!
//! Items belong to the wider catalog. The ledger only ever reads and writes
//! `quantity`, `unit` and `updated_at`; every other column is owned by the catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "A4 paper", "Toner cartridge")
    pub name: String,
    /// Current on-hand quantity, a materialized fold over the item's movements
    pub quantity: i64,
    /// Informational reorder threshold
    pub min_quantity: i64,
    /// Display unit (e.g., "piece", "box")
    pub unit: String,
    /// When the item was created
    pub created_at: DateTimeUtc,
    /// When the item row was last written
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One item has many movements
    #[sea_orm(has_many = "super::inventory_movement::Entity")]
    Movements,
}

impl Related<super::inventory_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
