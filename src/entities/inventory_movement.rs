//! Inventory movement entity - One immutable quantity-changing event for an item.
//!
//! `previous_qty` and `new_qty` are snapshots taken when the row was inserted. They are
//! caches for display, not sources of truth: deleting an older movement does not rewrite them.
//! Chronological order is `movement_date`, then the per-item `sequence`, then `id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory movement database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_movements")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier, never reused
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Item whose quantity this movement changed
    pub item_id: i64,
    /// Movement type that decides the effect
    pub movement_type_id: i64,
    /// Magnitude for increase/decrease types, target value for absolute types
    pub quantity: i64,
    /// Item quantity just before this movement was recorded
    pub previous_qty: i64,
    /// Item quantity just after this movement was recorded
    pub new_qty: i64,
    /// Per-item monotonic position, assigned at insert time
    pub sequence: i64,
    /// When the movement happened
    pub movement_date: DateTimeUtc,
    /// When the row was written
    pub created_at: DateTimeUtc,
    /// Actor who recorded the movement
    pub user_id: i64,
    /// Source department for transfers
    pub from_dept_id: Option<i64>,
    /// Destination department for transfers
    pub to_dept_id: Option<i64>,
    /// Source floor for transfers
    pub from_floor_id: Option<i64>,
    /// Destination floor for transfers
    pub to_floor_id: Option<i64>,
    /// External document reference (delivery note, requisition number)
    pub reference_no: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
}

/// Defines relationships between `InventoryMovement` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each movement belongs to one item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    /// Each movement has one type
    #[sea_orm(
        belongs_to = "super::movement_type::Entity",
        from = "Column::MovementTypeId",
        to = "super::movement_type::Column::Id"
    )]
    MovementType,
    /// Each movement was recorded by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::movement_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovementType.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
