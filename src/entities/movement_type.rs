//! Movement type entity - Maps a movement code (IN, OUT, ADJUSTMENT, ...) to its effect.
//!
//! Types are soft-disabled through `is_active`; an inactive type disappears from
//! selection lists but historical movements that reference it stay valid.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a movement's quantity combines with the running total.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// `+1`: running total plus the movement quantity
    #[sea_orm(num_value = 1)]
    Increase,
    /// `-1`: running total minus the movement quantity
    #[sea_orm(num_value = -1)]
    Decrease,
    /// `0`: the movement quantity is the new running total
    #[sea_orm(num_value = 0)]
    Absolute,
}

/// Movement type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movement_types")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the movement type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g., "Stock in")
    pub type_name: String,
    /// Short stable code (e.g., `IN`, `OUT`, `ADJUSTMENT`)
    #[sea_orm(unique)]
    pub type_code: String,
    /// Arithmetic rule applied by movements of this type
    pub effect: Effect,
    /// Soft-disable flag
    pub is_active: bool,
}

/// Defines relationships between `MovementType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One type is referenced by many movements
    #[sea_orm(has_many = "super::inventory_movement::Entity")]
    Movements,
}

impl Related<super::inventory_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
