//! Floor entity - Transfer endpoint, used for display names only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Floor database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "floors")]
pub struct Model {
    /// Unique identifier for the floor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
}

/// Floor has no relationships the ledger navigates
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
