//! Movement type registry - read access to the movement type table.
//!
//! Types are maintained by an administrator elsewhere; the ledger only resolves them.
//! Inactive types are hidden from selection lists but still resolve by id, because
//! replaying history must be able to apply the effect of a type that was retired later.

use crate::{
    entities::{Effect, MovementType, movement_type},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};
use std::collections::{BTreeSet, HashMap};

/// Retrieves all active movement types, ordered by id, for populating selection lists.
pub async fn list_active_types<C>(db: &C) -> Result<Vec<movement_type::Model>>
where
    C: ConnectionTrait,
{
    MovementType::find()
        .filter(movement_type::Column::IsActive.eq(true))
        .order_by_asc(movement_type::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Resolves a movement type by id, active or not.
///
/// # Errors
/// Returns `Error::UnknownMovementType` if no type has this id.
pub async fn get_type<C>(db: &C, type_id: i64) -> Result<movement_type::Model>
where
    C: ConnectionTrait,
{
    MovementType::find_by_id(type_id)
        .one(db)
        .await?
        .ok_or(Error::UnknownMovementType { id: type_id })
}

/// Resolves the effects of every id in `type_ids` with a single query.
///
/// # Errors
/// Returns `Error::UnknownMovementType` naming the first id that does not resolve.
pub async fn effects_for<C, I>(db: &C, type_ids: I) -> Result<HashMap<i64, Effect>>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = i64>,
{
    let wanted: BTreeSet<i64> = type_ids.into_iter().collect();
    if wanted.is_empty() {
        return Ok(HashMap::new());
    }

    let effects: HashMap<i64, Effect> = MovementType::find()
        .filter(movement_type::Column::Id.is_in(wanted.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.effect))
        .collect();

    if let Some(missing) = wanted.iter().find(|id| !effects.contains_key(id)) {
        return Err(Error::UnknownMovementType { id: *missing });
    }
    Ok(effects)
}
