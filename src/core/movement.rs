//! Movement ledger - recording, listing, and deleting inventory movements.
//!
//! Every write here runs in one database transaction scoped to one item: the item row is
//! locked first, then the movement table and the item's quantity are changed together.
//! Returning early with `?` drops the uncommitted transaction, which rolls it back, so a
//! failure never leaves a movement without its quantity change or the reverse.
//!
//! Deleting a movement does not reverse its delta. The item's surviving history is replayed
//! from the cached `previous_qty` of its earliest survivor. Survivors' own `previous_qty` and
//! `new_qty` are left as recorded, so they can go stale after an older movement is deleted.

use crate::{
    core::{item as item_store, ledger::NegativeStockPolicy, movement_type, replay},
    entities::{
        Department, Effect, Floor, InventoryMovement, Item, MovementType, User,
        inventory_movement, item,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, instrument};

/// Input for recording a movement. Each field is one column the caller may set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMovement {
    /// Item whose quantity changes
    pub item_id: i64,
    /// Movement type deciding the effect
    pub movement_type_id: i64,
    /// Magnitude (increase/decrease) or target value (absolute); must be positive
    pub quantity: i64,
    /// Actor; filled from the authenticated caller, never from the request body
    #[serde(skip)]
    pub user_id: i64,
    /// New unit label for the item, applied on a best-effort basis
    #[serde(default)]
    pub unit: Option<String>,
    /// External document reference
    #[serde(default)]
    pub reference_no: Option<String>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Transfer source department
    #[serde(default)]
    pub from_dept_id: Option<i64>,
    /// Transfer destination department
    #[serde(default)]
    pub to_dept_id: Option<i64>,
    /// Transfer source floor
    #[serde(default)]
    pub from_floor_id: Option<i64>,
    /// Transfer destination floor
    #[serde(default)]
    pub to_floor_id: Option<i64>,
}

/// Result of a recorded movement: the new movement id and the refreshed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMovement {
    /// Id assigned to the new movement
    pub movement_id: i64,
    /// Item after the movement was applied
    pub item: item::Model,
}

/// Optional filters for listing movements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementFilter {
    /// Only movements of this item
    pub item_id: Option<i64>,
    /// Only movements of this type
    pub movement_type_id: Option<i64>,
    /// Maximum rows to return; clamped to the configured maximum
    pub limit: Option<u64>,
}

/// A movement with display names for the records it references.
///
/// Names are looked up after the fact and carry no consistency guarantee; a reference
/// whose row is gone renders as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementView {
    /// The stored movement
    #[serde(flatten)]
    pub movement: inventory_movement::Model,
    /// Item name
    pub item_name: Option<String>,
    /// Movement type name
    pub movement_type_name: Option<String>,
    /// Movement type code
    pub movement_type_code: Option<String>,
    /// Actor name
    pub user_name: Option<String>,
    /// Source department name
    pub from_dept_name: Option<String>,
    /// Destination department name
    pub to_dept_name: Option<String>,
    /// Source floor name
    pub from_floor_name: Option<String>,
    /// Destination floor name
    pub to_floor_name: Option<String>,
}

/// Stored quantity compared with a replay of the item's full history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityAudit {
    /// Audited item
    pub item_id: i64,
    /// `items.quantity` as stored
    pub stored_quantity: i64,
    /// Replay baseline (earliest movement's `previous_qty`, or the stored quantity)
    pub baseline: i64,
    /// Result of replaying every movement from `baseline`
    pub replayed_quantity: i64,
    /// Number of movements replayed
    pub movement_count: usize,
}

impl QuantityAudit {
    /// Whether the stored quantity equals the replayed one.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.stored_quantity == self.replayed_quantity
    }
}

/// Resolves the row limit for a listing: absent or zero means the maximum.
#[must_use]
pub fn effective_limit(requested: Option<u64>, max_limit: u64) -> u64 {
    let max_limit = max_limit.max(1);
    match requested {
        None | Some(0) => max_limit,
        Some(limit) => limit.min(max_limit),
    }
}

/// Records a movement and applies its effect to the item, atomically.
///
/// Quantity and actor are validated before the transaction starts. Inside it, the type is
/// resolved, the item row locked, the actor checked, the next quantity computed and checked
/// against `policy`, the unit label updated (advisory), the quantity overwritten, and the
/// movement inserted with the previous/new snapshots and the next per-item sequence number.
///
/// # Errors
/// `InvalidQuantity`, `InvalidActor`, `UnknownMovementType`, `ItemNotFound`,
/// `NegativeStock` (under `NegativeStockPolicy::Reject`), or `Database`.
#[instrument(
    skip(db, request),
    fields(item_id = request.item_id, movement_type_id = request.movement_type_id)
)]
pub async fn record_movement(
    db: &DatabaseConnection,
    request: RecordMovement,
    policy: NegativeStockPolicy,
) -> Result<RecordedMovement> {
    if request.quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: request.quantity.to_string(),
        });
    }

    if request.user_id <= 0 {
        return Err(Error::InvalidActor);
    }

    let txn = db.begin().await?;

    let movement_type = movement_type::get_type(&txn, request.movement_type_id).await?;
    let item = item_store::lock_item(&txn, request.item_id).await?;

    if User::find_by_id(request.user_id).one(&txn).await?.is_none() {
        return Err(Error::InvalidActor);
    }

    let previous = item.quantity;
    let next = policy.check(
        item.id,
        previous,
        request.quantity,
        movement_type.effect.apply(previous, request.quantity),
    )?;

    if let Some(unit) = request.unit.as_deref().filter(|u| !u.trim().is_empty()) {
        item_store::set_unit(&txn, item.id, unit).await;
    }

    item_store::set_quantity(&txn, item.id, next).await?;

    // Dates never go backwards within an item, so date order matches sequence order.
    let now = Utc::now();
    let (sequence, movement_date) = latest_movement(&txn, item.id)
        .await?
        .map_or((1, now), |latest| {
            (latest.sequence + 1, latest.movement_date.max(now))
        });

    let movement = inventory_movement::ActiveModel {
        item_id: Set(item.id),
        movement_type_id: Set(movement_type.id),
        quantity: Set(request.quantity),
        previous_qty: Set(previous),
        new_qty: Set(next),
        sequence: Set(sequence),
        movement_date: Set(movement_date),
        created_at: Set(now),
        user_id: Set(request.user_id),
        from_dept_id: Set(request.from_dept_id),
        to_dept_id: Set(request.to_dept_id),
        from_floor_id: Set(request.from_floor_id),
        to_floor_id: Set(request.to_floor_id),
        reference_no: Set(non_blank(request.reference_no)),
        notes: Set(non_blank(request.notes)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let item = item_store::get_item(&txn, item.id)
        .await?
        .ok_or(Error::ItemNotFound { id: item.id })?;

    txn.commit().await?;

    info!(
        "Recorded movement {} for item {}: {} {} ({} -> {})",
        movement.id, item.id, movement_type.type_code, request.quantity, previous, next
    );
    Ok(RecordedMovement {
        movement_id: movement.id,
        item,
    })
}

/// Lists movements, most recent first, with display names joined in.
///
/// Ordered by `movement_date`, then `created_at`, then `id`, all descending.
#[instrument(skip(db))]
pub async fn list_movements(
    db: &DatabaseConnection,
    filter: MovementFilter,
    max_limit: u64,
) -> Result<Vec<MovementView>> {
    let mut query = InventoryMovement::find();
    if let Some(item_id) = filter.item_id {
        query = query.filter(inventory_movement::Column::ItemId.eq(item_id));
    }
    if let Some(type_id) = filter.movement_type_id {
        query = query.filter(inventory_movement::Column::MovementTypeId.eq(type_id));
    }

    let movements = query
        .order_by_desc(inventory_movement::Column::MovementDate)
        .order_by_desc(inventory_movement::Column::CreatedAt)
        .order_by_desc(inventory_movement::Column::Id)
        .limit(effective_limit(filter.limit, max_limit))
        .all(db)
        .await?;

    debug!("Fetched {} movements", movements.len());
    enrich(db, movements).await
}

/// Retrieves a single movement by id.
pub async fn get_movement<C>(db: &C, movement_id: i64) -> Result<Option<inventory_movement::Model>>
where
    C: ConnectionTrait,
{
    InventoryMovement::find_by_id(movement_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes a movement and recomputes its item's quantity from the surviving history.
///
/// The baseline is the cached `previous_qty` of the chronologically first survivor, or the
/// item's current quantity if nothing survives. Each survivor is then applied in order with
/// its own type's effect, inactive types included. The deletion and the quantity overwrite
/// commit together or not at all.
///
/// # Errors
/// `MovementNotFound` (nothing changed), `ItemNotFound`, `DanglingMovementType`, or `Database`.
#[instrument(skip(db))]
pub async fn delete_movement(db: &DatabaseConnection, movement_id: i64) -> Result<item::Model> {
    let txn = db.begin().await?;

    let movement = get_movement(&txn, movement_id)
        .await?
        .ok_or(Error::MovementNotFound { id: movement_id })?;
    let item = item_store::lock_item(&txn, movement.item_id).await?;

    let deleted = InventoryMovement::delete_by_id(movement.id)
        .exec(&txn)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(Error::MovementNotFound { id: movement_id });
    }

    let remaining = chronological_movements(&txn, item.id).await?;
    let effects = history_effects(&txn, &remaining).await?;
    let baseline = replay::baseline(remaining.first(), item.quantity);
    let quantity = replay::replay_movements(baseline, &remaining, &effects)?;

    item_store::set_quantity(&txn, item.id, quantity).await?;
    let item = item_store::get_item(&txn, item.id)
        .await?
        .ok_or(Error::ItemNotFound { id: item.id })?;

    txn.commit().await?;

    info!(
        "Deleted movement {} of item {}; replayed {} movements from {} to {}",
        movement_id,
        item.id,
        remaining.len(),
        baseline,
        quantity
    );
    Ok(item)
}

/// Replays an item's history without writing anything and compares it with the stored quantity.
///
/// # Errors
/// `ItemNotFound`, `DanglingMovementType`, or `Database`.
pub async fn audit_item<C>(db: &C, item_id: i64) -> Result<QuantityAudit>
where
    C: ConnectionTrait,
{
    let item = item_store::get_item(db, item_id)
        .await?
        .ok_or(Error::ItemNotFound { id: item_id })?;
    let history = chronological_movements(db, item.id).await?;
    let effects = history_effects(db, &history).await?;
    let baseline = replay::baseline(history.first(), item.quantity);

    Ok(QuantityAudit {
        item_id: item.id,
        stored_quantity: item.quantity,
        baseline,
        replayed_quantity: replay::replay_movements(baseline, &history, &effects)?,
        movement_count: history.len(),
    })
}

/// All movements of an item in replay order.
async fn chronological_movements<C>(db: &C, item_id: i64) -> Result<Vec<inventory_movement::Model>>
where
    C: ConnectionTrait,
{
    let mut movements = InventoryMovement::find()
        .filter(inventory_movement::Column::ItemId.eq(item_id))
        .order_by_asc(inventory_movement::Column::MovementDate)
        .order_by_asc(inventory_movement::Column::Sequence)
        .order_by_asc(inventory_movement::Column::Id)
        .all(db)
        .await?;
    // Storage may compare dates as text; the in-memory sort is authoritative.
    replay::sort_chronologically(&mut movements);
    Ok(movements)
}

/// Resolves the effect of every movement in `history`.
///
/// A type that no longer resolves is stored data gone bad, not caller input, so it is
/// reported against the movement that references it.
async fn history_effects<C>(
    db: &C,
    history: &[inventory_movement::Model],
) -> Result<HashMap<i64, Effect>>
where
    C: ConnectionTrait,
{
    movement_type::effects_for(db, history.iter().map(|m| m.movement_type_id))
        .await
        .map_err(|e| match e {
            Error::UnknownMovementType { id } => history
                .iter()
                .find(|m| m.movement_type_id == id)
                .map_or(Error::UnknownMovementType { id }, |m| {
                    Error::DanglingMovementType {
                        movement_id: m.id,
                        movement_type_id: id,
                    }
                }),
            other => other,
        })
}

/// The movement with the highest sequence number for an item.
async fn latest_movement<C>(db: &C, item_id: i64) -> Result<Option<inventory_movement::Model>>
where
    C: ConnectionTrait,
{
    InventoryMovement::find()
        .filter(inventory_movement::Column::ItemId.eq(item_id))
        .order_by_desc(inventory_movement::Column::Sequence)
        .one(db)
        .await
        .map_err(Into::into)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn enrich(
    db: &DatabaseConnection,
    movements: Vec<inventory_movement::Model>,
) -> Result<Vec<MovementView>> {
    let item_ids: BTreeSet<i64> = movements.iter().map(|m| m.item_id).collect();
    let type_ids: BTreeSet<i64> = movements.iter().map(|m| m.movement_type_id).collect();
    let user_ids: BTreeSet<i64> = movements.iter().map(|m| m.user_id).collect();
    let dept_ids: BTreeSet<i64> = movements
        .iter()
        .flat_map(|m| [m.from_dept_id, m.to_dept_id])
        .flatten()
        .collect();
    let floor_ids: BTreeSet<i64> = movements
        .iter()
        .flat_map(|m| [m.from_floor_id, m.to_floor_id])
        .flatten()
        .collect();

    let items: HashMap<i64, String> = if item_ids.is_empty() {
        HashMap::new()
    } else {
        Item::find()
            .filter(item::Column::Id.is_in(item_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|i| (i.id, i.name))
            .collect()
    };

    let types: HashMap<i64, (String, String)> = if type_ids.is_empty() {
        HashMap::new()
    } else {
        MovementType::find()
            .filter(crate::entities::movement_type::Column::Id.is_in(type_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, (t.type_name, t.type_code)))
            .collect()
    };

    let users: HashMap<i64, String> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        User::find()
            .filter(crate::entities::user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name))
            .collect()
    };

    let departments: HashMap<i64, String> = if dept_ids.is_empty() {
        HashMap::new()
    } else {
        Department::find()
            .filter(crate::entities::department::Column::Id.is_in(dept_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect()
    };

    let floors: HashMap<i64, String> = if floor_ids.is_empty() {
        HashMap::new()
    } else {
        Floor::find()
            .filter(crate::entities::floor::Column::Id.is_in(floor_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|f| (f.id, f.name))
            .collect()
    };

    let name_of = |names: &HashMap<i64, String>, id: Option<i64>| {
        id.and_then(|id| names.get(&id).cloned())
    };

    Ok(movements
        .into_iter()
        .map(|movement| {
            let movement_type = types.get(&movement.movement_type_id);
            MovementView {
                item_name: items.get(&movement.item_id).cloned(),
                movement_type_name: movement_type.map(|(name, _)| name.clone()),
                movement_type_code: movement_type.map(|(_, code)| code.clone()),
                user_name: users.get(&movement.user_id).cloned(),
                from_dept_name: name_of(&departments, movement.from_dept_id),
                to_dept_name: name_of(&departments, movement.to_dept_id),
                from_floor_name: name_of(&floors, movement.from_floor_id),
                to_floor_name: name_of(&floors, movement.to_floor_id),
                movement,
            }
        })
        .collect())
}
