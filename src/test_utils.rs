//! Shared test utilities for the stock ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::{database, movement_types::default_movement_types},
    core::{
        item::{self, NewItem},
        ledger::NegativeStockPolicy,
        movement::{self, RecordMovement, RecordedMovement},
    },
    entities::{self, MovementType, inventory_movement, movement_type},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables and the default movement types
/// (IN, OUT, ADJUSTMENT, TRANSFER). This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    database::create_tables(&db).await?;
    database::seed_movement_types(&db, &default_movement_types()).await?;
    Ok(db)
}

/// Creates a test user that can act as a movement's actor.
pub async fn create_test_user(
    db: &DatabaseConnection,
    full_name: &str,
) -> Result<entities::user::Model> {
    entities::user::ActiveModel {
        full_name: Set(full_name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test department.
pub async fn create_test_department(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::department::Model> {
    entities::department::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test floor.
pub async fn create_test_floor(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::floor::Model> {
    entities::floor::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test item with sensible defaults.
///
/// # Defaults
/// * `min_quantity`: 0
/// * `unit`: None (falls back to "piece")
pub async fn create_test_item(
    db: &DatabaseConnection,
    name: &str,
    quantity: i64,
) -> Result<entities::item::Model> {
    create_custom_item(db, name, quantity, 0).await
}

/// Creates a test item with a custom reorder threshold.
pub async fn create_custom_item(
    db: &DatabaseConnection,
    name: &str,
    quantity: i64,
    min_quantity: i64,
) -> Result<entities::item::Model> {
    item::create_item(
        db,
        NewItem {
            name: name.to_string(),
            initial_quantity: quantity,
            min_quantity,
            unit: None,
        },
    )
    .await
}

/// Looks up one of the seeded movement types by code.
pub async fn movement_type_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<movement_type::Model> {
    MovementType::find()
        .filter(movement_type::Column::TypeCode.eq(code))
        .one(db)
        .await?
        .ok_or_else(|| Error::Validation {
            message: format!("No seeded movement type '{code}'"),
        })
}

/// Builds a movement request with only the required fields set.
#[must_use]
pub fn movement_request(
    item_id: i64,
    movement_type_id: i64,
    quantity: i64,
    user_id: i64,
) -> RecordMovement {
    RecordMovement {
        item_id,
        movement_type_id,
        quantity,
        user_id,
        ..Default::default()
    }
}

/// Records a movement of the seeded type `code` under the permissive policy.
pub async fn record_test_movement(
    db: &DatabaseConnection,
    item_id: i64,
    code: &str,
    quantity: i64,
    user_id: i64,
) -> Result<RecordedMovement> {
    let movement_type = movement_type_by_code(db, code).await?;
    movement::record_movement(
        db,
        movement_request(item_id, movement_type.id, quantity, user_id),
        NegativeStockPolicy::Allow,
    )
    .await
}

/// Fields for inserting a movement row directly, bypassing the ledger.
/// Used to set up histories with controlled dates and sequence numbers.
pub struct RawMovement {
    /// Item id
    pub item_id: i64,
    /// Movement type id
    pub movement_type_id: i64,
    /// Movement quantity
    pub quantity: i64,
    /// Cached previous quantity
    pub previous_qty: i64,
    /// Cached new quantity
    pub new_qty: i64,
    /// Per-item sequence
    pub sequence: i64,
    /// Movement date
    pub movement_date: DateTime<Utc>,
    /// Actor
    pub user_id: i64,
}

/// Inserts a movement row directly. Does not touch the item's quantity.
pub async fn insert_raw_movement<C>(db: &C, raw: RawMovement) -> Result<inventory_movement::Model>
where
    C: ConnectionTrait,
{
    inventory_movement::ActiveModel {
        item_id: Set(raw.item_id),
        movement_type_id: Set(raw.movement_type_id),
        quantity: Set(raw.quantity),
        previous_qty: Set(raw.previous_qty),
        new_qty: Set(raw.new_qty),
        sequence: Set(raw.sequence),
        movement_date: Set(raw.movement_date),
        created_at: Set(raw.movement_date),
        user_id: Set(raw.user_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Counts all movement rows of an item.
pub async fn movement_count(db: &DatabaseConnection, item_id: i64) -> Result<usize> {
    Ok(entities::InventoryMovement::find()
        .filter(inventory_movement::Column::ItemId.eq(item_id))
        .all(db)
        .await?
        .len())
}

/// Sets up a complete test environment with one actor and one item.
/// Returns (db, item, user) for common ledger scenarios.
pub async fn setup_with_item(
    initial_quantity: i64,
) -> Result<(
    DatabaseConnection,
    entities::item::Model,
    entities::user::Model,
)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "Store Keeper").await?;
    let item = create_test_item(&db, "Test Item", initial_quantity).await?;
    Ok((db, item, user))
}
