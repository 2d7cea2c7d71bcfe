//! Database configuration module for the stock ledger.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The composite `(item_id, sequence)` index
//! is added by hand because entity attributes only describe single-column constraints.

use crate::config::movement_types::MovementTypeConfig;
use crate::entities::{
    Department, Floor, InventoryMovement, InventoryMovementColumn, Item, MovementType,
    MovementTypeColumn, User, movement_type,
};
use crate::errors::{Error, Result};
use sea_orm::sea_query::{Index, TableCreateStatement};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, Database,
    DatabaseConnection, EntityTrait, QueryFilter, Schema,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Default database location when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/stock_ledger.sqlite?mode=rwc";

/// Name of the unique index that keeps per-item sequence numbers distinct.
pub const MOVEMENT_SEQUENCE_INDEX: &str = "idx_inventory_movements_item_sequence";

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Directory holding a file-backed `SQLite` database, if the URL names one.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Creates all ledger tables (if missing) from the entity definitions.
///
/// Collaborator tables (users, departments, floors) are created as well so a fresh
/// database is usable on its own; in a shared database they already exist and are skipped.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements: [TableCreateStatement; 6] = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Department),
        schema.create_table_from_entity(Floor),
        schema.create_table_from_entity(Item),
        schema.create_table_from_entity(MovementType),
        schema.create_table_from_entity(InventoryMovement),
    ];

    for mut statement in statements {
        statement.if_not_exists();
        db.execute(builder.build(&statement)).await?;
    }

    let sequence_index = Index::create()
        .name(MOVEMENT_SEQUENCE_INDEX)
        .table(InventoryMovement)
        .col(InventoryMovementColumn::ItemId)
        .col(InventoryMovementColumn::Sequence)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&sequence_index)).await?;

    info!("Database tables ensured.");
    Ok(())
}

/// Inserts the configured movement types that are not present yet.
///
/// Matching is by `type_code`; existing rows are never modified, so an administrator's
/// later edits (renames, deactivation) survive restarts. Returns the number inserted.
pub async fn seed_movement_types<C>(db: &C, types: &[MovementTypeConfig]) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut inserted = 0;
    for config in types {
        let effect = config.effect()?;
        let code = config.type_code.trim();
        if code.is_empty() {
            return Err(Error::Config {
                message: format!("Movement type '{}' has an empty type_code", config.type_name),
            });
        }

        let existing = MovementType::find()
            .filter(MovementTypeColumn::TypeCode.eq(code))
            .one(db)
            .await?;
        if existing.is_some() {
            warn!("Movement type '{}' already exists. Skipping.", code);
            continue;
        }

        movement_type::ActiveModel {
            type_name: Set(config.type_name.clone()),
            type_code: Set(code.to_string()),
            effect: Set(effect),
            is_active: Set(config.is_active),
            ..Default::default()
        }
        .insert(db)
        .await?;
        info!("Inserted movement type '{}' ({:?})", code, effect);
        inserted += 1;
    }
    Ok(inserted)
}
