//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod department;
pub mod floor;
pub mod inventory_movement;
pub mod item;
pub mod movement_type;
pub mod user;

// Re-export specific types to avoid conflicts
pub use department::{Column as DepartmentColumn, Entity as Department, Model as DepartmentModel};
pub use floor::{Column as FloorColumn, Entity as Floor, Model as FloorModel};
pub use inventory_movement::{
    Column as InventoryMovementColumn, Entity as InventoryMovement,
    Model as InventoryMovementModel,
};
pub use item::{Column as ItemColumn, Entity as Item, Model as ItemModel};
pub use movement_type::{
    Column as MovementTypeColumn, Effect, Entity as MovementType, Model as MovementTypeModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
