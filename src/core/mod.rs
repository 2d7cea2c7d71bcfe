/// Item quantity store
pub mod item;
/// Ledger service and runtime settings
pub mod ledger;
/// Movement recording, listing, deletion, and auditing
pub mod movement;
/// Movement type registry
pub mod movement_type;
/// Pure replay of movement histories
pub mod replay;
