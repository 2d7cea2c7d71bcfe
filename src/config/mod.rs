/// Database connection, schema creation, and movement type seeding
pub mod database;

/// Movement type seed configuration loaded from config.toml
pub mod movement_types;

/// Runtime settings read from environment variables
pub mod settings;
