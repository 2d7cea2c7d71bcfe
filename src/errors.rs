//! Unified error types for the stock ledger.
//!
//! Validation failures are raised before anything is written. Storage failures wrap
//! `DbErr`; the enclosing database transaction is rolled back when they propagate.

use sea_orm::DbErr;
use thiserror::Error;

/// Errors produced by the ledger and its configuration layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Movement quantity was zero, negative, missing, or not an integer.
    #[error("Invalid quantity {quantity}: must be a positive integer")]
    InvalidQuantity {
        /// The rejected quantity as it was supplied
        quantity: String,
    },

    /// Actor was missing, non-positive, or unknown.
    #[error("Invalid actor: a valid user id is required")]
    InvalidActor,

    /// Movement type id did not resolve.
    #[error("Unknown movement type: {id}")]
    UnknownMovementType {
        /// The unresolved movement type id
        id: i64,
    },

    /// Item id did not resolve.
    #[error("Item not found: {id}")]
    ItemNotFound {
        /// The missing item id
        id: i64,
    },

    /// A stored movement references a movement type that no longer exists.
    #[error("Movement {movement_id} references missing movement type {movement_type_id}")]
    DanglingMovementType {
        /// The movement whose type is gone
        movement_id: i64,
        /// The unresolved type id
        movement_type_id: i64,
    },

    /// Movement id did not resolve.
    #[error("Movement not found: {id}")]
    MovementNotFound {
        /// The missing movement id
        id: i64,
    },

    /// A decrease would take the item below zero under the `reject` policy.
    #[error("Movement of {quantity} would take item {item_id} below zero (current {previous})")]
    NegativeStock {
        /// Item the movement targeted
        item_id: i64,
        /// Quantity before the movement
        previous: i64,
        /// Requested decrease
        quantity: i64,
    },

    /// Any other rejected input (blank names, negative thresholds, ...).
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O failure (binding the listener, reading files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used by the HTTP layer to choose a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied bad input
    Validation,
    /// A referenced record does not exist
    NotFound,
    /// Storage or environment failure
    Internal,
}

impl Error {
    /// Classifies the error for transport mapping.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity { .. }
            | Self::InvalidActor
            | Self::UnknownMovementType { .. }
            | Self::NegativeStock { .. }
            | Self::Validation { .. } => ErrorKind::Validation,
            Self::ItemNotFound { .. } | Self::MovementNotFound { .. } => ErrorKind::NotFound,
            Self::DanglingMovementType { .. }
            | Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
