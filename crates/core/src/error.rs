//! Domain error model.

use thiserror::Error;

use crate::id::WarehouseId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, capacity, conflicts). Storage concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A mutation would push a warehouse past its capacity ceiling.
    #[error(
        "capacity exceeded for warehouse {warehouse_id}: requested occupancy {requested}, maximum {max_capacity}"
    )]
    CapacityExceeded {
        warehouse_id: WarehouseId,
        requested: u64,
        max_capacity: u32,
    },

    /// A quantity operation token outside the supported set.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A uniquely-named record already uses the requested name.
    #[error("name conflict: {0}")]
    NameConflict(String),

    /// The mutation conflicts with existing state (duplicate line, live references).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn capacity_exceeded(warehouse_id: WarehouseId, requested: u64, max_capacity: u32) -> Self {
        Self::CapacityExceeded {
            warehouse_id,
            requested,
            max_capacity,
        }
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn name_conflict(msg: impl Into<String>) -> Self {
        Self::NameConflict(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
