//! Warehouse capacity arithmetic.
//!
//! Every change to a warehouse's occupied capacity is expressed as a
//! [`CapacityChange`] and passes through [`CapacityChange::apply`], which is the
//! single place where the ceiling and the zero floor are enforced.

use cragsupply_core::{DomainError, DomainResult, Entity};

use crate::line::InventoryLine;
use crate::operation::QuantityOperation;
use crate::warehouse::Warehouse;

/// A signed change to a warehouse's occupied capacity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CapacityChange {
    /// Units placed into the warehouse.
    Occupy(u32),
    /// Units taken out of the warehouse.
    Release(u32),
}

impl CapacityChange {
    /// Change required to go from `from` units to `to` units within one warehouse.
    pub fn between(from: u32, to: u32) -> Self {
        if to >= from {
            CapacityChange::Occupy(to - from)
        } else {
            CapacityChange::Release(from - to)
        }
    }

    /// Change matching a quantity adjustment on one of the warehouse's lines.
    pub fn for_operation(operation: QuantityOperation, value: u32) -> Self {
        match operation {
            QuantityOperation::Increment => CapacityChange::Occupy(value),
            QuantityOperation::Decrement => CapacityChange::Release(value),
        }
    }

    fn signed(self) -> i64 {
        match self {
            CapacityChange::Occupy(n) => i64::from(n),
            CapacityChange::Release(n) => -i64::from(n),
        }
    }

    /// Compute the warehouse state after this change, without mutating it.
    ///
    /// - Fails with `CapacityExceeded` if occupancy would pass `max_capacity`.
    /// - Fails with `InvariantViolation` if occupancy would drop below zero; that
    ///   can only happen when the cached counter has drifted from its lines.
    pub fn apply(self, warehouse: &Warehouse) -> DomainResult<Warehouse> {
        let candidate = i64::from(warehouse.current_capacity()) + self.signed();

        if candidate < 0 {
            return Err(DomainError::invariant(format!(
                "occupied capacity of warehouse {} would go negative ({candidate})",
                warehouse.id()
            )));
        }

        // A release never reaches this branch on a consistent warehouse; it stays
        // on the shared path so both directions are checked identically.
        if candidate > i64::from(warehouse.max_capacity()) {
            return Err(DomainError::capacity_exceeded(
                warehouse.id(),
                candidate as u64,
                warehouse.max_capacity(),
            ));
        }

        Ok(warehouse.with_current_capacity(candidate as u32))
    }
}

/// Sum of quantities of `lines` (the recomputed occupancy).
pub fn occupied_by<'a>(lines: impl IntoIterator<Item = &'a InventoryLine>) -> u64 {
    lines.into_iter().map(|l| u64::from(l.quantity())).sum()
}
