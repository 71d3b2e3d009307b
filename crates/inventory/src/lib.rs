//! Inventory domain module: warehouses, inventory lines, and capacity rules.
//!
//! This crate contains the capacity accounting rules implemented purely as
//! deterministic domain logic (no IO, no locking, no storage). The service
//! layer in `cragsupply-infra` sequences these rules against the stores.

pub mod capacity;
pub mod line;
pub mod operation;
pub mod warehouse;

pub use capacity::{CapacityChange, occupied_by};
pub use line::{InventoryKey, InventoryLine, InventoryLineDraft};
pub use operation::QuantityOperation;
pub use warehouse::{Warehouse, WarehouseAddress, WarehouseDraft};
