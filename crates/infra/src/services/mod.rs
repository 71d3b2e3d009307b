//! Application services: the only entry points that mutate stored records.
//!
//! - `inventory`: the capacity-accounting service (inventory lines + warehouse counters)
//! - `warehouse`: warehouse lifecycle (names, address, ceiling)
//! - `catalog`: categories and products

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument};

use cragsupply_catalog::{Category, Product};
use cragsupply_core::{DomainError, Entity, WarehouseId};
use cragsupply_inventory::{InventoryLine, Warehouse};

use crate::lock::{LockError, WarehouseLocks};
use crate::store::{
    CategoryStore, InMemoryRepository, InventoryStore, ProductStore, StoreError, WarehouseLedger,
};

pub mod catalog;
pub mod inventory;
pub mod warehouse;

pub use catalog::{CategoryService, ProductDetails, ProductService};
pub use inventory::{CapacityAudit, InventoryService};
pub use warehouse::WarehouseService;

/// Result type for service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every service operation.
///
/// Domain failures are flattened so callers can match on them directly; a
/// failed call leaves stored state as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(
        "capacity exceeded for warehouse {warehouse_id}: requested occupancy {requested}, maximum {max_capacity}"
    )]
    CapacityExceeded {
        warehouse_id: WarehouseId,
        requested: u64,
        max_capacity: u32,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("name conflict: {0}")]
    NameConflict(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvariantViolation(msg) => ServiceError::InvariantViolation(msg),
            DomainError::NotFound(msg) => ServiceError::NotFound(msg),
            DomainError::CapacityExceeded {
                warehouse_id,
                requested,
                max_capacity,
            } => ServiceError::CapacityExceeded {
                warehouse_id,
                requested,
                max_capacity,
            },
            DomainError::InvalidOperation(msg) => ServiceError::InvalidOperation(msg),
            DomainError::NameConflict(msg) => ServiceError::NameConflict(msg),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
        }
    }
}

/// The four record stores, as trait objects.
#[derive(Clone)]
pub struct Stores {
    pub warehouses: Arc<dyn WarehouseLedger>,
    pub lines: Arc<dyn InventoryStore>,
    pub products: Arc<dyn ProductStore>,
    pub categories: Arc<dyn CategoryStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            warehouses: Arc::new(InMemoryRepository::<Warehouse>::new()),
            lines: Arc::new(InMemoryRepository::<InventoryLine>::new()),
            products: Arc::new(InMemoryRepository::<Product>::new()),
            categories: Arc::new(InMemoryRepository::<Category>::new()),
        }
    }
}

/// Fully wired service set sharing one store set and one lock manager.
pub struct Services {
    pub warehouses: WarehouseService,
    pub categories: CategoryService,
    pub products: ProductService,
    pub inventory: InventoryService,
    stores: Stores,
    locks: Arc<WarehouseLocks>,
}

impl Services {
    pub fn new(stores: Stores, lock_timeout: Option<Duration>) -> Self {
        let locks = Arc::new(WarehouseLocks::new(lock_timeout));
        let handles = stores.clone();
        Self {
            warehouses: WarehouseService::new(
                stores.warehouses.clone(),
                stores.lines.clone(),
                locks.clone(),
            ),
            categories: CategoryService::new(stores.categories.clone(), stores.products.clone()),
            products: ProductService::new(
                stores.products.clone(),
                stores.categories.clone(),
                stores.lines.clone(),
            ),
            inventory: InventoryService::new(
                stores.warehouses,
                stores.lines,
                stores.products,
                locks.clone(),
            ),
            stores: handles,
            locks,
        }
    }

    /// Empty every store and restart each id sequence at 1.
    ///
    /// All existing warehouses are locked for the duration, so no inventory
    /// write can interleave with the wipe.
    #[instrument(skip(self))]
    pub fn clear_all(&self) -> ServiceResult<()> {
        let ids: Vec<WarehouseId> = self
            .stores
            .warehouses
            .list()?
            .iter()
            .map(Entity::id)
            .collect();
        let _guard = self.locks.acquire(&ids)?;

        self.stores.lines.clear()?;
        self.stores.products.clear()?;
        self.stores.warehouses.clear()?;
        self.stores.categories.clear()?;
        info!(warehouses = ids.len(), "all stores cleared");
        Ok(())
    }

    pub fn in_memory(lock_timeout: Option<Duration>) -> Self {
        Self::new(Stores::in_memory(), lock_timeout)
    }
}
