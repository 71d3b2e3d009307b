//! Storage boundary for catalog and inventory records.
//!
//! The services only talk to these traits. A successful `save`/`insert` is
//! treated as durably committed; everything else (pooling, SQL, caching) is the
//! implementation's business.

pub mod in_memory;

use thiserror::Error;

use cragsupply_catalog::{Category, Product};
use cragsupply_core::{CategoryId, Entity, ProductId, WarehouseId};
use cragsupply_inventory::{InventoryKey, InventoryLine, Warehouse};

pub use in_memory::InMemoryRepository;

/// Result type for storage calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An in-process store lock was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// The backing storage could not complete the call.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// No unused id is left in the record sequence.
    #[error("id sequence exhausted for {0}")]
    SequenceExhausted(String),
}

/// Keyed storage for one record type.
pub trait Repository<E: Entity>: Send + Sync {
    fn find(&self, id: E::Id) -> StoreResult<Option<E>>;

    /// All records, ordered by id.
    fn list(&self) -> StoreResult<Vec<E>>;

    /// Reserve the next unused id.
    fn next_id(&self) -> StoreResult<E::Id>;

    /// Insert or overwrite the record stored under its id.
    fn save(&self, record: E) -> StoreResult<E>;

    /// Insert only if the id is unused. Returns `None` when the id is taken.
    fn insert(&self, record: E) -> StoreResult<Option<E>>;

    /// Returns whether a record was removed.
    fn delete(&self, id: E::Id) -> StoreResult<bool>;

    /// Remove every record and restart the id sequence at 1.
    fn clear(&self) -> StoreResult<()>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.list()?.is_empty())
    }
}

/// Warehouse Ledger: the source of truth for capacity counters.
pub trait WarehouseLedger: Repository<Warehouse> {
    fn find_by_name(&self, name: &str) -> StoreResult<Option<Warehouse>>;

    fn exists_by_name(&self, name: &str) -> StoreResult<bool> {
        Ok(self.find_by_name(name)?.is_some())
    }
}

/// Inventory Record Store.
pub trait InventoryStore: Repository<InventoryLine> {
    fn find_by_key(&self, key: &InventoryKey) -> StoreResult<Option<InventoryLine>>;

    fn exists_by_key(&self, key: &InventoryKey) -> StoreResult<bool> {
        Ok(self.find_by_key(key)?.is_some())
    }

    fn list_by_warehouse(&self, warehouse_id: WarehouseId) -> StoreResult<Vec<InventoryLine>>;

    fn list_by_product(&self, product_id: ProductId) -> StoreResult<Vec<InventoryLine>>;
}

pub trait ProductStore: Repository<Product> {
    fn list_by_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>>;

    fn find_by_brand_and_name(&self, brand: &str, name: &str) -> StoreResult<Option<Product>>;
}

pub trait CategoryStore: Repository<Category> {
    fn find_by_name(&self, name: &str) -> StoreResult<Option<Category>>;
}
