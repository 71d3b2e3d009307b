use std::sync::{Arc, Mutex};

use tracing::{info, instrument};

use cragsupply_core::{Entity, WarehouseId};
use cragsupply_inventory::{Warehouse, WarehouseDraft};

use crate::lock::{LockError, WarehouseLocks};
use crate::store::{InventoryStore, WarehouseLedger};

use super::{ServiceError, ServiceResult};

/// Warehouse lifecycle: creation, descriptive updates, removal.
///
/// Occupied capacity is never taken from callers; it only moves through
/// [`super::InventoryService`].
pub struct WarehouseService {
    warehouses: Arc<dyn WarehouseLedger>,
    lines: Arc<dyn InventoryStore>,
    locks: Arc<WarehouseLocks>,
    // Serializes name checks so two creates cannot claim the same name.
    names: Mutex<()>,
}

impl WarehouseService {
    pub fn new(
        warehouses: Arc<dyn WarehouseLedger>,
        lines: Arc<dyn InventoryStore>,
        locks: Arc<WarehouseLocks>,
    ) -> Self {
        Self {
            warehouses,
            lines,
            locks,
            names: Mutex::new(()),
        }
    }

    pub fn find(&self, id: WarehouseId) -> ServiceResult<Option<Warehouse>> {
        Ok(self.warehouses.find(id)?)
    }

    pub fn find_by_name(&self, name: &str) -> ServiceResult<Option<Warehouse>> {
        Ok(self.warehouses.find_by_name(name.trim())?)
    }

    pub fn list(&self) -> ServiceResult<Vec<Warehouse>> {
        Ok(self.warehouses.list()?)
    }

    #[instrument(skip(self))]
    pub fn create(&self, draft: WarehouseDraft) -> ServiceResult<Warehouse> {
        let _names = self.names_guard()?;
        let warehouse = Warehouse::new(self.warehouses.next_id()?, draft)?;
        if self.warehouses.exists_by_name(warehouse.name())? {
            return Err(name_taken(warehouse.name()));
        }

        let saved = self.warehouses.save(warehouse)?;
        info!(
            warehouse_id = %saved.id(),
            name = saved.name(),
            max_capacity = saved.max_capacity(),
            "warehouse created"
        );
        Ok(saved)
    }

    /// Replace name, address, and ceiling. The ceiling may not drop below the
    /// capacity already occupied.
    #[instrument(skip(self))]
    pub fn update(&self, id: WarehouseId, draft: WarehouseDraft) -> ServiceResult<Warehouse> {
        let _names = self.names_guard()?;
        let _guard = self.locks.acquire(&[id])?;

        let existing = self
            .warehouses
            .find(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("warehouse {id}")))?;
        let revised = existing.revise(draft)?;

        if revised.name() != existing.name() && self.warehouses.exists_by_name(revised.name())? {
            return Err(name_taken(revised.name()));
        }

        let saved = self.warehouses.save(revised)?;
        info!(warehouse_id = %id, "warehouse updated");
        Ok(saved)
    }

    /// Remove an empty warehouse. Missing ids succeed.
    #[instrument(skip(self))]
    pub fn delete(&self, id: WarehouseId) -> ServiceResult<()> {
        let _guard = self.locks.acquire(&[id])?;

        let stocked = self.lines.list_by_warehouse(id)?;
        if !stocked.is_empty() {
            return Err(ServiceError::Conflict(format!(
                "warehouse {id} still holds {} inventory line(s)",
                stocked.len()
            )));
        }

        if self.warehouses.delete(id)? {
            info!(warehouse_id = %id, "warehouse deleted");
        }
        Ok(())
    }

    fn names_guard(&self) -> ServiceResult<std::sync::MutexGuard<'_, ()>> {
        self.names
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()).into())
    }
}

fn name_taken(name: &str) -> ServiceError {
    ServiceError::NameConflict(format!("warehouse with name '{name}' already exists"))
}
