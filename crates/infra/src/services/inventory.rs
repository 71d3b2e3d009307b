//! Inventory capacity accounting.
//!
//! `InventoryService` is the only path through which inventory quantities and
//! warehouse occupied-capacity change. After every successful call, for every
//! warehouse `W`:
//!
//! ```text
//! W.current_capacity == sum(line.quantity for line assigned to W)
//! ```
//!
//! Each mutation follows the same shape:
//!
//! ```text
//! lock warehouse(s) → re-read line/warehouse → compute new states (pure)
//!   → write warehouse(s) → write line → release locks
//! ```
//!
//! Warehouses are written before the line, so an interrupted call can only
//! leave a counter that accounts for a line not yet stored, never the reverse.
//! If the line write fails the warehouse snapshots are written back.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use cragsupply_core::{CategoryId, Entity, InventoryLineId, ProductId, WarehouseId};
use cragsupply_inventory::{
    CapacityChange, InventoryKey, InventoryLine, InventoryLineDraft, QuantityOperation, Warehouse,
    occupied_by,
};

use crate::lock::{LockError, WarehouseGuard, WarehouseLocks};
use crate::store::{InventoryStore, ProductStore, WarehouseLedger};

use super::{ServiceError, ServiceResult};

/// Upper bound on re-reads when a line moves between lookup and locking.
const MAX_LOCK_ATTEMPTS: usize = 8;

/// How the line half of a commit is written.
enum LineWrite {
    /// A fresh id; fails with `Conflict` if the id is taken.
    Insert(InventoryLine),
    /// Overwrite the stored line with the same id.
    Replace(InventoryLine),
}

/// Recomputed occupancy of one warehouse against its cached counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityAudit {
    pub warehouse_id: WarehouseId,
    pub recorded: u32,
    pub occupied: u64,
    pub max_capacity: u32,
    pub line_count: usize,
}

impl CapacityAudit {
    pub fn is_consistent(&self) -> bool {
        u64::from(self.recorded) == self.occupied && self.occupied <= u64::from(self.max_capacity)
    }
}

/// The inventory capacity service.
pub struct InventoryService {
    warehouses: Arc<dyn WarehouseLedger>,
    lines: Arc<dyn InventoryStore>,
    products: Arc<dyn ProductStore>,
    locks: Arc<WarehouseLocks>,
}

impl InventoryService {
    pub fn new(
        warehouses: Arc<dyn WarehouseLedger>,
        lines: Arc<dyn InventoryStore>,
        products: Arc<dyn ProductStore>,
        locks: Arc<WarehouseLocks>,
    ) -> Self {
        Self {
            warehouses,
            lines,
            products,
            locks,
        }
    }

    // -------------------------
    // Queries
    // -------------------------

    pub fn find(&self, id: InventoryLineId) -> ServiceResult<Option<InventoryLine>> {
        Ok(self.lines.find(id)?)
    }

    pub fn list(&self) -> ServiceResult<Vec<InventoryLine>> {
        Ok(self.lines.list()?)
    }

    pub fn list_by_warehouse(&self, warehouse_id: WarehouseId) -> ServiceResult<Vec<InventoryLine>> {
        self.require_warehouse(warehouse_id)?;
        Ok(self.lines.list_by_warehouse(warehouse_id)?)
    }

    /// Lines whose product belongs to `category_id`, ordered by line id.
    pub fn list_by_category(&self, category_id: CategoryId) -> ServiceResult<Vec<InventoryLine>> {
        let mut lines = Vec::new();
        for product in self.products.list_by_category(category_id)? {
            lines.extend(self.lines.list_by_product(product.id())?);
        }
        lines.sort_by_key(|l| l.id());
        Ok(lines)
    }

    /// Recompute a warehouse's occupancy from its lines.
    pub fn audit(&self, warehouse_id: WarehouseId) -> ServiceResult<CapacityAudit> {
        let _guard = self.locks.acquire(&[warehouse_id])?;
        let warehouse = self.require_warehouse(warehouse_id)?;
        let lines = self.lines.list_by_warehouse(warehouse_id)?;
        let audit = CapacityAudit {
            warehouse_id,
            recorded: warehouse.current_capacity(),
            occupied: occupied_by(&lines),
            max_capacity: warehouse.max_capacity(),
            line_count: lines.len(),
        };
        if !audit.is_consistent() {
            warn!(
                warehouse_id = %warehouse_id,
                recorded = audit.recorded,
                occupied = audit.occupied,
                "warehouse capacity counter has drifted from its lines"
            );
        }
        Ok(audit)
    }

    /// Audit every warehouse in the ledger.
    pub fn audit_all(&self) -> ServiceResult<Vec<CapacityAudit>> {
        self.warehouses
            .list()?
            .iter()
            .map(|w| self.audit(w.id()))
            .collect()
    }

    // -------------------------
    // Mutations
    // -------------------------

    /// Create a line, or merge into the existing line with the same
    /// (product, warehouse, size).
    #[instrument(skip(self))]
    pub fn create(&self, draft: InventoryLineDraft) -> ServiceResult<InventoryLine> {
        let key = draft.key()?;
        self.require_product(key.product_id)?;

        let _guard = self.locks.acquire(&[key.warehouse_id])?;
        let warehouse = self.require_warehouse(key.warehouse_id)?;

        if let Some(existing) = self.lines.find_by_key(&key)? {
            debug!(line_id = %existing.id(), "merging into existing inventory line");
            if draft.quantity == 0 {
                return Ok(existing);
            }
            return self.adjust_locked(
                &warehouse,
                existing,
                QuantityOperation::Increment,
                draft.quantity,
            );
        }

        let updated = self.occupy(&warehouse, CapacityChange::Occupy(draft.quantity))?;
        let line = InventoryLine::new(self.lines.next_id()?, draft)?;
        let saved = self.commit(vec![(warehouse, updated)], LineWrite::Insert(line))?;
        info!(
            line_id = %saved.id(),
            warehouse_id = %saved.warehouse_id(),
            quantity = saved.quantity(),
            "inventory line created"
        );
        Ok(saved)
    }

    /// Replace product, warehouse, size, and quantity of an existing line.
    ///
    /// Moving the line to another warehouse releases its old quantity from the
    /// source and occupies the new quantity at the destination.
    #[instrument(skip(self))]
    pub fn update(
        &self,
        id: InventoryLineId,
        draft: InventoryLineDraft,
    ) -> ServiceResult<InventoryLine> {
        let key = draft.key()?;
        self.require_product(key.product_id)?;

        let (_guard, current) = self
            .lock_line(id, Some(key.warehouse_id))?
            .ok_or_else(|| line_not_found(id))?;
        self.update_locked(current, &key, draft)
    }

    /// Update the line if it exists, otherwise insert it under the given id.
    ///
    /// The insert path is capacity-checked like `create`, but never merges: a
    /// different line already holding the same (product, warehouse, size) is a
    /// `Conflict`.
    #[instrument(skip(self))]
    pub fn upsert(
        &self,
        id: InventoryLineId,
        draft: InventoryLineDraft,
    ) -> ServiceResult<InventoryLine> {
        let key = draft.key()?;
        self.require_product(key.product_id)?;

        if let Some((_guard, current)) = self.lock_line(id, Some(key.warehouse_id))? {
            return self.update_locked(current, &key, draft);
        }

        let _guard = self.locks.acquire(&[key.warehouse_id])?;
        let warehouse = self.require_warehouse(key.warehouse_id)?;
        self.ensure_key_free(&key, None)?;

        let updated = self.occupy(&warehouse, CapacityChange::Occupy(draft.quantity))?;
        let line = InventoryLine::new(id, draft)?;
        let saved = self.commit(vec![(warehouse, updated)], LineWrite::Insert(line))?;
        info!(line_id = %id, warehouse_id = %saved.warehouse_id(), "inventory line upserted");
        Ok(saved)
    }

    /// Increment or decrement a line's quantity by `value` (must be ≥ 1).
    #[instrument(skip(self))]
    pub fn adjust_quantity(
        &self,
        id: InventoryLineId,
        operation: QuantityOperation,
        value: u32,
    ) -> ServiceResult<InventoryLine> {
        let (_guard, line) = self
            .lock_line(id, None)?
            .ok_or_else(|| line_not_found(id))?;
        let warehouse = self.require_warehouse(line.warehouse_id())?;
        self.adjust_locked(&warehouse, line, operation, value)
    }

    /// Remove a line and release its quantity. Deleting a missing id succeeds.
    #[instrument(skip(self))]
    pub fn delete(&self, id: InventoryLineId) -> ServiceResult<()> {
        let Some((_guard, line)) = self.lock_line(id, None)? else {
            debug!(line_id = %id, "delete of missing inventory line ignored");
            return Ok(());
        };

        let warehouse = self.require_warehouse(line.warehouse_id())?;
        let updated = CapacityChange::Release(line.quantity()).apply(&warehouse)?;

        self.warehouses.save(updated.clone())?;
        if let Err(e) = self.lines.delete(id) {
            error!(line_id = %id, error = %e, "line delete failed; restoring warehouse");
            self.restore(&[warehouse]);
            return Err(e.into());
        }

        info!(
            line_id = %id,
            warehouse_id = %updated.id(),
            current_capacity = updated.current_capacity(),
            "inventory line deleted"
        );
        Ok(())
    }

    // -------------------------
    // Locked sections (caller holds the relevant warehouse locks)
    // -------------------------

    fn adjust_locked(
        &self,
        warehouse: &Warehouse,
        line: InventoryLine,
        operation: QuantityOperation,
        value: u32,
    ) -> ServiceResult<InventoryLine> {
        let updated = self.occupy(warehouse, CapacityChange::for_operation(operation, value))?;
        let adjusted = line.adjusted(operation, value)?;
        let saved = self.commit(vec![(warehouse.clone(), updated)], LineWrite::Replace(adjusted))?;
        info!(
            line_id = %saved.id(),
            %operation,
            value,
            quantity = saved.quantity(),
            "inventory quantity adjusted"
        );
        Ok(saved)
    }

    fn update_locked(
        &self,
        current: InventoryLine,
        key: &InventoryKey,
        draft: InventoryLineDraft,
    ) -> ServiceResult<InventoryLine> {
        self.ensure_key_free(key, Some(current.id()))?;
        let replacement = current.replaced(draft)?;

        let writes = if key.warehouse_id != current.warehouse_id() {
            let source = self.require_warehouse(current.warehouse_id())?;
            let destination = self.require_warehouse(key.warehouse_id)?;

            let source_after = CapacityChange::Release(current.quantity()).apply(&source)?;
            let destination_after =
                self.occupy(&destination, CapacityChange::Occupy(replacement.quantity()))?;
            debug!(
                from = %source.id(),
                to = %destination.id(),
                "moving inventory line between warehouses"
            );
            vec![(source, source_after), (destination, destination_after)]
        } else {
            let warehouse = self.require_warehouse(key.warehouse_id)?;
            let change = CapacityChange::between(current.quantity(), replacement.quantity());
            let updated = self.occupy(&warehouse, change)?;
            vec![(warehouse, updated)]
        };

        let saved = self.commit(writes, LineWrite::Replace(replacement))?;
        info!(
            line_id = %saved.id(),
            warehouse_id = %saved.warehouse_id(),
            quantity = saved.quantity(),
            "inventory line updated"
        );
        Ok(saved)
    }

    // -------------------------
    // Helpers
    // -------------------------

    /// Apply `change`, logging rejections at the ceiling.
    fn occupy(&self, warehouse: &Warehouse, change: CapacityChange) -> ServiceResult<Warehouse> {
        change.apply(warehouse).map_err(|e| {
            warn!(
                warehouse_id = %warehouse.id(),
                current_capacity = warehouse.current_capacity(),
                max_capacity = warehouse.max_capacity(),
                ?change,
                "capacity change rejected"
            );
            ServiceError::from(e)
        })
    }

    /// Write warehouses (in order), then the line. Restores the warehouses
    /// already written if a later write fails.
    fn commit(
        &self,
        warehouses: Vec<(Warehouse, Warehouse)>,
        line: LineWrite,
    ) -> ServiceResult<InventoryLine> {
        let mut written: Vec<Warehouse> = Vec::with_capacity(warehouses.len());
        for (before, after) in warehouses {
            if let Err(e) = self.warehouses.save(after) {
                error!(warehouse_id = %before.id(), error = %e, "warehouse write failed");
                self.restore(&written);
                return Err(e.into());
            }
            written.push(before);
        }

        let result = match line {
            LineWrite::Replace(line) => self.lines.save(line).map_err(ServiceError::from),
            LineWrite::Insert(line) => {
                let id = line.id();
                match self.lines.insert(line) {
                    Ok(Some(saved)) => Ok(saved),
                    Ok(None) => Err(ServiceError::Conflict(format!(
                        "inventory line {id} already exists"
                    ))),
                    Err(e) => Err(e.into()),
                }
            }
        };

        if let Err(e) = &result {
            error!(error = %e, "inventory line write failed; restoring warehouses");
            self.restore(&written);
        }
        result
    }

    /// Best-effort write-back of warehouse snapshots, newest first.
    fn restore(&self, snapshots: &[Warehouse]) {
        for snapshot in snapshots.iter().rev() {
            if let Err(e) = self.warehouses.save(snapshot.clone()) {
                error!(
                    warehouse_id = %snapshot.id(),
                    error = %e,
                    "failed to restore warehouse; capacity counter needs an audit"
                );
            }
        }
    }

    /// Lock the warehouse currently holding line `id` (plus `also`), then
    /// re-read the line. Retries if the line moved in between.
    fn lock_line(
        &self,
        id: InventoryLineId,
        also: Option<WarehouseId>,
    ) -> ServiceResult<Option<(WarehouseGuard, InventoryLine)>> {
        for _ in 0..MAX_LOCK_ATTEMPTS {
            let Some(seen) = self.lines.find(id)? else {
                return Ok(None);
            };

            let ids: BTreeSet<WarehouseId> =
                std::iter::once(seen.warehouse_id()).chain(also).collect();
            let ids: Vec<WarehouseId> = ids.into_iter().collect();
            let guard = self.locks.acquire(&ids)?;

            match self.lines.find(id)? {
                Some(line) if guard.covers(line.warehouse_id()) => {
                    return Ok(Some((guard, line)));
                }
                Some(_) => debug!(line_id = %id, "inventory line moved while locking; retrying"),
                None => return Ok(None),
            }
        }

        Err(LockError::Contended(format!(
            "inventory line {id} kept moving between warehouses"
        ))
        .into())
    }

    fn ensure_key_free(
        &self,
        key: &InventoryKey,
        except: Option<InventoryLineId>,
    ) -> ServiceResult<()> {
        match self.lines.find_by_key(key)? {
            Some(other) if Some(other.id()) != except => Err(ServiceError::Conflict(format!(
                "inventory line {} already holds product {} in warehouse {} with size {}",
                other.id(),
                key.product_id,
                key.warehouse_id,
                key.size.as_deref().unwrap_or("<none>")
            ))),
            _ => Ok(()),
        }
    }

    fn require_warehouse(&self, id: WarehouseId) -> ServiceResult<Warehouse> {
        self.warehouses
            .find(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("warehouse {id}")))
    }

    fn require_product(&self, id: ProductId) -> ServiceResult<()> {
        match self.products.find(id)? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(format!("product {id}"))),
        }
    }
}

fn line_not_found(id: InventoryLineId) -> ServiceError {
    ServiceError::NotFound(format!("inventory line {id}"))
}
