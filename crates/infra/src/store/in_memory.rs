use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use cragsupply_catalog::{Category, Product};
use cragsupply_core::{CategoryId, Entity, ProductId, RecordId, WarehouseId};
use cragsupply_inventory::{InventoryKey, InventoryLine, Warehouse};

use super::{
    CategoryStore, InventoryStore, ProductStore, Repository, StoreError, StoreResult,
    WarehouseLedger,
};

/// In-memory keyed store for tests/dev.
///
/// Ids are handed out from a sequence starting at 1. Saving a record with an
/// explicit id moves the sequence past it, the way an identity column does.
/// Once `u64::MAX` has been used, `next_id` fails instead of wrapping.
#[derive(Debug)]
pub struct InMemoryRepository<E: Entity> {
    records: RwLock<BTreeMap<E::Id, E>>,
    // Highest id issued or stored so far.
    last: AtomicU64,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            last: AtomicU64::new(0),
        }
    }

    fn filtered(&self, keep: impl Fn(&E) -> bool) -> StoreResult<Vec<E>> {
        let map = self.records.read().map_err(poisoned)?;
        Ok(map.values().filter(|r| keep(*r)).cloned().collect())
    }

    fn first(&self, keep: impl Fn(&E) -> bool) -> StoreResult<Option<E>> {
        let map = self.records.read().map_err(poisoned)?;
        Ok(map.values().find(|r| keep(*r)).cloned())
    }

    fn bump_sequence(&self, id: E::Id) {
        self.last.fetch_max(id.get(), Ordering::SeqCst);
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Poisoned(err.to_string())
}

impl<E> Repository<E> for InMemoryRepository<E>
where
    E: Entity + Send + Sync,
{
    fn find(&self, id: E::Id) -> StoreResult<Option<E>> {
        let map = self.records.read().map_err(poisoned)?;
        Ok(map.get(&id).cloned())
    }

    fn list(&self) -> StoreResult<Vec<E>> {
        self.filtered(|_| true)
    }

    fn next_id(&self) -> StoreResult<E::Id> {
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|last| E::Id::from_raw(last + 1))
            .map_err(|_| StoreError::SequenceExhausted(std::any::type_name::<E>().to_string()))
    }

    fn save(&self, record: E) -> StoreResult<E> {
        let mut map = self.records.write().map_err(poisoned)?;
        self.bump_sequence(record.id());
        map.insert(record.id(), record.clone());
        Ok(record)
    }

    fn insert(&self, record: E) -> StoreResult<Option<E>> {
        let mut map = self.records.write().map_err(poisoned)?;
        if map.contains_key(&record.id()) {
            return Ok(None);
        }
        self.bump_sequence(record.id());
        map.insert(record.id(), record.clone());
        Ok(Some(record))
    }

    fn delete(&self, id: E::Id) -> StoreResult<bool> {
        let mut map = self.records.write().map_err(poisoned)?;
        Ok(map.remove(&id).is_some())
    }

    fn clear(&self) -> StoreResult<()> {
        let mut map = self.records.write().map_err(poisoned)?;
        map.clear();
        self.last.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn is_empty(&self) -> StoreResult<bool> {
        let map = self.records.read().map_err(poisoned)?;
        Ok(map.is_empty())
    }
}

impl WarehouseLedger for InMemoryRepository<Warehouse> {
    fn find_by_name(&self, name: &str) -> StoreResult<Option<Warehouse>> {
        self.first(|w| w.name() == name)
    }
}

impl InventoryStore for InMemoryRepository<InventoryLine> {
    fn find_by_key(&self, key: &InventoryKey) -> StoreResult<Option<InventoryLine>> {
        self.first(|l| l.key() == key)
    }

    fn list_by_warehouse(&self, warehouse_id: WarehouseId) -> StoreResult<Vec<InventoryLine>> {
        self.filtered(|l| l.warehouse_id() == warehouse_id)
    }

    fn list_by_product(&self, product_id: ProductId) -> StoreResult<Vec<InventoryLine>> {
        self.filtered(|l| l.product_id() == product_id)
    }
}

impl ProductStore for InMemoryRepository<Product> {
    fn list_by_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>> {
        self.filtered(|p| p.category_id() == category_id)
    }

    fn find_by_brand_and_name(&self, brand: &str, name: &str) -> StoreResult<Option<Product>> {
        self.first(|p| p.brand() == brand && p.name() == name)
    }
}

impl CategoryStore for InMemoryRepository<Category> {
    fn find_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        self.first(|c| c.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cragsupply_catalog::CategoryDraft;
    use cragsupply_core::InventoryLineId;
    use cragsupply_inventory::InventoryLineDraft;

    fn category(id: u64, name: &str) -> Category {
        Category::new(
            CategoryId::from_raw(id),
            CategoryDraft {
                name: name.to_string(),
            },
        )
        .unwrap()
    }

    fn line(id: u64, product: u64, warehouse: u64, size: Option<&str>) -> InventoryLine {
        InventoryLine::new(
            InventoryLineId::from_raw(id),
            InventoryLineDraft {
                product_id: ProductId::from_raw(product),
                warehouse_id: WarehouseId::from_raw(warehouse),
                size: size.map(str::to_string),
                quantity: 10,
            },
        )
        .unwrap()
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let store: InMemoryRepository<Category> = InMemoryRepository::new();
        assert_eq!(store.next_id().unwrap(), CategoryId::from_raw(1));
        assert_eq!(store.next_id().unwrap(), CategoryId::from_raw(2));
    }

    #[test]
    fn saving_explicit_id_moves_sequence_past_it() {
        let store: InMemoryRepository<Category> = InMemoryRepository::new();
        store.save(category(10, "Ropes")).unwrap();
        assert_eq!(store.next_id().unwrap(), CategoryId::from_raw(11));
    }

    #[test]
    fn sequence_fails_once_the_largest_id_is_used() {
        let store: InMemoryRepository<Category> = InMemoryRepository::new();
        store.save(category(u64::MAX, "Ropes")).unwrap();

        let err = store.next_id().unwrap_err();
        assert!(matches!(err, StoreError::SequenceExhausted(_)));
        // Still exhausted; never wraps back to small ids.
        assert!(store.next_id().is_err());
    }

    #[test]
    fn clear_empties_store_and_restarts_sequence() {
        let store: InMemoryRepository<Category> = InMemoryRepository::new();
        store.save(category(7, "Ropes")).unwrap();
        store.clear().unwrap();

        assert!(store.is_empty().unwrap());
        assert_eq!(store.next_id().unwrap(), CategoryId::from_raw(1));
    }

    #[test]
    fn insert_refuses_taken_id() {
        let store: InMemoryRepository<Category> = InMemoryRepository::new();
        assert!(store.insert(category(1, "Ropes")).unwrap().is_some());
        assert!(store.insert(category(1, "Helmets")).unwrap().is_none());
        assert_eq!(store.find(CategoryId::from_raw(1)).unwrap().unwrap().name(), "Ropes");
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let store: InMemoryRepository<Category> = InMemoryRepository::new();
        store.save(category(1, "Ropes")).unwrap();
        assert!(store.delete(CategoryId::from_raw(1)).unwrap());
        assert!(!store.delete(CategoryId::from_raw(1)).unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn find_by_key_distinguishes_sizeless_from_sized() {
        let store: InMemoryRepository<InventoryLine> = InMemoryRepository::new();
        store.save(line(1, 1, 1, None)).unwrap();
        store.save(line(2, 1, 1, Some("M"))).unwrap();

        let sizeless = InventoryKey {
            product_id: ProductId::from_raw(1),
            warehouse_id: WarehouseId::from_raw(1),
            size: None,
        };
        assert_eq!(
            store.find_by_key(&sizeless).unwrap().unwrap().id(),
            InventoryLineId::from_raw(1)
        );

        let large = InventoryKey {
            size: Some("L".to_string()),
            ..sizeless
        };
        assert!(!store.exists_by_key(&large).unwrap());
    }

    #[test]
    fn list_by_warehouse_filters_lines() {
        let store: InMemoryRepository<InventoryLine> = InMemoryRepository::new();
        store.save(line(1, 1, 1, None)).unwrap();
        store.save(line(2, 2, 2, None)).unwrap();
        store.save(line(3, 3, 1, Some("S"))).unwrap();

        let ids: Vec<_> = store
            .list_by_warehouse(WarehouseId::from_raw(1))
            .unwrap()
            .iter()
            .map(|l| l.id().get())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
