use serde::{Deserialize, Serialize};

use cragsupply_core::{DomainError, DomainResult, Entity, InventoryLineId, ProductId, WarehouseId};

use crate::operation::QuantityOperation;

const SIZE_MAX: usize = 20;

/// Merge identity of an inventory line: one row per (product, warehouse, size).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InventoryKey {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    /// `None` for sizeless products such as ropes.
    pub size: Option<String>,
}

/// Caller-supplied line fields (no identity yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLineDraft {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub size: Option<String>,
    pub quantity: u32,
}

impl InventoryLineDraft {
    /// Normalise the size and return the merge key this draft targets.
    pub fn key(&self) -> DomainResult<InventoryKey> {
        Ok(InventoryKey {
            product_id: self.product_id,
            warehouse_id: self.warehouse_id,
            size: normalize_size(self.size.as_deref())?,
        })
    }
}

/// Trim a size label; blank labels mean "sizeless".
pub fn normalize_size(size: Option<&str>) -> DomainResult<Option<String>> {
    let Some(raw) = size else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > SIZE_MAX {
        return Err(DomainError::validation(format!(
            "size must be at most {SIZE_MAX} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Quantity of one product, in one size, held at one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    id: InventoryLineId,
    key: InventoryKey,
    quantity: u32,
}

impl InventoryLine {
    pub fn new(id: InventoryLineId, draft: InventoryLineDraft) -> DomainResult<Self> {
        Ok(Self {
            id,
            key: draft.key()?,
            quantity: draft.quantity,
        })
    }

    pub fn key(&self) -> &InventoryKey {
        &self.key
    }

    pub fn product_id(&self) -> ProductId {
        self.key.product_id
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.key.warehouse_id
    }

    pub fn size(&self) -> Option<&str> {
        self.key.size.as_deref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Apply an increment/decrement of `value` units.
    ///
    /// `value` must be positive. Decrementing below zero is rejected rather than
    /// producing a negative quantity.
    pub fn adjusted(&self, operation: QuantityOperation, value: u32) -> DomainResult<Self> {
        if value == 0 {
            return Err(DomainError::validation("adjustment value must be at least 1"));
        }
        let quantity = match operation {
            QuantityOperation::Increment => self.quantity.checked_add(value).ok_or_else(|| {
                DomainError::validation(format!("quantity of line {} would overflow", self.id))
            })?,
            QuantityOperation::Decrement => self.quantity.checked_sub(value).ok_or_else(|| {
                DomainError::invariant(format!(
                    "quantity of line {} cannot go negative ({} - {value})",
                    self.id, self.quantity
                ))
            })?,
        };
        Ok(Self {
            quantity,
            ..self.clone()
        })
    }

    /// Replace every field except the identity.
    pub fn replaced(&self, draft: InventoryLineDraft) -> DomainResult<Self> {
        Self::new(self.id, draft)
    }
}

impl Entity for InventoryLine {
    type Id = InventoryLineId;

    fn id(&self) -> InventoryLineId {
        self.id
    }
}
