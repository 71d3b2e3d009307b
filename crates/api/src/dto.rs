use serde::{Deserialize, Serialize};

use cragsupply_catalog::{Category, CategoryDraft, Price, Product, ProductDraft};
use cragsupply_core::{
    CategoryId, Entity, InventoryLineId, ProductId, WarehouseId,
};
use cragsupply_infra::services::{CapacityAudit, ProductDetails};
use cragsupply_inventory::{
    InventoryLine, InventoryLineDraft, QuantityOperation, Warehouse, WarehouseAddress,
    WarehouseDraft,
};

use crate::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// Create/replace an inventory line. `quantity` arrives as text and is parsed
/// here.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryRequest {
    pub product: u64,
    pub warehouse: u64,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: String,
}

impl InventoryRequest {
    pub fn into_draft(self) -> Result<InventoryLineDraft, ApiError> {
        let quantity = parse_quantity(&self.quantity)?;
        Ok(InventoryLineDraft {
            product_id: ProductId::from_raw(self.product),
            warehouse_id: WarehouseId::from_raw(self.warehouse),
            size: self.size,
            quantity,
        })
    }
}

fn parse_quantity(raw: &str) -> Result<u32, ApiError> {
    raw.trim().parse::<u32>().map_err(|_| {
        ApiError::validation(format!(
            "quantity must be a non-negative whole number, got '{raw}'"
        ))
    })
}

fn default_adjust_value() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuantityRequest {
    pub operation: String,
    #[serde(default = "default_adjust_value")]
    pub value: u32,
}

impl UpdateQuantityRequest {
    pub fn parse(&self) -> Result<(QuantityOperation, u32), ApiError> {
        if self.operation.trim().is_empty() {
            return Err(ApiError::validation("operation is required"));
        }
        if self.value < 1 {
            return Err(ApiError::validation("value must be at least 1"));
        }
        let operation: QuantityOperation = self.operation.parse()?;
        Ok((operation, self.value))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseRequest {
    pub name: String,
    pub max_capacity: u32,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl From<WarehouseRequest> for WarehouseDraft {
    fn from(req: WarehouseRequest) -> Self {
        WarehouseDraft {
            name: req.name,
            max_capacity: req.max_capacity,
            address: WarehouseAddress {
                street_address: req.street_address,
                city: req.city,
                state: req.state,
                zip_code: req.zip_code,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

impl From<CategoryRequest> for CategoryDraft {
    fn from(req: CategoryRequest) -> Self {
        CategoryDraft { name: req.name }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductRequest {
    pub category: u64,
    pub brand: String,
    pub name: String,
    pub description: String,
    /// Decimal text, e.g. `"149.99"`.
    pub price: String,
}

impl ProductRequest {
    pub fn into_draft(self) -> Result<ProductDraft, ApiError> {
        Ok(ProductDraft {
            category_id: CategoryId::from_raw(self.category),
            brand: self.brand,
            name: self.name,
            description: self.description,
            price: self.price.parse::<Price>()?,
        })
    }
}

// -------------------------
// Response views
// -------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryView {
    pub id: InventoryLineId,
    pub product: ProductId,
    pub warehouse: WarehouseId,
    pub size: Option<String>,
    pub quantity: u32,
}

impl From<&InventoryLine> for InventoryView {
    fn from(line: &InventoryLine) -> Self {
        Self {
            id: line.id(),
            product: line.product_id(),
            warehouse: line.warehouse_id(),
            size: line.size().map(str::to_string),
            quantity: line.quantity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarehouseView {
    pub id: WarehouseId,
    pub name: String,
    pub max_capacity: u32,
    pub current_capacity: u32,
    pub available_capacity: u32,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl From<&Warehouse> for WarehouseView {
    fn from(w: &Warehouse) -> Self {
        let address = w.address();
        Self {
            id: w.id(),
            name: w.name().to_string(),
            max_capacity: w.max_capacity(),
            current_capacity: w.current_capacity(),
            available_capacity: w.available_capacity(),
            street_address: address.street_address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip_code: address.zip_code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
}

impl From<&Category> for CategoryView {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id(),
            name: c.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub category: CategoryId,
    pub brand: String,
    pub name: String,
    pub description: String,
    /// Rendered as `"149.99"`.
    pub price: String,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id(),
            category: p.category_id(),
            brand: p.brand().to_string(),
            name: p.name().to_string(),
            description: p.description().to_string(),
            price: p.price().to_string(),
        }
    }
}

/// A product with the inventory lines that stock it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetailsView {
    pub product: ProductView,
    pub inventory: Vec<InventoryView>,
}

impl From<&ProductDetails> for ProductDetailsView {
    fn from(d: &ProductDetails) -> Self {
        Self {
            product: ProductView::from(&d.product),
            inventory: d.lines.iter().map(InventoryView::from).collect(),
        }
    }
}

/// Warehouse occupancy as reported by the demo binary and the capacity
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityView {
    pub warehouse: WarehouseId,
    pub name: String,
    pub current_capacity: u32,
    pub max_capacity: u32,
    pub line_count: usize,
    pub consistent: bool,
}

impl CapacityView {
    pub fn new(warehouse: &Warehouse, audit: &CapacityAudit) -> Self {
        Self {
            warehouse: warehouse.id(),
            name: warehouse.name().to_string(),
            current_capacity: audit.recorded,
            max_capacity: audit.max_capacity,
            line_count: audit.line_count,
            consistent: audit.is_consistent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BAD_REQUEST;

    #[test]
    fn inventory_request_parses_text_quantity() {
        let req: InventoryRequest = serde_json::from_str(
            r#"{"product": 2, "warehouse": 1, "size": "M", "quantity": " 150 "}"#,
        )
        .unwrap();
        let draft = req.into_draft().unwrap();
        assert_eq!(draft.quantity, 150);
        assert_eq!(draft.size.as_deref(), Some("M"));
        assert_eq!(draft.warehouse_id, WarehouseId::from_raw(1));
    }

    #[test]
    fn negative_or_garbage_quantity_is_rejected() {
        for quantity in ["-5", "ten", "", "1.5"] {
            let req = InventoryRequest {
                product: 1,
                warehouse: 1,
                size: None,
                quantity: quantity.to_string(),
            };
            let err = req.into_draft().unwrap_err();
            assert_eq!(err.status, BAD_REQUEST);
            assert_eq!(err.code, "validation_error");
        }
    }

    #[test]
    fn update_quantity_defaults_value_to_one() {
        let req: UpdateQuantityRequest =
            serde_json::from_str(r#"{"operation": "increment"}"#).unwrap();
        assert_eq!(req.parse().unwrap(), (QuantityOperation::Increment, 1));
    }

    #[test]
    fn update_quantity_rejects_zero_and_unknown_tokens() {
        let zero = UpdateQuantityRequest {
            operation: "decrement".to_string(),
            value: 0,
        };
        assert_eq!(zero.parse().unwrap_err().code, "validation_error");

        let unknown = UpdateQuantityRequest {
            operation: "multiply".to_string(),
            value: 2,
        };
        assert_eq!(unknown.parse().unwrap_err().code, "invalid_operation");

        let blank = UpdateQuantityRequest {
            operation: "  ".to_string(),
            value: 2,
        };
        assert_eq!(blank.parse().unwrap_err().code, "validation_error");
    }

    fn product_request(price: &str) -> ProductRequest {
        ProductRequest {
            category: 3,
            brand: "RockGuard".to_string(),
            name: "ProLock Carabiner Set".to_string(),
            description: "Set of 5 lightweight carabiners.".to_string(),
            price: price.to_string(),
        }
    }

    #[test]
    fn product_request_parses_price_text_into_cents() {
        let draft = product_request("29.99").into_draft().unwrap();
        assert_eq!(draft.price, Price::from_cents(2_999));
    }

    #[test]
    fn product_request_rejects_malformed_price() {
        let err = product_request("29.999").into_draft().unwrap_err();
        assert_eq!(err.status, BAD_REQUEST);
        assert_eq!(err.code, "validation_error");
    }

    #[test]
    fn product_request_requires_description() {
        let missing = serde_json::from_str::<ProductRequest>(
            r#"{"category": 1, "brand": "PeakPro", "name": "Rope", "price": "10.00"}"#,
        );
        assert!(missing.is_err());
    }
}
