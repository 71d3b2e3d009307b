//! Request handlers: DTO in, view or `ApiError` out.
//!
//! Each handler is transport-agnostic; an HTTP adapter only has to
//! deserialize the body, call the handler, and write `ApiError::status` plus
//! `ApiError::body()` on failure.

use cragsupply_core::{CategoryId, Entity, InventoryLineId, ProductId, WarehouseId};
use cragsupply_infra::Services;
use cragsupply_infra::seed;
use cragsupply_inventory::WarehouseDraft;

use crate::dto::{
    CapacityView, CategoryRequest, CategoryView, InventoryRequest, InventoryView,
    ProductDetailsView, ProductRequest, ProductView, UpdateQuantityRequest, WarehouseRequest,
    WarehouseView,
};
use crate::errors::{ApiError, NOT_FOUND};

pub type HandlerResult<T> = Result<T, ApiError>;

fn not_found(what: &str, id: u64) -> ApiError {
    ApiError::new(NOT_FOUND, "not_found", format!("{what} {id} not found"))
}

fn name_not_found(what: &str, name: &str) -> ApiError {
    ApiError::new(NOT_FOUND, "not_found", format!("{what} '{name}' not found"))
}

// -------------------------
// Inventory
// -------------------------

pub fn list_inventory(services: &Services) -> HandlerResult<Vec<InventoryView>> {
    let lines = services.inventory.list()?;
    Ok(lines.iter().map(InventoryView::from).collect())
}

pub fn get_inventory(services: &Services, id: u64) -> HandlerResult<InventoryView> {
    services
        .inventory
        .find(InventoryLineId::from_raw(id))?
        .as_ref()
        .map(InventoryView::from)
        .ok_or_else(|| not_found("inventory line", id))
}

pub fn list_inventory_by_warehouse(
    services: &Services,
    warehouse: u64,
) -> HandlerResult<Vec<InventoryView>> {
    let lines = services
        .inventory
        .list_by_warehouse(WarehouseId::from_raw(warehouse))?;
    Ok(lines.iter().map(InventoryView::from).collect())
}

pub fn list_inventory_by_category(
    services: &Services,
    category: u64,
) -> HandlerResult<Vec<InventoryView>> {
    let lines = services
        .inventory
        .list_by_category(CategoryId::from_raw(category))?;
    Ok(lines.iter().map(InventoryView::from).collect())
}

pub fn create_inventory(services: &Services, req: InventoryRequest) -> HandlerResult<InventoryView> {
    let line = services.inventory.create(req.into_draft()?)?;
    Ok(InventoryView::from(&line))
}

pub fn update_inventory(
    services: &Services,
    id: u64,
    req: InventoryRequest,
) -> HandlerResult<InventoryView> {
    let line = services
        .inventory
        .update(InventoryLineId::from_raw(id), req.into_draft()?)?;
    Ok(InventoryView::from(&line))
}

pub fn upsert_inventory(
    services: &Services,
    id: u64,
    req: InventoryRequest,
) -> HandlerResult<InventoryView> {
    let line = services
        .inventory
        .upsert(InventoryLineId::from_raw(id), req.into_draft()?)?;
    Ok(InventoryView::from(&line))
}

pub fn adjust_inventory_quantity(
    services: &Services,
    id: u64,
    req: UpdateQuantityRequest,
) -> HandlerResult<InventoryView> {
    let (operation, value) = req.parse()?;
    let line = services
        .inventory
        .adjust_quantity(InventoryLineId::from_raw(id), operation, value)?;
    Ok(InventoryView::from(&line))
}

pub fn delete_inventory(services: &Services, id: u64) -> HandlerResult<()> {
    services.inventory.delete(InventoryLineId::from_raw(id))?;
    Ok(())
}

// -------------------------
// Warehouses
// -------------------------

pub fn list_warehouses(services: &Services) -> HandlerResult<Vec<WarehouseView>> {
    let warehouses = services.warehouses.list()?;
    Ok(warehouses.iter().map(WarehouseView::from).collect())
}

pub fn get_warehouse(services: &Services, id: u64) -> HandlerResult<WarehouseView> {
    services
        .warehouses
        .find(WarehouseId::from_raw(id))?
        .as_ref()
        .map(WarehouseView::from)
        .ok_or_else(|| not_found("warehouse", id))
}

pub fn find_warehouse_by_name(services: &Services, name: &str) -> HandlerResult<WarehouseView> {
    services
        .warehouses
        .find_by_name(name)?
        .as_ref()
        .map(WarehouseView::from)
        .ok_or_else(|| name_not_found("warehouse", name))
}

pub fn create_warehouse(services: &Services, req: WarehouseRequest) -> HandlerResult<WarehouseView> {
    let warehouse = services.warehouses.create(WarehouseDraft::from(req))?;
    Ok(WarehouseView::from(&warehouse))
}

pub fn update_warehouse(
    services: &Services,
    id: u64,
    req: WarehouseRequest,
) -> HandlerResult<WarehouseView> {
    let warehouse = services
        .warehouses
        .update(WarehouseId::from_raw(id), WarehouseDraft::from(req))?;
    Ok(WarehouseView::from(&warehouse))
}

pub fn delete_warehouse(services: &Services, id: u64) -> HandlerResult<()> {
    services.warehouses.delete(WarehouseId::from_raw(id))?;
    Ok(())
}

/// Occupancy of every warehouse, recomputed from its lines.
pub fn capacity_summary(services: &Services) -> HandlerResult<Vec<CapacityView>> {
    let mut summary = Vec::new();
    for warehouse in services.warehouses.list()? {
        let audit = services.inventory.audit(warehouse.id())?;
        summary.push(CapacityView::new(&warehouse, &audit));
    }
    Ok(summary)
}

// -------------------------
// Catalog
// -------------------------

pub fn list_categories(services: &Services) -> HandlerResult<Vec<CategoryView>> {
    let categories = services.categories.list()?;
    Ok(categories.iter().map(CategoryView::from).collect())
}

pub fn get_category(services: &Services, id: u64) -> HandlerResult<CategoryView> {
    services
        .categories
        .find(CategoryId::from_raw(id))?
        .as_ref()
        .map(CategoryView::from)
        .ok_or_else(|| not_found("category", id))
}

pub fn find_category_by_name(services: &Services, name: &str) -> HandlerResult<CategoryView> {
    services
        .categories
        .find_by_name(name)?
        .as_ref()
        .map(CategoryView::from)
        .ok_or_else(|| name_not_found("category", name))
}

pub fn create_category(services: &Services, req: CategoryRequest) -> HandlerResult<CategoryView> {
    let category = services.categories.create(req.into())?;
    Ok(CategoryView::from(&category))
}

pub fn update_category(
    services: &Services,
    id: u64,
    req: CategoryRequest,
) -> HandlerResult<CategoryView> {
    let category = services
        .categories
        .update(CategoryId::from_raw(id), req.into())?;
    Ok(CategoryView::from(&category))
}

pub fn delete_category(services: &Services, id: u64) -> HandlerResult<()> {
    services.categories.delete(CategoryId::from_raw(id))?;
    Ok(())
}

pub fn list_products(services: &Services) -> HandlerResult<Vec<ProductView>> {
    let products = services.products.list()?;
    Ok(products.iter().map(ProductView::from).collect())
}

pub fn get_product(services: &Services, id: u64) -> HandlerResult<ProductView> {
    services
        .products
        .find(ProductId::from_raw(id))?
        .as_ref()
        .map(ProductView::from)
        .ok_or_else(|| not_found("product", id))
}

pub fn get_product_detailed(services: &Services, id: u64) -> HandlerResult<ProductDetailsView> {
    services
        .products
        .find_detailed(ProductId::from_raw(id))?
        .as_ref()
        .map(ProductDetailsView::from)
        .ok_or_else(|| not_found("product", id))
}

/// Every product with its lines, optionally restricted to one category.
pub fn list_products_detailed(
    services: &Services,
    category: Option<u64>,
) -> HandlerResult<Vec<ProductDetailsView>> {
    let details = services
        .products
        .list_detailed(category.map(CategoryId::from_raw))?;
    Ok(details.iter().map(ProductDetailsView::from).collect())
}

pub fn create_product(services: &Services, req: ProductRequest) -> HandlerResult<ProductView> {
    let product = services.products.create(req.into_draft()?)?;
    Ok(ProductView::from(&product))
}

pub fn update_product(
    services: &Services,
    id: u64,
    req: ProductRequest,
) -> HandlerResult<ProductView> {
    let product = services
        .products
        .update(ProductId::from_raw(id), req.into_draft()?)?;
    Ok(ProductView::from(&product))
}

pub fn delete_product(services: &Services, id: u64) -> HandlerResult<()> {
    services.products.delete(ProductId::from_raw(id))?;
    Ok(())
}

// -------------------------
// Demo data
// -------------------------

/// Drop all records and reload the demonstration data set.
pub fn reset_demo_data(services: &Services) -> HandlerResult<Vec<CapacityView>> {
    seed::reset_demo_data(services)?;
    capacity_summary(services)
}
