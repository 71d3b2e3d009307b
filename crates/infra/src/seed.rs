//! Demonstration data: climbing-gear categories, three warehouses, a handful of
//! products and stocked lines.
//!
//! Everything goes through the services, so the seeded counters are produced by
//! the same accounting as any other write.

use tracing::info;

use cragsupply_catalog::{CategoryDraft, Price, ProductDraft};
use cragsupply_core::{CategoryId, Entity, ProductId, WarehouseId};
use cragsupply_inventory::{InventoryLineDraft, WarehouseAddress, WarehouseDraft};

use crate::services::{ServiceError, ServiceResult, Services};

const CATEGORIES: [&str; 11] = [
    "Climbing Shoes",
    "Ropes",
    "Carabiners",
    "Helmets",
    "Belay Devices",
    "Crash Pads",
    "Climbing Accessories",
    "Backpacks & Daypacks",
    "Harnesses",
    "Chalk & Chalk Bags",
    "Climbing Apparel",
];

struct WarehouseSeed {
    name: &'static str,
    max_capacity: u32,
    street_address: &'static str,
    city: &'static str,
    state: &'static str,
    zip_code: &'static str,
}

const WAREHOUSES: [WarehouseSeed; 3] = [
    WarehouseSeed {
        name: "CA1",
        max_capacity: 1000,
        street_address: "7550 Trade St",
        city: "San Diego",
        state: "CA",
        zip_code: "92121",
    },
    WarehouseSeed {
        name: "NY1",
        max_capacity: 1200,
        street_address: "150 5th Ave",
        city: "New York",
        state: "NY",
        zip_code: "10011",
    },
    WarehouseSeed {
        name: "TX1",
        max_capacity: 1500,
        street_address: "2100 Kramer Ln",
        city: "Austin",
        state: "TX",
        zip_code: "78758",
    },
];

struct ProductSeed {
    category: &'static str,
    brand: &'static str,
    name: &'static str,
    description: &'static str,
    cents: u64,
}

const PRODUCTS: [ProductSeed; 6] = [
    ProductSeed {
        category: "Backpacks & Daypacks",
        brand: "SilkRun",
        name: "Alpine Explorer Backpack 40L",
        description: "Spacious and ergonomic backpack designed for carrying climbing gear, 40 liters capacity.",
        cents: 14_999,
    },
    ProductSeed {
        category: "Ropes",
        brand: "PeakPro",
        name: "Titanium Ascend Rope 60m",
        description: "Durable and lightweight climbing rope, 60 meters long, perfect for lead climbing.",
        cents: 19_999,
    },
    ProductSeed {
        category: "Carabiners",
        brand: "RockGuard",
        name: "ProLock Carabiner Set",
        description: "Set of 5 lightweight carabiners, essential for any climbing setup.",
        cents: 2_999,
    },
    ProductSeed {
        category: "Climbing Shoes",
        brand: "SummitKing",
        name: "Peak Performance Climbing Shoes",
        description: "High-performance climbing shoes with excellent grip and comfort.",
        cents: 12_999,
    },
    ProductSeed {
        category: "Belay Devices",
        brand: "SafeClimb",
        name: "Guardian Belay Device",
        description: "Easy-to-use belay device for secure climbing and rappelling.",
        cents: 2_499,
    },
    ProductSeed {
        category: "Helmets",
        brand: "PeakGuard",
        name: "Eagle Eye Climbing Helmet",
        description: "Protective climbing helmet with adjustable fit and ventilation.",
        cents: 8_999,
    },
];

/// (product name, warehouse name, size, quantity)
const LINES: [(&str, &str, Option<&str>, u32); 7] = [
    ("Titanium Ascend Rope 60m", "CA1", None, 100),
    ("Peak Performance Climbing Shoes", "NY1", Some("M"), 150),
    ("Alpine Explorer Backpack 40L", "NY1", Some("L"), 200),
    ("ProLock Carabiner Set", "NY1", Some("S"), 300),
    ("Eagle Eye Climbing Helmet", "CA1", Some("S"), 150),
    ("Guardian Belay Device", "CA1", Some("L"), 75),
    ("Eagle Eye Climbing Helmet", "TX1", Some("S"), 170),
];

/// Load the demonstration data set.
///
/// Returns `false` without writing anything when warehouses or categories
/// already exist.
pub fn seed_demo_data(services: &Services) -> ServiceResult<bool> {
    if !services.warehouses.list()?.is_empty() || !services.categories.list()?.is_empty() {
        info!("stores already populated; skipping demo data");
        return Ok(false);
    }

    let mut categories: Vec<(&str, CategoryId)> = Vec::with_capacity(CATEGORIES.len());
    for name in CATEGORIES {
        let category = services.categories.create(CategoryDraft {
            name: name.to_string(),
        })?;
        categories.push((name, category.id()));
    }

    let mut warehouses: Vec<(&str, WarehouseId)> = Vec::with_capacity(WAREHOUSES.len());
    for seed in &WAREHOUSES {
        let warehouse = services.warehouses.create(WarehouseDraft {
            name: seed.name.to_string(),
            max_capacity: seed.max_capacity,
            address: WarehouseAddress {
                street_address: seed.street_address.to_string(),
                city: seed.city.to_string(),
                state: seed.state.to_string(),
                zip_code: seed.zip_code.to_string(),
            },
        })?;
        warehouses.push((seed.name, warehouse.id()));
    }

    let mut products: Vec<(&str, ProductId)> = Vec::with_capacity(PRODUCTS.len());
    for seed in &PRODUCTS {
        let product = services.products.create(ProductDraft {
            category_id: lookup(&categories, seed.category)?,
            brand: seed.brand.to_string(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            price: Price::from_cents(seed.cents),
        })?;
        products.push((seed.name, product.id()));
    }

    for (product, warehouse, size, quantity) in LINES {
        services.inventory.create(InventoryLineDraft {
            product_id: lookup(&products, product)?,
            warehouse_id: lookup(&warehouses, warehouse)?,
            size: size.map(str::to_string),
            quantity,
        })?;
    }

    info!(
        categories = categories.len(),
        warehouses = warehouses.len(),
        products = products.len(),
        lines = LINES.len(),
        "demo data seeded"
    );
    Ok(true)
}

/// Wipe every store and load the demonstration data set from scratch.
///
/// Ids restart at 1, so the reloaded records get the same ids as a fresh seed.
pub fn reset_demo_data(services: &Services) -> ServiceResult<()> {
    services.clear_all()?;
    seed_demo_data(services)?;
    info!("demo data reset");
    Ok(())
}

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> ServiceResult<T> {
    table
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, id)| *id)
        .ok_or_else(|| ServiceError::NotFound(format!("seed record '{name}'")))
}
