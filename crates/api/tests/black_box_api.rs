use serde_json::{Value, json};

use cragsupply_api::config::Settings;
use cragsupply_api::dto::{InventoryRequest, UpdateQuantityRequest, WarehouseRequest};
use cragsupply_api::errors::{ApiError, BAD_REQUEST, CONFLICT, NOT_FOUND};
use cragsupply_api::{build_app, handlers};
use cragsupply_infra::Services;

fn empty_app() -> Services {
    let settings = Settings {
        seed_demo_data: false,
        ..Settings::default()
    };
    build_app(&settings).unwrap()
}

fn seeded_app() -> Services {
    build_app(&Settings::default()).unwrap()
}

/// Deserialize a request body the way a transport adapter would.
fn body<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

fn warehouse(services: &Services, name: &str, max_capacity: u32) -> u64 {
    let req: WarehouseRequest = body(json!({
        "name": name,
        "max_capacity": max_capacity,
        "street_address": "7550 Trade St",
        "city": "San Diego",
        "state": "CA",
        "zip_code": "92121"
    }));
    handlers::create_warehouse(services, req).unwrap().id.get()
}

fn product(services: &Services, name: &str) -> u64 {
    let category = handlers::create_category(services, body(json!({ "name": name }))).unwrap();
    handlers::create_product(
        services,
        body(json!({
            "category": category.id.get(),
            "brand": "PeakPro",
            "name": name,
            "description": format!("{name} for testing"),
            "price": "199.99"
        })),
    )
    .unwrap()
    .id
    .get()
}

fn stock(product: u64, warehouse: u64, size: Option<&str>, quantity: &str) -> InventoryRequest {
    body(json!({
        "product": product,
        "warehouse": warehouse,
        "size": size,
        "quantity": quantity
    }))
}

fn adjust(operation: &str, value: u32) -> UpdateQuantityRequest {
    body(json!({ "operation": operation, "value": value }))
}

fn current(services: &Services, warehouse: u64) -> u32 {
    handlers::get_warehouse(services, warehouse)
        .unwrap()
        .current_capacity
}

#[test]
fn seeded_app_reports_consistent_capacities() {
    let services = seeded_app();
    let summary = handlers::capacity_summary(&services).unwrap();

    let by_name: Vec<(&str, u32)> = summary
        .iter()
        .map(|c| (c.name.as_str(), c.current_capacity))
        .collect();
    assert_eq!(by_name, vec![("CA1", 325), ("NY1", 650), ("TX1", 170)]);
    assert!(summary.iter().all(|c| c.consistent));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json[0]["max_capacity"], 1000);
}

#[test]
fn inventory_lifecycle_tracks_capacity() {
    let services = empty_app();
    let w = warehouse(&services, "CA1", 1000);
    let rope = product(&services, "Ropes");
    let helmet = product(&services, "Helmets");

    let rope_line = handlers::create_inventory(&services, stock(rope, w, None, "100")).unwrap();
    assert_eq!(current(&services, w), 100);

    let helmet_line =
        handlers::create_inventory(&services, stock(helmet, w, Some("S"), "150")).unwrap();
    assert_eq!(current(&services, w), 250);

    let rope_line =
        handlers::adjust_inventory_quantity(&services, rope_line.id.get(), adjust("increment", 50))
            .unwrap();
    assert_eq!(rope_line.quantity, 150);
    assert_eq!(current(&services, w), 300);

    handlers::delete_inventory(&services, helmet_line.id.get()).unwrap();
    handlers::delete_inventory(&services, helmet_line.id.get()).unwrap();
    assert_eq!(current(&services, w), 150);
}

#[test]
fn create_with_existing_triple_merges() {
    let services = empty_app();
    let w = warehouse(&services, "NY1", 1200);
    let shoes = product(&services, "Climbing Shoes");

    let first = handlers::create_inventory(&services, stock(shoes, w, Some("M"), "100")).unwrap();
    let second = handlers::create_inventory(&services, stock(shoes, w, Some(" M "), "50")).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 150);
    assert_eq!(handlers::list_inventory(&services).unwrap().len(), 1);
    assert_eq!(current(&services, w), 150);
}

#[test]
fn over_capacity_create_is_a_client_error() {
    let services = empty_app();
    let w = warehouse(&services, "TX1", 100);
    let rope = product(&services, "Ropes");

    let err = handlers::create_inventory(&services, stock(rope, w, None, "101")).unwrap_err();
    assert_eq!(err.status, BAD_REQUEST);
    assert_eq!(err.code, "capacity_exceeded");
    assert_eq!(err.body()["error"], "capacity_exceeded");
    assert_eq!(current(&services, w), 0);
    assert!(handlers::list_inventory(&services).unwrap().is_empty());
}

#[test]
fn unknown_operation_changes_nothing() {
    let services = empty_app();
    let w = warehouse(&services, "CA1", 1000);
    let rope = product(&services, "Ropes");
    let line = handlers::create_inventory(&services, stock(rope, w, None, "10")).unwrap();

    let err: ApiError =
        handlers::adjust_inventory_quantity(&services, line.id.get(), adjust("multiply", 3))
            .unwrap_err();
    assert_eq!(err.status, BAD_REQUEST);
    assert_eq!(err.code, "invalid_operation");
    assert_eq!(
        handlers::get_inventory(&services, line.id.get())
            .unwrap()
            .quantity,
        10
    );
    assert_eq!(current(&services, w), 10);
}

#[test]
fn decrement_below_zero_is_rejected() {
    let services = empty_app();
    let w = warehouse(&services, "CA1", 1000);
    let rope = product(&services, "Ropes");
    let line = handlers::create_inventory(&services, stock(rope, w, None, "5")).unwrap();

    let err = handlers::adjust_inventory_quantity(&services, line.id.get(), adjust("decrement", 6))
        .unwrap_err();
    assert_eq!(err.code, "invariant_violation");
    assert_eq!(current(&services, w), 5);
}

#[test]
fn missing_records_are_not_found() {
    let services = empty_app();

    let err =
        handlers::adjust_inventory_quantity(&services, 99, adjust("increment", 1)).unwrap_err();
    assert_eq!(err.status, NOT_FOUND);

    let err = handlers::update_inventory(&services, 99, stock(1, 1, None, "1")).unwrap_err();
    assert_eq!(err.status, NOT_FOUND);

    assert_eq!(handlers::get_warehouse(&services, 7).unwrap_err().status, NOT_FOUND);
    handlers::delete_inventory(&services, 99).unwrap();
}

#[test]
fn upsert_inserts_under_given_id() {
    let services = empty_app();
    let w = warehouse(&services, "CA1", 1000);
    let rope = product(&services, "Ropes");

    let line = handlers::upsert_inventory(&services, 42, stock(rope, w, Some("L"), "30")).unwrap();
    assert_eq!(line.id.get(), 42);
    assert_eq!(current(&services, w), 30);

    let line = handlers::upsert_inventory(&services, 42, stock(rope, w, Some("L"), "20")).unwrap();
    assert_eq!(line.quantity, 20);
    assert_eq!(current(&services, w), 20);

    let err = handlers::upsert_inventory(&services, 43, stock(rope, w, Some("L"), "1")).unwrap_err();
    assert_eq!(err.status, CONFLICT);
}

#[test]
fn moving_a_line_shifts_capacity_between_warehouses() {
    let services = empty_app();
    let a = warehouse(&services, "CA1", 1000);
    let b = warehouse(&services, "NY1", 1000);
    let rope = product(&services, "Ropes");
    let line = handlers::create_inventory(&services, stock(rope, a, None, "60")).unwrap();

    handlers::update_inventory(&services, line.id.get(), stock(rope, b, None, "80")).unwrap();
    assert_eq!(current(&services, a), 0);
    assert_eq!(current(&services, b), 80);
    assert_eq!(
        handlers::list_inventory_by_warehouse(&services, b)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn malformed_quantity_is_a_validation_error() {
    let services = empty_app();
    let w = warehouse(&services, "CA1", 1000);
    let rope = product(&services, "Ropes");

    let err = handlers::create_inventory(&services, stock(rope, w, None, "lots")).unwrap_err();
    assert_eq!(err.status, BAD_REQUEST);
    assert_eq!(err.code, "validation_error");
}

#[test]
fn warehouse_rules_surface_as_status_codes() {
    let services = empty_app();
    let w = warehouse(&services, "CA1", 1000);
    let rope = product(&services, "Ropes");
    handlers::create_inventory(&services, stock(rope, w, None, "10")).unwrap();

    let duplicate: WarehouseRequest = body(json!({
        "name": "CA1",
        "max_capacity": 10,
        "street_address": "1 Main St",
        "city": "Austin",
        "state": "TX",
        "zip_code": "78758"
    }));
    assert_eq!(
        handlers::create_warehouse(&services, duplicate).unwrap_err().code,
        "name_conflict"
    );

    assert_eq!(handlers::delete_warehouse(&services, w).unwrap_err().status, CONFLICT);
    assert_eq!(handlers::delete_product(&services, rope).unwrap_err().status, CONFLICT);
}

#[test]
fn categories_can_be_read_renamed_and_found_by_name() {
    let services = empty_app();
    let created = handlers::create_category(&services, body(json!({ "name": "Ropes" }))).unwrap();
    let id = created.id.get();

    assert_eq!(handlers::get_category(&services, id).unwrap(), created);
    let renamed =
        handlers::update_category(&services, id, body(json!({ "name": "Dynamic Ropes" }))).unwrap();
    assert_eq!(renamed.name, "Dynamic Ropes");
    assert_eq!(
        handlers::find_category_by_name(&services, "Dynamic Ropes").unwrap().id,
        created.id
    );

    assert_eq!(
        handlers::find_category_by_name(&services, "Ropes").unwrap_err().status,
        NOT_FOUND
    );
    assert_eq!(handlers::get_category(&services, 99).unwrap_err().status, NOT_FOUND);
    assert_eq!(
        handlers::update_category(&services, 99, body(json!({ "name": "Chalk" })))
            .unwrap_err()
            .status,
        NOT_FOUND
    );
}

#[test]
fn warehouse_is_found_by_name() {
    let services = seeded_app();
    let ny1 = handlers::find_warehouse_by_name(&services, "NY1").unwrap();
    assert_eq!(ny1.current_capacity, 650);
    assert_eq!(
        handlers::find_warehouse_by_name(&services, "ZZ9").unwrap_err().status,
        NOT_FOUND
    );
}

#[test]
fn detailed_products_list_their_inventory() {
    let services = empty_app();
    let ca1 = warehouse(&services, "CA1", 1000);
    let ny1 = warehouse(&services, "NY1", 1000);
    let rope = product(&services, "Ropes");
    let helmet = product(&services, "Helmets");
    handlers::create_inventory(&services, stock(rope, ca1, None, "10")).unwrap();
    handlers::create_inventory(&services, stock(rope, ny1, Some("M"), "5")).unwrap();

    let details = handlers::get_product_detailed(&services, rope).unwrap();
    assert_eq!(details.product.id.get(), rope);
    let quantities: Vec<u32> = details.inventory.iter().map(|l| l.quantity).collect();
    assert_eq!(quantities, vec![10, 5]);

    let all = handlers::list_products_detailed(&services, None).unwrap();
    assert_eq!(all.len(), 2);

    let helmet_category = handlers::get_product(&services, helmet).unwrap().category.get();
    let helmets = handlers::list_products_detailed(&services, Some(helmet_category)).unwrap();
    assert_eq!(helmets.len(), 1);
    assert!(helmets[0].inventory.is_empty());

    assert_eq!(
        handlers::get_product_detailed(&services, 404).unwrap_err().status,
        NOT_FOUND
    );
}

#[test]
fn reset_restores_the_demo_data() {
    let services = seeded_app();
    let ca1 = handlers::find_warehouse_by_name(&services, "CA1").unwrap().id.get();
    for line in handlers::list_inventory_by_warehouse(&services, ca1).unwrap() {
        handlers::delete_inventory(&services, line.id.get()).unwrap();
    }
    warehouse(&services, "WA1", 500);
    assert_eq!(current(&services, ca1), 0);

    let summary = handlers::reset_demo_data(&services).unwrap();
    let by_name: Vec<(&str, u32)> = summary
        .iter()
        .map(|c| (c.name.as_str(), c.current_capacity))
        .collect();
    assert_eq!(by_name, vec![("CA1", 325), ("NY1", 650), ("TX1", 170)]);
    assert_eq!(
        handlers::find_warehouse_by_name(&services, "CA1").unwrap().id.get(),
        1
    );
}
