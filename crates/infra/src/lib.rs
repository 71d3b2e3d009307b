//! Infrastructure layer: storage, warehouse locking, services, demo data.
//!
//! - `store`: repository traits + in-memory implementations
//! - `lock`: per-warehouse locks serializing capacity read-check-write
//! - `services`: the operations callers use (inventory, warehouse, catalog)
//! - `seed`: demonstration data set

pub mod lock;
pub mod seed;
pub mod services;
pub mod store;


pub use services::{ServiceError, ServiceResult, Services, Stores};
