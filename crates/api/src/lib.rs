//! Request surface: configuration, request/response mapping, handlers.

pub mod config;
pub mod dto;
pub mod errors;
pub mod handlers;

use cragsupply_infra::seed::seed_demo_data;
use cragsupply_infra::{ServiceResult, Services};

use crate::config::Settings;

/// Wire in-memory services per `settings`, seeding demo data if enabled.
pub fn build_app(settings: &Settings) -> ServiceResult<Services> {
    let services = Services::in_memory(settings.lock_timeout);
    if settings.seed_demo_data {
        seed_demo_data(&services)?;
    }
    Ok(services)
}
