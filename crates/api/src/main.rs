use anyhow::Context;

use cragsupply_api::config::Settings;
use cragsupply_api::handlers;

fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("invalid configuration")?;
    cragsupply_observability::init(settings.log_format);

    tracing::info!(
        log_format = %settings.log_format,
        seed_demo_data = settings.seed_demo_data,
        lock_timeout_ms = settings.lock_timeout.map(|t| t.as_millis() as u64),
        "starting cragsupply"
    );

    let services = cragsupply_api::build_app(&settings).context("failed to build services")?;
    let summary = handlers::capacity_summary(&services).context("capacity summary failed")?;

    if let Some(drift) = summary.iter().find(|c| !c.consistent) {
        tracing::error!(warehouse_id = %drift.warehouse, "warehouse counter does not match its lines");
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
