#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use tour_ops::{
    config::{self, database},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::settings::load_app_configuration()
        .inspect_err(|e| error!("Failed to load application configuration: {}", e))?;
    info!(
        max_sequence = app_config.reference.max_sequence,
        insert_retries = app_config.reference.insert_retries,
        "Loaded application configuration"
    );

    // 4. Connect and make sure the schema exists
    let database_url = database::resolve_database_url(app_config.database.url.as_deref());
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed currencies and vehicle types
    let summary = config::seed::seed_reference_data(&db, &app_config)
        .await
        .inspect_err(|e| error!("Failed to seed reference data: {}", e))?;

    info!(
        currencies_added = summary.currencies,
        vehicle_types_added = summary.vehicle_types,
        "Database ready"
    );
    Ok(())
}
