//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL.

use crate::entities::{
    ActivityCost, ActivityCostHistory, BuyerCompany, Currency, Hotel, HotelPriceHistory, Museum,
    MuseumPriceHistory, Operation, OperationCustomer, OperationDay, OperationItem,
    OperationSalesPrice, OperationSubItem, SubItemMuseum, VehicleCost, VehicleCostHistory,
    VehicleType,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

/// Default location of the database when neither the config file nor the
/// environment names one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/tour_ops.sqlite?mode=rwc";

/// Resolves the database URL: `DATABASE_URL` from the environment wins over
/// the configured value, which wins over [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn resolve_database_url(configured: Option<&str>) -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        configured
            .unwrap_or(DEFAULT_DATABASE_URL)
            .to_string()
    })
}

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all necessary tables, parents before children.
///
/// Existing tables are left untouched, so calling this on every start is safe.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    // Reference data
    create_table(db, &schema, Currency).await?;
    create_table(db, &schema, VehicleType).await?;
    create_table(db, &schema, BuyerCompany).await?;

    // Priced catalog records and their ledgers
    create_table(db, &schema, Hotel).await?;
    create_table(db, &schema, HotelPriceHistory).await?;
    create_table(db, &schema, Museum).await?;
    create_table(db, &schema, MuseumPriceHistory).await?;
    create_table(db, &schema, VehicleCost).await?;
    create_table(db, &schema, VehicleCostHistory).await?;
    create_table(db, &schema, ActivityCost).await?;
    create_table(db, &schema, ActivityCostHistory).await?;

    // Operations
    create_table(db, &schema, Operation).await?;
    create_table(db, &schema, OperationDay).await?;
    create_table(db, &schema, OperationCustomer).await?;
    create_table(db, &schema, OperationSalesPrice).await?;
    create_table(db, &schema, OperationItem).await?;
    create_table(db, &schema, OperationSubItem).await?;
    create_table(db, &schema, SubItemMuseum).await?;

    info!("Database tables ensured");
    Ok(())
}
