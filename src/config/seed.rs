//! Seeds reference data from `config.toml`.
//!
//! Seeding is idempotent: currencies are matched by code and vehicle types by
//! name, and existing rows are never modified.

use crate::{config::AppConfig, core::catalog, errors::Result};
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

/// What a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Currencies inserted
    pub currencies: usize,
    /// Vehicle types inserted
    pub vehicle_types: usize,
}

/// Inserts the configured currencies and vehicle types that do not exist yet.
pub async fn seed_reference_data(
    db: &DatabaseConnection,
    config: &AppConfig,
) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for currency in &config.currencies {
        if catalog::get_currency_by_code(db, &currency.code)
            .await?
            .is_some()
        {
            debug!(code = %currency.code, "Currency already present");
            continue;
        }
        catalog::create_currency(db, &currency.code, &currency.name, &currency.symbol).await?;
        summary.currencies += 1;
    }

    for vehicle_type in &config.vehicle_types {
        if catalog::get_vehicle_type_by_name(db, &vehicle_type.name)
            .await?
            .is_some()
        {
            debug!(name = %vehicle_type.name, "Vehicle type already present");
            continue;
        }
        catalog::create_vehicle_type(db, &vehicle_type.name).await?;
        summary.vehicle_types += 1;
    }

    info!(
        currencies = summary.currencies,
        vehicle_types = summary.vehicle_types,
        "Reference data seeded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{config::settings::parse_config, test_utils::*};

    const CONFIG: &str = r#"
        [[currencies]]
        code = "EUR"
        name = "Euro"
        symbol = "€"

        [[currencies]]
        code = "try"
        name = "Turkish Lira"
        symbol = "₺"

        [[vehicle_types]]
        name = "Minivan"

        [[vehicle_types]]
        name = "Bus"
    "#;

    #[tokio::test]
    async fn test_seeding_twice_inserts_once() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(CONFIG)?;

        let first = seed_reference_data(&db, &config).await?;
        assert_eq!(
            first,
            SeedSummary {
                currencies: 2,
                vehicle_types: 2
            }
        );

        let second = seed_reference_data(&db, &config).await?;
        assert_eq!(second, SeedSummary::default());

        let codes: Vec<String> = catalog::list_currencies(&db)
            .await?
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, vec!["EUR", "TRY"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_existing_rows_are_kept() -> Result<()> {
        let db = setup_test_db().await?;
        catalog::create_currency(&db, "EUR", "Euro (old)", "EUR").await?;

        let summary = seed_reference_data(&db, &parse_config(CONFIG)?).await?;
        assert_eq!(summary.currencies, 1);

        let eur = catalog::get_currency_by_code(&db, "EUR").await?.unwrap();
        assert_eq!(eur.name, "Euro (old)");
        Ok(())
    }
}
