//! Plain catalog records the core depends on - currencies, vehicle types and
//! buyer companies.
//!
//! These carry no derived state; they exist here because seeding, reference
//! allocation and the tests need to create and look them up.

use crate::{
    entities::{BuyerCompany, Currency, VehicleType, buyer_company, currency, vehicle_type},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput {
            message: format!("{field} cannot be empty"),
        });
    }
    Ok(trimmed.to_string())
}

/// Creates a currency. Codes are stored upper-cased.
///
/// # Errors
/// Returns an error if any field is blank or the code already exists.
pub async fn create_currency(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
    symbol: &str,
) -> Result<currency::Model> {
    let model = currency::ActiveModel {
        code: Set(require_text("Currency code", code)?.to_uppercase()),
        name: Set(require_text("Currency name", name)?),
        symbol: Set(require_text("Currency symbol", symbol)?),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Finds a currency by its ISO code, case-insensitively.
pub async fn get_currency_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<currency::Model>> {
    Currency::find()
        .filter(currency::Column::Code.eq(code.trim().to_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All currencies ordered by code.
pub async fn list_currencies(db: &DatabaseConnection) -> Result<Vec<currency::Model>> {
    Currency::find()
        .order_by_asc(currency::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates an active vehicle type.
pub async fn create_vehicle_type(
    db: &DatabaseConnection,
    name: &str,
) -> Result<vehicle_type::Model> {
    let model = vehicle_type::ActiveModel {
        name: Set(require_text("Vehicle type name", name)?),
        is_active: Set(true),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Finds a vehicle type by exact name.
pub async fn get_vehicle_type_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<vehicle_type::Model>> {
    VehicleType::find()
        .filter(vehicle_type::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an active buyer company.
///
/// # Errors
/// Returns an error if the name or short name is blank, or if the short name
/// is already taken.
pub async fn create_buyer_company(
    db: &DatabaseConnection,
    company_id: i64,
    name: &str,
    short_name: &str,
    contact: &str,
) -> Result<buyer_company::Model> {
    let now = chrono::Utc::now().naive_utc();
    let model = buyer_company::ActiveModel {
        company_id: Set(company_id),
        name: Set(require_text("Buyer company name", name)?),
        short_name: Set(require_text("Buyer company short name", short_name)?),
        contact: Set(contact.trim().to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Retrieves a buyer company by id.
pub async fn get_buyer_company<C>(db: &C, id: i64) -> Result<buyer_company::Model>
where
    C: ConnectionTrait,
{
    BuyerCompany::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("buyer company", id))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_currency_lookup_is_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_currency(&db, "eur", "Euro", "€").await?;
        assert_eq!(created.code, "EUR");

        let found = get_currency_by_code(&db, " Eur ").await?.unwrap();
        assert_eq!(found.id, created.id);
        assert!(get_currency_by_code(&db, "USD").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_currency_code_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_currency(&db, "EUR", "Euro", "€").await?;
        let result = create_currency(&db, "EUR", "Euro again", "€").await;
        assert!(matches!(result, Err(Error::Database(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_buyer_short_name_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_buyer_company(&db, 1, "Acme Travel", "  ", "ops@acme.test").await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_buyer_company_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = get_buyer_company(&db, 42).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "buyer company",
                id: 42
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_vehicle_type_roundtrip() -> Result<()> {
        let db = setup_test_db().await?;
        let minivan = create_vehicle_type(&db, "Minivan").await?;
        assert!(minivan.is_active);
        let found = get_vehicle_type_by_name(&db, "Minivan").await?.unwrap();
        assert_eq!(found, minivan);
        Ok(())
    }
}
