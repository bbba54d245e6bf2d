//! Sales prices quoted to the buyer for a whole operation.

use crate::{
    entities::{Operation, OperationSalesPrice, operation_sales_price},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Adds a sales price to an operation.
///
/// # Errors
/// [`Error::NegativeAmount`] for a negative price, [`Error::NotFound`] for an
/// unknown operation.
pub async fn add_sales_price(
    db: &DatabaseConnection,
    operation_id: i64,
    price: Decimal,
    currency_id: i64,
) -> Result<operation_sales_price::Model> {
    if price < Decimal::ZERO {
        return Err(Error::NegativeAmount {
            field: "price",
            amount: price,
        });
    }
    Operation::find_by_id(operation_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("operation", operation_id))?;

    let now = Utc::now().naive_utc();
    let sales_price = operation_sales_price::ActiveModel {
        operation_id: Set(operation_id),
        price: Set(price),
        currency_id: Set(currency_id),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(id = sales_price.id, operation_id, %price, "Added sales price");
    Ok(sales_price)
}

/// Active sales prices of an operation in insertion order.
pub async fn list_sales_prices(
    db: &DatabaseConnection,
    operation_id: i64,
) -> Result<Vec<operation_sales_price::Model>> {
    OperationSalesPrice::find()
        .filter(operation_sales_price::Column::OperationId.eq(operation_id))
        .filter(operation_sales_price::Column::IsActive.eq(true))
        .order_by_asc(operation_sales_price::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Withdraws a sales price without deleting it.
pub async fn deactivate_sales_price(
    db: &DatabaseConnection,
    id: i64,
) -> Result<operation_sales_price::Model> {
    let sales_price = OperationSalesPrice::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("sales price", id))?;
    let mut active: operation_sales_price::ActiveModel = sales_price.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_sales_price_lifecycle() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let op = create_test_operation_for(&db, "ABC").await?;

        let first = add_sales_price(&db, op.id, dec!(1200), eur.id).await?;
        let second = add_sales_price(&db, op.id, dec!(80.5), eur.id).await?;
        assert_eq!(list_sales_prices(&db, op.id).await?.len(), 2);

        deactivate_sales_price(&db, first.id).await?;
        let remaining = list_sales_prices(&db, op.id).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
        assert_eq!(remaining[0].price, dec!(80.5));
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_sales_price_never_reaches_the_database() -> Result<()> {
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Sqlite).into_connection();
        let result = add_sales_price(&db, 1, dec!(-1), 1).await;
        assert!(matches!(result, Err(Error::NegativeAmount { field: "price", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_operation() -> Result<()> {
        let db = setup_test_db().await?;
        let result = add_sales_price(&db, 5, dec!(10), 1).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "operation", id: 5 })));
        Ok(())
    }
}
