//! Activity costs - a supplier's per-person price for one activity.
//!
//! The simplest member of the price ledger: a single amount.

use crate::{
    core::ledger::{self, ColumnOf, LedgerEntry, PriceFields, PriceUpdate, PricedRecord, Quote},
    entities::{ActivityCost, activity_cost, activity_cost_history},
    errors::Result,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Price bundle of an activity cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityCostPrice {
    /// Price per person
    pub price: Decimal,
}

impl PriceFields for ActivityCostPrice {
    fn amounts(&self) -> Vec<(&'static str, Decimal)> {
        vec![("price", self.price)]
    }
}

impl LedgerEntry for activity_cost_history::Model {
    type Entity = activity_cost_history::Entity;
    type ActiveModel = activity_cost_history::ActiveModel;
    type Prices = ActivityCostPrice;

    fn id_column() -> ColumnOf<Self::Entity> {
        activity_cost_history::Column::Id
    }

    fn owner_column() -> ColumnOf<Self::Entity> {
        activity_cost_history::Column::ActivityCostId
    }

    fn valid_from_column() -> ColumnOf<Self::Entity> {
        activity_cost_history::Column::ValidFrom
    }

    fn valid_until_column() -> ColumnOf<Self::Entity> {
        activity_cost_history::Column::ValidUntil
    }

    fn is_active_column() -> ColumnOf<Self::Entity> {
        activity_cost_history::Column::IsActive
    }

    fn open(
        owner_id: i64,
        quote: &Quote<ActivityCostPrice>,
        valid_from: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Self::ActiveModel {
        activity_cost_history::ActiveModel {
            activity_cost_id: Set(owner_id),
            currency_id: Set(quote.currency_id),
            valid_from: Set(valid_from),
            valid_until: Set(quote.valid_until),
            price: Set(quote.prices.price),
            created_at: Set(created_at),
            is_active: Set(true),
            ..Default::default()
        }
    }

    fn prices(&self) -> ActivityCostPrice {
        ActivityCostPrice { price: self.price }
    }

    fn currency_id(&self) -> i64 {
        self.currency_id
    }

    fn valid_from(&self) -> NaiveDate {
        self.valid_from
    }

    fn valid_until(&self) -> NaiveDate {
        self.valid_until
    }
}

impl PricedRecord for activity_cost::Model {
    type Entity = activity_cost::Entity;
    type ActiveModel = activity_cost::ActiveModel;
    type History = activity_cost_history::Model;

    const LABEL: &'static str = "activity cost";

    fn id_column() -> ColumnOf<Self::Entity> {
        activity_cost::Column::Id
    }

    fn is_active_column() -> ColumnOf<Self::Entity> {
        activity_cost::Column::IsActive
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn quote(&self) -> Quote<ActivityCostPrice> {
        Quote::new(
            ActivityCostPrice { price: self.price },
            self.currency_id,
            self.valid_until,
        )
    }

    fn apply_quote(
        active: &mut activity_cost::ActiveModel,
        quote: &Quote<ActivityCostPrice>,
        now: NaiveDateTime,
    ) {
        active.price = Set(quote.prices.price);
        active.currency_id = Set(quote.currency_id);
        active.valid_until = Set(quote.valid_until);
        active.updated_at = Set(now);
    }
}

/// Input for [`create_activity_cost`].
#[derive(Debug, Clone)]
pub struct NewActivityCost {
    /// Owning tenant company
    pub company_id: i64,
    /// Activity being priced
    pub activity_id: i64,
    /// Supplier quoting the price
    pub supplier_id: i64,
    /// Initial quote
    pub quote: Quote<ActivityCostPrice>,
}

/// Creates an activity cost and opens its first price window.
#[instrument(skip(db, new), fields(activity_id = new.activity_id))]
pub async fn create_activity_cost(
    db: &DatabaseConnection,
    new: NewActivityCost,
    today: NaiveDate,
) -> Result<activity_cost::Model> {
    new.quote.validate(today)?;

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;
    let cost = activity_cost::ActiveModel {
        company_id: Set(new.company_id),
        activity_id: Set(new.activity_id),
        supplier_id: Set(new.supplier_id),
        price: Set(new.quote.prices.price),
        currency_id: Set(new.quote.currency_id),
        valid_until: Set(new.quote.valid_until),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    ledger::record_created(&txn, &cost, today).await?;
    txn.commit().await?;

    info!(id = cost.id, "Created activity cost");
    Ok(cost)
}

/// Retrieves an activity cost by id.
pub async fn get_activity_cost(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<activity_cost::Model>> {
    ActivityCost::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Active costs quoted for one activity, cheapest first.
pub async fn list_costs_for_activity(
    db: &DatabaseConnection,
    activity_id: i64,
) -> Result<Vec<activity_cost::Model>> {
    ActivityCost::find()
        .filter(activity_cost::Column::ActivityId.eq(activity_id))
        .filter(activity_cost::Column::IsActive.eq(true))
        .order_by_asc(activity_cost::Column::Price)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes the quoted price, currency or validity of an activity cost.
pub async fn update_activity_cost_price(
    db: &DatabaseConnection,
    id: i64,
    quote: Quote<ActivityCostPrice>,
    today: NaiveDate,
) -> Result<PriceUpdate<activity_cost::Model>> {
    ledger::update_quote(db, id, quote, today).await
}

/// The price window in force on `date`, if any.
pub async fn activity_cost_price_on<C>(
    db: &C,
    id: i64,
    date: NaiveDate,
) -> Result<Option<activity_cost_history::Model>>
where
    C: ConnectionTrait,
{
    ledger::entry_effective_on(db, id, date).await
}

/// Full price history, newest window first.
pub async fn list_activity_cost_history(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Vec<activity_cost_history::Model>> {
    ledger::history(db, id).await
}

/// Soft-deletes an activity cost; its history stays queryable.
pub async fn deactivate_activity_cost(
    db: &DatabaseConnection,
    id: i64,
) -> Result<activity_cost::Model> {
    ledger::set_record_active(db, id, false).await
}

/// Deletes an activity cost and its history.
pub async fn delete_activity_cost(db: &DatabaseConnection, id: i64) -> Result<()> {
    ledger::delete_record::<activity_cost::Model>(db, id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::ledger::Revision, errors::Error, test_utils::*};
    use rust_decimal_macros::dec;

    fn new_cost(currency_id: i64, price: Decimal) -> NewActivityCost {
        NewActivityCost {
            company_id: 1,
            activity_id: 5,
            supplier_id: 9,
            quote: Quote::new(ActivityCostPrice { price }, currency_id, date(2025, 10, 31)),
        }
    }

    #[tokio::test]
    async fn test_currency_change_alone_reprices() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let usd = create_test_currency(&db, "USD").await?;
        let cost = create_activity_cost(&db, new_cost(eur.id, dec!(30)), date(2025, 4, 1)).await?;

        let update = update_activity_cost_price(
            &db,
            cost.id,
            Quote::new(ActivityCostPrice { price: dec!(30) }, usd.id, date(2025, 10, 31)),
            date(2025, 5, 1),
        )
        .await?;

        let opened = update.revision.opened().unwrap();
        assert_eq!(opened.currency_id, usd.id);
        assert_eq!(update.record.currency_id, usd.id);
        assert_eq!(list_activity_cost_history(&db, cost.id).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_valid_until_change_alone_keeps_history() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let cost = create_activity_cost(&db, new_cost(eur.id, dec!(30)), date(2025, 4, 1)).await?;

        let update = update_activity_cost_price(
            &db,
            cost.id,
            Quote::new(ActivityCostPrice { price: dec!(30) }, eur.id, date(2026, 3, 31)),
            date(2025, 5, 1),
        )
        .await?;

        assert_eq!(update.revision, Revision::Unchanged);
        assert_eq!(update.record.valid_until, date(2026, 3, 31));
        let history = list_activity_cost_history(&db, cost.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].valid_until, date(2025, 10, 31));
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_price_is_rejected_on_create() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let result = create_activity_cost(&db, new_cost(eur.id, dec!(-5)), date(2025, 4, 1)).await;
        assert!(matches!(result, Err(Error::NegativeAmount { .. })));
        assert!(ActivityCost::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_costs_for_activity_skips_inactive() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let today = date(2025, 4, 1);
        let dear = create_activity_cost(&db, new_cost(eur.id, dec!(50)), today).await?;
        let cheap = create_activity_cost(&db, new_cost(eur.id, dec!(20)), today).await?;
        let gone = create_activity_cost(&db, new_cost(eur.id, dec!(10)), today).await?;
        deactivate_activity_cost(&db, gone.id).await?;

        let ids: Vec<i64> = list_costs_for_activity(&db, 5)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![cheap.id, dear.id]);
        Ok(())
    }
}
