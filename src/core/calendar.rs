//! Operation calendar - one day row per date of an operation's span.
//!
//! Day rows are derived data. Whenever the span changes the whole calendar is
//! dropped and rebuilt, together with everything booked on the old days.

use crate::{
    entities::{
        OperationDay, OperationItem, OperationSubItem, SubItemMuseum, operation_day,
        operation_item, operation_sub_item, sub_item_museum,
    },
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use tracing::info;

/// Day rows written per `INSERT`, keeping long spans under `SQLite`'s
/// bound-parameter limit.
pub const DAY_INSERT_BATCH: usize = 500;

/// Every date from `start` to `end`, both included. Empty when `end < start`.
#[must_use]
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Deletes all day rows of an operation and whatever hangs off them.
///
/// Returns the number of day rows removed.
pub async fn clear_days<C>(db: &C, operation_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let day_ids: Vec<i64> = OperationDay::find()
        .select_only()
        .column(operation_day::Column::Id)
        .filter(operation_day::Column::OperationId.eq(operation_id))
        .into_tuple()
        .all(db)
        .await?;
    if day_ids.is_empty() {
        return Ok(0);
    }

    let item_ids: Vec<i64> = OperationItem::find()
        .select_only()
        .column(operation_item::Column::Id)
        .filter(operation_item::Column::OperationDayId.is_in(day_ids.clone()))
        .into_tuple()
        .all(db)
        .await?;

    if !item_ids.is_empty() {
        let sub_item_ids: Vec<i64> = OperationSubItem::find()
            .select_only()
            .column(operation_sub_item::Column::Id)
            .filter(operation_sub_item::Column::OperationItemId.is_in(item_ids.clone()))
            .into_tuple()
            .all(db)
            .await?;

        if !sub_item_ids.is_empty() {
            SubItemMuseum::delete_many()
                .filter(sub_item_museum::Column::SubItemId.is_in(sub_item_ids.clone()))
                .exec(db)
                .await?;
            OperationSubItem::delete_many()
                .filter(operation_sub_item::Column::Id.is_in(sub_item_ids))
                .exec(db)
                .await?;
        }
        OperationItem::delete_many()
            .filter(operation_item::Column::Id.is_in(item_ids))
            .exec(db)
            .await?;
    }

    let removed = OperationDay::delete_many()
        .filter(operation_day::Column::Id.is_in(day_ids))
        .exec(db)
        .await?
        .rows_affected;
    Ok(removed)
}

/// Rebuilds the calendar of an operation for `[start, end]`.
///
/// Must run after the operation row exists. Returns the new days in date
/// order.
pub async fn regenerate_days<C>(
    db: &C,
    operation_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<operation_day::Model>>
where
    C: ConnectionTrait,
{
    let removed = clear_days(db, operation_id).await?;

    let now = Utc::now().naive_utc();
    let dates = dates_between(start, end);
    let count = dates.len();
    for batch in dates.chunks(DAY_INSERT_BATCH) {
        let rows = batch.iter().map(|&date| operation_day::ActiveModel {
            operation_id: Set(operation_id),
            date: Set(date),
            created_at: Set(now),
            updated_at: Set(now),
            is_active: Set(true),
            ..Default::default()
        });
        OperationDay::insert_many(rows).exec(db).await?;
    }

    info!(operation_id, removed, created = count, %start, %end, "Regenerated operation days");
    list_days(db, operation_id).await
}

/// Days of an operation in date order.
pub async fn list_days<C>(db: &C, operation_id: i64) -> Result<Vec<operation_day::Model>>
where
    C: ConnectionTrait,
{
    OperationDay::find()
        .filter(operation_day::Column::OperationId.eq(operation_id))
        .order_by_asc(operation_day::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The day of an operation falling on `date`, if the operation spans it.
pub async fn find_day<C>(
    db: &C,
    operation_id: i64,
    date: NaiveDate,
) -> Result<Option<operation_day::Model>>
where
    C: ConnectionTrait,
{
    OperationDay::find()
        .filter(operation_day::Column::OperationId.eq(operation_id))
        .filter(operation_day::Column::Date.eq(date))
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_dates_between_is_inclusive() {
        let dates = dates_between(date(2025, 2, 27), date(2025, 3, 2));
        assert_eq!(
            dates,
            vec![
                date(2025, 2, 27),
                date(2025, 2, 28),
                date(2025, 3, 1),
                date(2025, 3, 2)
            ]
        );
        assert_eq!(dates_between(date(2025, 3, 1), date(2025, 3, 1)).len(), 1);
        assert!(dates_between(date(2025, 3, 2), date(2025, 3, 1)).is_empty());
    }

    #[tokio::test]
    async fn test_regenerate_replaces_every_day() -> Result<()> {
        let db = setup_test_db().await?;
        let buyer = create_test_buyer(&db, "ABC").await?;
        let op = create_test_operation(&db, buyer.id, date(2025, 3, 10), date(2025, 3, 12)).await?;

        let before = list_days(&db, op.id).await?;
        assert_eq!(before.len(), 3);

        let after = regenerate_days(&db, op.id, date(2025, 3, 10), date(2025, 3, 14)).await?;
        let dates: Vec<NaiveDate> = after.iter().map(|d| d.date).collect();
        assert_eq!(dates, dates_between(date(2025, 3, 10), date(2025, 3, 14)));
        assert!(after.iter().all(|d| d.is_active));
        // Old rows are gone, not reused
        assert!(after.iter().all(|d| before.iter().all(|b| b.id != d.id)));
        Ok(())
    }

    #[tokio::test]
    async fn test_long_span_is_written_in_batches() -> Result<()> {
        let db = setup_test_db().await?;
        let buyer = create_test_buyer(&db, "ABC").await?;
        let op = create_test_operation(&db, buyer.id, date(2025, 3, 10), date(2025, 3, 10)).await?;

        // Twenty years of days, far more than a single statement can bind
        let (start, end) = (date(2000, 1, 1), date(2019, 12, 31));
        let days = regenerate_days(&db, op.id, start, end).await?;
        assert_eq!(days.len(), 7305);
        assert!(days.len() > DAY_INSERT_BATCH * 14);
        assert_eq!(days.first().unwrap().date, start);
        assert_eq!(days.last().unwrap().date, end);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_days_removes_booked_items() -> Result<()> {
        let db = setup_test_db().await?;
        let buyer = create_test_buyer(&db, "ABC").await?;
        let op = create_test_operation(&db, buyer.id, date(2025, 3, 10), date(2025, 3, 11)).await?;
        let day = find_day(&db, op.id, date(2025, 3, 11)).await?.unwrap();
        create_test_tour_item(&db, day.id).await?;

        let removed = clear_days(&db, op.id).await?;
        assert_eq!(removed, 2);
        assert!(OperationItem::find().all(&db).await?.is_empty());
        assert!(find_day(&db, op.id, date(2025, 3, 11)).await?.is_none());
        Ok(())
    }
}
