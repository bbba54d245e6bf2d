//! Operation business logic - creating and editing booked itineraries.
//!
//! Saving an operation keeps two pieces of derived state in step with it:
//! the reference number (re-allocated when the buyer or start date changes)
//! and the day calendar (rebuilt when the date span changes). Both happen in
//! the same transaction as the operation row itself.

use crate::{
    config::ReferencePolicy,
    core::{calendar, catalog, reference},
    entities::{
        Operation, OperationCustomer, OperationSalesPrice, OperationStatus, operation,
        operation_customer, operation_sales_price,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*};
use std::{collections::HashSet, str::FromStr};
use tracing::{info, instrument, warn};

/// Input for [`create_operation`].
#[derive(Debug, Clone)]
pub struct NewOperation {
    /// Owning tenant company
    pub company_id: i64,
    /// Branch handling the operation
    pub branch_id: i64,
    /// Agency the operation is sold to
    pub buyer_company_id: i64,
    /// User creating the operation
    pub created_by: i64,
    /// User following the operation up
    pub follow_by: i64,
    /// Explicit reference; blank or `None` lets the system allocate one
    pub reference_number: Option<String>,
    /// First day
    pub start_date: NaiveDate,
    /// Last day; not before `start_date`
    pub end_date: NaiveDate,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Field edits for [`update_operation`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct OperationChanges {
    /// New branch
    pub branch_id: Option<i64>,
    /// New buyer company; re-allocates the reference
    pub buyer_company_id: Option<i64>,
    /// New follow-up user
    pub follow_by: Option<i64>,
    /// Explicit reference; a blank value asks for a fresh allocation
    pub reference_number: Option<String>,
    /// New first day; re-allocates the reference and rebuilds the days
    pub start_date: Option<NaiveDate>,
    /// New last day; rebuilds the days
    pub end_date: Option<NaiveDate>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
    /// Soft delete or restore
    pub is_active: Option<bool>,
}

/// Filters for [`list_operations`]. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct OperationFilter {
    /// Only operations in this status
    pub status: Option<OperationStatus>,
    /// Only active or only inactive operations
    pub is_active: Option<bool>,
    /// Only operations of this branch
    pub branch_id: Option<i64>,
    /// Only operations sold to this buyer company
    pub buyer_company_id: Option<i64>,
}

/// Rejects a span whose end precedes its start.
///
/// # Errors
/// [`Error::InvalidDateRange`].
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(Error::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Parses a status name such as `"CONFIRMED"`.
///
/// # Errors
/// [`Error::InvalidInput`] for an unknown name.
pub fn parse_status(value: &str) -> Result<OperationStatus> {
    OperationStatus::from_str(value.trim()).map_err(|_| Error::InvalidInput {
        message: format!("Unknown operation status: {value}"),
    })
}

fn explicit_reference(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
}

/// Saves `active` under a freshly allocated reference, retrying when a
/// concurrent writer takes the same number first.
///
/// `existing_id` is `None` for an insert and the operation's id for an update.
/// A number lost to a unique violation is never tried again by this call.
async fn save_with_fresh_reference(
    txn: &DatabaseTransaction,
    mut active: operation::ActiveModel,
    buyer_short_name: &str,
    start_date: NaiveDate,
    existing_id: Option<i64>,
    policy: &ReferencePolicy,
) -> Result<operation::Model> {
    let mut attempt = 0;
    let mut lost = HashSet::new();
    loop {
        let number = reference::allocate_reference_avoiding(
            txn,
            buyer_short_name,
            start_date,
            existing_id,
            &lost,
            policy,
        )
        .await?;
        active.reference_number = Set(number.clone());

        let saved = match existing_id {
            Some(_) => active.clone().update(txn).await,
            None => active.clone().insert(txn).await,
        };
        match saved {
            Ok(model) => {
                info!(id = model.id, reference = %number, "Assigned operation reference");
                return Ok(model);
            }
            Err(err) if reference::is_unique_violation(&err) && attempt < policy.insert_retries => {
                attempt += 1;
                warn!(reference = %number, attempt, "Reference taken concurrently, retrying");
                lost.insert(number);
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Creates an operation in `DRAFT` with its reference and day calendar.
///
/// # Errors
/// [`Error::InvalidDateRange`], [`Error::NotFound`] for an unknown buyer
/// company, [`Error::ReferenceExhausted`], or a database error (including a
/// duplicate explicit reference).
#[instrument(skip(db, new, policy), fields(buyer_company_id = new.buyer_company_id))]
pub async fn create_operation(
    db: &DatabaseConnection,
    new: NewOperation,
    policy: &ReferencePolicy,
) -> Result<operation::Model> {
    validate_date_range(new.start_date, new.end_date)?;

    let txn = db.begin().await?;
    let buyer = catalog::get_buyer_company(&txn, new.buyer_company_id).await?;

    let now = Utc::now().naive_utc();
    let active = operation::ActiveModel {
        company_id: Set(new.company_id),
        branch_id: Set(new.branch_id),
        buyer_company_id: Set(buyer.id),
        created_by: Set(new.created_by),
        follow_by: Set(new.follow_by),
        start_date: Set(new.start_date),
        end_date: Set(new.end_date),
        status: Set(OperationStatus::Draft),
        total_pax: Set(0),
        notes: Set(new.notes),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
        ..Default::default()
    };

    let op = match explicit_reference(new.reference_number.as_deref()) {
        Some(number) => {
            let mut active = active;
            active.reference_number = Set(number);
            active.insert(&txn).await?
        }
        None => {
            save_with_fresh_reference(&txn, active, &buyer.short_name, new.start_date, None, policy)
                .await?
        }
    };

    calendar::regenerate_days(&txn, op.id, op.start_date, op.end_date).await?;
    txn.commit().await?;

    info!(id = op.id, reference = %op.reference_number, "Created operation");
    Ok(op)
}

/// Applies `changes` to an operation.
///
/// The reference is re-allocated when the stored one is blank or the buyer
/// company or start date changed, unless `changes` names an explicit
/// reference. Days are rebuilt when the start or end date changed.
#[instrument(skip(db, changes, policy))]
pub async fn update_operation(
    db: &DatabaseConnection,
    id: i64,
    changes: OperationChanges,
    policy: &ReferencePolicy,
) -> Result<operation::Model> {
    let txn = db.begin().await?;
    let previous = Operation::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("operation", id))?;

    let start_date = changes.start_date.unwrap_or(previous.start_date);
    let end_date = changes.end_date.unwrap_or(previous.end_date);
    validate_date_range(start_date, end_date)?;

    let buyer_company_id = changes.buyer_company_id.unwrap_or(previous.buyer_company_id);
    let buyer = catalog::get_buyer_company(&txn, buyer_company_id).await?;

    let span_changed = start_date != previous.start_date || end_date != previous.end_date;
    let explicit = changes
        .reference_number
        .as_deref()
        .and_then(|r| explicit_reference(Some(r)));
    let needs_reference = explicit.is_none()
        && (previous.reference_number.trim().is_empty()
            || changes.reference_number.is_some()
            || buyer_company_id != previous.buyer_company_id
            || start_date != previous.start_date);

    let mut active: operation::ActiveModel = previous.into();
    active.buyer_company_id = Set(buyer_company_id);
    active.start_date = Set(start_date);
    active.end_date = Set(end_date);
    if let Some(branch_id) = changes.branch_id {
        active.branch_id = Set(branch_id);
    }
    if let Some(follow_by) = changes.follow_by {
        active.follow_by = Set(follow_by);
    }
    if let Some(notes) = changes.notes {
        active.notes = Set(notes);
    }
    if let Some(is_active) = changes.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let op = if needs_reference {
        save_with_fresh_reference(&txn, active, &buyer.short_name, start_date, Some(id), policy)
            .await?
    } else {
        if let Some(number) = explicit {
            active.reference_number = Set(number);
        }
        active.update(&txn).await?
    };

    if span_changed {
        calendar::regenerate_days(&txn, op.id, op.start_date, op.end_date).await?;
    }
    txn.commit().await?;
    Ok(op)
}

/// Moves an operation to `status`.
pub async fn update_status(
    db: &DatabaseConnection,
    id: i64,
    status: OperationStatus,
) -> Result<operation::Model> {
    let op = Operation::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("operation", id))?;
    let from = op.status;

    let mut active: operation::ActiveModel = op.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now().naive_utc());
    let op = active.update(db).await?;

    info!(id, %from, to = %status, "Operation status changed");
    Ok(op)
}

/// Looks an operation up by id.
pub async fn get_operation(db: &DatabaseConnection, id: i64) -> Result<Option<operation::Model>> {
    Operation::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Looks an operation up by its reference number.
pub async fn get_operation_by_reference(
    db: &DatabaseConnection,
    reference_number: &str,
) -> Result<Option<operation::Model>> {
    Operation::find()
        .filter(operation::Column::ReferenceNumber.eq(reference_number.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Operations matching `filter`, latest start date first, then by reference.
pub async fn list_operations(
    db: &DatabaseConnection,
    filter: &OperationFilter,
) -> Result<Vec<operation::Model>> {
    let mut query = Operation::find();
    if let Some(status) = filter.status {
        query = query.filter(operation::Column::Status.eq(status));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(operation::Column::IsActive.eq(is_active));
    }
    if let Some(branch_id) = filter.branch_id {
        query = query.filter(operation::Column::BranchId.eq(branch_id));
    }
    if let Some(buyer_company_id) = filter.buyer_company_id {
        query = query.filter(operation::Column::BuyerCompanyId.eq(buyer_company_id));
    }
    query
        .order_by_desc(operation::Column::StartDate)
        .order_by_asc(operation::Column::ReferenceNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes an operation with its days, items, customers and sales prices.
pub async fn delete_operation(db: &DatabaseConnection, id: i64) -> Result<()> {
    let txn = db.begin().await?;
    Operation::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("operation", id))?;

    calendar::clear_days(&txn, id).await?;
    OperationCustomer::delete_many()
        .filter(operation_customer::Column::OperationId.eq(id))
        .exec(&txn)
        .await?;
    OperationSalesPrice::delete_many()
        .filter(operation_sales_price::Column::OperationId.eq(id))
        .exec(&txn)
        .await?;
    Operation::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(id, "Deleted operation");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::calendar::list_days, entities::OperationDay, test_utils::*};
    use sea_orm::PaginatorTrait;

    fn new_operation(buyer_company_id: i64, start: NaiveDate, end: NaiveDate) -> NewOperation {
        NewOperation {
            company_id: 1,
            branch_id: 1,
            buyer_company_id,
            created_by: 1,
            follow_by: 1,
            reference_number: None,
            start_date: start,
            end_date: end,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_references_follow_buyer_and_start_date() -> Result<()> {
        let db = setup_test_db().await?;
        let policy = ReferencePolicy::default();
        let buyer = create_test_buyer(&db, "ABC").await?;
        let start = date(2025, 3, 10);

        let first = create_operation(&db, new_operation(buyer.id, start, start), &policy).await?;
        let second = create_operation(&db, new_operation(buyer.id, start, start), &policy).await?;
        assert_eq!(first.reference_number, "ABC100325001");
        assert_eq!(second.reference_number, "ABC100325002");
        assert_eq!(first.status, OperationStatus::Draft);
        assert_eq!(first.total_pax, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_materializes_days() -> Result<()> {
        let db = setup_test_db().await?;
        let buyer = create_test_buyer(&db, "ABC").await?;
        let op = create_operation(
            &db,
            new_operation(buyer.id, date(2025, 3, 10), date(2025, 3, 12)),
            &ReferencePolicy::default(),
        )
        .await?;

        let days = list_days(&db, op.id).await?;
        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2025, 3, 10), date(2025, 3, 11), date(2025, 3, 12)]);
        assert!(days.iter().all(|d| d.is_active));
        Ok(())
    }

    #[tokio::test]
    async fn test_extending_end_date_rebuilds_days() -> Result<()> {
        let db = setup_test_db().await?;
        let policy = ReferencePolicy::default();
        let buyer = create_test_buyer(&db, "ABC").await?;
        let op = create_operation(
            &db,
            new_operation(buyer.id, date(2025, 3, 10), date(2025, 3, 12)),
            &policy,
        )
        .await?;

        let updated = update_operation(
            &db,
            op.id,
            OperationChanges {
                end_date: Some(date(2025, 3, 14)),
                ..Default::default()
            },
            &policy,
        )
        .await?;
        // Start date unchanged, so the reference stays
        assert_eq!(updated.reference_number, op.reference_number);
        assert_eq!(list_days(&db, op.id).await?.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_moving_start_date_reallocates_reference() -> Result<()> {
        let db = setup_test_db().await?;
        let policy = ReferencePolicy::default();
        let buyer = create_test_buyer(&db, "ABC").await?;
        let op = create_operation(
            &db,
            new_operation(buyer.id, date(2025, 3, 10), date(2025, 3, 12)),
            &policy,
        )
        .await?;

        let moved = update_operation(
            &db,
            op.id,
            OperationChanges {
                start_date: Some(date(2025, 3, 11)),
                ..Default::default()
            },
            &policy,
        )
        .await?;
        assert_eq!(moved.reference_number, "ABC110325001");
        assert_eq!(list_days(&db, op.id).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_changing_buyer_reallocates_reference() -> Result<()> {
        let db = setup_test_db().await?;
        let policy = ReferencePolicy::default();
        let abc = create_test_buyer(&db, "ABC").await?;
        let xyz = create_test_buyer(&db, "xyz").await?;
        let start = date(2025, 3, 10);
        let op = create_operation(&db, new_operation(abc.id, start, start), &policy).await?;

        let updated = update_operation(
            &db,
            op.id,
            OperationChanges {
                buyer_company_id: Some(xyz.id),
                ..Default::default()
            },
            &policy,
        )
        .await?;
        assert_eq!(updated.reference_number, "XYZ100325001");
        Ok(())
    }

    #[tokio::test]
    async fn test_explicit_reference_is_kept() -> Result<()> {
        let db = setup_test_db().await?;
        let policy = ReferencePolicy::default();
        let buyer = create_test_buyer(&db, "ABC").await?;
        let mut new = new_operation(buyer.id, date(2025, 3, 10), date(2025, 3, 10));
        new.reference_number = Some(" CUSTOM-1 ".to_string());
        let op = create_operation(&db, new, &policy).await?;
        assert_eq!(op.reference_number, "CUSTOM-1");

        let renamed = update_operation(
            &db,
            op.id,
            OperationChanges {
                reference_number: Some("CUSTOM-2".to_string()),
                start_date: Some(date(2025, 3, 9)),
                ..Default::default()
            },
            &policy,
        )
        .await?;
        assert_eq!(renamed.reference_number, "CUSTOM-2");

        let blanked = update_operation(
            &db,
            op.id,
            OperationChanges {
                reference_number: Some(String::new()),
                ..Default::default()
            },
            &policy,
        )
        .await?;
        assert_eq!(blanked.reference_number, "ABC090325001");
        Ok(())
    }

    #[tokio::test]
    async fn test_end_before_start_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let policy = ReferencePolicy::default();
        let buyer = create_test_buyer(&db, "ABC").await?;

        let result = create_operation(
            &db,
            new_operation(buyer.id, date(2025, 3, 10), date(2025, 3, 9)),
            &policy,
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidDateRange { .. })));

        let op = create_operation(
            &db,
            new_operation(buyer.id, date(2025, 3, 10), date(2025, 3, 12)),
            &policy,
        )
        .await?;
        let result = update_operation(
            &db,
            op.id,
            OperationChanges {
                start_date: Some(date(2025, 3, 20)),
                ..Default::default()
            },
            &policy,
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidDateRange { .. })));
        assert_eq!(list_days(&db, op.id).await?.len(), 3);
        Ok(())
    }

    /// Makes every insert matching `when` collide: a trigger slips in another
    /// operation holding the same reference just before the row is written.
    async fn collide_on_insert(db: &DatabaseConnection, when: &str) -> Result<()> {
        db.execute_unprepared(&format!(
            "CREATE TRIGGER collide_on_insert BEFORE INSERT ON operations {when} \
             BEGIN \
               INSERT INTO operations (company_id, branch_id, buyer_company_id, created_by, \
                 follow_by, reference_number, start_date, end_date, status, total_pax, notes, \
                 created_at, updated_at, is_active) \
               VALUES (NEW.company_id, NEW.branch_id, NEW.buyer_company_id, NEW.created_by, \
                 NEW.follow_by, NEW.reference_number, NEW.start_date, NEW.end_date, NEW.status, \
                 NEW.total_pax, NEW.notes, NEW.created_at, NEW.updated_at, NEW.is_active); \
             END"
        ))
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_reference_taken_concurrently_moves_to_next_number() -> Result<()> {
        let db = setup_test_db().await?;
        let buyer = create_test_buyer(&db, "ABC").await?;
        collide_on_insert(&db, "WHEN NEW.reference_number = 'ABC100325001'").await?;

        let start = date(2025, 3, 10);
        let op = create_operation(
            &db,
            new_operation(buyer.id, start, start),
            &ReferencePolicy::default(),
        )
        .await?;
        assert_eq!(op.reference_number, "ABC100325002");
        // The colliding row is undone together with the failed statement
        assert_eq!(Operation::find().count(&db).await?, 1);
        assert_eq!(list_days(&db, op.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_reference_retries_run_out() -> Result<()> {
        let db = setup_test_db().await?;
        let buyer = create_test_buyer(&db, "ABC").await?;
        collide_on_insert(&db, "").await?;
        let start = date(2025, 3, 10);

        let policy = ReferencePolicy {
            max_sequence: 999,
            insert_retries: 2,
        };
        let result = create_operation(&db, new_operation(buyer.id, start, start), &policy).await;
        match result {
            Err(Error::Database(err)) => assert!(reference::is_unique_violation(&err)),
            other => panic!("expected a unique violation, got {other:?}"),
        }

        // Lost numbers are not retried, so a low cap is reached before the retries
        let capped = ReferencePolicy {
            max_sequence: 2,
            insert_retries: 5,
        };
        let result = create_operation(&db, new_operation(buyer.id, start, start), &capped).await;
        assert!(matches!(result, Err(Error::ReferenceExhausted { .. })));

        assert_eq!(Operation::find().count(&db).await?, 0);
        assert!(OperationDay::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_buyer_company() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_operation(
            &db,
            new_operation(99, date(2025, 3, 10), date(2025, 3, 10)),
            &ReferencePolicy::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "buyer company",
                id: 99
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_transitions_and_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let policy = ReferencePolicy::default();
        let buyer = create_test_buyer(&db, "ABC").await?;
        let early = create_operation(
            &db,
            new_operation(buyer.id, date(2025, 3, 10), date(2025, 3, 10)),
            &policy,
        )
        .await?;
        let late = create_operation(
            &db,
            new_operation(buyer.id, date(2025, 4, 1), date(2025, 4, 2)),
            &policy,
        )
        .await?;

        let confirmed = update_status(&db, early.id, parse_status("CONFIRMED")?).await?;
        assert_eq!(confirmed.status, OperationStatus::Confirmed);
        assert!(matches!(parse_status("SHIPPED"), Err(Error::InvalidInput { .. })));

        let all = list_operations(&db, &OperationFilter::default()).await?;
        let ids: Vec<i64> = all.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![late.id, early.id]);

        let drafts = list_operations(
            &db,
            &OperationFilter {
                status: Some(OperationStatus::Draft),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, late.id);

        let found = get_operation_by_reference(&db, &late.reference_number).await?.unwrap();
        assert_eq!(found.id, late.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_operation_removes_children() -> Result<()> {
        let db = setup_test_db().await?;
        let buyer = create_test_buyer(&db, "ABC").await?;
        let op = create_operation(
            &db,
            new_operation(buyer.id, date(2025, 3, 10), date(2025, 3, 11)),
            &ReferencePolicy::default(),
        )
        .await?;
        add_test_buyer_customer(&db, op.id).await?;

        delete_operation(&db, op.id).await?;
        assert!(get_operation(&db, op.id).await?.is_none());
        assert!(list_days(&db, op.id).await?.is_empty());
        assert!(OperationCustomer::find().all(&db).await?.is_empty());
        Ok(())
    }
}
