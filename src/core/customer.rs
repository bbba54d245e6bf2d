//! Operation customers (pax) and the buyer rule.
//!
//! Every operation with active customers has exactly one active customer
//! flagged as buyer, and the buyer carries contact info. `total_pax` on the
//! operation is recounted from the database after every change to the active
//! customer set, inside the same transaction.

use crate::{
    entities::{CustomerType, Operation, OperationCustomer, operation, operation_customer},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

/// Input for [`add_customer`].
#[derive(Debug, Clone)]
pub struct NewCustomer {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Age band
    pub customer_type: CustomerType,
    /// Date of birth, if known
    pub birth_date: Option<NaiveDate>,
    /// Passport number, if known
    pub passport_no: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Phone number or email
    pub contact_info: Option<String>,
    /// Flag the customer as the operation's buyer
    pub is_buyer: bool,
}

/// Field edits for [`update_customer`]. `None` leaves a field as is; the
/// nested options clear a field with `Some(None)`.
#[derive(Debug, Clone, Default)]
pub struct CustomerChanges {
    /// New given name
    pub first_name: Option<String>,
    /// New family name
    pub last_name: Option<String>,
    /// New age band
    pub customer_type: Option<CustomerType>,
    /// New or cleared date of birth
    pub birth_date: Option<Option<NaiveDate>>,
    /// New or cleared passport number
    pub passport_no: Option<Option<String>>,
    /// New or cleared notes
    pub notes: Option<Option<String>>,
    /// New or cleared contact info
    pub contact_info: Option<Option<String>>,
    /// Set or clear the buyer flag
    pub is_buyer: Option<bool>,
}

fn has_contact(contact_info: Option<&str>) -> bool {
    contact_info.is_some_and(|c| !c.trim().is_empty())
}

fn require_name(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput {
            message: format!("{field} cannot be empty"),
        });
    }
    Ok(trimmed.to_string())
}

async fn ensure_operation<C>(db: &C, operation_id: i64) -> Result<operation::Model>
where
    C: ConnectionTrait,
{
    Operation::find_by_id(operation_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("operation", operation_id))
}

async fn load_customer<C>(db: &C, id: i64) -> Result<operation_customer::Model>
where
    C: ConnectionTrait,
{
    OperationCustomer::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("customer", id))
}

/// The active buyer of an operation, if any.
pub async fn active_buyer<C>(db: &C, operation_id: i64) -> Result<Option<operation_customer::Model>>
where
    C: ConnectionTrait,
{
    OperationCustomer::find()
        .filter(operation_customer::Column::OperationId.eq(operation_id))
        .filter(operation_customer::Column::IsActive.eq(true))
        .filter(operation_customer::Column::IsBuyer.eq(true))
        .order_by_asc(operation_customer::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn count_active<C>(db: &C, operation_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    OperationCustomer::find()
        .filter(operation_customer::Column::OperationId.eq(operation_id))
        .filter(operation_customer::Column::IsActive.eq(true))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Fails when the operation has active customers but none of them is the buyer.
async fn ensure_buyer_present<C>(db: &C, operation_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    if count_active(db, operation_id).await? > 0 && active_buyer(db, operation_id).await?.is_none()
    {
        return Err(Error::NoActiveBuyer { operation_id });
    }
    Ok(())
}

/// Recounts the active customers of an operation into `total_pax`.
///
/// Writes only the `total_pax` column. Returns the new count.
pub async fn refresh_total_pax<C>(db: &C, operation_id: i64) -> Result<i32>
where
    C: ConnectionTrait,
{
    let count = count_active(db, operation_id).await?;
    let total_pax = i32::try_from(count).map_err(|_| Error::InvalidInput {
        message: format!("Operation {operation_id} has too many customers: {count}"),
    })?;

    Operation::update_many()
        .col_expr(operation::Column::TotalPax, Expr::value(total_pax))
        .filter(operation::Column::Id.eq(operation_id))
        .exec(db)
        .await?;
    debug!(operation_id, total_pax, "Recomputed total pax");
    Ok(total_pax)
}

/// Adds a customer to an operation.
///
/// The first customer of an operation must be the buyer. A buyer needs
/// contact info and an operation can only have one.
///
/// # Errors
/// [`Error::NotFound`], [`Error::InvalidInput`] for blank names,
/// [`Error::BuyerContactMissing`], [`Error::BuyerAlreadyDesignated`] or
/// [`Error::NoActiveBuyer`].
#[instrument(skip(db, new), fields(is_buyer = new.is_buyer))]
pub async fn add_customer(
    db: &DatabaseConnection,
    operation_id: i64,
    new: NewCustomer,
) -> Result<operation_customer::Model> {
    let first_name = require_name("First name", &new.first_name)?;
    let last_name = require_name("Last name", &new.last_name)?;
    if new.is_buyer && !has_contact(new.contact_info.as_deref()) {
        return Err(Error::BuyerContactMissing);
    }

    let txn = db.begin().await?;
    ensure_operation(&txn, operation_id).await?;

    let buyer = active_buyer(&txn, operation_id).await?;
    match (new.is_buyer, buyer) {
        (true, Some(existing)) => {
            return Err(Error::BuyerAlreadyDesignated {
                operation_id,
                customer_id: existing.id,
            });
        }
        (false, None) => return Err(Error::NoActiveBuyer { operation_id }),
        _ => {}
    }

    let now = Utc::now().naive_utc();
    let customer = operation_customer::ActiveModel {
        operation_id: Set(operation_id),
        first_name: Set(first_name),
        last_name: Set(last_name),
        customer_type: Set(new.customer_type),
        birth_date: Set(new.birth_date),
        passport_no: Set(new.passport_no),
        notes: Set(new.notes),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
        is_buyer: Set(new.is_buyer),
        contact_info: Set(new.contact_info),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let total_pax = refresh_total_pax(&txn, operation_id).await?;
    txn.commit().await?;

    info!(id = customer.id, operation_id, total_pax, "Added customer");
    Ok(customer)
}

/// Edits a customer. The buyer rule is checked against the result.
pub async fn update_customer(
    db: &DatabaseConnection,
    id: i64,
    changes: CustomerChanges,
) -> Result<operation_customer::Model> {
    let txn = db.begin().await?;
    let previous = load_customer(&txn, id).await?;
    let operation_id = previous.operation_id;

    let is_buyer = changes.is_buyer.unwrap_or(previous.is_buyer);
    let contact_info = changes
        .contact_info
        .clone()
        .unwrap_or_else(|| previous.contact_info.clone());
    if is_buyer && !has_contact(contact_info.as_deref()) {
        return Err(Error::BuyerContactMissing);
    }
    if is_buyer && !previous.is_buyer && previous.is_active {
        if let Some(existing) = active_buyer(&txn, operation_id).await? {
            return Err(Error::BuyerAlreadyDesignated {
                operation_id,
                customer_id: existing.id,
            });
        }
    }

    let mut active: operation_customer::ActiveModel = previous.into();
    if let Some(first_name) = changes.first_name {
        active.first_name = Set(require_name("First name", &first_name)?);
    }
    if let Some(last_name) = changes.last_name {
        active.last_name = Set(require_name("Last name", &last_name)?);
    }
    if let Some(customer_type) = changes.customer_type {
        active.customer_type = Set(customer_type);
    }
    if let Some(birth_date) = changes.birth_date {
        active.birth_date = Set(birth_date);
    }
    if let Some(passport_no) = changes.passport_no {
        active.passport_no = Set(passport_no);
    }
    if let Some(notes) = changes.notes {
        active.notes = Set(notes);
    }
    active.contact_info = Set(contact_info);
    active.is_buyer = Set(is_buyer);
    active.updated_at = Set(Utc::now().naive_utc());
    let customer = active.update(&txn).await?;

    ensure_buyer_present(&txn, operation_id).await?;
    txn.commit().await?;
    Ok(customer)
}

/// Marks a customer inactive and recounts the pax.
///
/// Deactivating the buyer is only allowed when no other active customer
/// remains.
pub async fn deactivate_customer(
    db: &DatabaseConnection,
    id: i64,
) -> Result<operation_customer::Model> {
    let txn = db.begin().await?;
    let previous = load_customer(&txn, id).await?;
    let operation_id = previous.operation_id;

    let mut active: operation_customer::ActiveModel = previous.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().naive_utc());
    let customer = active.update(&txn).await?;

    ensure_buyer_present(&txn, operation_id).await?;
    let total_pax = refresh_total_pax(&txn, operation_id).await?;
    txn.commit().await?;

    info!(id, operation_id, total_pax, "Deactivated customer");
    Ok(customer)
}

/// Deletes a customer and recounts the pax. Same buyer rule as deactivation.
pub async fn delete_customer(db: &DatabaseConnection, id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let customer = load_customer(&txn, id).await?;
    let operation_id = customer.operation_id;

    OperationCustomer::delete_by_id(id).exec(&txn).await?;
    ensure_buyer_present(&txn, operation_id).await?;
    let total_pax = refresh_total_pax(&txn, operation_id).await?;
    txn.commit().await?;

    info!(id, operation_id, total_pax, "Deleted customer");
    Ok(())
}

/// Moves the buyer flag of an operation to another of its active customers.
///
/// # Errors
/// [`Error::InvalidInput`] when the customer belongs to another operation or
/// is inactive, [`Error::BuyerContactMissing`] when it has no contact info.
pub async fn transfer_buyer(
    db: &DatabaseConnection,
    operation_id: i64,
    customer_id: i64,
) -> Result<operation_customer::Model> {
    let txn = db.begin().await?;
    let customer = load_customer(&txn, customer_id).await?;
    if customer.operation_id != operation_id || !customer.is_active {
        return Err(Error::InvalidInput {
            message: format!(
                "Customer {customer_id} is not an active customer of operation {operation_id}"
            ),
        });
    }
    if !has_contact(customer.contact_info.as_deref()) {
        return Err(Error::BuyerContactMissing);
    }

    OperationCustomer::update_many()
        .col_expr(operation_customer::Column::IsBuyer, Expr::value(false))
        .filter(operation_customer::Column::OperationId.eq(operation_id))
        .filter(operation_customer::Column::Id.ne(customer_id))
        .exec(&txn)
        .await?;

    let mut active: operation_customer::ActiveModel = customer.into();
    active.is_buyer = Set(true);
    active.updated_at = Set(Utc::now().naive_utc());
    let buyer = active.update(&txn).await?;
    txn.commit().await?;

    info!(operation_id, customer_id, "Transferred buyer");
    Ok(buyer)
}

/// Customers of an operation, buyer first, then in insertion order.
pub async fn list_customers(
    db: &DatabaseConnection,
    operation_id: i64,
) -> Result<Vec<operation_customer::Model>> {
    OperationCustomer::find()
        .filter(operation_customer::Column::OperationId.eq(operation_id))
        .order_by_desc(operation_customer::Column::IsBuyer)
        .order_by_asc(operation_customer::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn traveller(first_name: &str, is_buyer: bool, contact: Option<&str>) -> NewCustomer {
        NewCustomer {
            first_name: first_name.to_string(),
            last_name: "Traveller".to_string(),
            customer_type: CustomerType::Adult,
            birth_date: None,
            passport_no: None,
            notes: None,
            contact_info: contact.map(ToString::to_string),
            is_buyer,
        }
    }

    async fn total_pax(db: &DatabaseConnection, operation_id: i64) -> Result<i32> {
        Ok(Operation::find_by_id(operation_id).one(db).await?.unwrap().total_pax)
    }

    #[tokio::test]
    async fn test_non_buyer_on_buyerless_operation_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let op = create_test_operation_for(&db, "ABC").await?;

        let result = add_customer(&db, op.id, traveller("Ann", false, None)).await;
        assert!(matches!(
            result,
            Err(Error::NoActiveBuyer { operation_id }) if operation_id == op.id
        ));
        assert_eq!(total_pax(&db, op.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_buyer_needs_contact_info() -> Result<()> {
        let db = setup_test_db().await?;
        let op = create_test_operation_for(&db, "ABC").await?;

        let result = add_customer(&db, op.id, traveller("Ann", true, Some("  "))).await;
        assert!(matches!(result, Err(Error::BuyerContactMissing)));
        Ok(())
    }

    #[tokio::test]
    async fn test_pax_follows_active_customers() -> Result<()> {
        let db = setup_test_db().await?;
        let op = create_test_operation_for(&db, "ABC").await?;

        let buyer = add_customer(&db, op.id, traveller("Ann", true, Some("ann@mail.test"))).await?;
        let bob = add_customer(&db, op.id, traveller("Bob", false, None)).await?;
        let cem = add_customer(&db, op.id, traveller("Cem", false, None)).await?;
        assert_eq!(total_pax(&db, op.id).await?, 3);

        deactivate_customer(&db, bob.id).await?;
        assert_eq!(total_pax(&db, op.id).await?, 2);

        delete_customer(&db, cem.id).await?;
        assert_eq!(total_pax(&db, op.id).await?, 1);

        let listed = list_customers(&db, op.id).await?;
        assert_eq!(listed[0].id, buyer.id);
        assert_eq!(listed.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_buyer_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let op = create_test_operation_for(&db, "ABC").await?;
        let ann = add_customer(&db, op.id, traveller("Ann", true, Some("+90 555"))).await?;

        let result = add_customer(&db, op.id, traveller("Bob", true, Some("bob@mail.test"))).await;
        assert!(matches!(
            result,
            Err(Error::BuyerAlreadyDesignated { customer_id, .. }) if customer_id == ann.id
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_buyer_cannot_leave_others_behind() -> Result<()> {
        let db = setup_test_db().await?;
        let op = create_test_operation_for(&db, "ABC").await?;
        let ann = add_customer(&db, op.id, traveller("Ann", true, Some("+90 555"))).await?;
        let bob = add_customer(&db, op.id, traveller("Bob", false, None)).await?;

        let result = deactivate_customer(&db, ann.id).await;
        assert!(matches!(result, Err(Error::NoActiveBuyer { .. })));

        let result = update_customer(
            &db,
            ann.id,
            CustomerChanges {
                is_buyer: Some(false),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::NoActiveBuyer { .. })));

        let result = delete_customer(&db, ann.id).await;
        assert!(matches!(result, Err(Error::NoActiveBuyer { .. })));
        assert_eq!(total_pax(&db, op.id).await?, 2);

        // Once the others are gone the buyer may go too
        deactivate_customer(&db, bob.id).await?;
        deactivate_customer(&db, ann.id).await?;
        assert_eq!(total_pax(&db, op.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_buyer() -> Result<()> {
        let db = setup_test_db().await?;
        let op = create_test_operation_for(&db, "ABC").await?;
        let ann = add_customer(&db, op.id, traveller("Ann", true, Some("+90 555"))).await?;
        let bob = add_customer(&db, op.id, traveller("Bob", false, None)).await?;

        let result = transfer_buyer(&db, op.id, bob.id).await;
        assert!(matches!(result, Err(Error::BuyerContactMissing)));

        update_customer(
            &db,
            bob.id,
            CustomerChanges {
                contact_info: Some(Some("bob@mail.test".to_string())),
                ..Default::default()
            },
        )
        .await?;
        let new_buyer = transfer_buyer(&db, op.id, bob.id).await?;
        assert!(new_buyer.is_buyer);

        let buyer = active_buyer(&db, op.id).await?.unwrap();
        assert_eq!(buyer.id, bob.id);
        let ann = OperationCustomer::find_by_id(ann.id).one(&db).await?.unwrap();
        assert!(!ann.is_buyer);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_customer_details() -> Result<()> {
        let db = setup_test_db().await?;
        let op = create_test_operation_for(&db, "ABC").await?;
        let ann = add_customer(&db, op.id, traveller("Ann", true, Some("+90 555"))).await?;

        let updated = update_customer(
            &db,
            ann.id,
            CustomerChanges {
                last_name: Some(" Smith ".to_string()),
                customer_type: Some(CustomerType::Child),
                passport_no: Some(Some("P123".to_string())),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.full_name(), "Ann Smith");
        assert_eq!(updated.customer_type, CustomerType::Child);
        assert_eq!(updated.passport_no.as_deref(), Some("P123"));

        let result = update_customer(
            &db,
            ann.id,
            CustomerChanges {
                contact_info: Some(None),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::BuyerContactMissing)));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_operation() -> Result<()> {
        let db = setup_test_db().await?;
        let result = add_customer(&db, 31, traveller("Ann", true, Some("+90 555"))).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "operation",
                id: 31
            })
        ));
        Ok(())
    }
}
