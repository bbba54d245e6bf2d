//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.
#![allow(clippy::unwrap_used)]

use crate::{
    config::ReferencePolicy,
    core::{
        calendar, catalog,
        customer::{self, NewCustomer},
        hotel::{self, HotelRates, NewHotel},
        item::{self, ItemKind, NewItem},
        ledger::Quote,
        operation::{self, NewOperation},
    },
    entities::{self, CustomerType},
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates a currency whose name and symbol are its code.
pub async fn create_test_currency(
    db: &DatabaseConnection,
    code: &str,
) -> Result<entities::currency::Model> {
    catalog::create_currency(db, code, code, code).await
}

/// Creates a test hotel.
///
/// # Defaults
/// * city: 1
/// * double / triple rate: 150 / 200
/// * `valid_until`: 2025-12-31
pub async fn create_test_hotel(
    db: &DatabaseConnection,
    currency_id: i64,
    single: Decimal,
    today: NaiveDate,
) -> Result<entities::hotel::Model> {
    hotel::create_hotel(
        db,
        NewHotel {
            company_id: 1,
            name: "Test Hotel".to_string(),
            city_id: 1,
            quote: Quote::new(
                HotelRates {
                    single,
                    double: dec!(150),
                    triple: dec!(200),
                },
                currency_id,
                date(2025, 12, 31),
            ),
        },
        today,
    )
    .await
}

/// Creates a buyer company with the given short name.
pub async fn create_test_buyer(
    db: &DatabaseConnection,
    short_name: &str,
) -> Result<entities::buyer_company::Model> {
    catalog::create_buyer_company(
        db,
        1,
        &format!("{short_name} Travel"),
        short_name,
        "ops@buyer.test",
    )
    .await
}

/// Creates an operation for `buyer_company_id` with the default reference policy.
pub async fn create_test_operation(
    db: &DatabaseConnection,
    buyer_company_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<entities::operation::Model> {
    operation::create_operation(
        db,
        NewOperation {
            company_id: 1,
            branch_id: 1,
            buyer_company_id,
            created_by: 1,
            follow_by: 1,
            reference_number: None,
            start_date,
            end_date,
            notes: None,
        },
        &ReferencePolicy::default(),
    )
    .await
}

/// Creates a buyer company and a three day operation (2025-03-10 to 2025-03-12) for it.
pub async fn create_test_operation_for(
    db: &DatabaseConnection,
    short_name: &str,
) -> Result<entities::operation::Model> {
    let buyer = create_test_buyer(db, short_name).await?;
    create_test_operation(db, buyer.id, date(2025, 3, 10), date(2025, 3, 12)).await
}

/// Adds a buyer customer with contact info.
pub async fn add_test_buyer_customer(
    db: &DatabaseConnection,
    operation_id: i64,
) -> Result<entities::operation_customer::Model> {
    customer::add_customer(
        db,
        operation_id,
        NewCustomer {
            first_name: "Test".to_string(),
            last_name: "Buyer".to_string(),
            customer_type: CustomerType::Adult,
            birth_date: None,
            passport_no: None,
            notes: None,
            contact_info: Some("buyer@mail.test".to_string()),
            is_buyer: true,
        },
    )
    .await
}

/// Creates a one day operation on 2025-03-10 and returns its day.
pub async fn create_test_day(db: &DatabaseConnection) -> Result<entities::operation_day::Model> {
    let buyer = create_test_buyer(db, "TST").await?;
    let op = create_test_operation(db, buyer.id, date(2025, 3, 10), date(2025, 3, 10)).await?;
    Ok(calendar::list_days(db, op.id).await?.remove(0))
}

/// Books a tour without a vehicle on a day.
pub async fn create_test_tour_item(
    db: &DatabaseConnection,
    operation_day_id: i64,
) -> Result<entities::operation_item::Model> {
    item::add_item(
        db,
        operation_day_id,
        NewItem::of(ItemKind::NoVehicleTour { tour_id: 1 }),
    )
    .await
}
