//! Operation entity - A booked itinerary for a buyer company.
//!
//! `reference_number` and `total_pax` are derived: the first is allocated by
//! `core::reference`, the second recomputed by `core::customer` whenever the
//! active customer set changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an operation
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    /// Being put together, not yet agreed with the buyer
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// Agreed with the buyer
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    /// Travelled
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Called off
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// Operation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operations")]
pub struct Model {
    /// Unique identifier for the operation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant company
    pub company_id: i64,
    /// Branch handling the operation
    pub branch_id: i64,
    /// Agency the operation is sold to
    pub buyer_company_id: i64,
    /// User who created the operation
    pub created_by: i64,
    /// User following the operation up
    pub follow_by: i64,
    /// Human-readable code, e.g. `ABC100325001`
    #[sea_orm(unique)]
    pub reference_number: String,
    /// First day of the operation
    pub start_date: Date,
    /// Last day of the operation
    pub end_date: Date,
    /// Current lifecycle status
    pub status: OperationStatus,
    /// Count of active customers
    pub total_pax: i32,
    /// Free-form notes
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// When the row was created
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
    /// Soft delete flag - inactive rows are kept but ignored
    pub is_active: bool,
}

/// Defines relationships between Operation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each operation is sold to one buyer company
    #[sea_orm(
        belongs_to = "super::buyer_company::Entity",
        from = "Column::BuyerCompanyId",
        to = "super::buyer_company::Column::Id"
    )]
    BuyerCompany,
    /// One operation has one day per date of its span
    #[sea_orm(has_many = "super::operation_day::Entity")]
    Days,
    /// One operation has many customers
    #[sea_orm(has_many = "super::operation_customer::Entity")]
    Customers,
    /// One operation has many sales prices
    #[sea_orm(has_many = "super::operation_sales_price::Entity")]
    SalesPrices,
}

impl Related<super::buyer_company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BuyerCompany.def()
    }
}

impl Related<super::operation_day::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Days.def()
    }
}

impl Related<super::operation_customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::operation_sales_price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesPrices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
