//! Operation customer entity - One traveller (pax) on an operation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Age band of a traveller
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
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    /// Adult traveller
    #[sea_orm(string_value = "ADULT")]
    Adult,
    /// Child traveller
    #[sea_orm(string_value = "CHILD")]
    Child,
    /// Infant traveller
    #[sea_orm(string_value = "INFANT")]
    Infant,
}

/// Operation customer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operation_customers")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Operation the customer travels on
    pub operation_id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Age band
    pub customer_type: CustomerType,
    /// Date of birth, if known
    pub birth_date: Option<Date>,
    /// Passport number, if known
    pub passport_no: Option<String>,
    /// Free-form notes
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// When the row was created
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
    /// Inactive customers do not count towards `total_pax`
    pub is_active: bool,
    /// Whether this customer is the buyer of the operation
    pub is_buyer: bool,
    /// Phone number or email; mandatory for the buyer
    pub contact_info: Option<String>,
}

impl Model {
    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Defines relationships to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each customer belongs to one operation
    #[sea_orm(
        belongs_to = "super::operation::Entity",
        from = "Column::OperationId",
        to = "super::operation::Column::Id",
        on_delete = "Cascade"
    )]
    Operation,
}

impl Related<super::operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
