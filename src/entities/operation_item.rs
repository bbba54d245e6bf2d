//! Operation item entity - A bookable line on one operation day.
//!
//! The table stores every kind of item in one row shape; which reference
//! columns are meaningful depends on `item_type`. The core never works with
//! the flat row directly but decodes it into `core::item::ItemKind`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of an operation item
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    /// Served with a vehicle
    #[sea_orm(string_value = "VEHICLE")]
    Vehicle,
    /// Walking tour
    #[sea_orm(string_value = "NO_VEHICLE_TOUR")]
    NoVehicleTour,
    /// Stand-alone activity
    #[sea_orm(string_value = "NO_VEHICLE_ACTIVITY")]
    NoVehicleActivity,
}

/// Operation item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operation_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Day the item is scheduled on
    pub operation_day_id: i64,
    /// Which kind of item this row holds
    pub item_type: ItemType,
    /// Pick-up time
    pub pick_time: Option<Time>,
    /// Where the group is picked up
    pub pick_up_location: Option<String>,
    /// Where the group is dropped off
    pub drop_off_location: Option<String>,
    // Vehicle items
    /// Vehicle type booked
    pub vehicle_type_id: Option<i64>,
    /// Supplier providing the vehicle
    pub vehicle_supplier_id: Option<i64>,
    /// Vehicle cost the item was priced from
    pub vehicle_cost_id: Option<i64>,
    /// Driver's name
    pub driver_name: Option<String>,
    /// Driver's phone number
    pub driver_phone: Option<String>,
    /// Plate number of the vehicle
    pub vehicle_plate_no: Option<String>,
    // Tours without a vehicle
    /// Tour booked without a vehicle
    pub no_vehicle_tour_id: Option<i64>,
    // Activities without a vehicle
    /// Activity booked without a vehicle
    pub no_vehicle_activity_id: Option<i64>,
    /// Supplier running the activity
    pub activity_supplier_id: Option<i64>,
    /// Activity cost the item was priced from
    pub activity_cost_id: Option<i64>,
    /// Free-form notes
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Amount charged to the buyer
    #[sea_orm(column_type = "Double", nullable)]
    pub sales_price: Option<Decimal>,
    /// Currency of the sales price
    pub sales_currency_id: Option<i64>,
    /// Amount paid to the supplier, snapshotted at booking
    #[sea_orm(column_type = "Double", nullable)]
    pub cost_price: Option<Decimal>,
    /// Currency of the cost price
    pub cost_currency_id: Option<i64>,
    /// When the row was created
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
    /// Soft delete flag - inactive rows are kept but ignored
    pub is_active: bool,
}

/// Defines relationships to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one day
    #[sea_orm(
        belongs_to = "super::operation_day::Entity",
        from = "Column::OperationDayId",
        to = "super::operation_day::Column::Id",
        on_delete = "Cascade"
    )]
    OperationDay,
    /// One item has many sub-items
    #[sea_orm(has_many = "super::operation_sub_item::Entity")]
    SubItems,
}

impl Related<super::operation_day::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperationDay.def()
    }
}

impl Related<super::operation_sub_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
