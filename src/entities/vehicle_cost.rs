//! Vehicle cost entity - What a vehicle supplier charges per vehicle class
//! for one tour or one transfer.
//!
//! Exactly one of `tour_id` and `transfer_id` is set; the core exposes the
//! pair as `core::vehicle_cost::VehicleRoute`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vehicle cost database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle_costs")]
pub struct Model {
    /// Unique identifier for the vehicle cost
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant company
    pub company_id: i64,
    /// Vehicle supplier quoting the cost
    pub supplier_id: i64,
    /// Tour the cost applies to, when it is a tour cost
    pub tour_id: Option<i64>,
    /// Transfer the cost applies to, when it is a transfer cost
    pub transfer_id: Option<i64>,
    /// Current cost of a car
    #[sea_orm(column_type = "Double")]
    pub car_cost: Decimal,
    /// Current cost of a minivan
    #[sea_orm(column_type = "Double")]
    pub minivan_cost: Decimal,
    /// Current cost of a minibus
    #[sea_orm(column_type = "Double")]
    pub minibus_cost: Decimal,
    /// Current cost of a midibus
    #[sea_orm(column_type = "Double")]
    pub midibus_cost: Decimal,
    /// Current cost of a bus
    #[sea_orm(column_type = "Double")]
    pub bus_cost: Decimal,
    /// Currency of the current costs
    pub currency_id: i64,
    /// Last day the current costs are quoted for
    pub valid_until: Date,
    /// When the row was created
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
    /// Soft delete flag - inactive rows are kept but ignored
    pub is_active: bool,
}

/// Defines relationships between `VehicleCost` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One vehicle cost has many history entries
    #[sea_orm(has_many = "super::vehicle_cost_history::Entity")]
    History,
}

impl Related<super::vehicle_cost_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
