//! Vehicle cost history entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price history window database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle_cost_history")]
pub struct Model {
    /// Unique identifier for the history entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Vehicle cost the window belongs to
    pub vehicle_cost_id: i64,
    /// Currency of the amounts in this window
    pub currency_id: i64,
    /// First day the window applies
    pub valid_from: Date,
    /// Last day the window applies
    pub valid_until: Date,
    /// Car cost in this window
    #[sea_orm(column_type = "Double")]
    pub car_cost: Decimal,
    /// Minivan cost in this window
    #[sea_orm(column_type = "Double")]
    pub minivan_cost: Decimal,
    /// Minibus cost in this window
    #[sea_orm(column_type = "Double")]
    pub minibus_cost: Decimal,
    /// Midibus cost in this window
    #[sea_orm(column_type = "Double")]
    pub midibus_cost: Decimal,
    /// Bus cost in this window
    #[sea_orm(column_type = "Double")]
    pub bus_cost: Decimal,
    /// When the row was created
    pub created_at: DateTime,
    /// Withdrawn windows are inactive and never effective
    pub is_active: bool,
}

/// Defines relationships to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one vehicle cost
    #[sea_orm(
        belongs_to = "super::vehicle_cost::Entity",
        from = "Column::VehicleCostId",
        to = "super::vehicle_cost::Column::Id",
        on_delete = "Cascade"
    )]
    VehicleCost,
}

impl Related<super::vehicle_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleCost.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
