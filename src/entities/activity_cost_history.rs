//! Activity cost history entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price history window database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_cost_history")]
pub struct Model {
    /// Unique identifier for the history entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Activity cost the window belongs to
    pub activity_cost_id: i64,
    /// Currency of the amounts in this window
    pub currency_id: i64,
    /// First day the window applies
    pub valid_from: Date,
    /// Last day the window applies
    pub valid_until: Date,
    /// Price per person in this window
    #[sea_orm(column_type = "Double")]
    pub price: Decimal,
    /// When the row was created
    pub created_at: DateTime,
    /// Withdrawn windows are inactive and never effective
    pub is_active: bool,
}

/// Defines relationships to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one activity cost
    #[sea_orm(
        belongs_to = "super::activity_cost::Entity",
        from = "Column::ActivityCostId",
        to = "super::activity_cost::Column::Id",
        on_delete = "Cascade"
    )]
    ActivityCost,
}

impl Related<super::activity_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityCost.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
