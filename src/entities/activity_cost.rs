//! Activity cost entity - A supplier's price for one activity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activity cost database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_costs")]
pub struct Model {
    /// Unique identifier for the activity cost
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant company
    pub company_id: i64,
    /// Activity being priced
    pub activity_id: i64,
    /// Activity supplier quoting the price
    pub supplier_id: i64,
    /// Current price per person
    #[sea_orm(column_type = "Double")]
    pub price: Decimal,
    /// Currency of the current price
    pub currency_id: i64,
    /// Last day the current price is quoted for
    pub valid_until: Date,
    /// When the row was created
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
    /// Soft delete flag - inactive rows are kept but ignored
    pub is_active: bool,
}

/// Defines relationships between `ActivityCost` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One activity cost has many history entries
    #[sea_orm(has_many = "super::activity_cost_history::Entity")]
    History,
}

impl Related<super::activity_cost_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
