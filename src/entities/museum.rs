//! Museum entity - Entrance fees for locals and foreign visitors.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Museum database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "museums")]
pub struct Model {
    /// Unique identifier for the museum
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant company
    pub company_id: i64,
    /// Museum name
    pub name: String,
    /// City the museum is located in
    pub city_id: i64,
    /// Current entrance fee for local visitors
    #[sea_orm(column_type = "Double")]
    pub local_price: Decimal,
    /// Current entrance fee for foreign visitors
    #[sea_orm(column_type = "Double")]
    pub foreign_price: Decimal,
    /// Currency of the current fees
    pub currency_id: i64,
    /// Last day the current fees are quoted for
    pub valid_until: Date,
    /// When the row was created
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
    /// Soft delete flag - inactive rows are kept but ignored
    pub is_active: bool,
}

/// Defines relationships between Museum and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One museum has many price history entries
    #[sea_orm(has_many = "super::museum_price_history::Entity")]
    PriceHistory,
}

impl Related<super::museum_price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
