//! Hotel entity - A priced catalog record with per-room-type rates.
//!
//! The price columns hold the *current* quote only. Every change to them goes
//! through `core::hotel::update_hotel_prices`, which keeps
//! [`super::hotel_price_history`] in step.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hotel database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hotels")]
pub struct Model {
    /// Unique identifier for the hotel
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant company
    pub company_id: i64,
    /// Hotel name
    pub name: String,
    /// City the hotel is located in
    pub city_id: i64,
    /// Current single room rate
    #[sea_orm(column_type = "Double")]
    pub single_price: Decimal,
    /// Current double room rate
    #[sea_orm(column_type = "Double")]
    pub double_price: Decimal,
    /// Current family (triple) room rate
    #[sea_orm(column_type = "Double")]
    pub triple_price: Decimal,
    /// Currency of the current rates
    pub currency_id: i64,
    /// Last day the current rates are quoted for
    pub valid_until: Date,
    /// When the row was created
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
    /// Soft delete flag - inactive rows are kept but ignored
    pub is_active: bool,
}

/// Defines relationships between Hotel and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One hotel has many price history entries
    #[sea_orm(has_many = "super::hotel_price_history::Entity")]
    PriceHistory,
}

impl Related<super::hotel_price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
