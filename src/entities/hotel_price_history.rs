//! Hotel price history entity - One validity window of a hotel's rates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hotel price history database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hotel_price_history")]
pub struct Model {
    /// Unique identifier for the history entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Hotel this window belongs to
    pub hotel_id: i64,
    /// Currency of the amounts in this window
    pub currency_id: i64,
    /// First day the rates applied
    pub valid_from: Date,
    /// Last day the rates applied (shortened when superseded)
    pub valid_until: Date,
    /// Single room rate in this window
    #[sea_orm(column_type = "Double")]
    pub single_price: Decimal,
    /// Double room rate in this window
    #[sea_orm(column_type = "Double")]
    pub double_price: Decimal,
    /// Family (triple) room rate in this window
    #[sea_orm(column_type = "Double")]
    pub triple_price: Decimal,
    /// When the row was created
    pub created_at: DateTime,
    /// Withdrawn windows are inactive and never effective
    pub is_active: bool,
}

/// Defines relationships to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one hotel
    #[sea_orm(
        belongs_to = "super::hotel::Entity",
        from = "Column::HotelId",
        to = "super::hotel::Column::Id",
        on_delete = "Cascade"
    )]
    Hotel,
}

impl Related<super::hotel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hotel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
