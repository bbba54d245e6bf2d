//! Museum price history entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price history window database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "museum_price_history")]
pub struct Model {
    /// Unique identifier for the history entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Museum the window belongs to
    pub museum_id: i64,
    /// Currency of the amounts in this window
    pub currency_id: i64,
    /// First day the window applies
    pub valid_from: Date,
    /// Last day the window applies
    pub valid_until: Date,
    /// Entrance fee for local visitors in this window
    #[sea_orm(column_type = "Double")]
    pub local_price: Decimal,
    /// Entrance fee for foreign visitors in this window
    #[sea_orm(column_type = "Double")]
    pub foreign_price: Decimal,
    /// When the row was created
    pub created_at: DateTime,
    /// Withdrawn windows are inactive and never effective
    pub is_active: bool,
}

/// Defines relationships to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one museum
    #[sea_orm(
        belongs_to = "super::museum::Entity",
        from = "Column::MuseumId",
        to = "super::museum::Column::Id",
        on_delete = "Cascade"
    )]
    Museum,
}

impl Related<super::museum::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Museum.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
