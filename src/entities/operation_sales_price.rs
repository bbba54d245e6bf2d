//! Operation sales price entity - A price the operation was sold for.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operation sales price database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operation_sales_prices")]
pub struct Model {
    /// Unique identifier for the sales price
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Operation the price is quoted for
    pub operation_id: i64,
    /// Amount charged for the operation
    #[sea_orm(column_type = "Double")]
    pub price: Decimal,
    /// Currency of the amount
    pub currency_id: i64,
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
    /// Each sales price belongs to one operation
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
