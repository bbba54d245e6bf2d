//! Operation day entity - One calendar date of an operation.
//!
//! Rows are owned by the operation and regenerated by `core::calendar`;
//! clients never insert them directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operation day database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operation_days")]
pub struct Model {
    /// Unique identifier for the day
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Operation the day belongs to
    pub operation_id: i64,
    /// Calendar date of the day
    pub date: Date,
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
    /// Each day belongs to one operation
    #[sea_orm(
        belongs_to = "super::operation::Entity",
        from = "Column::OperationId",
        to = "super::operation::Column::Id",
        on_delete = "Cascade"
    )]
    Operation,
    /// One day has many items
    #[sea_orm(has_many = "super::operation_item::Entity")]
    Items,
}

impl Related<super::operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operation.def()
    }
}

impl Related<super::operation_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
