//! Join table between museum sub-items and the museums they cover.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Museum visited by a museum sub-item
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operation_sub_item_museums")]
pub struct Model {
    /// Unique identifier for the link
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Museum sub-item
    pub sub_item_id: i64,
    /// Museum visited
    pub museum_id: i64,
}

/// Defines relationships to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link belongs to one sub-item
    #[sea_orm(
        belongs_to = "super::operation_sub_item::Entity",
        from = "Column::SubItemId",
        to = "super::operation_sub_item::Column::Id",
        on_delete = "Cascade"
    )]
    SubItem,
}

impl Related<super::operation_sub_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
