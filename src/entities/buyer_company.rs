//! Buyer company entity - The agency an operation is sold to.
//!
//! The `short_name` feeds the prefix of every operation reference number,
//! so it is unique across all tenants.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Buyer company database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "buyer_companies")]
pub struct Model {
    /// Unique identifier for the buyer company
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant company
    pub company_id: i64,
    /// Full legal or trading name
    pub name: String,
    /// Short code used in reference numbers (e.g., "ABC")
    #[sea_orm(unique)]
    pub short_name: String,
    /// Contact person, phone or email
    pub contact: String,
    /// Soft delete flag - inactive rows are kept but ignored
    pub is_active: bool,
    /// When the row was created
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `BuyerCompany` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One buyer company has many operations
    #[sea_orm(has_many = "super::operation::Entity")]
    Operations,
}

impl Related<super::operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
