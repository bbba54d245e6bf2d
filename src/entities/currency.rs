//! Currency entity - Reference data for every price and cost amount.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Currency database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    /// Unique identifier for the currency
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ISO code (e.g., "EUR", "USD", "TRY")
    #[sea_orm(unique)]
    pub code: String,
    /// Display name (e.g., "Euro")
    pub name: String,
    /// Display symbol (e.g., "€")
    pub symbol: String,
}

/// `Currency` is referenced by id only; no navigable relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
