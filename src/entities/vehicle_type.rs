//! Vehicle type entity - Car, minivan, minibus and so on.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vehicle type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle_types")]
pub struct Model {
    /// Unique identifier for the vehicle type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, e.g. "Minivan"
    #[sea_orm(unique)]
    pub name: String,
    /// Soft delete flag - inactive rows are kept but ignored
    pub is_active: bool,
}

/// Defines relationships to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
