//! Operation sub-item entity - The cost and sales breakdown of an item.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of an operation sub-item
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubItemType {
    /// A tour served by the parent vehicle
    #[sea_orm(string_value = "TOUR")]
    Tour,
    /// A transfer served by the parent vehicle
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
    /// An activity
    #[sea_orm(string_value = "ACTIVITY")]
    Activity,
    /// One or more museum visits
    #[sea_orm(string_value = "MUSEUM")]
    Museum,
    /// A hotel night
    #[sea_orm(string_value = "HOTEL")]
    Hotel,
    /// A guide
    #[sea_orm(string_value = "GUIDE")]
    Guide,
    /// Any other priced extra
    #[sea_orm(string_value = "OTHER_PRICE")]
    OtherPrice,
}

/// Hotel room category
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    /// Single room
    #[sea_orm(string_value = "SINGLE")]
    Single,
    /// Double room
    #[sea_orm(string_value = "DOUBLE")]
    Double,
    /// Family (triple) room
    #[sea_orm(string_value = "TRIPLE")]
    Triple,
}

/// Operation sub-item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operation_sub_items")]
pub struct Model {
    /// Unique identifier for the sub-item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent item
    pub operation_item_id: i64,
    /// Display position within the parent item
    pub ordering: i32,
    /// Which kind of sub-item this row holds
    pub subitem_type: SubItemType,
    /// Tour, for tour sub-items
    pub tour_id: Option<i64>,
    /// Transfer, for transfer sub-items
    pub transfer_id: Option<i64>,
    /// Hotel, for hotel sub-items
    pub hotel_id: Option<i64>,
    /// Room booked, for hotel sub-items
    pub room_type: Option<RoomType>,
    /// Whether a guide is booked
    pub is_guide: bool,
    /// Guide, for guide sub-items
    pub guide_id: Option<i64>,
    /// Activity, for activity sub-items
    pub activity_id: Option<i64>,
    /// Supplier running the activity
    pub activity_supplier_id: Option<i64>,
    /// Activity cost the sub-item was priced from
    pub activity_cost_id: Option<i64>,
    /// What an other-price sub-item charges for
    pub other_price_description: Option<String>,
    /// Free-form notes
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Amount charged to the buyer
    #[sea_orm(column_type = "Double", nullable)]
    pub sales_price: Option<Decimal>,
    /// Currency of the sales price
    pub sales_currency_id: Option<i64>,
    /// Amount paid to the supplier, snapshotted at booking
    #[sea_orm(column_type = "Double", nullable)]
    pub cost_price: Option<Decimal>,
    /// Currency of the cost price
    pub cost_currency_id: Option<i64>,
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
    /// Each sub-item belongs to one item
    #[sea_orm(
        belongs_to = "super::operation_item::Entity",
        from = "Column::OperationItemId",
        to = "super::operation_item::Column::Id",
        on_delete = "Cascade"
    )]
    OperationItem,
    /// Museums visited by a museum sub-item
    #[sea_orm(has_many = "super::sub_item_museum::Entity")]
    Museums,
}

impl Related<super::operation_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperationItem.def()
    }
}

impl Related<super::sub_item_museum::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Museums.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
