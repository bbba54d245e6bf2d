//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod activity_cost;
pub mod activity_cost_history;
pub mod buyer_company;
pub mod currency;
pub mod hotel;
pub mod hotel_price_history;
pub mod museum;
pub mod museum_price_history;
pub mod operation;
pub mod operation_customer;
pub mod operation_day;
pub mod operation_item;
pub mod operation_sales_price;
pub mod operation_sub_item;
pub mod sub_item_museum;
pub mod vehicle_cost;
pub mod vehicle_cost_history;
pub mod vehicle_type;

// Re-export specific types to avoid conflicts
pub use activity_cost::{Entity as ActivityCost, Model as ActivityCostModel};
pub use activity_cost_history::{
    Entity as ActivityCostHistory, Model as ActivityCostHistoryModel,
};
pub use buyer_company::{Entity as BuyerCompany, Model as BuyerCompanyModel};
pub use currency::{Entity as Currency, Model as CurrencyModel};
pub use hotel::{Entity as Hotel, Model as HotelModel};
pub use hotel_price_history::{Entity as HotelPriceHistory, Model as HotelPriceHistoryModel};
pub use museum::{Entity as Museum, Model as MuseumModel};
pub use museum_price_history::{Entity as MuseumPriceHistory, Model as MuseumPriceHistoryModel};
pub use operation::{Entity as Operation, Model as OperationModel, OperationStatus};
pub use operation_customer::{
    CustomerType, Entity as OperationCustomer, Model as OperationCustomerModel,
};
pub use operation_day::{Entity as OperationDay, Model as OperationDayModel};
pub use operation_item::{Entity as OperationItem, ItemType, Model as OperationItemModel};
pub use operation_sales_price::{
    Entity as OperationSalesPrice, Model as OperationSalesPriceModel,
};
pub use operation_sub_item::{
    Entity as OperationSubItem, Model as OperationSubItemModel, RoomType, SubItemType,
};
pub use sub_item_museum::{Entity as SubItemMuseum, Model as SubItemMuseumModel};
pub use vehicle_cost::{Entity as VehicleCost, Model as VehicleCostModel};
pub use vehicle_cost_history::{Entity as VehicleCostHistory, Model as VehicleCostHistoryModel};
pub use vehicle_type::{Entity as VehicleType, Model as VehicleTypeModel};
