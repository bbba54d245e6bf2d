//! Operation items and sub-items.
//!
//! An item is a bookable line on one operation day: a vehicle, a tour without
//! a vehicle, or an activity without a vehicle. Its sub-items break it down
//! into tours, transfers, activities, museums, hotels, guides and other
//! prices. Which references an item carries, and which sub-items it may
//! hold, depends on its type:
//!
//! | Item                  | Requires          | Sub-items allowed                                       |
//! |-----------------------|-------------------|---------------------------------------------------------|
//! | `VEHICLE`             | vehicle type      | TOUR, TRANSFER, ACTIVITY, MUSEUM, HOTEL, GUIDE, OTHER_PRICE |
//! | `NO_VEHICLE_TOUR`     | tour              | MUSEUM, ACTIVITY, HOTEL, GUIDE, OTHER_PRICE             |
//! | `NO_VEHICLE_ACTIVITY` | activity          | ACTIVITY, GUIDE, OTHER_PRICE                            |
//!
//! Rows are stored flat; [`ItemKind`] and [`SubItemKind`] are the checked
//! forms the rest of the code works with.
//!
//! Prices on items are booking-time snapshots. When an activity or hotel line
//! is added without an explicit cost, the cost is copied from the price
//! window in force on the item's day and never follows later price changes.

use crate::{
    core::{activity_cost, hotel, ledger::LedgerEntry},
    entities::{
        ItemType, OperationDay, OperationItem, OperationSubItem, RoomType, SubItemMuseum,
        SubItemType, operation_day, operation_item, operation_sub_item, sub_item_museum,
    },
    errors::{Error, Result},
};
use chrono::{NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

impl ItemType {
    /// Whether a sub-item of type `subitem` may be placed below an item of
    /// this type.
    #[must_use]
    pub const fn permits(self, subitem: SubItemType) -> bool {
        use SubItemType as S;
        match self {
            Self::Vehicle => true,
            Self::NoVehicleTour => matches!(
                subitem,
                S::Museum | S::Activity | S::Hotel | S::Guide | S::OtherPrice
            ),
            Self::NoVehicleActivity => matches!(subitem, S::Activity | S::Guide | S::OtherPrice),
        }
    }
}

/// An amount in a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Money {
    /// Amount in `currency_id`
    pub amount: Decimal,
    /// Currency of the amount
    pub currency_id: i64,
}

impl Money {
    fn from_columns(amount: Option<Decimal>, currency_id: Option<i64>) -> Option<Self> {
        Some(Self {
            amount: amount?,
            currency_id: currency_id?,
        })
    }
}

/// Sales and cost price of an item or sub-item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pricing {
    /// What the buyer is charged
    pub sales: Option<Money>,
    /// What the supplier charges; filled from the price ledger when left empty
    pub cost: Option<Money>,
}

impl Pricing {
    fn validate(&self) -> Result<()> {
        for (field, money) in [("sales_price", self.sales), ("cost_price", self.cost)] {
            match money {
                Some(money) if money.amount < Decimal::ZERO => {
                    return Err(Error::NegativeAmount {
                        field,
                        amount: money.amount,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Driver and plate of a vehicle item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverDetails {
    /// Driver's name
    pub name: Option<String>,
    /// Driver's phone number
    pub phone: Option<String>,
    /// Plate number of the vehicle
    pub plate_no: Option<String>,
}

/// What an item books. Each variant carries only the references its type uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// A vehicle with driver
    Vehicle {
        /// Vehicle type booked
        vehicle_type_id: i64,
        /// Supplier providing the vehicle
        supplier_id: Option<i64>,
        /// Vehicle cost the item is priced from
        vehicle_cost_id: Option<i64>,
        /// Driver and plate, once known
        driver: DriverDetails,
    },
    /// A tour without a vehicle
    NoVehicleTour {
        /// Tour booked
        tour_id: i64,
    },
    /// An activity without a vehicle
    NoVehicleActivity {
        /// Activity booked
        activity_id: i64,
        /// Supplier running the activity
        supplier_id: Option<i64>,
        /// Activity cost the item is priced from
        activity_cost_id: Option<i64>,
    },
}

impl ItemKind {
    /// The stored type of this kind.
    #[must_use]
    pub const fn item_type(&self) -> ItemType {
        match self {
            Self::Vehicle { .. } => ItemType::Vehicle,
            Self::NoVehicleTour { .. } => ItemType::NoVehicleTour,
            Self::NoVehicleActivity { .. } => ItemType::NoVehicleActivity,
        }
    }

    /// Decodes a stored item row.
    ///
    /// # Errors
    /// The same errors as converting an [`ItemDraft`].
    pub fn from_row(row: &operation_item::Model) -> Result<Self> {
        Self::try_from(ItemDraft::from(row))
    }
}

/// Flat item references as they arrive from a form or a row.
///
/// Convert into [`ItemKind`] with `try_from`, which checks that the type's
/// required reference is present and that no foreign references are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    /// Requested item type
    pub item_type: ItemType,
    /// Required for `VEHICLE`
    pub vehicle_type_id: Option<i64>,
    /// Vehicle items only
    pub vehicle_supplier_id: Option<i64>,
    /// Vehicle items only
    pub vehicle_cost_id: Option<i64>,
    /// Vehicle items only
    pub driver_name: Option<String>,
    /// Vehicle items only
    pub driver_phone: Option<String>,
    /// Vehicle items only
    pub vehicle_plate_no: Option<String>,
    /// Required for `NO_VEHICLE_TOUR`
    pub no_vehicle_tour_id: Option<i64>,
    /// Required for `NO_VEHICLE_ACTIVITY`
    pub no_vehicle_activity_id: Option<i64>,
    /// Activity items only
    pub activity_supplier_id: Option<i64>,
    /// Activity items only
    pub activity_cost_id: Option<i64>,
}

impl ItemDraft {
    /// An empty draft of the given type.
    #[must_use]
    pub const fn new(item_type: ItemType) -> Self {
        Self {
            item_type,
            vehicle_type_id: None,
            vehicle_supplier_id: None,
            vehicle_cost_id: None,
            driver_name: None,
            driver_phone: None,
            vehicle_plate_no: None,
            no_vehicle_tour_id: None,
            no_vehicle_activity_id: None,
            activity_supplier_id: None,
            activity_cost_id: None,
        }
    }

    fn require(&self, field: &'static str, value: Option<i64>) -> Result<i64> {
        value.ok_or(Error::MissingItemField {
            item_type: self.item_type,
            field,
        })
    }

    fn forbid(&self, fields: &[(&'static str, bool)]) -> Result<()> {
        match fields.iter().find(|(_, set)| *set) {
            Some((field, _)) => Err(Error::InvalidInput {
                message: format!("{} items cannot set `{field}`", self.item_type),
            }),
            None => Ok(()),
        }
    }

    fn vehicle_fields(&self) -> [(&'static str, bool); 6] {
        [
            ("vehicle_type_id", self.vehicle_type_id.is_some()),
            ("vehicle_supplier_id", self.vehicle_supplier_id.is_some()),
            ("vehicle_cost_id", self.vehicle_cost_id.is_some()),
            ("driver_name", self.driver_name.is_some()),
            ("driver_phone", self.driver_phone.is_some()),
            ("vehicle_plate_no", self.vehicle_plate_no.is_some()),
        ]
    }

    fn activity_fields(&self) -> [(&'static str, bool); 3] {
        [
            ("no_vehicle_activity_id", self.no_vehicle_activity_id.is_some()),
            ("activity_supplier_id", self.activity_supplier_id.is_some()),
            ("activity_cost_id", self.activity_cost_id.is_some()),
        ]
    }
}

impl TryFrom<ItemDraft> for ItemKind {
    type Error = Error;

    fn try_from(draft: ItemDraft) -> Result<Self> {
        let tour_field = [("no_vehicle_tour_id", draft.no_vehicle_tour_id.is_some())];
        match draft.item_type {
            ItemType::Vehicle => {
                let vehicle_type_id = draft.require("vehicle_type_id", draft.vehicle_type_id)?;
                draft.forbid(&tour_field)?;
                draft.forbid(&draft.activity_fields())?;
                Ok(Self::Vehicle {
                    vehicle_type_id,
                    supplier_id: draft.vehicle_supplier_id,
                    vehicle_cost_id: draft.vehicle_cost_id,
                    driver: DriverDetails {
                        name: draft.driver_name,
                        phone: draft.driver_phone,
                        plate_no: draft.vehicle_plate_no,
                    },
                })
            }
            ItemType::NoVehicleTour => {
                let tour_id = draft.require("no_vehicle_tour_id", draft.no_vehicle_tour_id)?;
                draft.forbid(&draft.vehicle_fields())?;
                draft.forbid(&draft.activity_fields())?;
                Ok(Self::NoVehicleTour { tour_id })
            }
            ItemType::NoVehicleActivity => {
                let activity_id =
                    draft.require("no_vehicle_activity_id", draft.no_vehicle_activity_id)?;
                draft.forbid(&draft.vehicle_fields())?;
                draft.forbid(&tour_field)?;
                Ok(Self::NoVehicleActivity {
                    activity_id,
                    supplier_id: draft.activity_supplier_id,
                    activity_cost_id: draft.activity_cost_id,
                })
            }
        }
    }
}

impl From<&operation_item::Model> for ItemDraft {
    fn from(row: &operation_item::Model) -> Self {
        Self {
            item_type: row.item_type,
            vehicle_type_id: row.vehicle_type_id,
            vehicle_supplier_id: row.vehicle_supplier_id,
            vehicle_cost_id: row.vehicle_cost_id,
            driver_name: row.driver_name.clone(),
            driver_phone: row.driver_phone.clone(),
            vehicle_plate_no: row.vehicle_plate_no.clone(),
            no_vehicle_tour_id: row.no_vehicle_tour_id,
            no_vehicle_activity_id: row.no_vehicle_activity_id,
            activity_supplier_id: row.activity_supplier_id,
            activity_cost_id: row.activity_cost_id,
        }
    }
}

/// What a sub-item stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubItemKind {
    /// A tour
    Tour {
        /// Tour served
        tour_id: i64,
    },
    /// A transfer
    Transfer {
        /// Transfer served
        transfer_id: i64,
    },
    /// An activity
    Activity {
        /// Activity booked
        activity_id: i64,
        /// Supplier running the activity
        supplier_id: Option<i64>,
        /// Activity cost the cost snapshot is taken from
        activity_cost_id: Option<i64>,
    },
    /// One or more museums visited as a single line
    Museum {
        /// Museums visited; never empty
        museum_ids: Vec<i64>,
    },
    /// A hotel room
    Hotel {
        /// Hotel booked
        hotel_id: i64,
        /// Room occupancy, selects the rate
        room_type: RoomType,
    },
    /// A guide, possibly not yet assigned
    Guide {
        /// Assigned guide
        guide_id: Option<i64>,
    },
    /// Any other priced extra
    OtherPrice {
        /// What is charged for; never blank
        description: String,
    },
}

impl SubItemKind {
    /// The stored type of this kind.
    #[must_use]
    pub const fn subitem_type(&self) -> SubItemType {
        match self {
            Self::Tour { .. } => SubItemType::Tour,
            Self::Transfer { .. } => SubItemType::Transfer,
            Self::Activity { .. } => SubItemType::Activity,
            Self::Museum { .. } => SubItemType::Museum,
            Self::Hotel { .. } => SubItemType::Hotel,
            Self::Guide { .. } => SubItemType::Guide,
            Self::OtherPrice { .. } => SubItemType::OtherPrice,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Museum { museum_ids } if museum_ids.is_empty() => Err(Error::InvalidInput {
                message: "Museum sub-items need at least one museum".to_string(),
            }),
            Self::OtherPrice { description } if description.trim().is_empty() => {
                Err(Error::InvalidInput {
                    message: "Other price sub-items need a description".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Decodes a stored sub-item row with its museum links.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] when the row lacks the reference its type needs.
    pub fn from_row(row: &operation_sub_item::Model, museum_ids: Vec<i64>) -> Result<Self> {
        let missing = |field: &str| Error::InvalidInput {
            message: format!(
                "{} sub-item {} has no `{field}`",
                row.subitem_type, row.id
            ),
        };
        let kind = match row.subitem_type {
            SubItemType::Tour => Self::Tour {
                tour_id: row.tour_id.ok_or_else(|| missing("tour_id"))?,
            },
            SubItemType::Transfer => Self::Transfer {
                transfer_id: row.transfer_id.ok_or_else(|| missing("transfer_id"))?,
            },
            SubItemType::Activity => Self::Activity {
                activity_id: row.activity_id.ok_or_else(|| missing("activity_id"))?,
                supplier_id: row.activity_supplier_id,
                activity_cost_id: row.activity_cost_id,
            },
            SubItemType::Museum => Self::Museum { museum_ids },
            SubItemType::Hotel => Self::Hotel {
                hotel_id: row.hotel_id.ok_or_else(|| missing("hotel_id"))?,
                room_type: row.room_type.ok_or_else(|| missing("room_type"))?,
            },
            SubItemType::Guide => Self::Guide {
                guide_id: row.guide_id,
            },
            SubItemType::OtherPrice => Self::OtherPrice {
                description: row
                    .other_price_description
                    .clone()
                    .ok_or_else(|| missing("other_price_description"))?,
            },
        };
        kind.validate()?;
        Ok(kind)
    }
}

/// Input for [`add_item`].
#[derive(Debug, Clone)]
pub struct NewItem {
    /// What is booked
    pub kind: ItemKind,
    /// Pick-up time
    pub pick_time: Option<NaiveTime>,
    /// Where the group is picked up
    pub pick_up_location: Option<String>,
    /// Where the group is dropped off
    pub drop_off_location: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Sales and cost price; a missing cost may be snapshotted
    pub pricing: Pricing,
}

impl NewItem {
    /// An item of `kind` with no schedule, notes or prices.
    #[must_use]
    pub const fn of(kind: ItemKind) -> Self {
        Self {
            kind,
            pick_time: None,
            pick_up_location: None,
            drop_off_location: None,
            notes: None,
            pricing: Pricing {
                sales: None,
                cost: None,
            },
        }
    }
}

/// Input for [`add_sub_item`].
#[derive(Debug, Clone)]
pub struct NewSubItem {
    /// What the sub-item stands for
    pub kind: SubItemKind,
    /// Position below the item; appended last when `None`
    pub ordering: Option<i32>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Sales and cost price; a missing cost may be snapshotted
    pub pricing: Pricing,
}

impl NewSubItem {
    /// A sub-item of `kind` appended last, with no notes or prices.
    #[must_use]
    pub const fn of(kind: SubItemKind) -> Self {
        Self {
            kind,
            ordering: None,
            notes: None,
            pricing: Pricing {
                sales: None,
                cost: None,
            },
        }
    }
}

async fn load_day(txn: &DatabaseTransaction, id: i64) -> Result<operation_day::Model> {
    OperationDay::find_by_id(id)
        .one(txn)
        .await?
        .ok_or_else(|| Error::not_found("operation day", id))
}

async fn load_item(txn: &DatabaseTransaction, id: i64) -> Result<operation_item::Model> {
    OperationItem::find_by_id(id)
        .one(txn)
        .await?
        .ok_or_else(|| Error::not_found("operation item", id))
}

/// Cost of an activity on `day` from its price ledger.
async fn activity_cost_snapshot(
    txn: &DatabaseTransaction,
    activity_cost_id: i64,
    day: &operation_day::Model,
) -> Result<Option<Money>> {
    let entry = activity_cost::activity_cost_price_on(txn, activity_cost_id, day.date).await?;
    Ok(entry.map(|e| Money {
        amount: e.prices().price,
        currency_id: e.currency_id,
    }))
}

/// Fills in a missing cost from the price ledger where the kind allows it.
async fn snapshot_sub_item_cost(
    txn: &DatabaseTransaction,
    kind: &SubItemKind,
    day: &operation_day::Model,
) -> Result<Option<Money>> {
    match kind {
        SubItemKind::Activity {
            activity_cost_id: Some(id),
            ..
        } => activity_cost_snapshot(txn, *id, day).await,
        SubItemKind::Hotel {
            hotel_id,
            room_type,
        } => {
            let entry = hotel::hotel_price_on(txn, *hotel_id, day.date).await?;
            Ok(entry.map(|e| Money {
                amount: e.prices().for_room(*room_type),
                currency_id: e.currency_id,
            }))
        }
        _ => Ok(None),
    }
}

/// Books an item on an operation day.
///
/// # Errors
/// [`Error::NotFound`] for an unknown day, [`Error::NegativeAmount`] for a
/// negative price, or a database error.
#[instrument(skip(db, new), fields(item_type = %new.kind.item_type()))]
pub async fn add_item(
    db: &DatabaseConnection,
    operation_day_id: i64,
    new: NewItem,
) -> Result<operation_item::Model> {
    new.pricing.validate()?;

    let txn = db.begin().await?;
    let day = load_day(&txn, operation_day_id).await?;

    let cost = match (new.pricing.cost, &new.kind) {
        (
            None,
            ItemKind::NoVehicleActivity {
                activity_cost_id: Some(id),
                ..
            },
        ) => {
            let snapshot = activity_cost_snapshot(&txn, *id, &day).await?;
            debug!(activity_cost_id = id, ?snapshot, "Snapshotted activity cost");
            snapshot
        }
        (cost, _) => cost,
    };

    let now = Utc::now().naive_utc();
    let mut row = operation_item::ActiveModel {
        operation_day_id: Set(day.id),
        item_type: Set(new.kind.item_type()),
        pick_time: Set(new.pick_time),
        pick_up_location: Set(new.pick_up_location),
        drop_off_location: Set(new.drop_off_location),
        vehicle_type_id: Set(None),
        vehicle_supplier_id: Set(None),
        vehicle_cost_id: Set(None),
        driver_name: Set(None),
        driver_phone: Set(None),
        vehicle_plate_no: Set(None),
        no_vehicle_tour_id: Set(None),
        no_vehicle_activity_id: Set(None),
        activity_supplier_id: Set(None),
        activity_cost_id: Set(None),
        notes: Set(new.notes),
        sales_price: Set(new.pricing.sales.map(|m| m.amount)),
        sales_currency_id: Set(new.pricing.sales.map(|m| m.currency_id)),
        cost_price: Set(cost.map(|m| m.amount)),
        cost_currency_id: Set(cost.map(|m| m.currency_id)),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
        ..Default::default()
    };
    match new.kind {
        ItemKind::Vehicle {
            vehicle_type_id,
            supplier_id,
            vehicle_cost_id,
            driver,
        } => {
            row.vehicle_type_id = Set(Some(vehicle_type_id));
            row.vehicle_supplier_id = Set(supplier_id);
            row.vehicle_cost_id = Set(vehicle_cost_id);
            row.driver_name = Set(driver.name);
            row.driver_phone = Set(driver.phone);
            row.vehicle_plate_no = Set(driver.plate_no);
        }
        ItemKind::NoVehicleTour { tour_id } => {
            row.no_vehicle_tour_id = Set(Some(tour_id));
        }
        ItemKind::NoVehicleActivity {
            activity_id,
            supplier_id,
            activity_cost_id,
        } => {
            row.no_vehicle_activity_id = Set(Some(activity_id));
            row.activity_supplier_id = Set(supplier_id);
            row.activity_cost_id = Set(activity_cost_id);
        }
    }
    let item = row.insert(&txn).await?;
    txn.commit().await?;

    info!(id = item.id, operation_day_id, "Added item");
    Ok(item)
}

/// Adds a sub-item below an item.
///
/// # Errors
/// [`Error::SubItemNotPermitted`] when the item type does not allow the
/// sub-item type, [`Error::InvalidInput`] for an incomplete kind,
/// [`Error::NotFound`] for an unknown item.
#[instrument(skip(db, new), fields(subitem_type = %new.kind.subitem_type()))]
pub async fn add_sub_item(
    db: &DatabaseConnection,
    operation_item_id: i64,
    new: NewSubItem,
) -> Result<operation_sub_item::Model> {
    new.kind.validate()?;
    new.pricing.validate()?;

    let txn = db.begin().await?;
    let item = load_item(&txn, operation_item_id).await?;
    let subitem_type = new.kind.subitem_type();
    if !item.item_type.permits(subitem_type) {
        return Err(Error::SubItemNotPermitted {
            item_type: item.item_type,
            subitem_type,
        });
    }
    let day = load_day(&txn, item.operation_day_id).await?;

    let cost = match new.pricing.cost {
        Some(cost) => Some(cost),
        None => snapshot_sub_item_cost(&txn, &new.kind, &day).await?,
    };
    let ordering = match new.ordering {
        Some(ordering) => ordering,
        None => {
            let existing = OperationSubItem::find()
                .filter(operation_sub_item::Column::OperationItemId.eq(item.id))
                .count(&txn)
                .await?;
            i32::try_from(existing).map_err(|_| Error::InvalidInput {
                message: format!("Item {} has too many sub-items", item.id),
            })?
        }
    };

    let now = Utc::now().naive_utc();
    let mut row = operation_sub_item::ActiveModel {
        operation_item_id: Set(item.id),
        ordering: Set(ordering),
        subitem_type: Set(subitem_type),
        tour_id: Set(None),
        transfer_id: Set(None),
        hotel_id: Set(None),
        room_type: Set(None),
        is_guide: Set(false),
        guide_id: Set(None),
        activity_id: Set(None),
        activity_supplier_id: Set(None),
        activity_cost_id: Set(None),
        other_price_description: Set(None),
        notes: Set(new.notes),
        sales_price: Set(new.pricing.sales.map(|m| m.amount)),
        sales_currency_id: Set(new.pricing.sales.map(|m| m.currency_id)),
        cost_price: Set(cost.map(|m| m.amount)),
        cost_currency_id: Set(cost.map(|m| m.currency_id)),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
        ..Default::default()
    };
    let mut museum_ids = Vec::new();
    match new.kind {
        SubItemKind::Tour { tour_id } => row.tour_id = Set(Some(tour_id)),
        SubItemKind::Transfer { transfer_id } => row.transfer_id = Set(Some(transfer_id)),
        SubItemKind::Activity {
            activity_id,
            supplier_id,
            activity_cost_id,
        } => {
            row.activity_id = Set(Some(activity_id));
            row.activity_supplier_id = Set(supplier_id);
            row.activity_cost_id = Set(activity_cost_id);
        }
        SubItemKind::Museum { museum_ids: ids } => museum_ids = ids,
        SubItemKind::Hotel {
            hotel_id,
            room_type,
        } => {
            row.hotel_id = Set(Some(hotel_id));
            row.room_type = Set(Some(room_type));
        }
        SubItemKind::Guide { guide_id } => {
            row.is_guide = Set(true);
            row.guide_id = Set(guide_id);
        }
        SubItemKind::OtherPrice { description } => {
            row.other_price_description = Set(Some(description.trim().to_string()));
        }
    }
    let sub_item = row.insert(&txn).await?;

    if !museum_ids.is_empty() {
        let links = museum_ids.into_iter().map(|museum_id| sub_item_museum::ActiveModel {
            sub_item_id: Set(sub_item.id),
            museum_id: Set(museum_id),
            ..Default::default()
        });
        SubItemMuseum::insert_many(links).exec(&txn).await?;
    }
    txn.commit().await?;

    info!(id = sub_item.id, operation_item_id, "Added sub-item");
    Ok(sub_item)
}

/// Items of a day ordered by pick-up time.
pub async fn list_items(
    db: &DatabaseConnection,
    operation_day_id: i64,
) -> Result<Vec<operation_item::Model>> {
    OperationItem::find()
        .filter(operation_item::Column::OperationDayId.eq(operation_day_id))
        .order_by_asc(operation_item::Column::PickTime)
        .order_by_asc(operation_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sub-items of an item in display order.
pub async fn list_sub_items(
    db: &DatabaseConnection,
    operation_item_id: i64,
) -> Result<Vec<operation_sub_item::Model>> {
    OperationSubItem::find()
        .filter(operation_sub_item::Column::OperationItemId.eq(operation_item_id))
        .order_by_asc(operation_sub_item::Column::Ordering)
        .order_by_asc(operation_sub_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Museums linked to a museum sub-item.
pub async fn sub_item_museums(db: &DatabaseConnection, sub_item_id: i64) -> Result<Vec<i64>> {
    let links = SubItemMuseum::find()
        .filter(sub_item_museum::Column::SubItemId.eq(sub_item_id))
        .order_by_asc(sub_item_museum::Column::Id)
        .all(db)
        .await?;
    Ok(links.into_iter().map(|l| l.museum_id).collect())
}

/// Loads a sub-item and decodes it.
pub async fn get_sub_item_kind(db: &DatabaseConnection, id: i64) -> Result<SubItemKind> {
    let row = OperationSubItem::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("operation sub-item", id))?;
    let museum_ids = sub_item_museums(db, id).await?;
    SubItemKind::from_row(&row, museum_ids)
}

/// Snapshotted cost of an item.
#[must_use]
pub fn item_cost(item: &operation_item::Model) -> Option<Money> {
    Money::from_columns(item.cost_price, item.cost_currency_id)
}

/// Snapshotted cost of a sub-item.
#[must_use]
pub fn sub_item_cost(sub_item: &operation_sub_item::Model) -> Option<Money> {
    Money::from_columns(sub_item.cost_price, sub_item.cost_currency_id)
}

/// Marks an item inactive. Its sub-items are left as they are.
pub async fn deactivate_item(db: &DatabaseConnection, id: i64) -> Result<operation_item::Model> {
    let item = OperationItem::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("operation item", id))?;
    let mut active: operation_item::ActiveModel = item.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

/// Deletes an item with its sub-items.
pub async fn delete_item(db: &DatabaseConnection, id: i64) -> Result<()> {
    let txn = db.begin().await?;
    load_item(&txn, id).await?;
    let sub_item_ids: Vec<i64> = OperationSubItem::find()
        .filter(operation_sub_item::Column::OperationItemId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();
    if !sub_item_ids.is_empty() {
        SubItemMuseum::delete_many()
            .filter(sub_item_museum::Column::SubItemId.is_in(sub_item_ids.clone()))
            .exec(&txn)
            .await?;
        OperationSubItem::delete_many()
            .filter(operation_sub_item::Column::Id.is_in(sub_item_ids))
            .exec(&txn)
            .await?;
    }
    OperationItem::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

/// Deletes a single sub-item with its museum links.
pub async fn delete_sub_item(db: &DatabaseConnection, id: i64) -> Result<()> {
    let txn = db.begin().await?;
    SubItemMuseum::delete_many()
        .filter(sub_item_museum::Column::SubItemId.eq(id))
        .exec(&txn)
        .await?;
    let deleted = OperationSubItem::delete_by_id(id).exec(&txn).await?;
    if deleted.rows_affected == 0 {
        return Err(Error::not_found("operation sub-item", id));
    }
    txn.commit().await?;
    Ok(())
}
