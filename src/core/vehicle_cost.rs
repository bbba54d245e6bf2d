//! Vehicle costs - what a vehicle supplier charges per vehicle class, for a
//! single tour or a single transfer.

use crate::{
    core::ledger::{self, ColumnOf, LedgerEntry, PriceFields, PriceUpdate, PricedRecord, Quote},
    entities::{VehicleCost, vehicle_cost, vehicle_cost_history},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// What a vehicle cost is quoted for. Exactly one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleRoute {
    /// A tour by id
    Tour(i64),
    /// A transfer by id
    Transfer(i64),
}

impl VehicleRoute {
    /// Reads the route from the nullable column pair.
    ///
    /// # Errors
    /// [`Error::InvalidVehicleRoute`] when both or neither are set.
    pub fn from_columns(tour_id: Option<i64>, transfer_id: Option<i64>) -> Result<Self> {
        match (tour_id, transfer_id) {
            (Some(id), None) => Ok(Self::Tour(id)),
            (None, Some(id)) => Ok(Self::Transfer(id)),
            _ => Err(Error::InvalidVehicleRoute),
        }
    }

    /// Splits the route into `(tour_id, transfer_id)` column values.
    #[must_use]
    pub const fn into_columns(self) -> (Option<i64>, Option<i64>) {
        match self {
            Self::Tour(id) => (Some(id), None),
            Self::Transfer(id) => (None, Some(id)),
        }
    }
}

/// Vehicle classes a cost is quoted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleClass {
    /// Up to 3 passengers
    Car,
    /// Up to 7 passengers
    Minivan,
    /// Up to 16 passengers
    Minibus,
    /// Up to 27 passengers
    Midibus,
    /// Full-size coach
    Bus,
}

/// Cost per vehicle class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleRates {
    /// Cost of a car
    pub car: Decimal,
    /// Cost of a minivan
    pub minivan: Decimal,
    /// Cost of a minibus
    pub minibus: Decimal,
    /// Cost of a midibus
    pub midibus: Decimal,
    /// Cost of a bus
    pub bus: Decimal,
}

impl VehicleRates {
    /// Cost of one vehicle class.
    #[must_use]
    pub const fn for_class(&self, class: VehicleClass) -> Decimal {
        match class {
            VehicleClass::Car => self.car,
            VehicleClass::Minivan => self.minivan,
            VehicleClass::Minibus => self.minibus,
            VehicleClass::Midibus => self.midibus,
            VehicleClass::Bus => self.bus,
        }
    }
}

impl PriceFields for VehicleRates {
    fn amounts(&self) -> Vec<(&'static str, Decimal)> {
        vec![
            ("car_cost", self.car),
            ("minivan_cost", self.minivan),
            ("minibus_cost", self.minibus),
            ("midibus_cost", self.midibus),
            ("bus_cost", self.bus),
        ]
    }
}

impl LedgerEntry for vehicle_cost_history::Model {
    type Entity = vehicle_cost_history::Entity;
    type ActiveModel = vehicle_cost_history::ActiveModel;
    type Prices = VehicleRates;

    fn id_column() -> ColumnOf<Self::Entity> {
        vehicle_cost_history::Column::Id
    }

    fn owner_column() -> ColumnOf<Self::Entity> {
        vehicle_cost_history::Column::VehicleCostId
    }

    fn valid_from_column() -> ColumnOf<Self::Entity> {
        vehicle_cost_history::Column::ValidFrom
    }

    fn valid_until_column() -> ColumnOf<Self::Entity> {
        vehicle_cost_history::Column::ValidUntil
    }

    fn is_active_column() -> ColumnOf<Self::Entity> {
        vehicle_cost_history::Column::IsActive
    }

    fn open(
        owner_id: i64,
        quote: &Quote<VehicleRates>,
        valid_from: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Self::ActiveModel {
        let rates = &quote.prices;
        vehicle_cost_history::ActiveModel {
            vehicle_cost_id: Set(owner_id),
            currency_id: Set(quote.currency_id),
            valid_from: Set(valid_from),
            valid_until: Set(quote.valid_until),
            car_cost: Set(rates.car),
            minivan_cost: Set(rates.minivan),
            minibus_cost: Set(rates.minibus),
            midibus_cost: Set(rates.midibus),
            bus_cost: Set(rates.bus),
            created_at: Set(created_at),
            is_active: Set(true),
            ..Default::default()
        }
    }

    fn prices(&self) -> VehicleRates {
        VehicleRates {
            car: self.car_cost,
            minivan: self.minivan_cost,
            minibus: self.minibus_cost,
            midibus: self.midibus_cost,
            bus: self.bus_cost,
        }
    }

    fn currency_id(&self) -> i64 {
        self.currency_id
    }

    fn valid_from(&self) -> NaiveDate {
        self.valid_from
    }

    fn valid_until(&self) -> NaiveDate {
        self.valid_until
    }
}

impl PricedRecord for vehicle_cost::Model {
    type Entity = vehicle_cost::Entity;
    type ActiveModel = vehicle_cost::ActiveModel;
    type History = vehicle_cost_history::Model;

    const LABEL: &'static str = "vehicle cost";

    fn id_column() -> ColumnOf<Self::Entity> {
        vehicle_cost::Column::Id
    }

    fn is_active_column() -> ColumnOf<Self::Entity> {
        vehicle_cost::Column::IsActive
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn quote(&self) -> Quote<VehicleRates> {
        Quote::new(
            VehicleRates {
                car: self.car_cost,
                minivan: self.minivan_cost,
                minibus: self.minibus_cost,
                midibus: self.midibus_cost,
                bus: self.bus_cost,
            },
            self.currency_id,
            self.valid_until,
        )
    }

    fn apply_quote(
        active: &mut vehicle_cost::ActiveModel,
        quote: &Quote<VehicleRates>,
        now: NaiveDateTime,
    ) {
        let rates = &quote.prices;
        active.car_cost = Set(rates.car);
        active.minivan_cost = Set(rates.minivan);
        active.minibus_cost = Set(rates.minibus);
        active.midibus_cost = Set(rates.midibus);
        active.bus_cost = Set(rates.bus);
        active.currency_id = Set(quote.currency_id);
        active.valid_until = Set(quote.valid_until);
        active.updated_at = Set(now);
    }
}

impl vehicle_cost::Model {
    /// The tour or transfer this cost is quoted for.
    ///
    /// # Errors
    /// [`Error::InvalidVehicleRoute`] for a row that names both or neither.
    pub fn route(&self) -> Result<VehicleRoute> {
        VehicleRoute::from_columns(self.tour_id, self.transfer_id)
    }
}

/// Input for [`create_vehicle_cost`].
#[derive(Debug, Clone)]
pub struct NewVehicleCost {
    /// Owning tenant company
    pub company_id: i64,
    /// Vehicle supplier
    pub supplier_id: i64,
    /// Tour or transfer being priced
    pub route: VehicleRoute,
    /// Initial rates
    pub quote: Quote<VehicleRates>,
}

/// Creates a vehicle cost and opens its first rate window.
#[instrument(skip(db, new), fields(supplier_id = new.supplier_id, route = ?new.route))]
pub async fn create_vehicle_cost(
    db: &DatabaseConnection,
    new: NewVehicleCost,
    today: NaiveDate,
) -> Result<vehicle_cost::Model> {
    new.quote.validate(today)?;
    let (tour_id, transfer_id) = new.route.into_columns();
    let rates = new.quote.prices;

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;
    let cost = vehicle_cost::ActiveModel {
        company_id: Set(new.company_id),
        supplier_id: Set(new.supplier_id),
        tour_id: Set(tour_id),
        transfer_id: Set(transfer_id),
        car_cost: Set(rates.car),
        minivan_cost: Set(rates.minivan),
        minibus_cost: Set(rates.minibus),
        midibus_cost: Set(rates.midibus),
        bus_cost: Set(rates.bus),
        currency_id: Set(new.quote.currency_id),
        valid_until: Set(new.quote.valid_until),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    ledger::record_created(&txn, &cost, today).await?;
    txn.commit().await?;

    info!(id = cost.id, "Created vehicle cost");
    Ok(cost)
}

/// Looks a vehicle cost up by id.
pub async fn get_vehicle_cost(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<vehicle_cost::Model>> {
    VehicleCost::find_by_id(id).one(db).await.map_err(Into::into)
}

/// The active cost a supplier quotes for a route, if any.
pub async fn find_vehicle_cost(
    db: &DatabaseConnection,
    supplier_id: i64,
    route: VehicleRoute,
) -> Result<Option<vehicle_cost::Model>> {
    let query = VehicleCost::find()
        .filter(vehicle_cost::Column::SupplierId.eq(supplier_id))
        .filter(vehicle_cost::Column::IsActive.eq(true));
    let query = match route {
        VehicleRoute::Tour(id) => query.filter(vehicle_cost::Column::TourId.eq(id)),
        VehicleRoute::Transfer(id) => query.filter(vehicle_cost::Column::TransferId.eq(id)),
    };
    query.one(db).await.map_err(Into::into)
}

/// Changes the rates, currency or validity of a vehicle cost.
pub async fn update_vehicle_cost_prices(
    db: &DatabaseConnection,
    id: i64,
    quote: Quote<VehicleRates>,
    today: NaiveDate,
) -> Result<PriceUpdate<vehicle_cost::Model>> {
    ledger::update_quote(db, id, quote, today).await
}

/// The rate window in force on `date`, if any.
pub async fn vehicle_cost_price_on<C>(
    db: &C,
    id: i64,
    date: NaiveDate,
) -> Result<Option<vehicle_cost_history::Model>>
where
    C: ConnectionTrait,
{
    ledger::entry_effective_on(db, id, date).await
}

/// Every rate window of a vehicle cost, newest first.
pub async fn list_vehicle_cost_history(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Vec<vehicle_cost_history::Model>> {
    ledger::history(db, id).await
}

/// Hides a vehicle cost from lookups; its history is kept.
pub async fn deactivate_vehicle_cost(
    db: &DatabaseConnection,
    id: i64,
) -> Result<vehicle_cost::Model> {
    ledger::set_record_active(db, id, false).await
}

/// Deletes a vehicle cost with its rate history.
pub async fn delete_vehicle_cost(db: &DatabaseConnection, id: i64) -> Result<()> {
    ledger::delete_record::<vehicle_cost::Model>(db, id).await
}
