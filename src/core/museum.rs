//! Museum entrance fees, priced separately for local and foreign visitors.

use crate::{
    core::ledger::{self, ColumnOf, LedgerEntry, PriceFields, PriceUpdate, PricedRecord, Quote},
    entities::{Museum, museum, museum_price_history},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Entrance fees of a museum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntranceFees {
    /// Fee for residents
    pub local: Decimal,
    /// Fee for foreign visitors
    pub foreign: Decimal,
}

impl PriceFields for EntranceFees {
    fn amounts(&self) -> Vec<(&'static str, Decimal)> {
        vec![("local_price", self.local), ("foreign_price", self.foreign)]
    }
}

impl LedgerEntry for museum_price_history::Model {
    type Entity = museum_price_history::Entity;
    type ActiveModel = museum_price_history::ActiveModel;
    type Prices = EntranceFees;

    fn id_column() -> ColumnOf<Self::Entity> {
        museum_price_history::Column::Id
    }

    fn owner_column() -> ColumnOf<Self::Entity> {
        museum_price_history::Column::MuseumId
    }

    fn valid_from_column() -> ColumnOf<Self::Entity> {
        museum_price_history::Column::ValidFrom
    }

    fn valid_until_column() -> ColumnOf<Self::Entity> {
        museum_price_history::Column::ValidUntil
    }

    fn is_active_column() -> ColumnOf<Self::Entity> {
        museum_price_history::Column::IsActive
    }

    fn open(
        owner_id: i64,
        quote: &Quote<EntranceFees>,
        valid_from: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Self::ActiveModel {
        museum_price_history::ActiveModel {
            museum_id: Set(owner_id),
            currency_id: Set(quote.currency_id),
            valid_from: Set(valid_from),
            valid_until: Set(quote.valid_until),
            local_price: Set(quote.prices.local),
            foreign_price: Set(quote.prices.foreign),
            created_at: Set(created_at),
            is_active: Set(true),
            ..Default::default()
        }
    }

    fn prices(&self) -> EntranceFees {
        EntranceFees {
            local: self.local_price,
            foreign: self.foreign_price,
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

impl PricedRecord for museum::Model {
    type Entity = museum::Entity;
    type ActiveModel = museum::ActiveModel;
    type History = museum_price_history::Model;

    const LABEL: &'static str = "museum";

    fn id_column() -> ColumnOf<Self::Entity> {
        museum::Column::Id
    }

    fn is_active_column() -> ColumnOf<Self::Entity> {
        museum::Column::IsActive
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn quote(&self) -> Quote<EntranceFees> {
        Quote::new(
            EntranceFees {
                local: self.local_price,
                foreign: self.foreign_price,
            },
            self.currency_id,
            self.valid_until,
        )
    }

    fn apply_quote(
        active: &mut museum::ActiveModel,
        quote: &Quote<EntranceFees>,
        now: NaiveDateTime,
    ) {
        active.local_price = Set(quote.prices.local);
        active.foreign_price = Set(quote.prices.foreign);
        active.currency_id = Set(quote.currency_id);
        active.valid_until = Set(quote.valid_until);
        active.updated_at = Set(now);
    }
}

/// Input for [`create_museum`].
#[derive(Debug, Clone)]
pub struct NewMuseum {
    /// Owning tenant company
    pub company_id: i64,
    /// Museum name
    pub name: String,
    /// City the museum is in
    pub city_id: i64,
    /// Initial fees
    pub quote: Quote<EntranceFees>,
}

/// Creates a museum and opens its first fee window.
#[instrument(skip(db, new), fields(name = %new.name))]
pub async fn create_museum(
    db: &DatabaseConnection,
    new: NewMuseum,
    today: NaiveDate,
) -> Result<museum::Model> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput {
            message: "Museum name cannot be empty".to_string(),
        });
    }
    new.quote.validate(today)?;

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;
    let museum = museum::ActiveModel {
        company_id: Set(new.company_id),
        name: Set(name.to_string()),
        city_id: Set(new.city_id),
        local_price: Set(new.quote.prices.local),
        foreign_price: Set(new.quote.prices.foreign),
        currency_id: Set(new.quote.currency_id),
        valid_until: Set(new.quote.valid_until),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    ledger::record_created(&txn, &museum, today).await?;
    txn.commit().await?;

    info!(id = museum.id, "Created museum");
    Ok(museum)
}

/// Looks a museum up by id.
pub async fn get_museum_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<museum::Model>> {
    Museum::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Active museums of a city, ordered by name.
pub async fn list_museums_in_city(
    db: &DatabaseConnection,
    city_id: i64,
) -> Result<Vec<museum::Model>> {
    Museum::find()
        .filter(museum::Column::CityId.eq(city_id))
        .filter(museum::Column::IsActive.eq(true))
        .order_by_asc(museum::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes the fees, currency or validity of a museum.
pub async fn update_museum_prices(
    db: &DatabaseConnection,
    id: i64,
    quote: Quote<EntranceFees>,
    today: NaiveDate,
) -> Result<PriceUpdate<museum::Model>> {
    ledger::update_quote(db, id, quote, today).await
}

/// The fee window in force on `date`, if any.
pub async fn museum_price_on<C>(
    db: &C,
    id: i64,
    date: NaiveDate,
) -> Result<Option<museum_price_history::Model>>
where
    C: ConnectionTrait,
{
    ledger::entry_effective_on(db, id, date).await
}

/// Every fee window of a museum, newest first.
pub async fn list_museum_price_history(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Vec<museum_price_history::Model>> {
    ledger::history(db, id).await
}

/// Hides a museum from listings; its history is kept.
pub async fn deactivate_museum(db: &DatabaseConnection, id: i64) -> Result<museum::Model> {
    ledger::set_record_active(db, id, false).await
}

/// Deletes a museum with its fee history.
pub async fn delete_museum(db: &DatabaseConnection, id: i64) -> Result<()> {
    ledger::delete_record::<museum::Model>(db, id).await
}
