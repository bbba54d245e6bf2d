//! Hotel business logic - room rates per night with a full price history.
//!
//! Rates are quoted for single, double and family (triple) rooms in one
//! currency. Rate changes go through [`update_hotel_prices`] so bookings can
//! always be costed at the rate that applied on the night of the stay.

use crate::{
    core::ledger::{self, ColumnOf, LedgerEntry, PriceFields, PriceUpdate, PricedRecord, Quote},
    entities::{Hotel, RoomType, hotel, hotel_price_history},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Room rates of a hotel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotelRates {
    /// Single room
    pub single: Decimal,
    /// Double room
    pub double: Decimal,
    /// Family room
    pub triple: Decimal,
}

impl HotelRates {
    /// Rate for one room type.
    #[must_use]
    pub const fn for_room(&self, room_type: RoomType) -> Decimal {
        match room_type {
            RoomType::Single => self.single,
            RoomType::Double => self.double,
            RoomType::Triple => self.triple,
        }
    }
}

impl PriceFields for HotelRates {
    fn amounts(&self) -> Vec<(&'static str, Decimal)> {
        vec![
            ("single_price", self.single),
            ("double_price", self.double),
            ("triple_price", self.triple),
        ]
    }
}

impl LedgerEntry for hotel_price_history::Model {
    type Entity = hotel_price_history::Entity;
    type ActiveModel = hotel_price_history::ActiveModel;
    type Prices = HotelRates;

    fn id_column() -> ColumnOf<Self::Entity> {
        hotel_price_history::Column::Id
    }

    fn owner_column() -> ColumnOf<Self::Entity> {
        hotel_price_history::Column::HotelId
    }

    fn valid_from_column() -> ColumnOf<Self::Entity> {
        hotel_price_history::Column::ValidFrom
    }

    fn valid_until_column() -> ColumnOf<Self::Entity> {
        hotel_price_history::Column::ValidUntil
    }

    fn is_active_column() -> ColumnOf<Self::Entity> {
        hotel_price_history::Column::IsActive
    }

    fn open(
        owner_id: i64,
        quote: &Quote<HotelRates>,
        valid_from: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Self::ActiveModel {
        hotel_price_history::ActiveModel {
            hotel_id: Set(owner_id),
            currency_id: Set(quote.currency_id),
            valid_from: Set(valid_from),
            valid_until: Set(quote.valid_until),
            single_price: Set(quote.prices.single),
            double_price: Set(quote.prices.double),
            triple_price: Set(quote.prices.triple),
            created_at: Set(created_at),
            is_active: Set(true),
            ..Default::default()
        }
    }

    fn prices(&self) -> HotelRates {
        HotelRates {
            single: self.single_price,
            double: self.double_price,
            triple: self.triple_price,
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

impl PricedRecord for hotel::Model {
    type Entity = hotel::Entity;
    type ActiveModel = hotel::ActiveModel;
    type History = hotel_price_history::Model;

    const LABEL: &'static str = "hotel";

    fn id_column() -> ColumnOf<Self::Entity> {
        hotel::Column::Id
    }

    fn is_active_column() -> ColumnOf<Self::Entity> {
        hotel::Column::IsActive
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn quote(&self) -> Quote<HotelRates> {
        Quote::new(
            HotelRates {
                single: self.single_price,
                double: self.double_price,
                triple: self.triple_price,
            },
            self.currency_id,
            self.valid_until,
        )
    }

    fn apply_quote(active: &mut hotel::ActiveModel, quote: &Quote<HotelRates>, now: NaiveDateTime) {
        active.single_price = Set(quote.prices.single);
        active.double_price = Set(quote.prices.double);
        active.triple_price = Set(quote.prices.triple);
        active.currency_id = Set(quote.currency_id);
        active.valid_until = Set(quote.valid_until);
        active.updated_at = Set(now);
    }
}

/// Input for [`create_hotel`].
#[derive(Debug, Clone)]
pub struct NewHotel {
    /// Owning tenant company
    pub company_id: i64,
    /// Hotel name
    pub name: String,
    /// City the hotel is in
    pub city_id: i64,
    /// Initial rates
    pub quote: Quote<HotelRates>,
}

/// Creates a hotel and opens its first rate window starting today.
///
/// # Errors
/// Returns an error if the name is blank, the quote is invalid or the
/// database rejects the insert. Nothing is persisted on error.
#[instrument(skip(db, new), fields(name = %new.name))]
pub async fn create_hotel(
    db: &DatabaseConnection,
    new: NewHotel,
    today: NaiveDate,
) -> Result<hotel::Model> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput {
            message: "Hotel name cannot be empty".to_string(),
        });
    }
    new.quote.validate(today)?;

    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;
    let hotel = hotel::ActiveModel {
        company_id: Set(new.company_id),
        name: Set(name.to_string()),
        city_id: Set(new.city_id),
        single_price: Set(new.quote.prices.single),
        double_price: Set(new.quote.prices.double),
        triple_price: Set(new.quote.prices.triple),
        currency_id: Set(new.quote.currency_id),
        valid_until: Set(new.quote.valid_until),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    ledger::record_created(&txn, &hotel, today).await?;
    txn.commit().await?;

    info!(id = hotel.id, "Created hotel");
    Ok(hotel)
}

/// Retrieves a hotel by id.
pub async fn get_hotel_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<hotel::Model>> {
    Hotel::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Active hotels of a city, ordered by name.
pub async fn list_hotels_in_city(
    db: &DatabaseConnection,
    city_id: i64,
) -> Result<Vec<hotel::Model>> {
    Hotel::find()
        .filter(hotel::Column::CityId.eq(city_id))
        .filter(hotel::Column::IsActive.eq(true))
        .order_by_asc(hotel::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Renames a hotel or moves it to another city. Rates are not touched.
pub async fn update_hotel_details(
    db: &DatabaseConnection,
    id: i64,
    name: &str,
    city_id: i64,
) -> Result<hotel::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput {
            message: "Hotel name cannot be empty".to_string(),
        });
    }
    let hotel = Hotel::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("hotel", id))?;

    let mut active: hotel::ActiveModel = hotel.into();
    active.name = Set(name.to_string());
    active.city_id = Set(city_id);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

/// Changes the rates, currency or validity of a hotel.
///
/// If any rate or the currency changed, every open window is closed at
/// `today` and a new one opened `[today, valid_until]`.
pub async fn update_hotel_prices(
    db: &DatabaseConnection,
    id: i64,
    quote: Quote<HotelRates>,
    today: NaiveDate,
) -> Result<PriceUpdate<hotel::Model>> {
    ledger::update_quote(db, id, quote, today).await
}

/// The rate window in force on `date`, if any.
pub async fn hotel_price_on<C>(
    db: &C,
    id: i64,
    date: NaiveDate,
) -> Result<Option<hotel_price_history::Model>>
where
    C: ConnectionTrait,
{
    ledger::entry_effective_on(db, id, date).await
}

/// Full rate history of a hotel, newest window first.
pub async fn list_hotel_price_history(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Vec<hotel_price_history::Model>> {
    ledger::history(db, id).await
}

/// Soft-deletes a hotel.
pub async fn deactivate_hotel(db: &DatabaseConnection, id: i64) -> Result<hotel::Model> {
    ledger::set_record_active(db, id, false).await
}

/// Deletes a hotel with its rate history.
pub async fn delete_hotel(db: &DatabaseConnection, id: i64) -> Result<()> {
    ledger::delete_record::<hotel::Model>(db, id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::ledger::Revision, entities::HotelPriceHistory, test_utils::*};
    use rust_decimal_macros::dec;

    fn rates(single: Decimal) -> HotelRates {
        HotelRates {
            single,
            double: dec!(150),
            triple: dec!(200),
        }
    }

    #[tokio::test]
    async fn test_create_hotel_opens_first_window() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let hotel = create_test_hotel(&db, eur.id, dec!(100), date(2025, 1, 1)).await?;

        let history = list_hotel_price_history(&db, hotel.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].valid_from, date(2025, 1, 1));
        assert_eq!(history[0].valid_until, date(2025, 12, 31));
        assert_eq!(history[0].single_price, dec!(100));
        assert!(history[0].is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_price_change_closes_and_opens_window() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let hotel = create_test_hotel(&db, eur.id, dec!(100), date(2025, 1, 1)).await?;

        let change_day = date(2025, 6, 1);
        let update = update_hotel_prices(
            &db,
            hotel.id,
            Quote::new(rates(dec!(120)), eur.id, date(2025, 12, 31)),
            change_day,
        )
        .await?;
        assert_eq!(update.record.single_price, dec!(120));
        assert!(matches!(update.revision, Revision::Repriced { closed: 1, .. }));

        let history = list_hotel_price_history(&db, hotel.id).await?;
        assert_eq!(history.len(), 2);
        // Newest first
        assert_eq!(history[0].single_price, dec!(120));
        assert_eq!(history[0].valid_from, change_day);
        assert_eq!(history[0].valid_until, date(2025, 12, 31));
        assert_eq!(history[1].single_price, dec!(100));
        assert_eq!(history[1].valid_from, date(2025, 1, 1));
        assert_eq!(history[1].valid_until, change_day);

        let march = hotel_price_on(&db, hotel.id, date(2025, 3, 15)).await?.unwrap();
        assert_eq!(march.prices().for_room(RoomType::Single), dec!(100));
        let july = hotel_price_on(&db, hotel.id, date(2025, 7, 1)).await?.unwrap();
        assert_eq!(july.prices().for_room(RoomType::Single), dec!(120));
        assert!(hotel_price_on(&db, hotel.id, date(2026, 1, 1)).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_unchanged_prices_leave_history_alone() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let hotel = create_test_hotel(&db, eur.id, dec!(100), date(2025, 1, 1)).await?;

        let update = update_hotel_prices(&db, hotel.id, hotel.quote(), date(2025, 2, 1)).await?;
        assert_eq!(update.revision, Revision::Unchanged);
        assert_eq!(HotelPriceHistory::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_with_past_valid_until_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let hotel = create_test_hotel(&db, eur.id, dec!(100), date(2025, 1, 1)).await?;

        let result = update_hotel_prices(
            &db,
            hotel.id,
            Quote::new(rates(dec!(90)), eur.id, date(2025, 1, 31)),
            date(2025, 2, 1),
        )
        .await;
        assert!(matches!(result, Err(Error::ValidUntilInPast { .. })));

        let unchanged = get_hotel_by_id(&db, hotel.id).await?.unwrap();
        assert_eq!(unchanged.single_price, dec!(100));
        assert_eq!(list_hotel_price_history(&db, hotel.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_hotel_name_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let result = create_hotel(
            &db,
            NewHotel {
                company_id: 1,
                name: "   ".to_string(),
                city_id: 1,
                quote: Quote::new(rates(dec!(100)), eur.id, date(2025, 12, 31)),
            },
            date(2025, 1, 1),
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_details_keeps_rates() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let hotel = create_test_hotel(&db, eur.id, dec!(100), date(2025, 1, 1)).await?;

        let renamed = update_hotel_details(&db, hotel.id, " Grand Palace ", 7).await?;
        assert_eq!(renamed.name, "Grand Palace");
        assert_eq!(renamed.city_id, 7);
        assert_eq!(renamed.single_price, dec!(100));
        assert_eq!(list_hotel_price_history(&db, hotel.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_hotels_in_city_skips_inactive() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let kept = create_test_hotel(&db, eur.id, dec!(100), date(2025, 1, 1)).await?;
        let closed = create_test_hotel(&db, eur.id, dec!(80), date(2025, 1, 1)).await?;
        deactivate_hotel(&db, closed.id).await?;

        let hotels = list_hotels_in_city(&db, kept.city_id).await?;
        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].id, kept.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_hotel_removes_history() -> Result<()> {
        let db = setup_test_db().await?;
        let eur = create_test_currency(&db, "EUR").await?;
        let hotel = create_test_hotel(&db, eur.id, dec!(100), date(2025, 1, 1)).await?;

        delete_hotel(&db, hotel.id).await?;
        assert!(get_hotel_by_id(&db, hotel.id).await?.is_none());
        assert!(HotelPriceHistory::find().all(&db).await?.is_empty());
        Ok(())
    }
}
