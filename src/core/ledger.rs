//! Versioned price ledger - one generic implementation shared by every priced
//! catalog record.
//!
//! A priced record (hotel, museum, vehicle cost, activity cost) carries its
//! *current* quote on its own row. Each record type has a companion history
//! table holding one row per validity window. This module keeps the two in
//! step:
//!
//! * creating a record opens a window `[today, valid_until]`;
//! * changing any price field or the currency closes every window that has not
//!   yet elapsed (its `valid_until` becomes today) and opens a new one;
//! * changing nothing else but `valid_until`, or nothing at all, leaves the
//!   history untouched.
//!
//! History rows are only ever shortened, never rewritten, so an operation
//! booked against an old price can always find the window it was quoted in.
//!
//! A record type joins the ledger by implementing [`PricedRecord`] for its
//! model and [`LedgerEntry`] for its history model.

use crate::errors::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use std::fmt::Debug;
use tracing::{debug, info, instrument};

/// Column type of an entity, spelled from its model.
pub type ColumnOf<E> = <E as EntityTrait>::Column;

/// A bundle of named monetary amounts, e.g. the three room rates of a hotel.
pub trait PriceFields: Clone + PartialEq + Debug + Send + Sync {
    /// Every amount with its field name.
    fn amounts(&self) -> Vec<(&'static str, Decimal)>;
}

/// The priced part of a record: amounts, their currency and how long they
/// are quoted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote<P> {
    /// Price amounts
    pub prices: P,
    /// Currency of every amount in `prices`
    pub currency_id: i64,
    /// Last day the quote is intended to hold
    pub valid_until: NaiveDate,
}

impl<P: PriceFields> Quote<P> {
    /// Creates a quote.
    pub const fn new(prices: P, currency_id: i64, valid_until: NaiveDate) -> Self {
        Self {
            prices,
            currency_id,
            valid_until,
        }
    }

    /// Rejects a quote whose validity already elapsed or that carries a
    /// negative amount.
    ///
    /// # Errors
    /// [`Error::ValidUntilInPast`] or [`Error::NegativeAmount`].
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if self.valid_until < today {
            return Err(Error::ValidUntilInPast {
                valid_until: self.valid_until,
                today,
            });
        }
        if let Some((field, amount)) = self
            .prices
            .amounts()
            .into_iter()
            .find(|(_, amount)| *amount < Decimal::ZERO)
        {
            return Err(Error::NegativeAmount { field, amount });
        }
        Ok(())
    }

    /// Whether moving from `previous` to `self` changes any amount or the
    /// currency. A different `valid_until` alone does not count.
    #[must_use]
    pub fn reprices(&self, previous: &Self) -> bool {
        self.prices != previous.prices || self.currency_id != previous.currency_id
    }
}

/// Checks the `valid_from <= valid_until` invariant of a history window.
///
/// # Errors
/// [`Error::InvalidValidityWindow`] when the window ends before it starts.
pub fn validate_window(valid_from: NaiveDate, valid_until: NaiveDate) -> Result<()> {
    if valid_until < valid_from {
        return Err(Error::InvalidValidityWindow {
            valid_from,
            valid_until,
        });
    }
    Ok(())
}

/// A row of a price history table.
pub trait LedgerEntry: Clone + Debug + Send + Sync + Sized + 'static {
    /// History table entity
    type Entity: EntityTrait<Model = Self>;
    /// History active model
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;
    /// Amounts stored in each row
    type Prices: PriceFields;

    /// Primary key column
    fn id_column() -> ColumnOf<Self::Entity>;
    /// Column referencing the priced record
    fn owner_column() -> ColumnOf<Self::Entity>;
    /// `valid_from` column
    fn valid_from_column() -> ColumnOf<Self::Entity>;
    /// `valid_until` column
    fn valid_until_column() -> ColumnOf<Self::Entity>;
    /// `is_active` column
    fn is_active_column() -> ColumnOf<Self::Entity>;

    /// Builds a new active window for `owner_id`.
    fn open(
        owner_id: i64,
        quote: &Quote<Self::Prices>,
        valid_from: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Self::ActiveModel;

    /// Amounts recorded in this window.
    fn prices(&self) -> Self::Prices;
    /// Currency recorded in this window.
    fn currency_id(&self) -> i64;
    /// First day of the window.
    fn valid_from(&self) -> NaiveDate;
    /// Last day of the window.
    fn valid_until(&self) -> NaiveDate;
}

/// A catalog record whose current quote is tracked by a [`LedgerEntry`] table.
pub trait PricedRecord: Clone + Debug + Send + Sync + Sized + 'static {
    /// Record entity
    type Entity: EntityTrait<Model = Self>;
    /// Record active model
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;
    /// Companion history rows
    type History: LedgerEntry;

    /// Name used in errors and logs, e.g. `"hotel"`.
    const LABEL: &'static str;

    /// Primary key column
    fn id_column() -> ColumnOf<Self::Entity>;
    /// `is_active` column
    fn is_active_column() -> ColumnOf<Self::Entity>;

    /// Identity of the record.
    fn id(&self) -> i64;
    /// The quote currently stored on the record.
    fn quote(&self) -> Quote<Prices<Self>>;
    /// Writes `quote` into the record's active model and bumps `updated_at`.
    fn apply_quote(active: &mut Self::ActiveModel, quote: &Quote<Prices<Self>>, now: NaiveDateTime);
}

/// Price bundle type of a priced record.
pub type Prices<R> = <<R as PricedRecord>::History as LedgerEntry>::Prices;

/// Outcome of a quote change on the history table.
#[derive(Debug, Clone, PartialEq)]
pub enum Revision<H> {
    /// No amount or currency changed; the history is untouched
    Unchanged,
    /// The open windows were closed and a new one opened
    Repriced {
        /// Number of windows whose `valid_until` was cut back to today
        closed: u64,
        /// The newly opened window
        opened: H,
    },
}

impl<H> Revision<H> {
    /// The window opened by this revision, if any.
    pub const fn opened(&self) -> Option<&H> {
        match self {
            Self::Unchanged => None,
            Self::Repriced { opened, .. } => Some(opened),
        }
    }
}

/// Result of [`update_quote`]: the saved record and what happened to its history.
#[derive(Debug, Clone)]
pub struct PriceUpdate<R: PricedRecord> {
    /// The record as persisted
    pub record: R,
    /// History mutation performed alongside
    pub revision: Revision<R::History>,
}

/// Opens a window `[today, quote.valid_until]` for `owner_id`.
///
/// # Errors
/// [`Error::InvalidValidityWindow`] if the quote ends before today, or a
/// database error.
pub async fn open_entry<H, C>(
    db: &C,
    owner_id: i64,
    quote: &Quote<H::Prices>,
    today: NaiveDate,
) -> Result<H>
where
    H: LedgerEntry + IntoActiveModel<H::ActiveModel>,
    C: ConnectionTrait,
{
    validate_window(today, quote.valid_until)?;
    let entry = H::open(owner_id, quote, today, Utc::now().naive_utc())
        .insert(db)
        .await?;
    debug!(
        owner_id,
        valid_from = %entry.valid_from(),
        valid_until = %entry.valid_until(),
        "Opened price window"
    );
    Ok(entry)
}

/// Closes every window of `owner_id` that has not yet fully elapsed.
///
/// Windows that already started get `valid_until = today`. Windows that would
/// only start after today can never take effect any more and are deactivated
/// instead, so no window ever ends before it starts. Running this twice is
/// harmless. Returns the number of windows touched.
pub async fn close_open_entries<H, C>(db: &C, owner_id: i64, today: NaiveDate) -> Result<u64>
where
    H: LedgerEntry,
    C: ConnectionTrait,
{
    let closed = <H::Entity as EntityTrait>::update_many()
        .col_expr(H::valid_until_column(), Expr::value(today))
        .filter(H::owner_column().eq(owner_id))
        .filter(H::valid_from_column().lte(today))
        .filter(H::valid_until_column().gte(today))
        .exec(db)
        .await?
        .rows_affected;

    let withdrawn = <H::Entity as EntityTrait>::update_many()
        .col_expr(H::is_active_column(), Expr::value(false))
        .filter(H::owner_column().eq(owner_id))
        .filter(H::valid_from_column().gt(today))
        .filter(H::is_active_column().eq(true))
        .exec(db)
        .await?
        .rows_affected;

    Ok(closed + withdrawn)
}

/// Applies the ledger rule for a quote change from `previous` to `next`.
///
/// When no amount and no currency changed this is a no-op and returns
/// [`Revision::Unchanged`].
pub async fn revise<H, C>(
    db: &C,
    owner_id: i64,
    previous: &Quote<H::Prices>,
    next: &Quote<H::Prices>,
    today: NaiveDate,
) -> Result<Revision<H>>
where
    H: LedgerEntry + IntoActiveModel<H::ActiveModel>,
    C: ConnectionTrait,
{
    if !next.reprices(previous) {
        debug!(owner_id, "Quote unchanged, history left as is");
        return Ok(Revision::Unchanged);
    }

    let closed = close_open_entries::<H, C>(db, owner_id, today).await?;
    let opened = open_entry::<H, C>(db, owner_id, next, today).await?;
    info!(owner_id, closed, "Price history revised");
    Ok(Revision::Repriced { closed, opened })
}

/// The active window of `owner_id` covering `date`, or `None`.
///
/// There is no fallback to the record's current quote. When a repricing on
/// day D leaves two windows touching D, the newer window wins.
pub async fn entry_effective_on<H, C>(db: &C, owner_id: i64, date: NaiveDate) -> Result<Option<H>>
where
    H: LedgerEntry,
    C: ConnectionTrait,
{
    <H::Entity as EntityTrait>::find()
        .filter(H::owner_column().eq(owner_id))
        .filter(H::is_active_column().eq(true))
        .filter(H::valid_from_column().lte(date))
        .filter(H::valid_until_column().gte(date))
        .order_by_desc(H::valid_from_column())
        .order_by_desc(H::id_column())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Every window of `owner_id`, newest first.
pub async fn history<H, C>(db: &C, owner_id: i64) -> Result<Vec<H>>
where
    H: LedgerEntry,
    C: ConnectionTrait,
{
    <H::Entity as EntityTrait>::find()
        .filter(H::owner_column().eq(owner_id))
        .order_by_desc(H::valid_from_column())
        .order_by_desc(H::id_column())
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads a priced record by id.
///
/// # Errors
/// [`Error::NotFound`] when no record has that id.
pub async fn find_record<R, C>(db: &C, id: i64) -> Result<R>
where
    R: PricedRecord,
    C: ConnectionTrait,
{
    <R::Entity as EntityTrait>::find()
        .filter(R::id_column().eq(id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(R::LABEL, id))
}

/// Opens the first window of a freshly inserted record.
pub async fn record_created<R, C>(db: &C, record: &R, today: NaiveDate) -> Result<R::History>
where
    R: PricedRecord,
    R::History: IntoActiveModel<<R::History as LedgerEntry>::ActiveModel>,
    C: ConnectionTrait,
{
    let entry = open_entry::<R::History, C>(db, record.id(), &record.quote(), today).await?;
    info!(record = R::LABEL, id = record.id(), "Opened initial price window");
    Ok(entry)
}

/// The only sanctioned way to change a priced record's quote.
///
/// Loads the persisted record, applies the ledger rule against its current
/// quote and saves the new quote, all inside one transaction.
///
/// # Errors
/// Validation errors for a bad quote, [`Error::NotFound`] for an unknown id,
/// or a database error. Nothing is persisted on error.
#[instrument(skip(db, next), fields(record = R::LABEL))]
pub async fn update_quote<R>(
    db: &DatabaseConnection,
    id: i64,
    next: Quote<Prices<R>>,
    today: NaiveDate,
) -> Result<PriceUpdate<R>>
where
    R: PricedRecord + IntoActiveModel<R::ActiveModel>,
    R::History: IntoActiveModel<<R::History as LedgerEntry>::ActiveModel>,
{
    next.validate(today)?;

    let txn = db.begin().await?;
    let previous = find_record::<R, _>(&txn, id).await?;
    let revision =
        revise::<R::History, _>(&txn, id, &previous.quote(), &next, today).await?;

    let mut active = previous.into_active_model();
    R::apply_quote(&mut active, &next, Utc::now().naive_utc());
    let record = active.update(&txn).await?;
    txn.commit().await?;

    Ok(PriceUpdate { record, revision })
}

/// Flips the `is_active` flag of a priced record. The history is kept.
pub async fn set_record_active<R>(db: &DatabaseConnection, id: i64, active: bool) -> Result<R>
where
    R: PricedRecord,
{
    let txn = db.begin().await?;
    find_record::<R, _>(&txn, id).await?;
    <R::Entity as EntityTrait>::update_many()
        .col_expr(R::is_active_column(), Expr::value(active))
        .filter(R::id_column().eq(id))
        .exec(&txn)
        .await?;
    let record = find_record::<R, _>(&txn, id).await?;
    txn.commit().await?;
    Ok(record)
}

/// Deletes a priced record together with its whole history.
pub async fn delete_record<R>(db: &DatabaseConnection, id: i64) -> Result<()>
where
    R: PricedRecord,
{
    let txn = db.begin().await?;
    find_record::<R, _>(&txn, id).await?;
    let purged = <<R::History as LedgerEntry>::Entity as EntityTrait>::delete_many()
        .filter(<R::History as LedgerEntry>::owner_column().eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    <R::Entity as EntityTrait>::delete_many()
        .filter(R::id_column().eq(id))
        .exec(&txn)
        .await?;
    txn.commit().await?;
    info!(record = R::LABEL, id, purged, "Deleted priced record with its history");
    Ok(())
}
