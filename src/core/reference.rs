//! Operation reference numbers.
//!
//! A reference reads `<PREFIX><DDMMYY><SEQ>`: the buyer company's short name,
//! the operation's start date and a three digit sequence, e.g. `ABC100325001`
//! for the first operation of buyer `ABC` starting on 10 March 2025.

use crate::{
    config::ReferencePolicy,
    entities::{Operation, operation},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{DbErr, QuerySelect, SqlErr, prelude::*};
use std::collections::HashSet;
use tracing::debug;

/// Upper-cased buyer short name with whitespace removed.
#[must_use]
pub fn reference_prefix(short_name: &str) -> String {
    short_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// `DDMMYY` stamp of a date.
#[must_use]
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%d%m%y").to_string()
}

/// Joins the parts of a reference, padding the sequence to three digits.
#[must_use]
pub fn format_reference(prefix: &str, stamp: &str, sequence: u32) -> String {
    format!("{prefix}{stamp}{sequence:03}")
}

/// Whether a failed write lost a race on a unique column.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Finds the lowest free reference for a buyer and start date.
///
/// References held by `exclude_operation_id` do not count as taken, so an
/// operation being re-saved can keep or reclaim its own number. The scan
/// stops at `policy.max_sequence`.
///
/// # Errors
/// [`Error::ReferenceExhausted`] when every sequence up to the cap is used,
/// [`Error::InvalidInput`] when the short name has no usable characters.
pub async fn allocate_reference<C>(
    db: &C,
    buyer_short_name: &str,
    start_date: NaiveDate,
    exclude_operation_id: Option<i64>,
    policy: &ReferencePolicy,
) -> Result<String>
where
    C: ConnectionTrait,
{
    allocate_reference_avoiding(
        db,
        buyer_short_name,
        start_date,
        exclude_operation_id,
        &HashSet::new(),
        policy,
    )
    .await
}

/// Like [`allocate_reference`], but also treats every number in `lost` as
/// taken.
///
/// A writer that lost a uniqueness race passes the numbers it lost, since
/// the competing row may not be visible to its own transaction.
pub async fn allocate_reference_avoiding<C>(
    db: &C,
    buyer_short_name: &str,
    start_date: NaiveDate,
    exclude_operation_id: Option<i64>,
    lost: &HashSet<String>,
    policy: &ReferencePolicy,
) -> Result<String>
where
    C: ConnectionTrait,
{
    let prefix = reference_prefix(buyer_short_name);
    if prefix.is_empty() {
        return Err(Error::InvalidInput {
            message: "Buyer short name cannot be empty".to_string(),
        });
    }
    let stamp = date_stamp(start_date);
    let base = format!("{prefix}{stamp}");

    let mut query = Operation::find()
        .select_only()
        .column(operation::Column::ReferenceNumber)
        .filter(operation::Column::ReferenceNumber.starts_with(&base));
    if let Some(id) = exclude_operation_id {
        query = query.filter(operation::Column::Id.ne(id));
    }
    let taken: HashSet<String> = query.into_tuple::<String>().all(db).await?.into_iter().collect();

    let free = (1..=policy.max_sequence)
        .map(|sequence| format_reference(&prefix, &stamp, sequence))
        .find(|candidate| !taken.contains(candidate) && !lost.contains(candidate));

    match free {
        Some(reference) => {
            debug!(%reference, taken = taken.len(), "Allocated reference");
            Ok(reference)
        }
        None => Err(Error::ReferenceExhausted {
            prefix,
            date_stamp: stamp,
            max_sequence: policy.max_sequence,
        }),
    }
}
