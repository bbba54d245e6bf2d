//! Unified error types and result handling.
//!
//! Validation failures are reported to the caller and never retried; database
//! failures are wrapped as they come out of `SeaORM`.

use crate::entities::{ItemType, SubItemType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Every failure the core can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A record looked up by identity does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record, e.g. `"hotel"`
        entity: &'static str,
        /// Identity that was looked up
        id: i64,
    },

    /// Malformed input that does not fit a more specific variant
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human-readable description
        message: String,
    },

    /// An operation whose end date precedes its start date
    #[error("End date {end} cannot be before start date {start}")]
    InvalidDateRange {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// A quoted price whose validity already elapsed
    #[error("Valid-until date {valid_until} is in the past (today is {today})")]
    ValidUntilInPast {
        /// Requested valid-until date
        valid_until: NaiveDate,
        /// Date the request was evaluated on
        today: NaiveDate,
    },

    /// A history window that ends before it starts
    #[error("Validity window ends ({valid_until}) before it starts ({valid_from})")]
    InvalidValidityWindow {
        /// Start of the window
        valid_from: NaiveDate,
        /// End of the window
        valid_until: NaiveDate,
    },

    /// A price field below zero
    #[error("Price field `{field}` cannot be negative: {amount}")]
    NegativeAmount {
        /// Name of the offending field
        field: &'static str,
        /// Offending amount
        amount: Decimal,
    },

    /// A vehicle cost that names both or neither of a tour and a transfer
    #[error("Vehicle cost must reference exactly one of a tour or a transfer")]
    InvalidVehicleRoute,

    /// The operation would be left with customers but no buyer
    #[error("Operation {operation_id} must have at least one active customer marked as buyer")]
    NoActiveBuyer {
        /// Operation being modified
        operation_id: i64,
    },

    /// A second buyer was flagged on the same operation
    #[error("Operation {operation_id} already has buyer customer {customer_id}")]
    BuyerAlreadyDesignated {
        /// Operation being modified
        operation_id: i64,
        /// The customer currently flagged as buyer
        customer_id: i64,
    },

    /// The buyer has no phone number or email
    #[error("Contact info is required for the buyer")]
    BuyerContactMissing,

    /// An item of the given type lacks the reference its type requires
    #[error("{item_type} items require `{field}`")]
    MissingItemField {
        /// Type of the item being validated
        item_type: ItemType,
        /// Missing field
        field: &'static str,
    },

    /// A sub-item type that is not allowed below its parent item
    #[error("Sub-item type {subitem_type} is not allowed for {item_type} items")]
    SubItemNotPermitted {
        /// Parent item type
        item_type: ItemType,
        /// Rejected sub-item type
        subitem_type: SubItemType,
    },

    /// Every candidate reference up to the configured cap is taken
    #[error("Could not allocate a reference number for {prefix}{date_stamp} within {max_sequence} attempts")]
    ReferenceExhausted {
        /// Buyer prefix
        prefix: String,
        /// `DDMMYY` stamp of the start date
        date_stamp: String,
        /// Highest sequence that was tried
        max_sequence: u32,
    },
}

impl Error {
    /// Whether this error belongs to the validation class (reported, never retried).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::InvalidDateRange { .. }
                | Self::ValidUntilInPast { .. }
                | Self::InvalidValidityWindow { .. }
                | Self::NegativeAmount { .. }
                | Self::InvalidVehicleRoute
                | Self::NoActiveBuyer { .. }
                | Self::BuyerAlreadyDesignated { .. }
                | Self::BuyerContactMissing
                | Self::MissingItemField { .. }
                | Self::SubItemNotPermitted { .. }
        )
    }

    /// Shorthand for [`Error::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(Error::BuyerContactMissing.is_validation());
        assert!(Error::InvalidVehicleRoute.is_validation());
        assert!(!Error::not_found("hotel", 1).is_validation());
        assert!(
            !Error::Config {
                message: "missing".to_string()
            }
            .is_validation()
        );
    }

    #[test]
    fn test_messages_name_the_offending_values() {
        let err = Error::SubItemNotPermitted {
            item_type: ItemType::NoVehicleActivity,
            subitem_type: SubItemType::Hotel,
        };
        assert_eq!(
            err.to_string(),
            "Sub-item type HOTEL is not allowed for NO_VEHICLE_ACTIVITY items"
        );
        assert_eq!(Error::not_found("operation", 7).to_string(), "operation 7 not found");
    }
}
