/// Generic versioned price ledger shared by every priced record
pub mod ledger;

/// Hotel room rates
pub mod hotel;

/// Museum entrance fees
pub mod museum;

/// Vehicle supplier costs per tour or transfer
pub mod vehicle_cost;

/// Activity supplier costs
pub mod activity_cost;

/// Currencies, vehicle types and buyer companies
pub mod catalog;

/// Operation reference number allocation
pub mod reference;

/// Operation day calendar
pub mod calendar;

/// Operation lifecycle
pub mod operation;

/// Operation customers, buyer designation and pax counting
pub mod customer;

/// Operation items and sub-items
pub mod item;

/// Operation-level sales prices
pub mod sales_price;
