//! Foreign Exchange (FX) rate lookup
//!
//! The automatic rate table is an external collaborator. This module holds the
//! trait the rest of the crate consumes, plus two implementations.
//!
//! # Components
//!
//! - **base**: The `RateTableLookup` trait
//! - **in_memory**: Daily rate table backed by `BTreeMap`s, loadable from CSV
//! - **exploding**: Testing stub that panics on cross-currency lookups
//!
//! # Example
//!
//! ```rust
//! use manual_fx::currency::Currency;
//! use manual_fx::data::fx::{InMemoryRateTable, RateTableLookup};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let mut table = InMemoryRateTable::new();
//! let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
//!
//! table.add_rate(Currency::USD, Currency::ARS, date, Decimal::new(900, 0)).unwrap();
//!
//! let rate = table.get_rate(Currency::USD, Currency::ARS, 1, date).unwrap();
//! assert_eq!(rate, Decimal::new(900, 0));
//! ```

pub mod base;
pub mod exploding;
pub mod in_memory;

pub use base::RateTableLookup;
pub use exploding::ExplodingRateTable;
pub use in_memory::InMemoryRateTable;
