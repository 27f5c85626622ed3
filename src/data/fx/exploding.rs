//! Exploding rate table - testing stub
//!
//! Panics on any cross-currency lookup. Use it wherever a computation must not
//! reach the automatic rate table, such as a document carrying a manual rate.

use super::base::RateTableLookup;
use crate::currency::Currency;
use crate::error::Result;
use crate::types::{OrganizationId, Rate, ReferenceDate};
use rust_decimal::Decimal;

/// Exploding rate table
///
/// # Example
/// ```should_panic
/// use manual_fx::currency::Currency;
/// use manual_fx::data::fx::{ExplodingRateTable, RateTableLookup};
/// use chrono::NaiveDate;
///
/// let table = ExplodingRateTable::new();
/// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
///
/// // This will panic!
/// table.get_rate(Currency::USD, Currency::ARS, 1, date).unwrap();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplodingRateTable {
    /// Custom panic message
    message: Option<&'static str>,
}

impl ExplodingRateTable {
    /// Create new exploding rate table with default message
    pub fn new() -> Self {
        Self { message: None }
    }

    /// Create with custom panic message
    pub fn with_message(message: &'static str) -> Self {
        Self {
            message: Some(message),
        }
    }

    fn panic_message(&self) -> &'static str {
        self.message
            .unwrap_or("Automatic rate lookup not allowed! This computation should use a manual rate.")
    }
}

impl RateTableLookup for ExplodingRateTable {
    fn get_rate(
        &self,
        from: Currency,
        to: Currency,
        organization: OrganizationId,
        date: ReferenceDate,
    ) -> Result<Rate> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        panic!(
            "{}\n\nAttempted lookup: {} -> {} for organization {} on {}",
            self.panic_message(),
            from,
            to,
            organization,
            date
        );
    }

    fn has_rate(
        &self,
        from: Currency,
        to: Currency,
        _organization: OrganizationId,
        _date: ReferenceDate,
    ) -> bool {
        from == to
    }
}
