//! Base FX system - the automatic rate-table collaborator

use crate::currency::Currency;
use crate::error::Result;
use crate::types::{OrganizationId, Rate, ReferenceDate};
use std::sync::Arc;

/// Trait for the automatic exchange-rate provider.
///
/// Implementations return the rate such that `to_amount = from_amount * rate`,
/// or fail with [`ManualFxError::RateNotFound`](crate::error::ManualFxError::RateNotFound)
/// when nothing is configured for the pair, organization and date.
pub trait RateTableLookup: Send + Sync {
    /// Get the exchange rate from one currency to another on a given date
    fn get_rate(
        &self,
        from_currency: Currency,
        to_currency: Currency,
        organization: OrganizationId,
        date: ReferenceDate,
    ) -> Result<Rate>;

    /// Check if a rate is available
    fn has_rate(
        &self,
        from_currency: Currency,
        to_currency: Currency,
        organization: OrganizationId,
        date: ReferenceDate,
    ) -> bool {
        self.get_rate(from_currency, to_currency, organization, date)
            .is_ok()
    }
}

impl<T: RateTableLookup + ?Sized> RateTableLookup for &T {
    fn get_rate(
        &self,
        from_currency: Currency,
        to_currency: Currency,
        organization: OrganizationId,
        date: ReferenceDate,
    ) -> Result<Rate> {
        (**self).get_rate(from_currency, to_currency, organization, date)
    }
}

impl<T: RateTableLookup + ?Sized> RateTableLookup for Arc<T> {
    fn get_rate(
        &self,
        from_currency: Currency,
        to_currency: Currency,
        organization: OrganizationId,
        date: ReferenceDate,
    ) -> Result<Rate> {
        (**self).get_rate(from_currency, to_currency, organization, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManualFxError;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    struct Fixed;

    impl RateTableLookup for Fixed {
        fn get_rate(
            &self,
            from: Currency,
            to: Currency,
            _organization: OrganizationId,
            date: ReferenceDate,
        ) -> Result<Rate> {
            match (from, to) {
                (Currency::USD, Currency::ARS) => Ok(dec!(1000)),
                _ => Err(ManualFxError::RateNotFound { from, to, date }),
            }
        }
    }

    #[test]
    fn test_has_rate_default() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(Fixed.has_rate(Currency::USD, Currency::ARS, 1, date));
        assert!(!Fixed.has_rate(Currency::EUR, Currency::ARS, 1, date));
    }

    #[test]
    fn test_blanket_impls() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let shared: Arc<dyn RateTableLookup> = Arc::new(Fixed);
        assert_eq!(
            shared.get_rate(Currency::USD, Currency::ARS, 1, date).unwrap(),
            dec!(1000)
        );

        let borrowed = &Fixed;
        assert_eq!(
            borrowed.get_rate(Currency::USD, Currency::ARS, 1, date).unwrap(),
            dec!(1000)
        );
    }
}
