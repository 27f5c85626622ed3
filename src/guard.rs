//! Change-of-currency guard
//!
//! Runs before a new transaction currency is stored on a document. Switching
//! to the home currency clears the manual rate; switching between foreign
//! currencies keeps whatever manual rate was there.

use crate::currency::Currency;
use crate::document::Document;
use crate::rate::ManualRate;
use serde::{Deserialize, Serialize};

/// What the guard did to the manual rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardOutcome {
    /// Manual rate was set and has been reset to unset
    Cleared,
    /// Nothing to clear
    Unchanged,
    /// New currency is foreign and a manual rate entered for another
    /// currency was kept
    Retained,
}

/// Apply the guard for `document` moving to `new_currency`.
///
/// Does not store `new_currency`; the caller does that after the guard runs.
pub fn on_currency_change(document: &mut Document, new_currency: Currency) -> GuardOutcome {
    let home = document.home_currency();

    if new_currency == home {
        if !document.manual_rate.is_set() {
            return GuardOutcome::Unchanged;
        }
        log::info!(
            "Clearing manual rate {} on document {}: currency set to home currency {}",
            document.manual_rate,
            document.id,
            home
        );
        document.manual_rate = ManualRate::UNSET;
        return GuardOutcome::Cleared;
    }

    if document.manual_rate.is_set() && new_currency != document.currency {
        // TODO: decide whether a foreign-to-foreign switch should also clear the rate
        log::warn!(
            "Keeping manual rate {} on document {} after currency change {} -> {}",
            document.manual_rate,
            document.id,
            document.currency,
            new_currency
        );
        return GuardOutcome::Retained;
    }

    GuardOutcome::Unchanged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Organization;
    use rust_decimal_macros::dec;

    fn usd_quote_with_rate() -> Document {
        let mut quote = Document::quote(Organization::new(1, "Acme SA", Currency::ARS), Currency::USD);
        quote.manual_rate = ManualRate::new(dec!(1050.5));
        quote
    }

    #[test]
    fn test_switch_to_home_clears_rate() {
        let mut quote = usd_quote_with_rate();
        assert_eq!(on_currency_change(&mut quote, Currency::ARS), GuardOutcome::Cleared);
        assert_eq!(quote.manual_rate, ManualRate::UNSET);
        assert_eq!(quote.manual_rate.stored(), dec!(0));
    }

    #[test]
    fn test_switch_to_home_twice_is_noop() {
        let mut quote = usd_quote_with_rate();
        on_currency_change(&mut quote, Currency::ARS);
        assert_eq!(on_currency_change(&mut quote, Currency::ARS), GuardOutcome::Unchanged);
        assert!(!quote.manual_rate.is_set());
    }

    #[test]
    fn test_foreign_to_foreign_keeps_stale_rate() {
        let mut quote = usd_quote_with_rate();
        assert_eq!(on_currency_change(&mut quote, Currency::EUR), GuardOutcome::Retained);
        assert_eq!(quote.manual_rate.get(), Some(dec!(1050.5)));
    }

    #[test]
    fn test_same_foreign_currency_is_unchanged() {
        let mut quote = usd_quote_with_rate();
        assert_eq!(on_currency_change(&mut quote, Currency::USD), GuardOutcome::Unchanged);
        assert!(quote.manual_rate.is_set());
    }

    #[test]
    fn test_does_not_store_new_currency() {
        let mut quote = usd_quote_with_rate();
        on_currency_change(&mut quote, Currency::ARS);
        assert_eq!(quote.currency, Currency::USD);
    }
}
