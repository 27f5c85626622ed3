//! In-memory rate table implementation
//!
//! Daily rates keyed by currency pair, optionally scoped to one organization.
//! A lookup uses the most recent rate on or before the requested date, the way
//! a daily rate table is read by the accounting host.

use super::base::RateTableLookup;
use crate::config::EngineConfig;
use crate::currency::{Currency, CurrencyPair};
use crate::error::{ManualFxError, Result};
use crate::types::{OrganizationId, Rate, ReferenceDate};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

/// Scope of a stored rate: shared by every organization or owned by one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Scope {
    Shared,
    Organization(OrganizationId),
}

/// In-memory daily rate table
///
/// # Example
/// ```
/// use manual_fx::currency::Currency;
/// use manual_fx::data::fx::{InMemoryRateTable, RateTableLookup};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let mut table = InMemoryRateTable::new();
/// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
///
/// // 1 USD = 820.50 ARS
/// table.add_rate(Currency::USD, Currency::ARS, date, Decimal::new(82050, 2)).unwrap();
///
/// let rate = table.get_rate(Currency::USD, Currency::ARS, 1, date).unwrap();
/// assert_eq!(rate, Decimal::new(82050, 2));
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryRateTable {
    /// (scope, pair) -> (date -> rate)
    rates: HashMap<(Scope, CurrencyPair), BTreeMap<ReferenceDate, Rate>>,
    /// Answer B/A lookups from stored A/B rates
    auto_inverse: bool,
}

/// One CSV row: `date,from,to,rate[,organization]`
#[derive(Debug, Deserialize)]
struct RateRecord {
    date: NaiveDate,
    from: String,
    to: String,
    rate: Decimal,
    #[serde(default)]
    organization: Option<OrganizationId>,
}

impl InMemoryRateTable {
    /// Create new rate table with inverse lookup enabled
    pub fn new() -> Self {
        Self::with_inverse(true)
    }

    /// Create with explicit inverse-lookup setting
    pub fn with_inverse(auto_inverse: bool) -> Self {
        Self {
            rates: HashMap::new(),
            auto_inverse,
        }
    }

    /// Create following the engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_inverse(config.inverse_lookup)
    }

    /// Add a rate shared by every organization
    pub fn add_rate(
        &mut self,
        from: Currency,
        to: Currency,
        date: ReferenceDate,
        rate: Rate,
    ) -> Result<()> {
        self.insert(Scope::Shared, from, to, date, rate)
    }

    /// Add a rate that only applies to one organization
    pub fn add_organization_rate(
        &mut self,
        organization: OrganizationId,
        from: Currency,
        to: Currency,
        date: ReferenceDate,
        rate: Rate,
    ) -> Result<()> {
        self.insert(Scope::Organization(organization), from, to, date, rate)
    }

    fn insert(
        &mut self,
        scope: Scope,
        from: Currency,
        to: Currency,
        date: ReferenceDate,
        rate: Rate,
    ) -> Result<()> {
        if rate <= Decimal::ZERO {
            return Err(ManualFxError::InvalidRate(format!(
                "FX rate must be positive, got: {}",
                rate
            )));
        }

        self.rates
            .entry((scope, CurrencyPair::new(from, to)))
            .or_default()
            .insert(date, rate);
        Ok(())
    }

    /// Load rates from CSV with a `date,from,to,rate[,organization]` header
    pub fn load_from_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(reader);

        let mut count = 0;
        for record in csv_reader.deserialize::<RateRecord>() {
            let record = record?;
            let from: Currency = record.from.parse()?;
            let to: Currency = record.to.parse()?;
            let scope = match record.organization {
                Some(id) => Scope::Organization(id),
                None => Scope::Shared,
            };
            self.insert(scope, from, to, record.date, record.rate)?;
            count += 1;
        }

        log::debug!("Loaded {} rates into in-memory rate table", count);
        Ok(count)
    }

    /// Clear all rates
    pub fn clear(&mut self) {
        self.rates.clear();
    }

    /// Get number of stored (scope, pair) series
    pub fn num_pairs(&self) -> usize {
        self.rates.len()
    }

    /// Get total number of rate entries across all series
    pub fn num_entries(&self) -> usize {
        self.rates.values().map(|tree| tree.len()).sum()
    }

    /// Most recent rate on or before `date` in one scope
    fn nearest(&self, scope: Scope, pair: CurrencyPair, date: ReferenceDate) -> Option<Rate> {
        self.rates
            .get(&(scope, pair))?
            .range(..=date)
            .next_back()
            .map(|(_, rate)| *rate)
    }

    /// Organization rates take precedence over shared ones
    fn scoped(
        &self,
        organization: OrganizationId,
        pair: CurrencyPair,
        date: ReferenceDate,
    ) -> Option<Rate> {
        self.nearest(Scope::Organization(organization), pair, date)
            .or_else(|| self.nearest(Scope::Shared, pair, date))
    }
}

impl Default for InMemoryRateTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RateTableLookup for InMemoryRateTable {
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

        let pair = CurrencyPair::new(from, to);
        if let Some(rate) = self.scoped(organization, pair, date) {
            return Ok(rate);
        }

        if self.auto_inverse {
            if let Some(rate) = self.scoped(organization, pair.inverse(), date) {
                // Stored rates are strictly positive, so this never divides by zero
                return Ok(Decimal::ONE / rate);
            }
        }

        Err(ManualFxError::RateNotFound { from, to, date })
    }
}
