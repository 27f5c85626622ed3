//! Rate resolution - manual rate if present, automatic table otherwise
//!
//! A [`ManualRate`] is what the user typed on a document. An [`EffectiveRate`]
//! is what a single computation pass actually multiplies by. Effective rates
//! are produced on demand by [`resolve`] and are never stored.

use crate::currency::Currency;
use crate::data::fx::RateTableLookup;
use crate::error::{ManualFxError, Result};
use crate::types::{OrganizationId, Rate, ReferenceDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-entered override rate: 1 transaction-currency unit = rate home units.
///
/// Stored as a plain decimal where zero means "unset". Zero and negative
/// inputs both collapse to unset, so [`ManualRate::get`] never yields a
/// non-positive multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct ManualRate(Option<Rate>);

impl ManualRate {
    /// No manual rate: use the automatic table
    pub const UNSET: ManualRate = ManualRate(None);

    /// Build from a stored decimal; zero or negative is unset
    pub fn new(value: Decimal) -> Self {
        if value > Decimal::ZERO {
            Self(Some(value))
        } else {
            Self(None)
        }
    }

    /// Build from a float entered in a form field
    pub fn try_from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(ManualFxError::InvalidRate(format!(
                "manual rate must be finite, got: {}",
                value
            )));
        }
        Decimal::from_f64(value)
            .map(Self::new)
            .ok_or_else(|| ManualFxError::InvalidRate(format!("manual rate out of range: {}", value)))
    }

    /// Same rate rounded to the storage precision
    pub fn rounded(self, decimal_places: u32) -> Self {
        match self.0 {
            Some(rate) => Self::new(rate.round_dp(decimal_places)),
            None => self,
        }
    }

    /// The rate when set
    pub fn get(&self) -> Option<Rate> {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Storage representation, zero when unset
    pub fn stored(&self) -> Decimal {
        self.0.unwrap_or(Decimal::ZERO)
    }
}

impl From<Decimal> for ManualRate {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl From<ManualRate> for Decimal {
    fn from(rate: ManualRate) -> Self {
        rate.stored()
    }
}

impl FromStr for ManualRate {
    type Err = ManualFxError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::UNSET);
        }
        Decimal::from_str(trimmed)
            .map(Self::new)
            .map_err(|e| ManualFxError::InvalidRate(format!("{}: {}", trimmed, e)))
    }
}

impl fmt::Display for ManualRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(rate) => write!(f, "{}", rate),
            None => write!(f, "unset"),
        }
    }
}

/// Where an effective rate came from, for audit output only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    Manual,
    Automatic,
}

impl fmt::Display for RateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateOrigin::Manual => write!(f, "manual"),
            RateOrigin::Automatic => write!(f, "automatic"),
        }
    }
}

/// Rate used by one computation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveRate {
    pub rate: Rate,
    pub origin: RateOrigin,
}

impl EffectiveRate {
    pub fn manual(rate: Rate) -> Self {
        Self {
            rate,
            origin: RateOrigin::Manual,
        }
    }

    pub fn automatic(rate: Rate) -> Self {
        Self {
            rate,
            origin: RateOrigin::Automatic,
        }
    }

    /// Rate for a same-currency document
    pub fn identity() -> Self {
        Self::automatic(Decimal::ONE)
    }
}

/// Resolve the effective rate for converting `tx` amounts into `home` amounts.
///
/// Same currency yields `1` without touching the lookup, even if a manual
/// rate is set. A set manual rate is returned untouched. Otherwise the
/// lookup is asked and its failure is returned as-is.
pub fn resolve<L: RateTableLookup + ?Sized>(
    manual: ManualRate,
    tx: Currency,
    home: Currency,
    organization: OrganizationId,
    reference_date: ReferenceDate,
    lookup: &L,
) -> Result<EffectiveRate> {
    if tx == home {
        if manual.is_set() {
            log::warn!(
                "Ignoring manual rate {} on a {} document for a {} organization",
                manual,
                tx,
                home
            );
        }
        return Ok(EffectiveRate::identity());
    }

    let effective = match manual.get() {
        Some(rate) => EffectiveRate::manual(rate),
        None => EffectiveRate::automatic(lookup.get_rate(tx, home, organization, reference_date)?),
    };

    log::debug!(
        "Resolved {}/{} rate {} ({}) for organization {} on {}",
        tx,
        home,
        effective.rate,
        effective.origin,
        organization,
        reference_date
    );
    Ok(effective)
}
