//! Dual-currency projection of already-computed amounts

use crate::currency::Currency;
use crate::error::{ManualFxError, Result};
use crate::types::{Amount, Rate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, Neg};

/// Product of two decimals, failing instead of panicking on overflow
pub fn checked_product(amount: Decimal, factor: Decimal) -> Result<Decimal> {
    amount
        .checked_mul(factor)
        .ok_or_else(|| ManualFxError::AmountOverflow(format!("{} * {}", amount, factor)))
}

/// Document-level amounts: untaxed, tax and total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AmountTriple {
    pub untaxed: Amount,
    pub tax: Amount,
    pub total: Amount,
}

impl AmountTriple {
    pub fn new(untaxed: Amount, tax: Amount, total: Amount) -> Self {
        Self {
            untaxed,
            tax,
            total,
        }
    }

    /// Build from untaxed and tax, total being their sum
    pub fn from_parts(untaxed: Amount, tax: Amount) -> Self {
        Self::new(untaxed, tax, untaxed + tax)
    }

    /// Multiply every amount by `factor`
    pub fn scaled(&self, factor: Decimal) -> Result<Self> {
        Ok(Self {
            untaxed: checked_product(self.untaxed, factor)?,
            tax: checked_product(self.tax, factor)?,
            total: checked_product(self.total, factor)?,
        })
    }
}

impl Add for AmountTriple {
    type Output = AmountTriple;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            untaxed: self.untaxed + rhs.untaxed,
            tax: self.tax + rhs.tax,
            total: self.total + rhs.total,
        }
    }
}

impl Neg for AmountTriple {
    type Output = AmountTriple;

    fn neg(self) -> Self::Output {
        Self {
            untaxed: -self.untaxed,
            tax: -self.tax,
            total: -self.total,
        }
    }
}

impl Sum for AmountTriple {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(AmountTriple::default(), Add::add)
    }
}

/// Line-level amounts: unit price and subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineAmounts {
    pub price_unit: Amount,
    pub price_subtotal: Amount,
}

/// Project transaction-currency amounts into the home currency.
///
/// Returns `source` itself when the currencies match. Otherwise every amount
/// is multiplied by `rate`; no rounding is applied and the sign comes from
/// the source amount. A product outside the decimal range is
/// [`ManualFxError::AmountOverflow`].
pub fn project(source: &AmountTriple, rate: Rate, tx: Currency, home: Currency) -> Result<AmountTriple> {
    if tx == home {
        return Ok(*source);
    }
    source.scaled(rate)
}

/// Line-granularity counterpart of [`project`]
pub fn project_line(source: &LineAmounts, rate: Rate, tx: Currency, home: Currency) -> Result<LineAmounts> {
    if tx == home {
        return Ok(*source);
    }
    Ok(LineAmounts {
        price_unit: checked_product(source.price_unit, rate)?,
        price_subtotal: checked_product(source.price_subtotal, rate)?,
    })
}
