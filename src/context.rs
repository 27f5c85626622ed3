//! Computation context - carries a manual rate override through one recompute
//!
//! A [`ComputationContext`] is built at the start of a single recompute pass
//! for a single document, handed by reference to every nested computation of
//! that pass, and dropped when the pass returns. Nothing here is global or
//! thread-local: two documents recomputed side by side each hold their own
//! context and cannot see each other's override.

use crate::currency::Currency;
use crate::data::fx::RateTableLookup;
use crate::document::Document;
use crate::error::Result;
use crate::projection::checked_product;
use crate::rate::{resolve, EffectiveRate, ManualRate};
use crate::types::{Amount, DocumentId, OrganizationId, Rate, ReferenceDate};

/// Manual rate forced onto nested computations of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateOverride {
    pub rate: Rate,
    pub document: DocumentId,
}

/// Scoped parameters of one recompute pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputationContext {
    document: DocumentId,
    tx_currency: Currency,
    home_currency: Currency,
    organization: OrganizationId,
    reference_date: ReferenceDate,
    rate_override: Option<RateOverride>,
}

impl ComputationContext {
    /// Empty context for `document`: nested computations use the automatic table
    pub fn new(document: &Document, today: ReferenceDate) -> Self {
        Self {
            document: document.id,
            tx_currency: document.currency,
            home_currency: document.home_currency(),
            organization: document.organization.id,
            reference_date: document.reference_date(today),
            rate_override: None,
        }
    }

    /// Context with the document's manual rate injected when it has one
    pub fn for_document(document: &Document, today: ReferenceDate) -> Self {
        let mut context = Self::new(document, today);
        context.inject(document.manual_rate);
        context
    }

    /// Install `manual` as the override for this pass.
    ///
    /// An unset rate leaves the context untouched. Injecting the same rate
    /// again is a no-op.
    pub fn inject(&mut self, manual: ManualRate) {
        if let Some(rate) = manual.get() {
            self.rate_override = Some(RateOverride {
                rate,
                document: self.document,
            });
        }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn reference_date(&self) -> ReferenceDate {
        self.reference_date
    }

    pub fn rate_override(&self) -> Option<RateOverride> {
        self.rate_override
    }

    pub fn is_same_currency(&self) -> bool {
        self.tx_currency == self.home_currency
    }

    /// Effective rate as seen by nested computations of this pass
    pub fn effective_rate<L: RateTableLookup + ?Sized>(&self, lookup: &L) -> Result<EffectiveRate> {
        let manual = self
            .rate_override
            .map(|o| ManualRate::new(o.rate))
            .unwrap_or(ManualRate::UNSET);

        resolve(
            manual,
            self.tx_currency,
            self.home_currency,
            self.organization,
            self.reference_date,
            lookup,
        )
    }

    /// Convert a transaction-currency amount into the home currency, rounded
    /// to the home currency's minor unit the way posted balances are.
    pub fn convert<L: RateTableLookup + ?Sized>(&self, amount: Amount, lookup: &L) -> Result<Amount> {
        if self.is_same_currency() {
            return Ok(amount);
        }
        let rate = self.effective_rate(lookup)?.rate;
        Ok(self.home_currency.round(checked_product(amount, rate)?))
    }
}
