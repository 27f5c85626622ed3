//! Documents - quotations, purchase orders and journal entries
//!
//! A [`Document`] owns its [`Line`]s. Line subtotals and document totals are
//! computed in the transaction currency by [`Document::recompute`]; journal
//! entries additionally carry [`JournalLine`]s whose home-currency balance is
//! the nested conversion that honours a propagated manual rate.

use crate::context::ComputationContext;
use crate::currency::Currency;
use crate::data::fx::RateTableLookup;
use crate::error::{ManualFxError, Result};
use crate::projection::{checked_product, AmountTriple, LineAmounts};
use crate::rate::ManualRate;
use crate::types::{Amount, DocumentId, LineId, OrganizationId, ReferenceDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Owning organization (company)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    /// Home (accounting) currency
    pub currency: Currency,
}

impl Organization {
    pub fn new(id: OrganizationId, name: impl Into<String>, currency: Currency) -> Self {
        Self {
            id,
            name: name.into(),
            currency,
        }
    }
}

/// Journal entry flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    /// Customer invoice
    OutInvoice,
    /// Customer credit note
    OutRefund,
    /// Vendor bill
    InInvoice,
    /// Vendor credit note
    InRefund,
    /// Miscellaneous entry
    Entry,
}

impl MoveType {
    /// Sign applied to `*_signed` amounts
    pub fn sign(&self) -> Decimal {
        match self {
            MoveType::OutInvoice | MoveType::InRefund | MoveType::Entry => Decimal::ONE,
            MoveType::OutRefund | MoveType::InInvoice => Decimal::NEGATIVE_ONE,
        }
    }
}

/// Document variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Quote,
    PurchaseOrder,
    JournalEntry(MoveType),
}

impl DocumentKind {
    pub fn is_order(&self) -> bool {
        matches!(self, DocumentKind::Quote | DocumentKind::PurchaseOrder)
    }

    /// Journal entry type generated from this kind of order
    pub fn invoice_type(&self) -> Option<MoveType> {
        match self {
            DocumentKind::Quote => Some(MoveType::OutInvoice),
            DocumentKind::PurchaseOrder => Some(MoveType::InInvoice),
            DocumentKind::JournalEntry(_) => None,
        }
    }
}

/// Document lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentState {
    Draft,
    /// Confirmed order
    Confirmed,
    /// Posted journal entry
    Posted,
    Cancelled,
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentState::Draft => "draft",
            DocumentState::Confirmed => "confirmed",
            DocumentState::Posted => "posted",
            DocumentState::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Currency a printed report shows amounts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintMode {
    #[default]
    Transaction,
    Home,
}

impl PrintMode {
    /// From the stored "print in company currency" flag
    pub fn from_flag(print_in_home_currency: bool) -> Self {
        if print_in_home_currency {
            PrintMode::Home
        } else {
            PrintMode::Transaction
        }
    }

    pub fn is_home(&self) -> bool {
        matches!(self, PrintMode::Home)
    }
}

impl fmt::Display for PrintMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintMode::Transaction => write!(f, "transaction currency"),
            PrintMode::Home => write!(f, "home currency"),
        }
    }
}

/// Document line in transaction currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub description: String,
    pub quantity: Decimal,
    pub price_unit: Amount,
    /// Discount in percent (10 = 10%)
    pub discount: Decimal,
    /// Tax as a fraction of the subtotal (0.21 = 21%)
    pub tax_rate: Decimal,
    pub price_subtotal: Amount,
    pub price_tax: Amount,
}

impl Line {
    pub fn new(description: impl Into<String>, quantity: Decimal, price_unit: Amount) -> Self {
        Self {
            id: LineId::new_v4(),
            description: description.into(),
            quantity,
            price_unit,
            discount: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            price_subtotal: Decimal::ZERO,
            price_tax: Decimal::ZERO,
        }
    }

    pub fn with_discount(mut self, percent: Decimal) -> Self {
        self.discount = percent;
        self
    }

    pub fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Recompute subtotal and tax, rounded to the currency's minor unit
    pub fn compute(&mut self, currency: Currency) -> Result<()> {
        let factor = Decimal::ONE - self.discount / Decimal::ONE_HUNDRED;
        let gross = checked_product(self.quantity, self.price_unit)?;
        self.price_subtotal = currency.round(checked_product(gross, factor)?);
        self.price_tax = currency.round(checked_product(self.price_subtotal, self.tax_rate)?);
        Ok(())
    }

    pub fn amounts(&self) -> LineAmounts {
        LineAmounts {
            price_unit: self.price_unit,
            price_subtotal: self.price_subtotal,
        }
    }

    fn triple(&self) -> AmountTriple {
        AmountTriple::from_parts(self.price_subtotal, self.price_tax)
    }

    /// Copy for a derived document, with a fresh id
    fn duplicate(&self) -> Self {
        Self {
            id: LineId::new_v4(),
            ..self.clone()
        }
    }
}

/// Journal item of a journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Source line, `None` for the tax line
    pub line: Option<LineId>,
    pub label: String,
    /// Signed amount in transaction currency
    pub amount_currency: Amount,
    /// Signed amount in home currency
    pub balance: Amount,
}

/// Quote, purchase order or journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub organization: Organization,
    /// Transaction currency
    pub currency: Currency,
    /// Order date or invoice date
    pub date: Option<ReferenceDate>,
    pub manual_rate: ManualRate,
    pub print_mode: PrintMode,
    pub state: DocumentState,
    pub lines: Vec<Line>,
    pub journal_lines: Vec<JournalLine>,
    /// Unsigned totals in transaction currency
    pub amounts: AmountTriple,
    /// Document this one was generated from
    pub origin: Option<DocumentId>,
}

impl Document {
    pub fn new(kind: DocumentKind, organization: Organization, currency: Currency) -> Self {
        Self {
            id: DocumentId::new_v4(),
            kind,
            organization,
            currency,
            date: None,
            manual_rate: ManualRate::UNSET,
            print_mode: PrintMode::default(),
            state: DocumentState::Draft,
            lines: Vec::new(),
            journal_lines: Vec::new(),
            amounts: AmountTriple::default(),
            origin: None,
        }
    }

    pub fn quote(organization: Organization, currency: Currency) -> Self {
        Self::new(DocumentKind::Quote, organization, currency)
    }

    pub fn purchase_order(organization: Organization, currency: Currency) -> Self {
        Self::new(DocumentKind::PurchaseOrder, organization, currency)
    }

    pub fn journal_entry(organization: Organization, currency: Currency, move_type: MoveType) -> Self {
        Self::new(DocumentKind::JournalEntry(move_type), organization, currency)
    }

    /// Draft journal entry generated from `source`.
    ///
    /// `manual_rate` is copied into the new document once; the two documents
    /// share nothing afterwards.
    pub fn derived_from(source: &Document, move_type: MoveType, manual_rate: ManualRate) -> Self {
        let mut derived = Self::journal_entry(source.organization.clone(), source.currency, move_type);
        derived.manual_rate = manual_rate;
        derived.lines = source.lines.iter().map(Line::duplicate).collect();
        derived.origin = Some(source.id);
        derived
    }

    pub fn with_date(mut self, date: ReferenceDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    pub fn add_line(&mut self, line: Line) -> LineId {
        let id = line.id;
        self.lines.push(line);
        id
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn home_currency(&self) -> Currency {
        self.organization.currency
    }

    pub fn is_foreign(&self) -> bool {
        self.currency != self.home_currency()
    }

    /// Whether the manual rate field is relevant to show
    pub fn show_manual_rate(&self) -> bool {
        self.is_foreign()
    }

    /// Date used for automatic rate lookups
    pub fn reference_date(&self, today: ReferenceDate) -> ReferenceDate {
        self.date.unwrap_or(today)
    }

    pub fn is_journal_entry(&self) -> bool {
        matches!(self.kind, DocumentKind::JournalEntry(_))
    }

    /// Accounting sign of this document's totals
    pub fn sign(&self) -> Decimal {
        match self.kind {
            DocumentKind::JournalEntry(move_type) => move_type.sign(),
            _ => Decimal::ONE,
        }
    }

    /// Totals carrying the document's accounting sign
    pub fn signed_amounts(&self) -> AmountTriple {
        if self.sign().is_sign_negative() {
            return -self.amounts;
        }
        self.amounts
    }

    /// Recompute lines, totals and journal items under `context`.
    ///
    /// `context` must have been built for this document.
    pub fn recompute<L: RateTableLookup + ?Sized>(
        &mut self,
        context: &ComputationContext,
        lookup: &L,
    ) -> Result<()> {
        if context.document() != self.id {
            return Err(ManualFxError::DataError(format!(
                "computation context for {} used on document {}",
                context.document(),
                self.id
            )));
        }

        let currency = self.currency;
        for line in &mut self.lines {
            line.compute(currency)?;
        }
        self.amounts = self.lines.iter().map(Line::triple).sum();

        if self.is_journal_entry() {
            self.journal_lines = self.build_journal_lines(context, lookup)?;
        }
        Ok(())
    }

    fn build_journal_lines<L: RateTableLookup + ?Sized>(
        &self,
        context: &ComputationContext,
        lookup: &L,
    ) -> Result<Vec<JournalLine>> {
        let sign = self.sign();
        let mut items = Vec::with_capacity(self.lines.len() + 1);

        for line in &self.lines {
            let amount_currency = line.price_subtotal * sign;
            items.push(JournalLine {
                line: Some(line.id),
                label: line.description.clone(),
                amount_currency,
                balance: context.convert(amount_currency, lookup)?,
            });
        }

        if !self.amounts.tax.is_zero() {
            let amount_currency = self.amounts.tax * sign;
            items.push(JournalLine {
                line: None,
                label: "Taxes".to_string(),
                amount_currency,
                balance: context.convert(amount_currency, lookup)?,
            });
        }
        Ok(items)
    }
}
