//! Rate engine - manual-rate handling wired into the document lifecycle
//!
//! [`RateEngine`] is what the host application calls from its document
//! lifecycle: field updates, recomputes, confirmation/posting and invoice
//! generation. It owns the automatic rate table and the registered
//! [`LifecycleHook`]s but holds no per-document state, so one engine can
//! serve any number of documents.

use crate::audit::{AuditNotifier, MessageLog, MessageLogNotifier, RateAppliedNotice};
use crate::config::EngineConfig;
use crate::context::ComputationContext;
use crate::currency::Currency;
use crate::data::fx::RateTableLookup;
use crate::document::{Document, DocumentKind, DocumentState, Line, PrintMode};
use crate::error::{ManualFxError, Result};
use crate::guard::GuardOutcome;
use crate::hooks::{AuditHook, LifecycleHook, ManualRateHook};
use crate::projection::{project, project_line, AmountTriple, LineAmounts};
use crate::rate::{resolve, EffectiveRate, ManualRate};
use crate::types::ReferenceDate;

/// Field changes of one persisted update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUpdate {
    pub currency: Option<Currency>,
    pub manual_rate: Option<ManualRate>,
    pub print_mode: Option<PrintMode>,
    /// `Some(None)` clears the date
    pub date: Option<Option<ReferenceDate>>,
}

impl DocumentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn manual_rate(mut self, rate: ManualRate) -> Self {
        self.manual_rate = Some(rate);
        self
    }

    /// Manual rate as typed into a float field
    pub fn manual_rate_value(self, value: f64) -> Result<Self> {
        Ok(self.manual_rate(ManualRate::try_from_f64(value)?))
    }

    pub fn print_mode(mut self, mode: PrintMode) -> Self {
        self.print_mode = Some(mode);
        self
    }

    pub fn date(mut self, date: Option<ReferenceDate>) -> Self {
        self.date = Some(date);
        self
    }

    fn touches_amounts(&self) -> bool {
        self.currency.is_some() || self.manual_rate.is_some() || self.date.is_some()
    }
}

/// What an update did besides storing fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Guard result when the currency was part of the update
    pub guard: Option<GuardOutcome>,
    pub print_mode_changed: bool,
}

/// Host-facing façade for manual exchange rates
pub struct RateEngine<L: RateTableLookup> {
    config: EngineConfig,
    lookup: L,
    hooks: Vec<Box<dyn LifecycleHook>>,
    /// Fixed "today", mainly for reproducible tests
    today: Option<ReferenceDate>,
}

impl<L: RateTableLookup> RateEngine<L> {
    /// Create a new engine with the manual-rate hook registered
    pub fn new(config: EngineConfig, lookup: L) -> Self {
        Self {
            config,
            lookup,
            hooks: vec![Box::new(ManualRateHook)],
            today: None,
        }
    }

    /// Create engine with default configuration
    pub fn default_engine(lookup: L) -> Self {
        Self::new(EngineConfig::default(), lookup)
    }

    /// Register an audit notifier
    pub fn with_notifier<N: AuditNotifier + 'static>(self, notifier: N) -> Self {
        self.with_hook(AuditHook::new(notifier))
    }

    /// Register a message-log sink, filed under the configured audit category
    pub fn with_message_log<S: MessageLog + 'static>(self, sink: S) -> Self {
        let notifier = MessageLogNotifier::with_category(sink, self.config.audit_category.clone());
        self.with_notifier(notifier)
    }

    /// Register an additional lifecycle hook
    pub fn with_hook<H: LifecycleHook + 'static>(mut self, hook: H) -> Self {
        log::debug!("Registering lifecycle hook '{}'", hook.name());
        self.hooks.push(Box::new(hook));
        self
    }

    /// Pin the date used for documents without one
    pub fn with_today(mut self, today: ReferenceDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn today(&self) -> ReferenceDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Effective rate of `document`, resolved afresh on every call
    pub fn effective_rate(&self, document: &Document) -> Result<EffectiveRate> {
        resolve(
            document.manual_rate,
            document.currency,
            document.home_currency(),
            document.organization.id,
            document.reference_date(self.today()),
            &self.lookup,
        )
    }

    /// Context for one recompute pass of `document`, with hooks applied
    pub fn context_for(&self, document: &Document) -> ComputationContext {
        let mut context = ComputationContext::new(document, self.today());
        for hook in &self.hooks {
            hook.before_recompute(document, &mut context);
        }
        context
    }

    /// Recompute lines, totals and journal items of `document`
    pub fn recompute(&self, document: &mut Document) -> Result<()> {
        let context = self.context_for(document);
        log::debug!(
            "Recomputing document {} (override: {:?})",
            document.id,
            context.rate_override().map(|o| o.rate)
        );
        document.recompute(&context, &self.lookup)
    }

    /// Home-currency totals; signed for journal entries
    pub fn home_amounts(&self, document: &Document) -> Result<AmountTriple> {
        let rate = self.effective_rate(document)?;
        project(
            &document.signed_amounts(),
            rate.rate,
            document.currency,
            document.home_currency(),
        )
    }

    /// Home-currency unit price and subtotal of one line
    pub fn home_line_amounts(&self, document: &Document, line: &Line) -> Result<LineAmounts> {
        let rate = self.effective_rate(document)?;
        project_line(
            &line.amounts(),
            rate.rate,
            document.currency,
            document.home_currency(),
        )
    }

    /// Currency and totals a printed report should show
    pub fn report_amounts(&self, document: &Document) -> Result<(Currency, AmountTriple)> {
        match document.print_mode {
            PrintMode::Home => Ok((document.home_currency(), self.home_amounts(document)?)),
            PrintMode::Transaction => Ok((document.currency, document.signed_amounts())),
        }
    }

    /// Store a manual rate typed by the user
    pub fn set_manual_rate(&self, document: &mut Document, rate: ManualRate) -> Result<()> {
        self.update(document, DocumentUpdate::new().manual_rate(rate))
            .map(|_| ())
    }

    /// Change the transaction currency, running the guard first
    pub fn change_currency(&self, document: &mut Document, currency: Currency) -> Result<GuardOutcome> {
        let outcome = self.update(document, DocumentUpdate::new().currency(currency))?;
        Ok(outcome.guard.unwrap_or(GuardOutcome::Unchanged))
    }

    /// Apply a persisted update to `document`.
    ///
    /// Changes are staged on a copy and recomputed there; `document` is only
    /// replaced, and print-mode hooks only run, once the recompute succeeded.
    pub fn update(&self, document: &mut Document, update: DocumentUpdate) -> Result<UpdateOutcome> {
        if update.touches_amounts() {
            ensure_editable(document)?;
        }

        let mut outcome = UpdateOutcome::default();
        let mut staged = document.clone();

        if let Some(date) = update.date {
            staged.date = date;
        }

        // A rate entered in this update replaces the stored one before the guard runs
        if update.manual_rate.is_some() {
            staged.manual_rate = ManualRate::UNSET;
        }

        if let Some(currency) = update.currency {
            outcome.guard = Some(self.run_currency_hooks(&mut staged, currency));
            staged.currency = currency;
        }

        if let Some(rate) = update.manual_rate {
            staged.manual_rate = self.accepted_rate(&staged, rate);
        }

        if let Some(mode) = update.print_mode {
            if mode != staged.print_mode {
                staged.print_mode = mode;
                outcome.print_mode_changed = true;
            }
        }

        if update.touches_amounts() {
            self.recompute(&mut staged)?;
        }
        *document = staged;

        if outcome.print_mode_changed {
            for hook in &self.hooks {
                hook.after_print_mode_change(document.id, document.print_mode);
            }
        }
        Ok(outcome)
    }

    /// Cancel a draft or confirmed document. Posted entries stay posted.
    pub fn cancel(&self, document: &mut Document) -> Result<()> {
        match document.state {
            DocumentState::Draft | DocumentState::Confirmed => {
                document.state = DocumentState::Cancelled;
                log::info!("Document {} cancelled", document.id);
                Ok(())
            }
            state => Err(ManualFxError::InvalidTransition {
                document: document.id,
                from: state.to_string(),
                action: "cancel",
            }),
        }
    }

    fn accepted_rate(&self, document: &Document, rate: ManualRate) -> ManualRate {
        if rate.is_set() && !document.is_foreign() {
            log::warn!(
                "Ignoring manual rate {} on document {}: currency is the home currency {}",
                rate,
                document.id,
                document.home_currency()
            );
            return ManualRate::UNSET;
        }
        rate.rounded(self.config.rate_decimal_places)
    }

    fn run_currency_hooks(&self, document: &mut Document, currency: Currency) -> GuardOutcome {
        let mut result = GuardOutcome::Unchanged;
        for hook in &self.hooks {
            if let Some(outcome) = hook.before_currency_change(document, currency) {
                if outcome != GuardOutcome::Unchanged {
                    result = outcome;
                }
            }
        }
        result
    }

    /// Confirm an order or post a journal entry.
    ///
    /// The rate-applied notification goes out once here and never on a
    /// plain recompute. A failed rate lookup leaves the document untouched.
    pub fn confirm(&self, document: &mut Document) -> Result<RateAppliedNotice> {
        if document.state != DocumentState::Draft {
            return Err(ManualFxError::InvalidTransition {
                document: document.id,
                from: document.state.to_string(),
                action: "confirm",
            });
        }

        let mut staged = document.clone();
        let target = match staged.kind {
            DocumentKind::JournalEntry(_) => {
                if staged.date.is_none() {
                    staged.date = Some(self.today());
                }
                DocumentState::Posted
            }
            _ => DocumentState::Confirmed,
        };

        self.recompute(&mut staged)?;
        let rate = self.effective_rate(&staged)?;
        let home = self.home_amounts(&staged)?;
        staged.state = target;

        let notice = RateAppliedNotice {
            document: staged.id,
            tx_currency: staged.currency,
            home_currency: staged.home_currency(),
            effective_rate: rate.rate,
            origin: rate.origin,
            reference_date: staged.reference_date(self.today()),
            total_tx: staged.signed_amounts().total,
            total_home: home.total,
        };

        *document = staged;
        log::info!(
            "Document {} {} at {} rate {} ({})",
            document.id,
            document.state,
            notice.tx_currency,
            notice.effective_rate,
            notice.origin
        );

        if self.config.notify_on_confirm {
            for hook in &self.hooks {
                hook.after_confirm(&notice);
            }
        }
        Ok(notice)
    }

    /// Generate a draft invoice or vendor bill from a confirmed order.
    ///
    /// The order's manual rate is copied into the invoice once.
    pub fn generate_invoice(&self, source: &Document) -> Result<Document> {
        let move_type = match source.kind.invoice_type() {
            Some(move_type) if source.state == DocumentState::Confirmed => move_type,
            _ => {
                return Err(ManualFxError::InvalidTransition {
                    document: source.id,
                    from: source.state.to_string(),
                    action: "generate invoice",
                })
            }
        };

        let mut invoice = Document::derived_from(source, move_type, source.manual_rate);
        self.recompute(&mut invoice)?;

        log::info!(
            "Generated invoice {} from {} (manual rate: {})",
            invoice.id,
            source.id,
            invoice.manual_rate
        );
        Ok(invoice)
    }
}

fn ensure_editable(document: &Document) -> Result<()> {
    match document.state {
        DocumentState::Draft | DocumentState::Confirmed => Ok(()),
        state => Err(ManualFxError::InvalidTransition {
            document: document.id,
            from: state.to_string(),
            action: "edit amounts",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditEvent, MemoryMessageLog, RecordingNotifier};
    use crate::data::fx::{ExplodingRateTable, InMemoryRateTable};
    use crate::document::{MoveType, Organization};
    use crate::rate::RateOrigin;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn today() -> ReferenceDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn org() -> Organization {
        Organization::new(1, "Acme SA", Currency::ARS)
    }

    fn table() -> InMemoryRateTable {
        let mut table = InMemoryRateTable::new();
        table
            .add_rate(Currency::USD, Currency::ARS, today(), dec!(880))
            .unwrap();
        table
    }

    fn usd_quote() -> Document {
        Document::quote(org(), Currency::USD)
            .with_date(today())
            .with_line(Line::new("Consulting", dec!(1), dec!(100)).with_tax_rate(dec!(0.21)))
    }

    #[test]
    fn test_home_amounts_automatic() {
        let engine = RateEngine::default_engine(table()).with_today(today());
        let mut quote = usd_quote();
        engine.recompute(&mut quote).unwrap();

        let home = engine.home_amounts(&quote).unwrap();
        assert_eq!(home.untaxed, dec!(88000));
        assert_eq!(home.total, dec!(106480));
    }

    #[test]
    fn test_set_manual_rate_rounds_and_recomputes() {
        let engine = RateEngine::default_engine(table()).with_today(today());
        let mut quote = usd_quote();

        engine
            .set_manual_rate(&mut quote, ManualRate::new(dec!(1050.50000049)))
            .unwrap();

        assert_eq!(quote.manual_rate.get(), Some(dec!(1050.500000)));
        assert_eq!(quote.amounts.untaxed, dec!(100));
    }

    #[test]
    fn test_manual_rate_value_rejects_nan() {
        assert!(DocumentUpdate::new().manual_rate_value(f64::NAN).is_err());
        let update = DocumentUpdate::new().manual_rate_value(-4.0).unwrap();
        assert_eq!(update.manual_rate, Some(ManualRate::UNSET));
    }

    #[test]
    fn test_confirm_notifies_once() {
        let recorder = Arc::new(RecordingNotifier::new());
        let engine = RateEngine::default_engine(ExplodingRateTable::new())
            .with_today(today())
            .with_notifier(Arc::clone(&recorder));
        let mut quote = usd_quote();
        quote.manual_rate = ManualRate::new(dec!(1050.5));

        let notice = engine.confirm(&mut quote).unwrap();
        assert_eq!(quote.state, DocumentState::Confirmed);
        assert_eq!(notice.origin, RateOrigin::Manual);
        assert_eq!(notice.total_home, dec!(127110.5));

        engine.recompute(&mut quote).unwrap();
        assert!(engine.confirm(&mut quote).is_err());
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_confirm_failure_leaves_document_draft() {
        let engine = RateEngine::default_engine(InMemoryRateTable::new()).with_today(today());
        let mut quote = usd_quote();

        let err = engine.confirm(&mut quote).unwrap_err();
        assert!(matches!(err, ManualFxError::RateNotFound { .. }));
        assert_eq!(quote.state, DocumentState::Draft);
    }

    #[test]
    fn test_confirm_without_notification() {
        let recorder = Arc::new(RecordingNotifier::new());
        let config = EngineConfig {
            notify_on_confirm: false,
            ..EngineConfig::default()
        };
        let engine = RateEngine::new(config, table())
            .with_today(today())
            .with_notifier(Arc::clone(&recorder));
        let mut quote = usd_quote();

        engine.confirm(&mut quote).unwrap();
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_post_sets_missing_date() {
        let engine = RateEngine::default_engine(table()).with_today(today());
        let mut bill = Document::journal_entry(org(), Currency::USD, MoveType::InInvoice)
            .with_line(Line::new("Parts", dec!(2), dec!(50)));

        let notice = engine.confirm(&mut bill).unwrap();
        assert_eq!(bill.state, DocumentState::Posted);
        assert_eq!(bill.date, Some(today()));
        assert_eq!(notice.total_tx, dec!(-100));
        assert_eq!(notice.total_home, dec!(-88000));
    }

    #[test]
    fn test_print_mode_change_notifies_only_on_change() {
        let recorder = Arc::new(RecordingNotifier::new());
        let engine = RateEngine::default_engine(table())
            .with_today(today())
            .with_notifier(Arc::clone(&recorder));
        let mut quote = usd_quote();

        let outcome = engine
            .update(&mut quote, DocumentUpdate::new().print_mode(PrintMode::Home))
            .unwrap();
        assert!(outcome.print_mode_changed);

        let outcome = engine
            .update(&mut quote, DocumentUpdate::new().print_mode(PrintMode::Home))
            .unwrap();
        assert!(!outcome.print_mode_changed);

        assert_eq!(
            recorder.events(),
            vec![AuditEvent::PrintModeChanged {
                document: quote.id,
                mode: PrintMode::Home
            }]
        );
    }

    #[test]
    fn test_failed_update_leaves_document_and_notifier_untouched() {
        let recorder = Arc::new(RecordingNotifier::new());
        let engine = RateEngine::default_engine(InMemoryRateTable::new())
            .with_today(today())
            .with_notifier(Arc::clone(&recorder));
        let mut invoice = Document::journal_entry(org(), Currency::USD, MoveType::OutInvoice)
            .with_date(today())
            .with_line(Line::new("Service", dec!(1), dec!(100)));
        invoice.manual_rate = ManualRate::new(dec!(1000));
        engine.recompute(&mut invoice).unwrap();
        let before = invoice.clone();

        let err = engine
            .update(
                &mut invoice,
                DocumentUpdate::new()
                    .manual_rate(ManualRate::UNSET)
                    .print_mode(PrintMode::Home),
            )
            .unwrap_err();

        assert!(matches!(err, ManualFxError::RateNotFound { .. }));
        assert_eq!(invoice, before);
        assert_eq!(invoice.manual_rate.get(), Some(dec!(1000)));
        assert_eq!(invoice.print_mode, PrintMode::Transaction);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_currency_and_new_rate_in_one_update() {
        let engine = RateEngine::default_engine(ExplodingRateTable::new()).with_today(today());
        let mut quote = usd_quote();
        quote.manual_rate = ManualRate::new(dec!(1050.5));

        let outcome = engine
            .update(
                &mut quote,
                DocumentUpdate::new()
                    .currency(Currency::EUR)
                    .manual_rate(ManualRate::new(dec!(1130))),
            )
            .unwrap();

        assert_eq!(outcome.guard, Some(GuardOutcome::Unchanged));
        assert_eq!(quote.currency, Currency::EUR);
        assert_eq!(quote.manual_rate.get(), Some(dec!(1130)));
    }

    #[test]
    fn test_rate_with_switch_to_home_is_not_stored() {
        let engine = RateEngine::default_engine(table()).with_today(today());
        let mut quote = usd_quote();

        engine
            .update(
                &mut quote,
                DocumentUpdate::new()
                    .currency(Currency::ARS)
                    .manual_rate(ManualRate::new(dec!(1130))),
            )
            .unwrap();

        assert_eq!(quote.currency, Currency::ARS);
        assert!(!quote.manual_rate.is_set());
    }

    #[test]
    fn test_message_log_uses_configured_category() {
        let sink = Arc::new(MemoryMessageLog::new());
        let config = EngineConfig {
            audit_category: "fx".to_string(),
            ..EngineConfig::default()
        };
        let engine = RateEngine::new(config, table())
            .with_today(today())
            .with_message_log(Arc::clone(&sink));
        let mut quote = usd_quote();

        engine.confirm(&mut quote).unwrap();

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].category, "fx");
    }

    #[test]
    fn test_cancel() {
        let engine = RateEngine::default_engine(table()).with_today(today());
        let mut quote = usd_quote();
        engine.confirm(&mut quote).unwrap();

        engine.cancel(&mut quote).unwrap();
        assert_eq!(quote.state, DocumentState::Cancelled);
        assert!(engine.generate_invoice(&quote).is_err());
        assert!(engine
            .set_manual_rate(&mut quote, ManualRate::new(dec!(1000)))
            .is_err());

        let mut entry = Document::journal_entry(org(), Currency::USD, MoveType::OutInvoice)
            .with_line(Line::new("Service", dec!(1), dec!(10)));
        engine.confirm(&mut entry).unwrap();
        let err = engine.cancel(&mut entry).unwrap_err();
        assert!(matches!(err, ManualFxError::InvalidTransition { .. }));
        assert_eq!(entry.state, DocumentState::Posted);
    }

    #[test]
    fn test_report_amounts_follow_print_mode() {
        let engine = RateEngine::default_engine(table()).with_today(today());
        let mut quote = usd_quote();
        engine.recompute(&mut quote).unwrap();

        let (currency, amounts) = engine.report_amounts(&quote).unwrap();
        assert_eq!(currency, Currency::USD);
        assert_eq!(amounts.total, dec!(121));

        quote.print_mode = PrintMode::Home;
        let (currency, amounts) = engine.report_amounts(&quote).unwrap();
        assert_eq!(currency, Currency::ARS);
        assert_eq!(amounts.total, dec!(106480));
    }

    #[test]
    fn test_posted_document_rejects_rate_edit() {
        let engine = RateEngine::default_engine(table()).with_today(today());
        let mut entry = Document::journal_entry(org(), Currency::USD, MoveType::OutInvoice)
            .with_line(Line::new("Service", dec!(1), dec!(10)));
        engine.confirm(&mut entry).unwrap();

        let err = engine
            .set_manual_rate(&mut entry, ManualRate::new(dec!(1000)))
            .unwrap_err();
        assert!(matches!(err, ManualFxError::InvalidTransition { .. }));

        // Print mode is still editable after posting
        engine
            .update(&mut entry, DocumentUpdate::new().print_mode(PrintMode::Home))
            .unwrap();
        assert_eq!(entry.print_mode, PrintMode::Home);
    }

    #[test]
    fn test_generate_invoice_requires_confirmed_order() {
        let engine = RateEngine::default_engine(table()).with_today(today());
        let quote = usd_quote();

        let err = engine.generate_invoice(&quote).unwrap_err();
        assert!(matches!(err, ManualFxError::InvalidTransition { .. }));
    }
}
