//! Lifecycle hooks
//!
//! The host's document lifecycle calls into the engine; the engine fans each
//! transition out to its registered [`LifecycleHook`]s. Every method has a
//! no-op default so a hook only implements what it subscribes to.

use crate::audit::{AuditNotifier, RateAppliedNotice};
use crate::context::ComputationContext;
use crate::currency::Currency;
use crate::document::{Document, PrintMode};
use crate::guard::{self, GuardOutcome};
use crate::types::DocumentId;

/// Subscriber to document lifecycle transitions
pub trait LifecycleHook: Send + Sync {
    fn name(&self) -> &'static str;

    /// Before a new transaction currency is stored
    fn before_currency_change(
        &self,
        _document: &mut Document,
        _new_currency: Currency,
    ) -> Option<GuardOutcome> {
        None
    }

    /// Before aggregate amounts are recomputed under `context`
    fn before_recompute(&self, _document: &Document, _context: &mut ComputationContext) {}

    /// After a document was confirmed or posted
    fn after_confirm(&self, _notice: &RateAppliedNotice) {}

    /// After a persisted update changed the print mode
    fn after_print_mode_change(&self, _document: DocumentId, _mode: PrintMode) {}
}

/// Manual-rate handling: currency guard and override injection
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualRateHook;

impl LifecycleHook for ManualRateHook {
    fn name(&self) -> &'static str {
        "manual_rate"
    }

    fn before_currency_change(
        &self,
        document: &mut Document,
        new_currency: Currency,
    ) -> Option<GuardOutcome> {
        Some(guard::on_currency_change(document, new_currency))
    }

    fn before_recompute(&self, document: &Document, context: &mut ComputationContext) {
        context.inject(document.manual_rate);
    }
}

/// Forwards confirmations and print-mode changes to an [`AuditNotifier`]
#[derive(Debug)]
pub struct AuditHook<N: AuditNotifier> {
    notifier: N,
}

impl<N: AuditNotifier> AuditHook<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }
}

impl<N: AuditNotifier> LifecycleHook for AuditHook<N> {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn after_confirm(&self, notice: &RateAppliedNotice) {
        self.notifier.notify_rate_applied(notice);
    }

    fn after_print_mode_change(&self, document: DocumentId, mode: PrintMode) {
        self.notifier.notify_print_mode_changed(document, mode);
    }
}
