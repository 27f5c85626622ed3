//! Audit notifications
//!
//! The core reports two transitions: a rate applied when a document is
//! confirmed or posted, and a change of print mode. How they are rendered and
//! stored is up to the host; [`MessageLogNotifier`] turns them into plain-text
//! messages for a [`MessageLog`] sink.

use crate::currency::Currency;
use crate::document::PrintMode;
use crate::error::Result;
use crate::rate::RateOrigin;
use crate::types::{Amount, DocumentId, Rate, ReferenceDate};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Default message-log category
pub const DEFAULT_AUDIT_CATEGORY: &str = "currency_rate";

/// Payload of a rate-applied notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateAppliedNotice {
    pub document: DocumentId,
    pub tx_currency: Currency,
    pub home_currency: Currency,
    pub effective_rate: Rate,
    pub origin: RateOrigin,
    pub reference_date: ReferenceDate,
    pub total_tx: Amount,
    pub total_home: Amount,
}

impl RateAppliedNotice {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Receiver of audit notifications
pub trait AuditNotifier: Send + Sync {
    fn notify_rate_applied(&self, notice: &RateAppliedNotice);

    fn notify_print_mode_changed(&self, document: DocumentId, new_mode: PrintMode);
}

/// Generic audit-trail sink
pub trait MessageLog: Send + Sync {
    fn message_log(&self, document: DocumentId, title: &str, body: &str, category: &str);
}

/// One message written to a [`MemoryMessageLog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMessage {
    pub document: DocumentId,
    pub title: String,
    pub body: String,
    pub category: String,
}

/// Sink that keeps messages in memory
#[derive(Debug, Default)]
pub struct MemoryMessageLog {
    messages: Mutex<Vec<LoggedMessage>>,
}

impl MemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<LoggedMessage> {
        lock(&self.messages).clone()
    }
}

impl MessageLog for MemoryMessageLog {
    fn message_log(&self, document: DocumentId, title: &str, body: &str, category: &str) {
        lock(&self.messages).push(LoggedMessage {
            document,
            title: title.to_string(),
            body: body.to_string(),
            category: category.to_string(),
        });
    }
}

impl<S: MessageLog + ?Sized> MessageLog for std::sync::Arc<S> {
    fn message_log(&self, document: DocumentId, title: &str, body: &str, category: &str) {
        (**self).message_log(document, title, body, category)
    }
}

/// Renders notifications as plain-text messages
#[derive(Debug)]
pub struct MessageLogNotifier<S: MessageLog> {
    sink: S,
    category: String,
}

impl<S: MessageLog> MessageLogNotifier<S> {
    pub fn new(sink: S) -> Self {
        Self::with_category(sink, DEFAULT_AUDIT_CATEGORY)
    }

    pub fn with_category(sink: S, category: impl Into<String>) -> Self {
        Self {
            sink,
            category: category.into(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: MessageLog> AuditNotifier for MessageLogNotifier<S> {
    fn notify_rate_applied(&self, notice: &RateAppliedNotice) {
        let title = match notice.origin {
            RateOrigin::Manual => "Manual exchange rate applied",
            RateOrigin::Automatic => "System exchange rate applied",
        };
        let body = format!(
            "1 {} = {} {} ({} rate, {}). Total: {} {} = {} {}",
            notice.tx_currency,
            notice.effective_rate,
            notice.home_currency,
            notice.origin,
            notice.reference_date,
            notice.total_tx,
            notice.tx_currency,
            notice.total_home,
            notice.home_currency
        );
        self.sink
            .message_log(notice.document, title, &body, &self.category);
    }

    fn notify_print_mode_changed(&self, document: DocumentId, new_mode: PrintMode) {
        let body = format!("Reports will be printed in {}", new_mode);
        self.sink
            .message_log(document, "Print currency changed", &body, &self.category);
    }
}

/// Notification captured by a [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    RateApplied(RateAppliedNotice),
    PrintModeChanged {
        document: DocumentId,
        mode: PrintMode,
    },
}

/// Notifier that records every call
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        lock(&self.events).clone()
    }

    pub fn rate_applied(&self) -> Vec<RateAppliedNotice> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                AuditEvent::RateApplied(notice) => Some(notice.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.events).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditNotifier for RecordingNotifier {
    fn notify_rate_applied(&self, notice: &RateAppliedNotice) {
        lock(&self.events).push(AuditEvent::RateApplied(notice.clone()));
    }

    fn notify_print_mode_changed(&self, document: DocumentId, new_mode: PrintMode) {
        lock(&self.events).push(AuditEvent::PrintModeChanged {
            document,
            mode: new_mode,
        });
    }
}

impl<N: AuditNotifier + ?Sized> AuditNotifier for std::sync::Arc<N> {
    fn notify_rate_applied(&self, notice: &RateAppliedNotice) {
        (**self).notify_rate_applied(notice)
    }

    fn notify_print_mode_changed(&self, document: DocumentId, new_mode: PrintMode) {
        (**self).notify_print_mode_changed(document, new_mode)
    }
}

// A poisoned lock only means another thread panicked mid-push; the Vec is still valid.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
