//! # manual_fx
//!
//! Manual exchange-rate overrides for quotations, purchase orders and
//! invoices.
//!
//! A user may type an exchange rate on a document. When present it replaces
//! the automatic daily rate for every monetary computation on that document,
//! is copied once into the invoice generated from an order, and drives the
//! home-currency amounts shown on printed reports.
//!
//! ## Example
//!
//! ```rust
//! use manual_fx::prelude::*;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
//! let engine = RateEngine::default_engine(InMemoryRateTable::new()).with_today(today);
//!
//! let org = Organization::new(1, "Acme SA", Currency::ARS);
//! let mut quote = Document::quote(org, Currency::USD)
//!     .with_line(Line::new("Consulting", Decimal::ONE, Decimal::new(100, 0)));
//!
//! engine
//!     .set_manual_rate(&mut quote, ManualRate::new(Decimal::new(1050_500000, 6)))
//!     .unwrap();
//!
//! let home = engine.home_amounts(&quote).unwrap();
//! assert_eq!(home.untaxed, Decimal::new(105050, 0));
//! ```

pub mod audit;
pub mod config;
pub mod context;
pub mod currency;
pub mod data;
pub mod document;
pub mod engine;
pub mod error;
pub mod guard;
pub mod hooks;
pub mod projection;
pub mod rate;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::audit::{AuditNotifier, MessageLog, MessageLogNotifier, RateAppliedNotice, RecordingNotifier};
    pub use crate::config::EngineConfig;
    pub use crate::context::ComputationContext;
    pub use crate::currency::Currency;
    pub use crate::data::fx::{InMemoryRateTable, RateTableLookup};
    pub use crate::document::{Document, DocumentKind, DocumentState, Line, MoveType, Organization, PrintMode};
    pub use crate::engine::{DocumentUpdate, RateEngine, UpdateOutcome};
    pub use crate::error::{ManualFxError, Result};
    pub use crate::guard::GuardOutcome;
    pub use crate::hooks::LifecycleHook;
    pub use crate::projection::{AmountTriple, LineAmounts};
    pub use crate::rate::{EffectiveRate, ManualRate, RateOrigin};
    pub use crate::types::*;
}
