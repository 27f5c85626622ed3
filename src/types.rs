//! Core types and constants

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Monetary amount, in whatever currency the surrounding field declares
pub type Amount = Decimal;

/// Exchange rate: 1 unit of transaction currency = `Rate` units of home currency
pub type Rate = Decimal;

/// Calendar date used for rate lookups
pub type ReferenceDate = NaiveDate;

/// Unique identifier for documents
pub type DocumentId = uuid::Uuid;

/// Unique identifier for document lines
pub type LineId = uuid::Uuid;

/// Unique identifier for organizations (companies)
pub type OrganizationId = u64;

/// Decimal places kept on a stored manual rate
pub const DEFAULT_RATE_DECIMAL_PLACES: u32 = 6;
