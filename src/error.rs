//! Error types for manual_fx

use crate::currency::Currency;
use crate::types::{DocumentId, ReferenceDate};
use thiserror::Error;

/// Main error type for manual_fx
#[derive(Error, Debug)]
pub enum ManualFxError {
    #[error("No exchange rate found for {from}/{to} on {date}")]
    RateNotFound {
        from: Currency,
        to: Currency,
        date: ReferenceDate,
    },

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Invalid transition for document {document}: cannot {action} from state {from}")]
    InvalidTransition {
        document: DocumentId,
        from: String,
        action: &'static str,
    },

    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for manual_fx operations
pub type Result<T> = std::result::Result<T, ManualFxError>;
