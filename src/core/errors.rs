//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
///
/// Missing credentials are not represented here: a provider without
/// credentials runs in demo mode and never produces an error.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Endpoint discovery failed or a provider response did not match its schema
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
    },

    /// A translation call returned a non-success status
    #[error("Batch translation failed: {status} - {message}")]
    BatchTranslationError {
        status: u16,
        message: String,
    },

    /// Response body could not be parsed or lacked the translation list
    #[error("Invalid response: {message}")]
    InvalidResponse {
        message: String,
    },

    /// Caller supplied no rows or no target languages
    #[error("Invalid input: {message}")]
    InputError {
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Request timeout
    #[error("Request timeout")]
    TimeoutError,

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        path: String,
        message: String,
    },

    /// Invalid file format
    #[error("Invalid file format: {format}")]
    InvalidFormat {
        format: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Spreadsheet read error
    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    /// Spreadsheet write error
    #[error("Excel export error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TranslationError::TimeoutError
        } else if err.is_decode() {
            TranslationError::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            TranslationError::NetworkError {
                message: err.to_string(),
            }
        }
    }
}

impl TranslationError {
    /// Shorthand for an input error
    pub fn input(message: impl Into<String>) -> Self {
        TranslationError::InputError {
            message: message.into(),
        }
    }

    /// Shorthand for a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        TranslationError::ConfigurationError {
            message: message.into(),
        }
    }

    /// Whether this error aborts the whole target-language task rather than one batch
    pub fn is_configuration(&self) -> bool {
        matches!(self, TranslationError::ConfigurationError { .. })
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(TranslationError::configuration("no endpoint").is_configuration());
        assert!(!TranslationError::TimeoutError.is_configuration());
        assert!(!TranslationError::BatchTranslationError {
            status: 500,
            message: "boom".to_string(),
        }
        .is_configuration());
    }

    #[test]
    fn test_error_display() {
        let err = TranslationError::input("no target languages selected");
        assert_eq!(err.to_string(), "Invalid input: no target languages selected");
    }
}
