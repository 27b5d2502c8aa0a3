//! Assessment Translator - concurrent spreadsheet translation library
//!
//! Reads assessment workbooks, sends each distinct string once per target
//! language through a rate-limited provider (Google Translate or Bhashini),
//! and reassembles structurally identical translated workbooks.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod pipeline;
pub mod processors;
pub mod providers;
pub mod server;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use self::core::{
    config::TranslatorConfig,
    endpoint_cache::PipelineEndpointCache,
    errors::{Result, TranslationError},
    models::{
        CellValue, ProviderKind, Row, Sheet, TranslatableColumns, TranslatedResult,
        TranslationLookup, TranslationResults, Workbook,
    },
};

pub use pipeline::{DeduplicatingBatcher, WorkbookTranslator};
pub use providers::{build_provider, BhashiniProvider, GoogleProvider, TranslationProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
