//! Error and warning types for lmerge-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when a file schema declares neither merge kind
pub const NO_SCHEMA_KIND: &str = "No include or composite property found in JSON schema";

/// Errors that abort a merge
#[derive(Debug, Error)]
pub enum Error {
    /// The original document is not valid JSON
    #[error("Invalid JSON file: {identity}")]
    InvalidDocument {
        identity: String,
        #[source]
        source: serde_json::Error,
    },

    /// The file schema is malformed or declares no merge kind
    #[error("{0}")]
    SchemaConfiguration(String),

    /// An array composite entry has no key path
    #[error("Composite entry at path: {path} has type array but no key path")]
    MissingKeyPath { path: String },

    /// The composite root does not resolve to an array
    #[error("Source object value is not an array at path: {path}")]
    NotAnArray { path: String },

    /// The composite root does not resolve to a keyed object
    #[error("Source object value is not an object at path: {path}")]
    NotAnObject { path: String },

    /// An object composite has no entry for the default locale
    #[error(
        "Source item not found at path: {path}. You must specify a source item where its key matches the default locale"
    )]
    DefaultLocaleMissing { path: String },

    /// A payload references an index the source array does not have
    #[error(
        "Array index /{index} is not present in the source json at path: {path}. The translated JSON must only reference items of the source array"
    )]
    IndexOutOfRange { index: usize, path: String },

    /// Fewer translated items than existing target-locale items
    #[error(
        "Items to add is less than items to remove at path: {path}. Items to add: {to_add}, items to remove: {to_remove}"
    )]
    ReconciliationCount {
        path: String,
        to_add: usize,
        to_remove: usize,
    },

    /// A schema JSONPath could not be evaluated
    #[error("Invalid JSONPath '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// A transform `match` pattern failed to compile
    #[error("Invalid transform pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Two targets of a per-locale job would write the same output file
    #[error("Target locale {locale} is listed more than once; its outputs would overwrite each other")]
    DuplicateLocale { locale: String },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw JSON error, e.g. an unparsable translated payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error belongs to the reported merge taxonomy.
    ///
    /// Payload format errors and I/O failures propagate to the caller
    /// without going through the reporter.
    pub fn is_reported(&self) -> bool {
        !matches!(self, Error::FileRead { .. } | Error::Io(_) | Error::Json(_))
    }
}

/// Non-fatal conditions; the affected (target, entry) pair is skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    /// The payload has no section for the composite root and no transform applies
    #[error(
        "Translated JSON for locale: {locale} does not have a valid sourceObjectPointer: {pointer}. Skipping this target"
    )]
    MissingSourcePointer { locale: String, pointer: String },

    /// A transform-only array pass found no default-locale items to copy
    #[error(
        "Source items not found at path: {path} where the key matches the default locale: {default_locale}. Skipping this target"
    )]
    NoDefaultLocaleItems { path: String, default_locale: String },
}
