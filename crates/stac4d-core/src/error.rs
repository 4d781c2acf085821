//! Error types for stac4d

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Stac4dError {
    // CRS and geometry errors
    #[error("Invalid CRS: '{input}' does not resolve to a coordinate reference system")]
    InvalidCrs { input: String },

    #[error("Reprojection from {from} to {to} failed: {reason}")]
    Reprojection {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Invalid bounding box: {reason}")]
    InvalidBbox { reason: String },

    // Property schema errors
    #[error("Missing required property: {name}")]
    MissingRequiredProperty { name: String },

    #[error("Invalid value '{value}' for {name}. Allowed values: {}", allowed.join(", "))]
    InvalidEnumValue {
        name: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Type mismatch for {name}: expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("Extension {uri} is not registered on this object")]
    ExtensionNotRegistered { uri: String },

    // Catalog structure errors
    #[error("Collection not found: {id}")]
    CollectionNotFound { id: String },

    #[error("Collection already exists: {id}")]
    DuplicateCollection { id: String },

    #[error("Item already exists in target: {id}")]
    DuplicateItem { id: String },

    #[error("Invalid catalog arguments: {reason}")]
    InvalidCatalogArgs { reason: String },

    #[error("Invalid id '{id}': {reason}")]
    InvalidId { id: String, reason: String },

    #[error("Inconsistent collection summary: item count {item_count} but {timestamps} timestamps")]
    SummaryMismatch { item_count: u64, timestamps: usize },

    // Source file errors
    #[error("Failed to read source file {path}: {reason}")]
    SourceFile { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Stac4dError {
    fn from(err: serde_json::Error) -> Self {
        Stac4dError::Serialization(err.to_string())
    }
}

impl Stac4dError {
    /// Shorthand for a missing required property
    pub fn missing(name: impl Into<String>) -> Self {
        Stac4dError::MissingRequiredProperty { name: name.into() }
    }

    /// Shorthand for a type mismatch on a named property
    pub fn type_mismatch(
        name: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Stac4dError::TypeMismatch {
            name: name.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Stac4dError>;
