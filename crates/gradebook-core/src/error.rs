//! Error types for gradebook-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gradebook-core
#[derive(Debug, Error)]
pub enum Error {
    /// Two grade items share a name (compared without whitespace)
    #[error("Grade item already exists: {0}")]
    DuplicateItem(String),

    /// Two categories share a name
    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    /// Two students share an id
    #[error("Student already exists: {0}")]
    DuplicateStudent(String),

    /// Grade item names a category that was never defined
    #[error("Grade item '{item}' refers to unknown category '{category}'")]
    UnknownCategory { item: String, category: String },

    /// Student id not on the roster
    #[error("Student not found: {0}")]
    UnknownStudent(String),

    /// No scored grade item with this name
    #[error("Scored grade item not found: {0}")]
    UnknownItem(String),

    /// Maximum score must be a positive, finite number
    #[error("Invalid out-of value for '{item}': {value}")]
    InvalidOutOf { item: String, value: f64 },

    /// Weights must be finite and non-negative
    #[error("Invalid weight for '{name}': {value}")]
    InvalidWeight { name: String, value: f64 },

    /// Item name is empty once whitespace is removed
    #[error("Grade item name must not be blank")]
    BlankName,

    /// Formula-level failure surfaced to gradebook callers
    #[error("Formula error: {0}")]
    Formula(String),

    /// Malformed gradebook file
    #[cfg(feature = "serde")]
    #[error("Invalid gradebook file: {0}")]
    Json(#[from] serde_json::Error),
}
