//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
///
/// In the default (lenient) mode only [`FormulaError::Parse`] for runaway
/// nesting can surface; everything else degrades to zero. Strict mode
/// reports the rest.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Input left over after a complete expression
    #[error("Unexpected characters after expression: '{0}'")]
    TrailingInput(String),

    /// Variable reference with no binding
    #[error("Unresolved variable: {0}")]
    UnresolvedVariable(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Computed items that depend on each other
    #[error("Circular reference detected involving {0}")]
    CircularReference(String),
}
